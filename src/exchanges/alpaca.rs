use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::core::{
    broker::{BaseBroker, Broker},
    config::{ApiKeys, BrokerConfig},
    error::ExchangeError,
    types::*,
};

/// 单页K线最大条数
const BARS_PAGE_LIMIT: u32 = 10_000;
/// 翻页上限，防止服务端异常导致死循环
const MAX_BAR_PAGES: usize = 20;
/// 单页挂单最大条数（Alpaca 上限）
const OPEN_ORDERS_PAGE_LIMIT: usize = 500;
/// 挂单翻页上限
const MAX_ORDER_PAGES: usize = 20;

/// Alpaca 券商实现（交易 + 行情 REST v2）
pub struct AlpacaBroker {
    base: BaseBroker,
}

impl AlpacaBroker {
    /// 创建Alpaca实例
    pub fn new(
        config: BrokerConfig,
        api_keys: ApiKeys,
        timeout: Duration,
    ) -> std::result::Result<Self, ExchangeError> {
        let base = BaseBroker::new("alpaca".to_string(), config, api_keys, timeout)?;
        Ok(Self { base })
    }

    /// 发送认证请求到Alpaca
    async fn send_request<T, B>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
        B: Serialize + ?Sized,
    {
        let mut request = self
            .base
            .client
            .request(method, url)
            .header("APCA-API-KEY-ID", &self.base.api_keys.api_key)
            .header("APCA-API-SECRET-KEY", &self.base.api_keys.api_secret);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "未知错误".to_string());

        Err(map_error_status(status, error_text, retry_after))
    }

    fn trading_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base.config.trading_url.trim_end_matches('/'), path)
    }

    fn data_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base.config.data_url.trim_end_matches('/'), path)
    }
}

#[derive(Deserialize)]
struct AlpacaOrder {
    id: String,
    #[serde(default)]
    client_order_id: Option<String>,
    symbol: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    submitted_at: Option<String>,
}

#[derive(Deserialize)]
struct AlpacaPosition {
    symbol: String,
    qty: String,
}

#[derive(Deserialize)]
struct AlpacaBar {
    t: String,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: i64,
}

#[derive(Deserialize)]
struct AlpacaBarsPage {
    #[serde(default)]
    bars: Option<Vec<AlpacaBar>>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Serialize)]
struct TakeProfitLeg {
    limit_price: Price,
}

#[derive(Serialize)]
struct StopLossLeg {
    stop_price: Price,
}

/// Alpaca 括号单请求体
#[derive(Serialize)]
struct AlpacaBracketOrder<'a> {
    symbol: &'a str,
    qty: String,
    side: OrderSide,
    #[serde(rename = "type")]
    order_type: &'static str,
    time_in_force: TimeInForce,
    order_class: OrderClass,
    limit_price: Price,
    take_profit: TakeProfitLeg,
    stop_loss: StopLossLeg,
    client_order_id: &'a str,
}

impl<'a> From<&'a BracketOrderRequest> for AlpacaBracketOrder<'a> {
    fn from(req: &'a BracketOrderRequest) -> Self {
        Self {
            symbol: &req.symbol,
            qty: req.quantity.to_string(),
            side: req.side,
            order_type: "limit",
            time_in_force: req.time_in_force,
            order_class: req.order_class,
            limit_price: req.limit_price,
            take_profit: TakeProfitLeg {
                limit_price: req.take_profit_price,
            },
            stop_loss: StopLossLeg {
                stop_price: req.stop_loss_price,
            },
            client_order_id: &req.client_order_id,
        }
    }
}

/// 合并一页挂单后的翻页状态
#[derive(Debug, PartialEq)]
enum OrderPageCursor {
    /// 不满一页，已取完
    Done,
    /// 下一页的 `until`（本页最早的提交时间）
    Next(DateTime<Utc>),
    /// 满页但无法继续翻页
    Stalled,
}

/// 按 id 去重合并一页挂单（按提交时间倒序返回）
fn merge_open_orders(
    orders: &mut Vec<OpenOrder>,
    seen: &mut HashSet<String>,
    page: Vec<AlpacaOrder>,
) -> OrderPageCursor {
    let full = page.len() >= OPEN_ORDERS_PAGE_LIMIT;
    let mut added = 0;
    let mut oldest: Option<DateTime<Utc>> = None;

    for order in page {
        let submitted = order
            .submitted_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc));
        if let Some(ts) = submitted {
            oldest = Some(oldest.map_or(ts, |o| o.min(ts)));
        }
        if seen.insert(order.id.clone()) {
            orders.push(OpenOrder {
                id: order.id,
                symbol: order.symbol,
            });
            added += 1;
        }
    }

    match (full, oldest) {
        (false, _) => OrderPageCursor::Done,
        (true, Some(ts)) if added > 0 => OrderPageCursor::Next(ts),
        _ => OrderPageCursor::Stalled,
    }
}

fn map_error_status(status: StatusCode, message: String, retry_after: Option<u64>) -> ExchangeError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ExchangeError::AuthError(message),
        StatusCode::TOO_MANY_REQUESTS => ExchangeError::RateLimitError(message, retry_after),
        _ => ExchangeError::ApiError {
            code: status.as_u16() as i32,
            message,
        },
    }
}

/// 解析K线时间戳，带时区按原样保留，不带时区的留给上层按UTC处理
fn parse_bar_timestamp(raw: &str) -> Result<RawTimestamp> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(RawTimestamp::Zoned(ts));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .map(RawTimestamp::Naive)
        .map_err(|e| ExchangeError::ParseError(format!("无法解析K线时间 {}: {}", raw, e)))
}

fn convert_bar(bar: AlpacaBar) -> Result<RawBar> {
    Ok(RawBar {
        timestamp: parse_bar_timestamp(&bar.t)?,
        open: bar.o,
        high: bar.h,
        low: bar.l,
        close: bar.c,
        volume: bar.v,
    })
}

fn convert_position(position: AlpacaPosition) -> Result<Position> {
    let quantity = position.qty.trim().parse::<f64>().map_err(|e| {
        ExchangeError::ParseError(format!("持仓数量无效 {}={}: {}", position.symbol, position.qty, e))
    })?;
    Ok(Position {
        symbol: position.symbol,
        quantity,
    })
}

#[async_trait]
impl Broker for AlpacaBroker {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn account_url(&self) -> &str {
        &self.base.config.trading_url
    }

    async fn list_open_orders(&self) -> Result<Vec<OpenOrder>> {
        let url = self.trading_endpoint("/v2/orders");
        let mut orders = Vec::new();
        let mut seen = HashSet::new();
        let mut until: Option<DateTime<Utc>> = None;

        for _ in 0..MAX_ORDER_PAGES {
            let mut query = vec![
                ("status", "open".to_string()),
                ("limit", OPEN_ORDERS_PAGE_LIMIT.to_string()),
                ("direction", "desc".to_string()),
            ];
            if let Some(ts) = until {
                query.push(("until", ts.to_rfc3339_opts(SecondsFormat::Micros, true)));
            }

            let page: Vec<AlpacaOrder> = self
                .send_request(Method::GET, &url, &query, None::<&()>)
                .await?;

            match merge_open_orders(&mut orders, &mut seen, page) {
                OrderPageCursor::Done => return Ok(orders),
                OrderPageCursor::Next(ts) => until = Some(ts),
                OrderPageCursor::Stalled => {
                    log::warn!("⚠️ 挂单满页但无法继续翻页，挂单列表可能不完整 (已取{}笔)", orders.len());
                    return Ok(orders);
                }
            }
        }

        log::warn!("⚠️ 挂单翻页超过{}页，已截断 (已取{}笔)", MAX_ORDER_PAGES, orders.len());
        Ok(orders)
    }

    async fn list_positions(&self) -> Result<Vec<Position>> {
        let url = self.trading_endpoint("/v2/positions");
        let positions: Vec<AlpacaPosition> = self
            .send_request(Method::GET, &url, &[], None::<&()>)
            .await?;

        positions.into_iter().map(convert_position).collect()
    }

    async fn get_minute_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawBar>> {
        let url = self.data_endpoint(&format!("/v2/stocks/{}/bars", symbol));
        let mut result = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_BAR_PAGES {
            let mut query = vec![
                ("timeframe", "1Min".to_string()),
                ("start", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("end", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("feed", self.base.config.feed.clone()),
                ("limit", BARS_PAGE_LIMIT.to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("page_token", token.clone()));
            }

            let page: AlpacaBarsPage = self
                .send_request(Method::GET, &url, &query, None::<&()>)
                .await?;

            for bar in page.bars.unwrap_or_default() {
                result.push(convert_bar(bar)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(result),
            }
        }

        log::warn!("{}: K线翻页超过{}页，已截断", symbol, MAX_BAR_PAGES);
        Ok(result)
    }

    async fn submit_bracket_order(&self, request: &BracketOrderRequest) -> Result<OrderAck> {
        let url = self.trading_endpoint("/v2/orders");
        let body = AlpacaBracketOrder::from(request);
        let order: AlpacaOrder = self
            .send_request(Method::POST, &url, &[], Some(&body))
            .await?;

        Ok(OrderAck {
            id: order.id,
            client_order_id: order.client_order_id,
            status: order.status,
        })
    }
}
