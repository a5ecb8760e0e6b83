use crate::core::{
    config::{ApiKeys, BrokerConfig},
    error::ExchangeError,
    types::{BracketOrderRequest, OpenOrder, OrderAck, Position, RawBar, Result},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// 行情/券商网关通用接口trait
#[async_trait]
pub trait Broker: Send + Sync {
    /// 获取网关名称
    fn name(&self) -> &str;

    /// 账户地址（写入交易通知）
    fn account_url(&self) -> &str;

    /// 获取活跃订单
    async fn list_open_orders(&self) -> Result<Vec<OpenOrder>>;

    /// 获取持仓信息
    async fn list_positions(&self) -> Result<Vec<Position>>;

    /// 获取分钟K线，区间为 [start, end)，可能返回空
    async fn get_minute_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawBar>>;

    /// 提交括号单
    async fn submit_bracket_order(&self, request: &BracketOrderRequest) -> Result<OrderAck>;
}

/// 网关实现的公共部分
pub struct BaseBroker {
    pub name: String,
    pub config: BrokerConfig,
    pub api_keys: ApiKeys,
    pub client: reqwest::Client,
}

impl BaseBroker {
    /// 创建新的网关实例
    pub fn new(
        name: String,
        config: BrokerConfig,
        api_keys: ApiKeys,
        timeout: Duration,
    ) -> std::result::Result<Self, ExchangeError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("rustorb/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()
            .map_err(|e| ExchangeError::Other(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            name,
            config,
            api_keys,
            client,
        })
    }
}
