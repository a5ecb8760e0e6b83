use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::core::broker::Broker;
use crate::core::error::OrbError;
use crate::core::retry_policy::ExponentialBackoffRetry;
use crate::utils::order_id::OrderIdGenerator;

use super::bars::BarSeries;
use super::breakout::detect_breakout;
use super::logging;
use super::model::{SymbolOutcome, TradeRecord};
use super::planner::OrderPlanBuilder;
use super::range::compute_opening_range;
use super::session::SessionWindow;

/// 单次运行内各交易对共享的只读上下文
pub(super) struct RunContext {
    pub broker: Arc<dyn Broker>,
    pub session: SessionWindow,
    pub planner: OrderPlanBuilder,
    pub read_retry: ExponentialBackoffRetry,
    pub order_ids: OrderIdGenerator,
    pub submit_timeout: Duration,
    pub dry_run: bool,
}

/// 拉取K线 → 开盘区间 → 突破检测 → 订单计划 → 提交
///
/// 所有错误都在这里转换为结果，不向上传播。
pub(super) async fn process_symbol(ctx: &RunContext, symbol: &str) -> SymbolOutcome {
    let (start, end) = ctx.session.fetch_bounds_utc();
    let broker = &ctx.broker;
    let raw = match ctx
        .read_retry
        .execute_with_retry("get_minute_bars", move || {
            broker.get_minute_bars(symbol, start, end)
        })
        .await
    {
        Ok(raw) => raw,
        Err(err) => {
            let reason = format!("拉取分钟K线失败: {}", err);
            logging::error(Some(symbol), &reason);
            return SymbolOutcome::Failed(reason);
        }
    };

    let series = match BarSeries::from_raw(symbol, raw, ctx.session.tz) {
        Ok(series) => series,
        Err(err) => {
            logging::info(Some(symbol), format!("跳过: {}", err));
            return SymbolOutcome::NoData(err.to_string());
        }
    };

    let range = match compute_opening_range(
        &series,
        &ctx.session.session_start,
        &ctx.session.range_end,
    ) {
        Ok(range) => range,
        Err(err) => {
            logging::info(Some(symbol), format!("跳过: {}", OrbError::from(err.clone())));
            return SymbolOutcome::InvalidRange(err);
        }
    };
    logging::debug(
        Some(symbol),
        format!(
            "开盘区间 ORH={:.2} ORL={:.2} R={:.2} (K线{}根)",
            range.high,
            range.low,
            range.range,
            series.len()
        ),
    );

    let breakout = match detect_breakout(&series, &ctx.session.range_end, &range) {
        Some(event) => event,
        None => {
            logging::info(
                Some(symbol),
                format!("尚未突破 ORH={:.2}，不下单", range.high),
            );
            return SymbolOutcome::NoBreakout;
        }
    };

    let plan = match ctx.planner.build(symbol, &breakout, &range) {
        Ok(plan) => plan,
        Err(err) => {
            logging::warn(Some(symbol), format!("跳过: {}", err));
            return SymbolOutcome::InvalidPlan(err.to_string());
        }
    };

    let client_order_id = ctx.order_ids.generate(symbol, &breakout.timestamp);
    logging::info(
        Some(symbol),
        format!(
            "📈 突破 {} close={:.2} > ORH={:.2} | 买入 {} 股 limit={} tp={} sl={} ({})",
            breakout.timestamp.format("%H:%M"),
            breakout.close,
            range.high,
            plan.quantity,
            plan.limit_price,
            plan.take_profit_price,
            plan.stop_loss_price,
            client_order_id
        ),
    );

    let mut record = TradeRecord {
        symbol: symbol.to_string(),
        breakout,
        range,
        plan,
        client_order_id,
        order_id: None,
    };

    if ctx.dry_run {
        logging::info(Some(symbol), "dry-run 模式，不提交订单");
        return SymbolOutcome::DryRun(record);
    }

    // 只提交一次，不重试
    let request = record.plan.to_request(record.client_order_id.clone());
    match timeout(ctx.submit_timeout, ctx.broker.submit_bracket_order(&request)).await {
        Ok(Ok(ack)) => {
            logging::info(
                Some(symbol),
                format!("✅ 括号单已提交 order_id={} status={}", ack.id, ack.status),
            );
            record.order_id = Some(ack.id);
            SymbolOutcome::Submitted(record)
        }
        Ok(Err(err)) => {
            let err = OrbError::Submission(err);
            logging::error(Some(symbol), format!("❌ {}", err));
            SymbolOutcome::Failed(err.to_string())
        }
        Err(_) => {
            let reason = format!(
                "下单超时({}秒)，订单状态未知 client_order_id={}",
                ctx.submit_timeout.as_secs(),
                record.client_order_id
            );
            logging::error(Some(symbol), format!("❌ {}", reason));
            SymbolOutcome::Failed(reason)
        }
    }
}
