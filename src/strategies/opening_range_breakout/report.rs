// 交易汇总通知的文本格式

use chrono::NaiveDate;

use super::model::TradeRecord;

pub fn notification_subject(date: NaiveDate) -> String {
    format!("Trade Notifications for {}", date.format("%Y-%m-%d"))
}

pub fn format_trade_message(record: &TradeRecord, account_url: &str) -> String {
    let range = &record.range;
    let breakout = &record.breakout;
    [
        format!("Symbol: {}", record.symbol),
        format!(
            "Breakout time ({}): {}",
            breakout.timestamp.timezone().name(),
            breakout.timestamp.format("%Y-%m-%d %H:%M:%S%:z")
        ),
        format!(
            "Opening Range: ORH={:.2} ORL={:.2} R={:.2}",
            range.high, range.low, range.range
        ),
        format!("Entry (limit): {}", record.plan.limit_price),
        format!("Take Profit:   {}", record.plan.take_profit_price),
        format!("Stop Loss:     {}", record.plan.stop_loss_price),
        format!(
            "Breakout candle: close={:.2} high={:.2}",
            breakout.close, breakout.high
        ),
        format!("Account: {}", account_url),
    ]
    .join("\n")
}

/// 没有交易时返回 None，不发送通知
pub fn compose_notification(
    date: NaiveDate,
    trades: &[&TradeRecord],
    account_url: &str,
) -> Option<(String, String)> {
    if trades.is_empty() {
        return None;
    }

    let mut sorted: Vec<&TradeRecord> = trades.to_vec();
    sorted.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let body = sorted
        .iter()
        .map(|record| format_trade_message(record, account_url))
        .collect::<Vec<_>>()
        .join("\n\n");

    Some((notification_subject(date), body))
}
