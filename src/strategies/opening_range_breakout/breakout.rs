use chrono::DateTime;
use chrono_tz::Tz;

use super::bars::BarSeries;
use super::range::OpeningRange;

/// 区间结束后第一根收盘价突破区间高点的K线
#[derive(Debug, Clone, PartialEq)]
pub struct BreakoutEvent {
    pub timestamp: DateTime<Tz>,
    pub close: f64,
    pub high: f64,
}

/// 严格大于区间高点才算突破，只取最早的一根
pub fn detect_breakout(
    series: &BarSeries,
    range_end: &DateTime<Tz>,
    range: &OpeningRange,
) -> Option<BreakoutEvent> {
    series
        .from_time(range_end)
        .iter()
        .find(|bar| bar.close > range.high)
        .map(|bar| BreakoutEvent {
            timestamp: bar.timestamp,
            close: bar.close,
            high: bar.high,
        })
}
