use chrono::DateTime;
use chrono_tz::Tz;

use crate::core::error::RangeError;

use super::bars::BarSeries;

/// 开盘区间
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpeningRange {
    pub low: f64,
    pub high: f64,
    /// high - low，恒大于0
    pub range: f64,
}

/// 取 [session_start, range_end) 内K线的最低价与最高价
pub fn compute_opening_range(
    series: &BarSeries,
    session_start: &DateTime<Tz>,
    range_end: &DateTime<Tz>,
) -> Result<OpeningRange, RangeError> {
    let window = series.between(session_start, range_end);
    if window.is_empty() {
        return Err(RangeError::Empty);
    }

    let low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let high = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);

    if !(high > low) {
        return Err(RangeError::NonPositive { low, high });
    }

    Ok(OpeningRange {
        low,
        high,
        range: high - low,
    })
}
