use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::core::error::OrbError;
use crate::core::types::{Bar, RawBar, RawTimestamp};

use super::logging;

/// 单个交易对的分钟K线序列
///
/// 时间戳严格递增、无重复，并统一为交易所本地时间。
#[derive(Debug, Clone)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// 校验、转换时区并排序。格式错误的K线会被丢弃并记录警告，
    /// 全部为空或全部错误时返回 `OrbError::Data`。
    pub fn from_raw(symbol: &str, raw: Vec<RawBar>, tz: Tz) -> Result<Self, OrbError> {
        if raw.is_empty() {
            return Err(OrbError::Data("没有返回分钟K线".to_string()));
        }

        let total = raw.len();
        let mut bars = Vec::with_capacity(total);
        for raw_bar in raw {
            match normalize_bar(&raw_bar, tz) {
                Ok(bar) => bars.push(bar),
                Err(reason) => logging::warn(
                    Some(symbol),
                    format!("丢弃异常K线 {:?}: {}", raw_bar.timestamp, reason),
                ),
            }
        }

        if bars.is_empty() {
            return Err(OrbError::Data(format!("{}根K线全部异常", total)));
        }

        bars.sort_by_key(|bar| bar.timestamp);
        let before = bars.len();
        bars.dedup_by_key(|bar| bar.timestamp);
        if bars.len() < before {
            logging::warn(
                Some(symbol),
                format!("丢弃{}根重复时间戳的K线", before - bars.len()),
            );
        }

        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 时间落在 [start, end) 内的K线
    pub fn between(&self, start: &DateTime<Tz>, end: &DateTime<Tz>) -> &[Bar] {
        let lo = self.bars.partition_point(|bar| bar.timestamp < *start);
        let hi = self.bars.partition_point(|bar| bar.timestamp < *end);
        if lo >= hi {
            &[]
        } else {
            &self.bars[lo..hi]
        }
    }

    /// 时间不早于 start 的K线
    pub fn from_time(&self, start: &DateTime<Tz>) -> &[Bar] {
        let lo = self.bars.partition_point(|bar| bar.timestamp < *start);
        &self.bars[lo..]
    }
}

fn normalize_bar(raw: &RawBar, tz: Tz) -> Result<Bar, String> {
    let prices = [raw.open, raw.high, raw.low, raw.close];
    if prices.iter().any(|p| !p.is_finite()) {
        return Err("价格不是有限数".to_string());
    }
    if prices.iter().any(|p| *p < 0.0) {
        return Err("价格为负".to_string());
    }
    if raw.high < raw.low {
        return Err(format!("high {} < low {}", raw.high, raw.low));
    }
    if raw.high < raw.open || raw.high < raw.close {
        return Err(format!(
            "high {} 低于 open {} / close {}",
            raw.high, raw.open, raw.close
        ));
    }
    if raw.volume < 0 {
        return Err(format!("成交量为负: {}", raw.volume));
    }

    let timestamp = match raw.timestamp {
        RawTimestamp::Zoned(ts) => ts.with_timezone(&tz),
        RawTimestamp::Naive(naive) => Utc.from_utc_datetime(&naive).with_timezone(&tz),
    };

    Ok(Bar {
        timestamp,
        open: raw.open,
        high: raw.high,
        low: raw.low,
        close: raw.close,
        volume: raw.volume as u64,
    })
}
