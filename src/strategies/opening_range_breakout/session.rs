use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::core::error::OrbError;

use super::config::SessionConfig;

/// 某个交易日的时段边界（交易所本地时间）
#[derive(Debug, Clone, PartialEq)]
pub struct SessionWindow {
    pub date: NaiveDate,
    pub tz: Tz,
    /// 开盘，开盘区间起点
    pub session_start: DateTime<Tz>,
    /// 开盘区间终点（不含）
    pub range_end: DateTime<Tz>,
    pub session_end: DateTime<Tz>,
}

impl SessionWindow {
    pub fn new(date: NaiveDate, config: &SessionConfig) -> Result<Self, OrbError> {
        let tz = config.tz()?;
        let session_start = localize(tz, date, config.open_time()?)?;
        let session_end = localize(tz, date, config.close_time()?)?;
        let range_end = session_start + Duration::minutes(config.range_minutes as i64);

        if range_end >= session_end {
            return Err(OrbError::Config(format!(
                "开盘区间终点 {} 不早于收盘 {}",
                range_end, session_end
            )));
        }

        Ok(Self {
            date,
            tz,
            session_start,
            range_end,
            session_end,
        })
    }

    /// 交易所时区下的“今天”
    pub fn today(tz: Tz) -> NaiveDate {
        Utc::now().with_timezone(&tz).date_naive()
    }

    /// 拉取K线用的UTC区间 [开盘, 收盘)
    pub fn fetch_bounds_utc(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.session_start.with_timezone(&Utc),
            self.session_end.with_timezone(&Utc),
        )
    }
}

fn localize(tz: Tz, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Tz>, OrbError> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| OrbError::Config(format!("{} 在时区 {} 中不存在", naive, tz)))
}
