use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::core::config::{BrokerConfig, StorageConfig};
use crate::core::error::OrbError;
use crate::utils::unified_logger::LogConfig;
use crate::utils::webhook::NotificationConfig;

fn default_strategy_name() -> String {
    "opening_range_breakout".to_string()
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_open() -> String {
    "09:30".to_string()
}

fn default_close() -> String {
    "16:00".to_string()
}

fn default_range_minutes() -> u32 {
    15
}

fn default_quantity() -> u32 {
    100
}

fn default_max_concurrency() -> usize {
    4
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_read_retries() -> u32 {
    2
}

fn default_retry_initial_delay_ms() -> u64 {
    200
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrbConfig {
    #[serde(default)]
    pub strategy: StrategyInfo,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub order: OrderConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    #[serde(default = "default_strategy_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Default for StrategyInfo {
    fn default() -> Self {
        Self {
            name: default_strategy_name(),
            log_level: default_log_level(),
            description: None,
        }
    }
}

/// 交易时段（交易所本地时间）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// 开盘时间 HH:MM
    #[serde(default = "default_open")]
    pub open: String,
    /// 收盘时间 HH:MM
    #[serde(default = "default_close")]
    pub close: String,
    /// 开盘区间长度（分钟）
    #[serde(default = "default_range_minutes")]
    pub range_minutes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            open: default_open(),
            close: default_close(),
            range_minutes: default_range_minutes(),
        }
    }
}

impl SessionConfig {
    pub fn tz(&self) -> Result<Tz, OrbError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| OrbError::Config(format!("无效时区 {}: {}", self.timezone, e)))
    }

    pub fn open_time(&self) -> Result<NaiveTime, OrbError> {
        parse_hhmm("session.open", &self.open)
    }

    pub fn close_time(&self) -> Result<NaiveTime, OrbError> {
        parse_hhmm("session.close", &self.close)
    }
}

fn parse_hhmm(field: &str, value: &str) -> Result<NaiveTime, OrbError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| OrbError::Config(format!("{} 时间格式无效 {}: {}", field, value, e)))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    /// 固定下单股数
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// 只计算不下单
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            quantity: default_quantity(),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// 并发处理的交易对数量上限
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// 只读请求的重试次数
    #[serde(default = "default_read_retries")]
    pub read_retries: u32,
    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            request_timeout_secs: default_request_timeout_secs(),
            read_retries: default_read_retries(),
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
        }
    }
}

impl OrbConfig {
    /// 校验配置，失败即为致命错误
    pub fn validate(&self) -> Result<(), OrbError> {
        if self.strategy.name.trim().is_empty() {
            return Err(OrbError::Config("strategy.name 不能为空".to_string()));
        }

        self.session.tz()?;
        let open = self.session.open_time()?;
        let close = self.session.close_time()?;

        if self.session.range_minutes == 0 {
            return Err(OrbError::Config("session.range_minutes 必须大于0".to_string()));
        }
        let range_end = open + chrono::Duration::minutes(self.session.range_minutes as i64);
        if range_end <= open || close <= range_end {
            return Err(OrbError::Config(format!(
                "收盘时间 {} 必须晚于开盘区间结束 {}",
                close,
                range_end.format("%H:%M")
            )));
        }

        if self.order.quantity == 0 {
            return Err(OrbError::Config("order.quantity 必须大于0".to_string()));
        }
        if self.execution.max_concurrency == 0 {
            return Err(OrbError::Config(
                "execution.max_concurrency 必须大于0".to_string(),
            ));
        }
        if self.execution.request_timeout_secs == 0 {
            return Err(OrbError::Config(
                "execution.request_timeout_secs 必须大于0".to_string(),
            ));
        }

        Ok(())
    }
}
