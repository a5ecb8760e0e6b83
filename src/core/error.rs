use thiserror::Error;

/// 行情/券商网关错误
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("网络请求错误: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON序列化错误: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("API错误: {code} - {message}")]
    ApiError { code: i32, message: String },

    #[error("认证错误: {0}")]
    AuthError(String),

    #[error("速率限制: {0}")]
    RateLimitError(String, Option<u64>),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("数据解析错误: {0}")]
    ParseError(String),

    #[error("超时错误: 操作 '{operation}' 超时 ({timeout_seconds}秒)")]
    TimeoutError {
        operation: String,
        timeout_seconds: u64,
    },

    #[error("其他错误: {0}")]
    Other(String),
}

impl ExchangeError {
    /// 判断错误是否可以重试
    pub fn is_retryable(&self) -> bool {
        match self {
            ExchangeError::NetworkError(_) => true,
            ExchangeError::TimeoutError { .. } => true,
            ExchangeError::RateLimitError(_, _) => true,
            ExchangeError::ApiError { code, .. } => {
                // HTTP 5xx 错误通常可以重试
                *code >= 500 && *code < 600
            }
            _ => false,
        }
    }

    /// 获取建议的重试等待时间(秒)
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            ExchangeError::RateLimitError(_, retry_after) => *retry_after,
            ExchangeError::NetworkError(_) => Some(1),
            ExchangeError::TimeoutError { .. } => Some(2),
            ExchangeError::ApiError { code, .. } if *code >= 500 => Some(5),
            _ => None,
        }
    }
}

/// 开盘区间无效的原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RangeError {
    #[error("开盘区间内没有K线")]
    Empty,

    #[error("开盘区间无效: high={high:.4} low={low:.4}")]
    NonPositive { low: f64, high: f64 },
}

/// 策略运行错误分类
///
/// `Config`、`Store` 与 `Exposure` 会中止整个运行，其余都在单个交易对的处理边界内被捕获。
#[derive(Error, Debug)]
pub enum OrbError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("交易对仓库错误: {0}")]
    Store(#[from] sqlx::Error),

    #[error("无法获取持仓/挂单快照: {0}")]
    Exposure(#[source] ExchangeError),

    #[error("数据错误: {0}")]
    Data(String),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error("订单计划无效: {0}")]
    Plan(String),

    #[error("下单失败: {0}")]
    Submission(#[source] ExchangeError),

    #[error("通知发送失败: {0}")]
    Notification(String),
}

impl OrbError {
    /// 是否需要中止整个运行
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            OrbError::Config(_) | OrbError::Store(_) | OrbError::Exposure(_)
        )
    }
}

impl From<config::ConfigError> for OrbError {
    fn from(err: config::ConfigError) -> Self {
        OrbError::Config(err.to_string())
    }
}
