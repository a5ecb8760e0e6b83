use crate::core::error::ExchangeError;
/// 只读请求的有限次重试策略
///
/// 下单不走这里：重复提交会造成重复敞口。
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// 重试策略配置
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// 最大重试次数（不含首次请求）
    pub max_retries: u32,
    /// 初始延迟（毫秒）
    pub initial_delay_ms: u64,
    /// 最大延迟（毫秒）
    pub max_delay_ms: u64,
    /// 指数退避因子
    pub backoff_factor: f64,
    /// 是否添加抖动
    pub jitter: bool,
    /// 单次请求超时
    pub attempt_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 200,
            max_delay_ms: 5000,
            backoff_factor: 2.0,
            jitter: true,
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

/// 指数退避重试策略
#[derive(Debug, Clone)]
pub struct ExponentialBackoffRetry {
    config: RetryConfig,
}

impl ExponentialBackoffRetry {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay_ms: u64) -> Self {
        self.config.initial_delay_ms = delay_ms;
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// 判断是否应该重试
    pub fn should_retry(&self, error: &ExchangeError, attempt: u32) -> bool {
        attempt < self.config.max_retries && error.is_retryable()
    }

    /// 计算重试延迟
    pub fn calculate_delay(&self, error: &ExchangeError, attempt: u32) -> Duration {
        // 限流错误优先使用服务端建议的等待时间
        if let ExchangeError::RateLimitError(_, Some(secs)) = error {
            return Duration::from_secs(*secs).min(Duration::from_millis(self.config.max_delay_ms));
        }

        let base_delay =
            self.config.initial_delay_ms as f64 * self.config.backoff_factor.powi(attempt as i32);

        let mut delay_ms = base_delay.min(self.config.max_delay_ms as f64) as u64;

        // 添加抖动以避免雷同重试
        if self.config.jitter && delay_ms >= 4 {
            use rand::Rng;
            let jitter = rand::thread_rng().gen_range(0..=delay_ms / 4);
            delay_ms += jitter;
        }

        Duration::from_millis(delay_ms)
    }

    /// 执行带超时与重试的操作
    pub async fn execute_with_retry<F, T, Fut>(
        &self,
        operation_name: &str,
        operation: F,
    ) -> Result<T, ExchangeError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ExchangeError>>,
    {
        let mut attempt = 0;

        loop {
            let outcome = match timeout(self.config.attempt_timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(ExchangeError::TimeoutError {
                    operation: operation_name.to_string(),
                    timeout_seconds: self.config.attempt_timeout.as_secs(),
                }),
            };

            match outcome {
                Ok(result) => {
                    if attempt > 0 {
                        log::info!("✅ {} 在第{}次尝试后成功", operation_name, attempt + 1);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if !self.should_retry(&error, attempt) {
                        return Err(error);
                    }

                    let delay = self.calculate_delay(&error, attempt);
                    log::warn!(
                        "⚠️ {} 失败，将在{:.2}秒后重试 (尝试 {}/{}): {}",
                        operation_name,
                        delay.as_secs_f64(),
                        attempt + 1,
                        self.config.max_retries,
                        error
                    );

                    attempt += 1;
                    sleep(delay).await;
                }
            }
        }
    }
}
