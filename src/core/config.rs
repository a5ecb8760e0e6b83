use crate::core::error::ExchangeError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_trading_url() -> String {
    "https://paper-api.alpaca.markets".to_string()
}

fn default_data_url() -> String {
    "https://data.alpaca.markets".to_string()
}

fn default_feed() -> String {
    "iex".to_string()
}

fn default_api_key_env() -> String {
    "ALPACA".to_string()
}

fn default_database_url() -> String {
    "sqlite://app.db".to_string()
}

/// 券商网关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "default_trading_url")]
    pub trading_url: String,
    #[serde(default = "default_data_url")]
    pub data_url: String,
    /// 行情源（iex / sip）
    #[serde(default = "default_feed")]
    pub feed: String,
    /// API密钥环境变量前缀
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            trading_url: default_trading_url(),
            data_url: default_data_url(),
            feed: default_feed(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// 交易对仓库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

/// 从YAML文件加载配置，并叠加环境变量覆盖（如 `ORB__ORDER__DRY_RUN=true`）
pub fn load_layered<T: DeserializeOwned>(
    path: &str,
    env_prefix: &str,
) -> Result<T, config::ConfigError> {
    if !Path::new(path).exists() {
        return Err(config::ConfigError::NotFound(format!(
            "配置文件不存在: {}",
            path
        )));
    }

    config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(
            config::Environment::with_prefix(env_prefix)
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// API密钥配置
#[derive(Debug, Clone)]
pub struct ApiKeys {
    pub api_key: String,
    pub api_secret: String,
}

impl ApiKeys {
    /// 从环境变量加载API密钥
    pub fn from_env(prefix: &str) -> Result<Self, ExchangeError> {
        dotenv::dotenv().ok(); // 加载.env文件，忽略错误

        let prefix_upper = prefix.to_uppercase();

        let api_key = std::env::var(format!("{}_API_KEY", prefix_upper)).map_err(|_| {
            ExchangeError::ConfigError(format!("未找到{}的API_KEY环境变量", prefix))
        })?;

        // 尝试两种格式的密钥名称
        let api_secret = std::env::var(format!("{}_SECRET_KEY", prefix_upper))
            .or_else(|_| std::env::var(format!("{}_API_SECRET", prefix_upper)))
            .map_err(|_| {
                ExchangeError::ConfigError(format!(
                    "未找到{}的SECRET_KEY或API_SECRET环境变量",
                    prefix
                ))
            })?;

        Ok(ApiKeys {
            api_key,
            api_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_defaults() {
        let cfg: BrokerConfig = serde_yaml::from_str("feed: sip").unwrap();
        assert_eq!(cfg.feed, "sip");
        assert_eq!(cfg.trading_url, "https://paper-api.alpaca.markets");
        assert_eq!(cfg.api_key_env, "ALPACA");
    }

    #[test]
    fn test_missing_api_keys() {
        let err = ApiKeys::from_env("RUSTORB_TEST_MISSING").unwrap_err();
        assert!(matches!(err, ExchangeError::ConfigError(_)));
    }

    #[test]
    fn test_load_layered_missing_file() {
        let result: Result<BrokerConfig, _> = load_layered("does/not/exist.yml", "ORB");
        assert!(result.is_err());
    }
}
