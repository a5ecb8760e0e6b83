// 交易对仓库
pub mod sqlite;

use async_trait::async_trait;

use crate::core::error::OrbError;

pub use sqlite::SqliteSymbolStore;

/// 策略与交易对的分配关系
#[async_trait]
pub trait SymbolStore: Send + Sync {
    /// 列出分配给指定策略的交易对
    async fn list_symbols_for_strategy(&self, strategy_name: &str) -> Result<Vec<String>, OrbError>;
}
