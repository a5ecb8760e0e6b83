pub mod core;
pub mod exchanges;
pub mod storage;
pub mod strategies;
pub mod utils;

// 选择性导出，避免与 std::result::Result 冲突
pub use crate::core::{config::*, error::*};
pub use crate::core::{Broker, ExponentialBackoffRetry, Price, RetryConfig};
pub use exchanges::*;
pub use storage::{SqliteSymbolStore, SymbolStore};
pub use strategies::*;
pub use utils::*;
