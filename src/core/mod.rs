// 核心模块 - 网关接口、公共类型与错误定义
pub mod broker;
pub mod config;
pub mod error;
pub mod retry_policy;
pub mod types;

pub use broker::{BaseBroker, Broker};
pub use self::config::*;
pub use error::*;
pub use retry_policy::{ExponentialBackoffRetry, RetryConfig};
pub use types::{
    Bar, BracketOrderRequest, OpenOrder, OrderAck, OrderClass, OrderSide, Position, Price,
    RawBar, RawTimestamp, TimeInForce,
};
