// 工具模块 - 日志、通知与订单ID
pub mod order_id;
pub mod unified_logger;
pub mod webhook;

pub use order_id::OrderIdGenerator;
pub use unified_logger::{init_strategy_logger, LogConfig};
pub use webhook::{build_notifier, LogNotifier, NotificationConfig, Notifier, WebhookNotifier};
