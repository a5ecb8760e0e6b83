use std::sync::Arc;

use crate::core::broker::Broker;
use crate::core::error::OrbError;
use crate::storage::SymbolStore;
use crate::utils::webhook::{LogNotifier, Notifier};

/// 统一的策略依赖容器
#[derive(Clone)]
pub struct StrategyDeps {
    pub broker: Arc<dyn Broker>,
    pub store: Arc<dyn SymbolStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl StrategyDeps {
    pub fn builder() -> StrategyDepsBuilder {
        StrategyDepsBuilder::default()
    }
}

/// 构建策略依赖的辅助结构
#[derive(Default)]
pub struct StrategyDepsBuilder {
    broker: Option<Arc<dyn Broker>>,
    store: Option<Arc<dyn SymbolStore>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl StrategyDepsBuilder {
    pub fn with_broker(mut self, broker: Arc<dyn Broker>) -> Self {
        self.broker = Some(broker);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn SymbolStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// 未设置通知器时只写日志
    pub fn build(self) -> Result<StrategyDeps, OrbError> {
        let broker = self
            .broker
            .ok_or_else(|| OrbError::Config("StrategyDeps 缺少 broker".to_string()))?;
        let store = self
            .store
            .ok_or_else(|| OrbError::Config("StrategyDeps 缺少 store".to_string()))?;
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(LogNotifier));

        Ok(StrategyDeps {
            broker,
            store,
            notifier,
        })
    }
}
