use std::collections::BTreeSet;

use crate::core::types::{OpenOrder, Position};

/// 运行开始时已有挂单或持仓的交易对，本次运行内不再处理
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExposureSet {
    symbols: BTreeSet<String>,
}

impl ExposureSet {
    pub fn from_snapshot(open_orders: &[OpenOrder], positions: &[Position]) -> Self {
        let symbols = open_orders
            .iter()
            .map(|order| order.symbol.clone())
            .chain(
                positions
                    .iter()
                    .filter(|position| position.quantity != 0.0)
                    .map(|position| position.symbol.clone()),
            )
            .collect();
        Self { symbols }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// 按字母序
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }
}
