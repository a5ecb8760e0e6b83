use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::core::error::RangeError;

use super::breakout::BreakoutEvent;
use super::planner::OrderPlan;
use super::range::OpeningRange;

/// 一笔已决策的交易
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub symbol: String,
    pub breakout: BreakoutEvent,
    pub range: OpeningRange,
    pub plan: OrderPlan,
    pub client_order_id: String,
    /// 券商返回的订单ID，dry-run 时为空
    pub order_id: Option<String>,
}

/// 单个交易对在本次运行中的结果
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    /// 已有挂单或持仓
    Blocked,
    NoData(String),
    InvalidRange(RangeError),
    NoBreakout,
    InvalidPlan(String),
    Submitted(TradeRecord),
    DryRun(TradeRecord),
    /// 拉取或下单失败
    Failed(String),
    /// 中止信号到达时尚未启动
    Cancelled,
}

impl SymbolOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SymbolOutcome::Blocked => "skipped-blocked",
            SymbolOutcome::NoData(_) => "no-data",
            SymbolOutcome::InvalidRange(_) => "invalid-range",
            SymbolOutcome::NoBreakout => "no-breakout",
            SymbolOutcome::InvalidPlan(_) => "invalid-plan",
            SymbolOutcome::Submitted(_) => "submitted",
            SymbolOutcome::DryRun(_) => "dry-run",
            SymbolOutcome::Failed(_) => "failed",
            SymbolOutcome::Cancelled => "cancelled",
        }
    }

    pub fn trade(&self) -> Option<&TradeRecord> {
        match self {
            SymbolOutcome::Submitted(record) | SymbolOutcome::DryRun(record) => Some(record),
            _ => None,
        }
    }
}

impl fmt::Display for SymbolOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SymbolOutcome::NoData(reason)
            | SymbolOutcome::InvalidPlan(reason)
            | SymbolOutcome::Failed(reason) => write!(f, "{} ({})", self.label(), reason),
            SymbolOutcome::InvalidRange(err) => write!(f, "{} ({})", self.label(), err),
            SymbolOutcome::Submitted(record) | SymbolOutcome::DryRun(record) => write!(
                f,
                "{} limit={} tp={} sl={}",
                self.label(),
                record.plan.limit_price,
                record.plan.take_profit_price,
                record.plan.stop_loss_price
            ),
            _ => write!(f, "{}", self.label()),
        }
    }
}

/// 一次运行的结果
#[derive(Debug, Clone)]
pub struct RunReport {
    pub date: NaiveDate,
    pub dry_run: bool,
    /// 按交易对排序
    pub outcomes: BTreeMap<String, SymbolOutcome>,
    /// 汇总通知是否已成功发出
    pub notified: bool,
}

impl RunReport {
    pub fn new(date: NaiveDate, dry_run: bool) -> Self {
        Self {
            date,
            dry_run,
            outcomes: BTreeMap::new(),
            notified: false,
        }
    }

    pub fn record(&mut self, symbol: String, outcome: SymbolOutcome) {
        self.outcomes.insert(symbol, outcome);
    }

    pub fn outcome(&self, symbol: &str) -> Option<&SymbolOutcome> {
        self.outcomes.get(symbol)
    }

    /// 已提交的交易，按交易对排序
    pub fn submitted_trades(&self) -> Vec<&TradeRecord> {
        self.outcomes
            .values()
            .filter_map(|outcome| match outcome {
                SymbolOutcome::Submitted(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    /// 各类结果的数量
    pub fn counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for outcome in self.outcomes.values() {
            *counts.entry(outcome.label()).or_insert(0) += 1;
        }
        counts
    }

    pub fn summary_line(&self) -> String {
        let parts: Vec<String> = self
            .counts()
            .iter()
            .map(|(label, count)| format!("{}={}", label, count))
            .collect();
        format!("共{}个交易对: {}", self.outcomes.len(), parts.join(", "))
    }
}
