pub mod bars;
pub mod breakout;
pub mod config;
pub mod exposure;
mod logging;
pub mod model;
pub mod planner;
pub mod range;
pub mod report;
pub mod session;
mod strategy;
mod tasks;

pub use self::config::OrbConfig;
pub use model::{RunReport, SymbolOutcome, TradeRecord};
pub use session::SessionWindow;
pub use strategy::OpeningRangeBreakoutStrategy;
