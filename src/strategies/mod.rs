// 核心策略模块
pub mod common;
pub mod opening_range_breakout;

pub use opening_range_breakout::{OpeningRangeBreakoutStrategy, OrbConfig};
