pub mod deps;

pub use deps::{StrategyDeps, StrategyDepsBuilder};
