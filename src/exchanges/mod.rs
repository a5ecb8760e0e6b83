// 券商网关实现
pub mod alpaca;

pub use alpaca::AlpacaBroker;
