use chrono::{DateTime, FixedOffset, NaiveDateTime};
use chrono_tz::Tz;
/// 统一的类型定义模块
/// 整合了行情、持仓与订单相关的数据结构
use serde::{Deserialize, Serialize};
use std::fmt;

// ============= 基础类型定义 =============

/// 结果类型别名
pub type Result<T> = std::result::Result<T, crate::core::error::ExchangeError>;

/// 以“分”为单位的价格，避免浮点舍入误差
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

impl Price {
    /// 最小报价单位 0.01
    pub const TICK: Price = Price(1);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Price {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// ============= K线数据 =============

/// 上游返回的原始时间戳，可能不带时区
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawTimestamp {
    Zoned(DateTime<FixedOffset>),
    /// 不带时区的时间按UTC处理
    Naive(NaiveDateTime),
}

/// 网关返回的原始分钟K线，尚未校验
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    pub timestamp: RawTimestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// 已校验并转换到交易所本地时间的K线
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Tz>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

// ============= 订单与持仓 =============

/// 订单方向，本策略只做多
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
}

/// 时间有效性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    Day,
}

/// 订单类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderClass {
    Bracket,
}

/// 当前挂单（只关心交易对）
#[derive(Debug, Clone, PartialEq)]
pub struct OpenOrder {
    pub id: String,
    pub symbol: String,
}

/// 当前持仓
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
}

/// 括号单请求：限价入场 + 止盈 + 止损
#[derive(Debug, Clone, PartialEq)]
pub struct BracketOrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u32,
    pub limit_price: Price,
    pub take_profit_price: Price,
    pub stop_loss_price: Price,
    pub time_in_force: TimeInForce,
    pub order_class: OrderClass,
    pub client_order_id: String,
}

/// 下单回执
#[derive(Debug, Clone, PartialEq)]
pub struct OrderAck {
    pub id: String,
    pub client_order_id: Option<String>,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_display() {
        assert_eq!(Price::from_cents(1060).to_string(), "10.60");
        assert_eq!(Price::from_cents(1).to_string(), "0.01");
        assert_eq!(Price::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Price::from_cents(2000).as_f64(), 20.0);
    }

    #[test]
    fn test_price_serializes_as_two_decimal_string() {
        let json = serde_json::to_string(&Price::from_cents(1110)).unwrap();
        assert_eq!(json, "\"11.10\"");
    }
}
