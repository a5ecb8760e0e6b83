use crate::core::error::OrbError;
use crate::core::types::{BracketOrderRequest, OrderClass, OrderSide, Price, TimeInForce};

use super::breakout::BreakoutEvent;
use super::range::OpeningRange;

/// 四舍五入前加上的偏移，抵消 .xx5 附近的二进制浮点误差
const ROUNDING_EPSILON: f64 = 1e-9;

/// 保留两位小数，返回“分”
pub fn round_to_cents(value: f64) -> i64 {
    ((value + ROUNDING_EPSILON) * 100.0).round() as i64
}

/// 括号单计划：限价入场 + 止盈 + 止损
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPlan {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u32,
    pub limit_price: Price,
    pub take_profit_price: Price,
    pub stop_loss_price: Price,
    pub time_in_force: TimeInForce,
    pub order_class: OrderClass,
}

impl OrderPlan {
    pub fn to_request(&self, client_order_id: String) -> BracketOrderRequest {
        BracketOrderRequest {
            symbol: self.symbol.clone(),
            side: self.side,
            quantity: self.quantity,
            limit_price: self.limit_price,
            take_profit_price: self.take_profit_price,
            stop_loss_price: self.stop_loss_price,
            time_in_force: self.time_in_force,
            order_class: self.order_class,
            client_order_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderPlanBuilder {
    quantity: u32,
}

impl OrderPlanBuilder {
    pub fn new(quantity: u32) -> Self {
        Self { quantity }
    }

    /// limit = round2(close)，tp = round2(limit + R)，sl = max(round2(limit - R), 0.01)，
    /// 取整后必须满足 sl < limit < tp
    pub fn build(
        &self,
        symbol: &str,
        breakout: &BreakoutEvent,
        range: &OpeningRange,
    ) -> Result<OrderPlan, OrbError> {
        if !breakout.close.is_finite() || !range.range.is_finite() || range.range <= 0.0 {
            return Err(OrbError::Plan(format!(
                "输入无效: close={} range={}",
                breakout.close, range.range
            )));
        }

        let limit = Price::from_cents(round_to_cents(breakout.close));
        let take_profit = Price::from_cents(round_to_cents(limit.as_f64() + range.range));
        let stop_loss = Price::from_cents(round_to_cents(limit.as_f64() - range.range)).max(Price::TICK);

        if !(stop_loss < limit && limit < take_profit) {
            return Err(OrbError::Plan(format!(
                "取整后价格顺序失效: sl={} limit={} tp={}",
                stop_loss, limit, take_profit
            )));
        }

        Ok(OrderPlan {
            symbol: symbol.to_string(),
            side: OrderSide::Buy,
            quantity: self.quantity,
            limit_price: limit,
            take_profit_price: take_profit,
            stop_loss_price: stop_loss,
            time_in_force: TimeInForce::Day,
            order_class: OrderClass::Bracket,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn breakout(close: f64) -> BreakoutEvent {
        BreakoutEvent {
            timestamp: New_York.with_ymd_and_hms(2024, 1, 2, 9, 47, 0).unwrap(),
            close,
            high: close + 0.02,
        }
    }

    fn range(range: f64) -> OpeningRange {
        OpeningRange {
            low: 10.0,
            high: 10.0 + range,
            range,
        }
    }

    #[test]
    fn test_round_to_cents_epsilon() {
        assert_eq!(round_to_cents(19.995), 2000);
        assert_eq!(round_to_cents(19.994), 1999);
        assert_eq!(round_to_cents(10.6), 1060);
        assert_eq!(round_to_cents(0.0), 0);
    }

    #[test]
    fn test_plan_from_breakout() {
        let plan = OrderPlanBuilder::new(100)
            .build("ABCD", &breakout(10.60), &range(0.50))
            .unwrap();
        assert_eq!(plan.limit_price, Price::from_cents(1060));
        assert_eq!(plan.take_profit_price, Price::from_cents(1110));
        assert_eq!(plan.stop_loss_price, Price::from_cents(1010));
        assert_eq!(plan.quantity, 100);
        assert_eq!(plan.side, OrderSide::Buy);
        assert_eq!(plan.time_in_force, TimeInForce::Day);
        assert_eq!(plan.order_class, OrderClass::Bracket);
    }

    #[test]
    fn test_stop_loss_floored_at_one_cent() {
        let plan = OrderPlanBuilder::new(100)
            .build("PENNY", &breakout(1.00), &range(1.00))
            .unwrap();
        assert_eq!(plan.stop_loss_price, Price::TICK);
        assert_eq!(plan.take_profit_price, Price::from_cents(200));

        let plan = OrderPlanBuilder::new(100)
            .build("PENNY", &breakout(1.00), &range(3.00))
            .unwrap();
        assert_eq!(plan.stop_loss_price, Price::TICK);
    }

    #[test]
    fn test_collapsed_ordering_rejected() {
        // 区间小于半分，取整后止盈止损与入场重合
        let result = OrderPlanBuilder::new(100).build("ABCD", &breakout(10.00), &range(0.004));
        assert!(matches!(result, Err(OrbError::Plan(_))));

        // 入场价取整为 0.01，止损下限与入场重合
        let result = OrderPlanBuilder::new(100).build("ABCD", &breakout(0.01), &range(0.5));
        assert!(matches!(result, Err(OrbError::Plan(_))));
    }

    #[test]
    fn test_request_carries_plan_prices() {
        let plan = OrderPlanBuilder::new(25)
            .build("ABCD", &breakout(10.60), &range(0.50))
            .unwrap();
        let request = plan.to_request("ORB-202401020947-ABCD".to_string());
        assert_eq!(request.quantity, 25);
        assert_eq!(request.limit_price, plan.limit_price);
        assert_eq!(request.client_order_id, "ORB-202401020947-ABCD");
    }
}
