/// 客户端订单ID生成器
///
/// 同一交易对、同一根突破K线总是生成相同的ID，券商会拒绝重复的 client_order_id，
/// 同一天重复运行不会造成重复下单。
use chrono::{DateTime, TimeZone};

/// Alpaca client_order_id 最大长度
const MAX_LENGTH: usize = 48;

/// 订单ID生成器
#[derive(Debug, Clone)]
pub struct OrderIdGenerator {
    strategy_code: String,
}

impl OrderIdGenerator {
    /// 创建新的订单ID生成器
    pub fn new(strategy_name: &str) -> Self {
        Self {
            strategy_code: Self::generate_strategy_code(strategy_name),
        }
    }

    /// 格式: [策略代码]-[YYYYMMDDHHMM]-[交易对]
    pub fn generate<Tz: TimeZone>(&self, symbol: &str, signal_time: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let clean_symbol: String = symbol
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
            .collect();

        let mut order_id = format!(
            "{}-{}-{}",
            self.strategy_code,
            signal_time.format("%Y%m%d%H%M"),
            clean_symbol.to_uppercase()
        );

        if order_id.len() > MAX_LENGTH {
            order_id.truncate(MAX_LENGTH);
        }

        order_id
    }

    /// 生成策略代码：取每个单词的首字母
    fn generate_strategy_code(strategy_name: &str) -> String {
        let code: String = strategy_name
            .split('_')
            .filter_map(|w| w.chars().next())
            .collect::<String>()
            .to_uppercase()
            .chars()
            .take(4)
            .collect();

        if code.is_empty() {
            "X".to_string()
        } else {
            code
        }
    }
}
