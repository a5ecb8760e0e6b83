use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

use super::SymbolStore;
use crate::core::error::OrbError;

/// 初始化时写入的策略
const SEEDED_STRATEGIES: [&str; 2] = ["opening_range_breakout", "opening_range_breakdown"];

/// 基于SQLite的交易对仓库（stock / strategy / stock_strategy 三张表）
#[derive(Debug, Clone)]
pub struct SqliteSymbolStore {
    pool: SqlitePool,
}

impl SqliteSymbolStore {
    /// 连接数据库，文件不存在时自动创建
    pub async fn connect(database_url: &str) -> Result<Self, OrbError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(10))
            .foreign_keys(true);

        // 内存库每个连接都是独立的数据库，只能用单连接
        let max_connections = if database_url.contains(":memory:") { 1 } else { 4 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// 建表并写入默认策略，可重复执行
    pub async fn init_schema(&self) -> Result<(), OrbError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS stock (
                id INTEGER PRIMARY KEY,
                symbol TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                exchange TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS strategy (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS stock_strategy (
                stock_id INTEGER NOT NULL,
                strategy_id INTEGER NOT NULL,
                FOREIGN KEY (stock_id) REFERENCES stock (id),
                FOREIGN KEY (strategy_id) REFERENCES strategy (id)
            )
            "#,
        ];

        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        for name in SEEDED_STRATEGIES {
            sqlx::query(
                "INSERT INTO strategy (name) SELECT ?1 WHERE NOT EXISTS (SELECT 1 FROM strategy WHERE name = ?1)",
            )
            .bind(name)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// 新增股票，已存在则返回原有ID
    pub async fn add_stock(&self, symbol: &str, name: &str, exchange: &str) -> Result<i64, OrbError> {
        sqlx::query("INSERT OR IGNORE INTO stock (symbol, name, exchange) VALUES (?1, ?2, ?3)")
            .bind(symbol)
            .bind(name)
            .bind(exchange)
            .execute(&self.pool)
            .await?;

        let id: i64 = sqlx::query_scalar("SELECT id FROM stock WHERE symbol = ?1")
            .bind(symbol)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    /// 把股票分配给策略
    pub async fn assign_strategy(&self, symbol: &str, strategy_name: &str) -> Result<(), OrbError> {
        let strategy_id = self.strategy_id(strategy_name).await?.ok_or_else(|| {
            OrbError::Config(format!("策略不存在: {}", strategy_name))
        })?;

        let stock_id: Option<i64> = sqlx::query_scalar("SELECT id FROM stock WHERE symbol = ?1")
            .bind(symbol)
            .fetch_optional(&self.pool)
            .await?;
        let stock_id =
            stock_id.ok_or_else(|| OrbError::Config(format!("股票不存在: {}", symbol)))?;

        sqlx::query(
            r#"
            INSERT INTO stock_strategy (stock_id, strategy_id)
            SELECT ?1, ?2
            WHERE NOT EXISTS (
                SELECT 1 FROM stock_strategy WHERE stock_id = ?1 AND strategy_id = ?2
            )
            "#,
        )
        .bind(stock_id)
        .bind(strategy_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn strategy_id(&self, strategy_name: &str) -> Result<Option<i64>, OrbError> {
        let id = sqlx::query_scalar("SELECT id FROM strategy WHERE name = ?1 ORDER BY id LIMIT 1")
            .bind(strategy_name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }
}

#[async_trait]
impl SymbolStore for SqliteSymbolStore {
    async fn list_symbols_for_strategy(&self, strategy_name: &str) -> Result<Vec<String>, OrbError> {
        let strategy_id = self.strategy_id(strategy_name).await?.ok_or_else(|| {
            OrbError::Config(format!("策略不存在: {}", strategy_name))
        })?;

        let symbols: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT stock.symbol
            FROM stock
            JOIN stock_strategy ON stock_strategy.stock_id = stock.id
            WHERE stock_strategy.strategy_id = ?1
            ORDER BY stock.symbol
            "#,
        )
        .bind(strategy_id)
        .fetch_all(&self.pool)
        .await?;

        // 加密货币交易对（含 /）不属于股票策略
        Ok(symbols.into_iter().filter(|s| !s.contains('/')).collect())
    }
}
