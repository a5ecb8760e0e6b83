use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

use crate::core::error::OrbError;
use crate::core::retry_policy::{ExponentialBackoffRetry, RetryConfig};
use crate::strategies::common::StrategyDeps;
use crate::utils::order_id::OrderIdGenerator;

use super::config::OrbConfig;
use super::exposure::ExposureSet;
use super::logging;
use super::model::{RunReport, SymbolOutcome};
use super::planner::OrderPlanBuilder;
use super::report::compose_notification;
use super::session::SessionWindow;
use super::tasks::{process_symbol, RunContext};

/// 开盘区间突破策略：每个交易日运行一次的批处理
pub struct OpeningRangeBreakoutStrategy {
    config: OrbConfig,
    deps: StrategyDeps,
}

impl OpeningRangeBreakoutStrategy {
    pub fn new(config: OrbConfig, deps: StrategyDeps) -> Result<Self, OrbError> {
        config.validate()?;
        Ok(Self { config, deps })
    }

    fn read_retry(&self) -> ExponentialBackoffRetry {
        let execution = &self.config.execution;
        ExponentialBackoffRetry::new(RetryConfig {
            attempt_timeout: Duration::from_secs(execution.request_timeout_secs),
            ..RetryConfig::default()
        })
        .with_max_retries(execution.read_retries)
        .with_initial_delay(execution.retry_initial_delay_ms)
    }

    /// 运行一个交易日。只有配置、仓库与持仓快照错误会返回 Err。
    ///
    /// `abort` 变为 true 后不再启动新的交易对，已启动的会执行完毕。
    pub async fn run(
        &self,
        date: NaiveDate,
        mut abort: watch::Receiver<bool>,
    ) -> Result<RunReport, OrbError> {
        let dry_run = self.config.order.dry_run;
        logging::info(
            None,
            format!(
                "🚀 开盘区间突破策略启动 日期={} 网关={} dry_run={}",
                date,
                self.deps.broker.name(),
                dry_run
            ),
        );

        let symbols = self.load_universe().await?;
        let session = SessionWindow::new(date, &self.config.session)?;
        logging::info(
            None,
            format!(
                "交易对{}个，开盘区间 {} - {}",
                symbols.len(),
                session.session_start.format("%H:%M"),
                session.range_end.format("%H:%M %Z")
            ),
        );

        let read_retry = self.read_retry();
        let exposure = self.compute_exposure(&read_retry).await?;
        if !exposure.is_empty() {
            logging::info(
                None,
                format!(
                    "已有挂单或持仓，本次跳过: {}",
                    exposure.symbols().collect::<Vec<_>>().join(", ")
                ),
            );
        }

        let ctx = Arc::new(RunContext {
            broker: self.deps.broker.clone(),
            session,
            planner: OrderPlanBuilder::new(self.config.order.quantity),
            read_retry,
            order_ids: OrderIdGenerator::new(&self.config.strategy.name),
            submit_timeout: Duration::from_secs(self.config.execution.request_timeout_secs),
            dry_run,
        });

        let mut report = RunReport::new(date, dry_run);
        self.process_universe(ctx, symbols, &exposure, &mut abort, &mut report)
            .await;

        report.notified = self.notify(&report).await;
        logging::info(None, format!("🏁 运行结束 {}", report.summary_line()));

        Ok(report)
    }

    async fn load_universe(&self) -> Result<Vec<String>, OrbError> {
        let name = &self.config.strategy.name;
        let symbols: BTreeSet<String> = self
            .deps
            .store
            .list_symbols_for_strategy(name)
            .await?
            .into_iter()
            .collect();

        if symbols.is_empty() {
            return Err(OrbError::Config(format!("策略 {} 没有分配任何交易对", name)));
        }
        Ok(symbols.into_iter().collect())
    }

    async fn compute_exposure(
        &self,
        read_retry: &ExponentialBackoffRetry,
    ) -> Result<ExposureSet, OrbError> {
        let broker = &self.deps.broker;
        let open_orders = read_retry
            .execute_with_retry("list_open_orders", move || broker.list_open_orders())
            .await
            .map_err(OrbError::Exposure)?;
        let positions = read_retry
            .execute_with_retry("list_positions", move || broker.list_positions())
            .await
            .map_err(OrbError::Exposure)?;

        Ok(ExposureSet::from_snapshot(&open_orders, &positions))
    }

    async fn process_universe(
        &self,
        ctx: Arc<RunContext>,
        symbols: Vec<String>,
        exposure: &ExposureSet,
        abort: &mut watch::Receiver<bool>,
        report: &mut RunReport,
    ) {
        let semaphore = Arc::new(Semaphore::new(self.config.execution.max_concurrency));
        let mut tasks = JoinSet::new();
        let mut launched = Vec::new();

        for symbol in symbols {
            if exposure.contains(&symbol) {
                report.record(symbol, SymbolOutcome::Blocked);
                continue;
            }
            if *abort.borrow() {
                report.record(symbol, SymbolOutcome::Cancelled);
                continue;
            }

            let permit = tokio::select! {
                biased;
                _ = wait_for_abort(&mut *abort) => None,
                permit = semaphore.clone().acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                report.record(symbol, SymbolOutcome::Cancelled);
                continue;
            };

            let ctx = ctx.clone();
            launched.push(symbol.clone());
            tasks.spawn(async move {
                let _permit = permit;
                let outcome = process_symbol(&ctx, &symbol).await;
                (symbol, outcome)
            });
        }

        let cancelled = report
            .outcomes
            .values()
            .filter(|o| matches!(o, SymbolOutcome::Cancelled))
            .count();
        if cancelled > 0 {
            logging::warn(
                None,
                format!("⚠️ 收到中止信号，{}个交易对未启动，等待进行中的任务完成", cancelled),
            );
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((symbol, outcome)) => report.record(symbol, outcome),
                Err(err) => logging::error(None, format!("交易对任务异常退出: {}", err)),
            }
        }

        for symbol in launched {
            if report.outcome(&symbol).is_none() {
                report.record(symbol, SymbolOutcome::Failed("任务异常退出".to_string()));
            }
        }
    }

    /// 有交易时发送一次汇总通知，失败只记录日志
    async fn notify(&self, report: &RunReport) -> bool {
        if report.dry_run {
            let planned = report.outcomes.values().filter_map(|o| o.trade()).count();
            logging::info(None, format!("dry-run 模式，{}笔计划交易不发送通知", planned));
            return false;
        }

        let trades = report.submitted_trades();
        let Some((subject, body)) =
            compose_notification(report.date, &trades, self.deps.broker.account_url())
        else {
            logging::info(None, "没有提交任何订单，不发送通知");
            return false;
        };

        match self.deps.notifier.send(&subject, &body).await {
            Ok(()) => {
                logging::info(None, format!("📨 已发送{}笔交易的汇总通知", trades.len()));
                true
            }
            Err(err) => {
                logging::error(
                    None,
                    format!("❌ {}（已提交的订单不受影响）", err),
                );
                false
            }
        }
    }
}

/// 等待中止信号；发送端关闭后永不返回
async fn wait_for_abort(abort: &mut watch::Receiver<bool>) {
    loop {
        if *abort.borrow_and_update() {
            return;
        }
        if abort.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::broker::Broker;
    use crate::core::error::ExchangeError;
    use crate::core::types::{
        BracketOrderRequest, OpenOrder, OrderAck, Position, Price, RawBar, RawTimestamp,
        Result as GatewayResult,
    };
    use crate::storage::SymbolStore;
    use crate::utils::webhook::Notifier;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBroker {
        open_orders: Vec<OpenOrder>,
        positions: Vec<Position>,
        bars: HashMap<String, Vec<RawBar>>,
        fetch_errors: HashSet<String>,
        submit_errors: HashSet<String>,
        hang_fetch: HashSet<String>,
        hang_submit: HashSet<String>,
        submissions: Mutex<Vec<BracketOrderRequest>>,
        fetched: Mutex<Vec<String>>,
        abort_on_fetch: Option<watch::Sender<bool>>,
        exposure_calls: AtomicUsize,
    }

    #[async_trait]
    impl Broker for FakeBroker {
        fn name(&self) -> &str {
            "fake"
        }

        fn account_url(&self) -> &str {
            "https://paper-api.alpaca.markets"
        }

        async fn list_open_orders(&self) -> GatewayResult<Vec<OpenOrder>> {
            self.exposure_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.open_orders.clone())
        }

        async fn list_positions(&self) -> GatewayResult<Vec<Position>> {
            self.exposure_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.positions.clone())
        }

        async fn get_minute_bars(
            &self,
            symbol: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> GatewayResult<Vec<RawBar>> {
            self.fetched.lock().unwrap().push(symbol.to_string());
            if let Some(tx) = &self.abort_on_fetch {
                let _ = tx.send(true);
            }
            if self.hang_fetch.contains(symbol) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.fetch_errors.contains(symbol) {
                return Err(ExchangeError::ApiError {
                    code: 404,
                    message: "symbol not found".to_string(),
                });
            }
            Ok(self.bars.get(symbol).cloned().unwrap_or_default())
        }

        async fn submit_bracket_order(
            &self,
            request: &BracketOrderRequest,
        ) -> GatewayResult<OrderAck> {
            self.submissions.lock().unwrap().push(request.clone());
            if self.hang_submit.contains(&request.symbol) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.submit_errors.contains(&request.symbol) {
                return Err(ExchangeError::ApiError {
                    code: 403,
                    message: "insufficient buying power".to_string(),
                });
            }
            Ok(OrderAck {
                id: format!("order-{}", request.symbol),
                client_order_id: Some(request.client_order_id.clone()),
                status: "accepted".to_string(),
            })
        }
    }

    struct FakeStore(Vec<String>);

    #[async_trait]
    impl SymbolStore for FakeStore {
        async fn list_symbols_for_strategy(
            &self,
            _strategy_name: &str,
        ) -> Result<Vec<String>, OrbError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct FakeNotifier {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        async fn send(&self, subject: &str, body: &str) -> Result<(), OrbError> {
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_string(), body.to_string()));
            if self.fail {
                return Err(OrbError::Notification("smtp down".to_string()));
            }
            Ok(())
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    /// 2024-01-02 纽约时间 hh:mm 的K线（UTC-5，无时区标记）
    fn bar(hour: u32, minute: u32, low: f64, high: f64, close: f64) -> RawBar {
        let ts = date().and_hms_opt(hour + 5, minute, 0).unwrap();
        RawBar {
            timestamp: RawTimestamp::Naive(ts),
            open: low,
            high,
            low,
            close,
            volume: 1_000,
        }
    }

    /// 09:30-09:44 区间 low=10.00 high=10.50，之后第一根收盘价为 `post_close`
    fn orb_bars(post_close: f64) -> Vec<RawBar> {
        let mut bars: Vec<RawBar> = (30..45)
            .map(|minute| bar(9, minute, 10.10, 10.40, 10.20))
            .collect();
        bars[3] = bar(9, 33, 10.00, 10.30, 10.10);
        bars[9] = bar(9, 39, 10.20, 10.50, 10.45);
        bars.push(bar(9, 45, 10.30, post_close.max(10.40), post_close));
        bars
    }

    fn strategy_with(
        broker: Arc<FakeBroker>,
        symbols: &[&str],
        notifier: Arc<FakeNotifier>,
        config: OrbConfig,
    ) -> OpeningRangeBreakoutStrategy {
        let deps = StrategyDeps::builder()
            .with_broker(broker)
            .with_store(Arc::new(FakeStore(
                symbols.iter().map(|s| s.to_string()).collect(),
            )))
            .with_notifier(notifier)
            .build()
            .unwrap();
        OpeningRangeBreakoutStrategy::new(config, deps).unwrap()
    }

    fn test_config() -> OrbConfig {
        let mut config = OrbConfig::default();
        config.execution.read_retries = 0;
        config.execution.retry_initial_delay_ms = 1;
        config
    }

    #[tokio::test]
    async fn test_scenario_a_breakout_submits_bracket_order() {
        let broker = Arc::new(FakeBroker {
            bars: HashMap::from([("ABCD".to_string(), orb_bars(10.60))]),
            ..Default::default()
        });
        let notifier = Arc::new(FakeNotifier::default());
        let strategy = strategy_with(broker.clone(), &["ABCD"], notifier.clone(), test_config());

        let (_tx, rx) = watch::channel(false);
        let report = strategy.run(date(), rx).await.unwrap();

        let submissions = broker.submissions.lock().unwrap().clone();
        assert_eq!(submissions.len(), 1);
        let order = &submissions[0];
        assert_eq!(order.symbol, "ABCD");
        assert_eq!(order.quantity, 100);
        assert_eq!(order.limit_price, Price::from_cents(1060));
        assert_eq!(order.take_profit_price, Price::from_cents(1110));
        assert_eq!(order.stop_loss_price, Price::from_cents(1010));
        assert_eq!(order.client_order_id, "ORB-202401020945-ABCD");

        match report.outcome("ABCD") {
            Some(SymbolOutcome::Submitted(record)) => {
                assert_eq!(record.order_id.as_deref(), Some("order-ABCD"));
                assert_eq!(record.range.high, 10.50);
                assert_eq!(record.range.low, 10.00);
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        assert!(report.notified);
        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "Trade Notifications for 2024-01-02");
        assert!(sent[0].1.contains("Entry (limit): 10.60"));
    }

    #[tokio::test]
    async fn test_scenario_b_close_at_high_is_no_breakout() {
        let broker = Arc::new(FakeBroker {
            bars: HashMap::from([("ABCD".to_string(), orb_bars(10.50))]),
            ..Default::default()
        });
        let notifier = Arc::new(FakeNotifier::default());
        let strategy = strategy_with(broker.clone(), &["ABCD"], notifier.clone(), test_config());

        let (_tx, rx) = watch::channel(false);
        let report = strategy.run(date(), rx).await.unwrap();

        assert_eq!(report.outcome("ABCD"), Some(&SymbolOutcome::NoBreakout));
        assert!(broker.submissions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scenario_c_empty_bars_do_not_stop_other_symbols() {
        let broker = Arc::new(FakeBroker {
            bars: HashMap::from([("ABCD".to_string(), orb_bars(10.60))]),
            ..Default::default()
        });
        let notifier = Arc::new(FakeNotifier::default());
        let strategy = strategy_with(
            broker.clone(),
            &["EMPTY", "ABCD"],
            notifier.clone(),
            test_config(),
        );

        let (_tx, rx) = watch::channel(false);
        let report = strategy.run(date(), rx).await.unwrap();

        assert!(matches!(
            report.outcome("EMPTY"),
            Some(SymbolOutcome::NoData(_))
        ));
        assert!(matches!(
            report.outcome("ABCD"),
            Some(SymbolOutcome::Submitted(_))
        ));
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_scenario_d_no_trades_no_notification() {
        let broker = Arc::new(FakeBroker {
            bars: HashMap::from([
                ("AAA".to_string(), orb_bars(10.50)),
                ("BBB".to_string(), orb_bars(10.30)),
            ]),
            ..Default::default()
        });
        let notifier = Arc::new(FakeNotifier::default());
        let strategy = strategy_with(broker, &["AAA", "BBB", "CCC"], notifier.clone(), test_config());

        let (_tx, rx) = watch::channel(false);
        let report = strategy.run(date(), rx).await.unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert!(report.submitted_trades().is_empty());
        assert!(!report.notified);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exposed_symbols_are_never_fetched() {
        let broker = Arc::new(FakeBroker {
            open_orders: vec![OpenOrder {
                id: "1".to_string(),
                symbol: "AAA".to_string(),
            }],
            positions: vec![
                Position {
                    symbol: "BBB".to_string(),
                    quantity: 50.0,
                },
                Position {
                    symbol: "CCC".to_string(),
                    quantity: 0.0,
                },
            ],
            bars: HashMap::from([
                ("AAA".to_string(), orb_bars(10.60)),
                ("BBB".to_string(), orb_bars(10.60)),
                ("CCC".to_string(), orb_bars(10.60)),
            ]),
            ..Default::default()
        });
        let notifier = Arc::new(FakeNotifier::default());
        let strategy = strategy_with(
            broker.clone(),
            &["AAA", "BBB", "CCC"],
            notifier.clone(),
            test_config(),
        );

        let (_tx, rx) = watch::channel(false);
        let report = strategy.run(date(), rx).await.unwrap();

        assert_eq!(report.outcome("AAA"), Some(&SymbolOutcome::Blocked));
        assert_eq!(report.outcome("BBB"), Some(&SymbolOutcome::Blocked));
        assert!(matches!(
            report.outcome("CCC"),
            Some(SymbolOutcome::Submitted(_))
        ));
        assert_eq!(broker.fetched.lock().unwrap().clone(), vec!["CCC".to_string()]);
        assert_eq!(broker.exposure_calls.load(Ordering::SeqCst), 2);
        let submissions = broker.submissions.lock().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].symbol, "CCC");
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_symbol() {
        let broker = Arc::new(FakeBroker {
            bars: HashMap::from([
                ("GOOD".to_string(), orb_bars(10.60)),
                ("REJECT".to_string(), orb_bars(10.70)),
            ]),
            fetch_errors: HashSet::from(["BROKEN".to_string()]),
            submit_errors: HashSet::from(["REJECT".to_string()]),
            ..Default::default()
        });
        let notifier = Arc::new(FakeNotifier {
            fail: true,
            ..Default::default()
        });
        let strategy = strategy_with(
            broker.clone(),
            &["BROKEN", "GOOD", "REJECT"],
            notifier.clone(),
            test_config(),
        );

        let (_tx, rx) = watch::channel(false);
        let report = strategy.run(date(), rx).await.unwrap();

        assert!(matches!(report.outcome("BROKEN"), Some(SymbolOutcome::Failed(_))));
        assert!(matches!(report.outcome("REJECT"), Some(SymbolOutcome::Failed(_))));
        assert!(matches!(report.outcome("GOOD"), Some(SymbolOutcome::Submitted(_))));
        // 每个突破只提交一次
        assert_eq!(broker.submissions.lock().unwrap().len(), 2);

        // 通知失败不影响运行结果
        assert!(!report.notified);
        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("Symbol: GOOD"));
        assert!(!sent[0].1.contains("REJECT"));
    }

    #[tokio::test]
    async fn test_unresponsive_symbols_time_out_without_blocking_others() {
        let broker = Arc::new(FakeBroker {
            bars: HashMap::from([
                ("GOOD".to_string(), orb_bars(10.60)),
                ("SLOWBARS".to_string(), orb_bars(10.60)),
                ("SLOWSUB".to_string(), orb_bars(10.60)),
            ]),
            hang_fetch: HashSet::from(["SLOWBARS".to_string()]),
            hang_submit: HashSet::from(["SLOWSUB".to_string()]),
            ..Default::default()
        });
        let notifier = Arc::new(FakeNotifier::default());
        let mut config = test_config();
        config.execution.request_timeout_secs = 1;
        config.execution.max_concurrency = 1;
        let strategy = strategy_with(
            broker.clone(),
            &["GOOD", "SLOWBARS", "SLOWSUB"],
            notifier.clone(),
            config,
        );

        let (_tx, rx) = watch::channel(false);
        let started = std::time::Instant::now();
        let report = strategy.run(date(), rx).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(30));

        assert!(matches!(report.outcome("GOOD"), Some(SymbolOutcome::Submitted(_))));
        match report.outcome("SLOWBARS") {
            Some(SymbolOutcome::Failed(reason)) => assert!(reason.contains("get_minute_bars")),
            other => panic!("unexpected outcome {:?}", other),
        }
        match report.outcome("SLOWSUB") {
            Some(SymbolOutcome::Failed(reason)) => assert!(
                reason.contains("订单状态未知 client_order_id=ORB-202401020945-SLOWSUB")
            ),
            other => panic!("unexpected outcome {:?}", other),
        }

        // 超时的下单不重试
        let submitted: Vec<String> = broker
            .submissions
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.symbol.clone())
            .collect();
        assert_eq!(submitted, vec!["GOOD".to_string(), "SLOWSUB".to_string()]);

        assert!(report.notified);
        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("Symbol: GOOD"));
        assert!(!sent[0].1.contains("SLOWSUB"));
        assert!(!sent[0].1.contains("SLOWBARS"));
    }

    #[tokio::test]
    async fn test_empty_universe_is_fatal() {
        let broker = Arc::new(FakeBroker::default());
        let strategy = strategy_with(broker.clone(), &[], Arc::new(FakeNotifier::default()), test_config());

        let (_tx, rx) = watch::channel(false);
        let err = strategy.run(date(), rx).await.unwrap_err();
        assert!(matches!(err, OrbError::Config(_)));
        assert!(err.is_fatal());
        assert_eq!(broker.exposure_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_abort_before_run_launches_nothing() {
        let broker = Arc::new(FakeBroker {
            bars: HashMap::from([("ABCD".to_string(), orb_bars(10.60))]),
            ..Default::default()
        });
        let notifier = Arc::new(FakeNotifier::default());
        let strategy = strategy_with(broker.clone(), &["ABCD", "EFGH"], notifier.clone(), test_config());

        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let report = strategy.run(date(), rx).await.unwrap();

        assert_eq!(report.outcome("ABCD"), Some(&SymbolOutcome::Cancelled));
        assert_eq!(report.outcome("EFGH"), Some(&SymbolOutcome::Cancelled));
        assert!(broker.fetched.lock().unwrap().is_empty());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_abort_lets_in_flight_symbol_finish() {
        let (tx, rx) = watch::channel(false);
        let broker = Arc::new(FakeBroker {
            bars: HashMap::from([
                ("AAA".to_string(), orb_bars(10.60)),
                ("BBB".to_string(), orb_bars(10.60)),
            ]),
            abort_on_fetch: Some(tx),
            ..Default::default()
        });
        let notifier = Arc::new(FakeNotifier::default());
        let mut config = test_config();
        config.execution.max_concurrency = 1;
        let strategy = strategy_with(broker.clone(), &["AAA", "BBB"], notifier.clone(), config);

        let report = strategy.run(date(), rx).await.unwrap();

        assert!(matches!(report.outcome("AAA"), Some(SymbolOutcome::Submitted(_))));
        assert_eq!(report.outcome("BBB"), Some(&SymbolOutcome::Cancelled));
        assert_eq!(broker.submissions.lock().unwrap().len(), 1);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_builds_plans_without_submitting() {
        let broker = Arc::new(FakeBroker {
            bars: HashMap::from([("ABCD".to_string(), orb_bars(10.60))]),
            ..Default::default()
        });
        let notifier = Arc::new(FakeNotifier::default());
        let mut config = test_config();
        config.order.dry_run = true;
        let strategy = strategy_with(broker.clone(), &["ABCD"], notifier.clone(), config);

        let (_tx, rx) = watch::channel(false);
        let report = strategy.run(date(), rx).await.unwrap();

        match report.outcome("ABCD") {
            Some(SymbolOutcome::DryRun(record)) => {
                assert_eq!(record.plan.limit_price, Price::from_cents(1060));
                assert!(record.order_id.is_none());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(broker.submissions.lock().unwrap().is_empty());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }
}
