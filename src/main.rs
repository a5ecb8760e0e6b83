use anyhow::Context;
use chrono::NaiveDate;
use clap::{Arg, ArgAction, Command};
use rustorb::{
    core::config::{load_layered, ApiKeys},
    exchanges::AlpacaBroker,
    storage::SqliteSymbolStore,
    strategies::common::StrategyDeps,
    strategies::opening_range_breakout::{OpeningRangeBreakoutStrategy, OrbConfig, SessionWindow},
    utils::{init_strategy_logger, webhook::build_notifier, Notifier},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const DEFAULT_CONFIG: &str = "config/opening_range_breakout.yml";
const ENV_PREFIX: &str = "ORB";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载环境变量
    dotenv::dotenv().ok();

    // 解析命令行参数
    let matches = Command::new("rustorb")
        .version(env!("CARGO_PKG_VERSION"))
        .about("开盘区间突破(ORB)日内交易")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径")
                .default_value(DEFAULT_CONFIG),
        )
        .arg(
            Arg::new("date")
                .long("date")
                .value_name("YYYY-MM-DD")
                .help("交易日，默认为交易所时区的今天"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("只计算订单计划，不提交"),
        )
        .arg(
            Arg::new("assign")
                .long("assign")
                .value_name("SYMBOLS")
                .help("把逗号分隔的股票分配给本策略后退出"),
        )
        .get_matches();

    let config_file = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG);

    let mut config: OrbConfig = load_layered(config_file, ENV_PREFIX)
        .with_context(|| format!("加载配置失败: {}", config_file))?;
    if matches.get_flag("dry-run") {
        config.order.dry_run = true;
    }
    config.validate()?;

    // 初始化日志，级别取自策略配置
    let mut log_config = config.logging.clone();
    log_config.default_level = config.strategy.log_level.clone();
    let log_path = init_strategy_logger(&log_config, &config.strategy.name)?;
    log::info!(
        "启动策略: {} 配置: {} 日志: {}",
        config.strategy.name,
        config_file,
        log_path.display()
    );

    let store = SqliteSymbolStore::connect(&config.storage.database_url).await?;
    store.init_schema().await?;

    if let Some(list) = matches.get_one::<String>("assign") {
        for symbol in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let symbol = symbol.to_uppercase();
            store.add_stock(&symbol, &symbol, "").await?;
            store.assign_strategy(&symbol, &config.strategy.name).await?;
            log::info!("✅ 已分配 {} -> {}", symbol, config.strategy.name);
        }
        return Ok(());
    }

    let tz = config.session.tz()?;
    let date = match matches.get_one::<String>("date") {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .with_context(|| format!("日期格式无效: {}", text))?,
        None => SessionWindow::today(tz),
    };

    let api_keys = ApiKeys::from_env(&config.broker.api_key_env)?;
    let broker = AlpacaBroker::new(
        config.broker.clone(),
        api_keys,
        Duration::from_secs(config.execution.request_timeout_secs),
    )?;
    let notifier: Arc<dyn Notifier> = Arc::from(build_notifier(&config.notification));

    let deps = StrategyDeps::builder()
        .with_broker(Arc::new(broker))
        .with_store(Arc::new(store))
        .with_notifier(notifier)
        .build()?;
    let strategy = OpeningRangeBreakoutStrategy::new(config, deps)?;

    // Ctrl-C 只停止启动新的交易对，进行中的下单会完成
    let (abort_tx, abort_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("收到停止信号，不再处理新的交易对...");
            let _ = abort_tx.send(true);
        }
    });

    match strategy.run(date, abort_rx).await {
        Ok(report) => {
            log::info!(
                "✅ {} 运行完成，提交订单{}笔",
                report.date,
                report.submitted_trades().len()
            );
            Ok(())
        }
        Err(err) => {
            log::error!("❌ 运行中止: {}", err);
            Err(err.into())
        }
    }
}
