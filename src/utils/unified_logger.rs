use chrono::Local;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
/// 统一日志管理模块
/// 控制台 + 按大小轮转的策略日志文件
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_root_dir() -> String {
    "logs".to_string()
}

fn default_level() -> String {
    "INFO".to_string()
}

fn default_max_file_size_mb() -> u64 {
    10
}

fn default_retained_files() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

fn default_pattern() -> String {
    "[{d(%Y-%m-%d %H:%M:%S%.3f)}] [{l}] [{M}] {m}{n}".to_string()
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_root_dir")]
    pub root_dir: String,
    #[serde(default = "default_level")]
    pub default_level: String,
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
    /// 保留的轮转文件数量
    #[serde(default = "default_retained_files")]
    pub retained_files: u32,
    #[serde(default = "default_true")]
    pub console_output: bool,
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            default_level: default_level(),
            max_file_size_mb: default_max_file_size_mb(),
            retained_files: default_retained_files(),
            console_output: true,
            pattern: default_pattern(),
        }
    }
}

impl LogConfig {
    /// 获取日志级别
    pub fn level_filter(&self) -> LevelFilter {
        parse_level(&self.default_level)
    }

    /// 获取策略的日志文件路径
    pub fn strategy_log_path(&self, strategy_name: &str) -> PathBuf {
        let date = Local::now().format("%Y%m%d");
        PathBuf::from(format!(
            "{}/strategies/{}_{}.log",
            self.root_dir, strategy_name, date
        ))
    }
}

pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_uppercase().as_str() {
        "TRACE" => LevelFilter::Trace,
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARN" | "WARNING" => LevelFilter::Warn,
        "ERROR" => LevelFilter::Error,
        "OFF" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// 初始化全局日志器，返回策略日志文件路径
pub fn init_strategy_logger(config: &LogConfig, strategy_name: &str) -> anyhow::Result<PathBuf> {
    let log_path = config.strategy_log_path(strategy_name);
    let roll_pattern = format!(
        "{}/strategies/{}_{}.{{}}.log",
        config.root_dir,
        strategy_name,
        Local::now().format("%Y%m%d")
    );

    let roller = FixedWindowRoller::builder().build(&roll_pattern, config.retained_files.max(1))?;
    let trigger = SizeTrigger::new(config.max_file_size_mb.max(1) * 1024 * 1024);
    let policy = CompoundPolicy::new(Box::new(trigger), Box::new(roller));

    let file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(&config.pattern)))
        .build(&log_path, Box::new(policy))?;

    let mut builder =
        Config::builder().appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if config.console_output {
        let console = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(&config.pattern)))
            .build();
        builder = builder.appender(Appender::builder().build("console", Box::new(console)));
        root = root.appender("console");
    }

    let log_config = builder.build(root.build(config.level_filter()))?;
    log4rs::init_config(log_config)?;

    Ok(log_path)
}
