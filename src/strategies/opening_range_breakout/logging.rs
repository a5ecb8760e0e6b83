// 按交易对打前缀的日志助手，文件输出由 log4rs 负责

fn log_with_level(level: log::Level, symbol: Option<&str>, message: &str) {
    match symbol {
        Some(sym) => log::log!(level, "[{}] {}", sym, message),
        None => log::log!(level, "{}", message),
    }
}

pub fn info(symbol: Option<&str>, message: impl AsRef<str>) {
    log_with_level(log::Level::Info, symbol, message.as_ref());
}

pub fn warn(symbol: Option<&str>, message: impl AsRef<str>) {
    log_with_level(log::Level::Warn, symbol, message.as_ref());
}

pub fn error(symbol: Option<&str>, message: impl AsRef<str>) {
    log_with_level(log::Level::Error, symbol, message.as_ref());
}

pub fn debug(symbol: Option<&str>, message: impl AsRef<str>) {
    log_with_level(log::Level::Debug, symbol, message.as_ref());
}
