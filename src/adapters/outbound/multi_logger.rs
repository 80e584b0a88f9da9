use super::console_logger::init_console_logger;
use super::file_logger::init_file_logger;
use crate::config::LoggingConfig;
use crate::domains::logger::{parse_level, DomainLogger, DynLogger};
use std::sync::Arc;

/// Fans each message out to a primary and an optional secondary sink.
pub struct MultiLogger {
    primary: DynLogger,
    secondary: Option<DynLogger>,
}

impl MultiLogger {
    pub fn new(primary: DynLogger, secondary: Option<DynLogger>) -> Self {
        Self { primary, secondary }
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.primary.info(msg);
        if let Some(sec) = &self.secondary {
            sec.info(msg);
        }
    }

    fn warn(&self, msg: &str) {
        self.primary.warn(msg);
        if let Some(sec) = &self.secondary {
            sec.warn(msg);
        }
    }

    fn error(&self, msg: &str) {
        self.primary.error(msg);
        if let Some(sec) = &self.secondary {
            sec.error(msg);
        }
    }
}

/// Console logging, plus the file sink when `[logging] file` is set and
/// can be opened. A file that fails to open leaves console only.
pub fn init_combined_logger(config: &LoggingConfig) -> DynLogger {
    let console = init_console_logger();
    let Some(path) = &config.file else {
        return console;
    };
    match init_file_logger(path, parse_level(&config.level)) {
        Ok(file) => Arc::new(MultiLogger::new(file, Some(console))) as DynLogger,
        Err(e) => {
            console.warn(&format!("file logging disabled: {}", e));
            console
        }
    }
}
