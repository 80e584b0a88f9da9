use crate::common::{DomainError, DomainResult};
use crate::domains::logger::{DomainLogger, DynLogger, FileLogger};
use log::LevelFilter;
use std::path::Path;
use std::sync::Arc;

/// Install the `fast_log` file sink and hand back a logger writing to it.
pub fn init_file_logger(path: &Path, level: LevelFilter) -> DomainResult<DynLogger> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            DomainError::Infrastructure(format!("creating log directory {}: {}", parent.display(), e))
        })?;
    }
    FileLogger::init(path, level)
        .map_err(|e| DomainError::Infrastructure(format!("initialising fast_log: {}", e)))?;
    Ok(Arc::new(FileLogger) as Arc<dyn DomainLogger>)
}
