use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::Arc;

/// Forwards domain messages to the `tracing` subscriber installed by the
/// binary, so they honour `RUST_LOG`.
struct ConsoleBridge;

impl DomainLogger for ConsoleBridge {
    fn info(&self, msg: &str) {
        tracing::info!(target: "maze_traverse::episode", "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "maze_traverse::episode", "{}", msg);
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "maze_traverse::episode", "{}", msg);
    }
}

pub fn init_console_logger() -> DynLogger {
    Arc::new(ConsoleBridge)
}
