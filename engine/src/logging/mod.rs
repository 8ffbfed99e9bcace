//! Scoped logging on top of `tracing`.
//!
//! Each subsystem logs under a scope name (`scene`, `raycast`, `navigation`,
//! `input`). The per-scope level table is read once from an environment
//! variable by [`init_logging`]; before that, everything at `WARN` and above
//! is let through.
pub mod config;
pub mod macros;

pub use config::{init_logging, init_with_config, LogConfig};
pub use tracing::{debug, error, info, trace, warn, Level};

use once_cell::sync::Lazy;
use std::sync::OnceLock;

static LOG_CONFIG: OnceLock<LogConfig> = OnceLock::new();
static FALLBACK_CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::default);

pub fn log_config() -> &'static LogConfig {
    LOG_CONFIG.get().unwrap_or(&FALLBACK_CONFIG)
}

pub(crate) fn install_log_config(config: LogConfig) -> bool {
    LOG_CONFIG.set(config).is_ok()
}
