use std::collections::HashMap;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Per-scope level table, e.g. `warn,navigation=debug,raycast=trace`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    default_level: Level,
    scopes: HashMap<String, Level>,
}

impl LogConfig {
    pub fn new(default_level: Level) -> Self {
        Self {
            default_level,
            scopes: HashMap::new(),
        }
    }

    /// Read the table from `env_var`; unset or empty falls back to `WARN`.
    pub fn from_env(env_var: &str) -> Self {
        std::env::var(env_var)
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    /// Unknown level names are skipped rather than rejected, so a typo in the
    /// environment never stops the scene from starting.
    pub fn parse(table: &str) -> Self {
        let mut config = Self::default();

        for entry in table.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match entry.split_once('=') {
                Some((scope, level)) => {
                    if let Ok(level) = Level::from_str(level.trim()) {
                        config.scopes.insert(scope.trim().to_string(), level);
                    }
                }
                None => {
                    if let Ok(level) = Level::from_str(entry) {
                        config.default_level = level;
                    }
                }
            }
        }

        config
    }

    pub fn level_for(&self, scope: &str) -> Level {
        self.scopes
            .get(scope)
            .copied()
            .unwrap_or(self.default_level)
    }

    pub fn enabled(&self, scope: &str, level: Level) -> bool {
        level <= self.level_for(scope)
    }

    /// Most verbose level any scope asks for.
    pub fn max_level(&self) -> Level {
        self.scopes
            .values()
            .copied()
            .fold(self.default_level, Ord::max)
    }

    pub fn set_default_level(&mut self, level: Level) {
        self.default_level = level;
    }

    pub fn set_scope_level(&mut self, scope: impl Into<String>, level: Level) {
        self.scopes.insert(scope.into(), level);
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new(Level::WARN)
    }
}

/// Install the fmt subscriber and the scope table read from `env_var`.
///
/// Safe to call more than once: the first subscriber and the first table win.
/// Example: `init_logging("TELEPORT_LOG")` with `TELEPORT_LOG=warn,navigation=debug`.
pub fn init_logging(env_var: &str) -> LogConfig {
    init_with_config(LogConfig::from_env(env_var))
}

/// Like [`init_logging`] with an already built table, e.g. one a CLI flag raised.
/// `RUST_LOG`, when set, still overrides the subscriber filter.
pub fn init_with_config(config: LogConfig) -> LogConfig {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.max_level()).into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();

    super::install_log_config(config.clone());
    config
}
