use std::path::PathBuf;

use thiserror::Error;

/// Errors from setting navigation up. Nothing in the per-frame path returns
/// these: a failed teleport is "nothing happens", not an error.
#[derive(Debug, Error)]
pub enum TeleportError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid teleport config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid teleport config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid colour '{0}', expected #rgb or #rrggbb")]
    InvalidColor(String),

    #[error("camera rig is being moved by a teleport")]
    RigBusy,

    #[error("camera rig is not available")]
    RigUnavailable,

    #[error("saved position store is corrupt: {0}")]
    Store(#[from] serde_json::Error),
}
