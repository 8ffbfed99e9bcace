use std::path::PathBuf;

use thiserror::Error;

use crate::scene::NodeId;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scene description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("node {0:?} is not in the scene")]
    MissingNode(NodeId),
}
