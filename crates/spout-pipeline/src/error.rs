//! Pipeline error types.
//!
//! Everything here aborts the current build. Per-file style compile failures
//! are not errors: they are reported as [`crate::FileNotice`]s instead.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::deploy::DeployError;

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("invalid browser query: {0}")]
    Browsers(String),

    #[error("script error in {}: {message}", .path.display())]
    Script { path: PathBuf, message: String },

    #[error("image error in {}: {message}", .path.display())]
    Image { path: PathBuf, message: String },

    #[error("deploy failed: {0}")]
    Deploy(#[from] DeployError),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl PipelineError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
