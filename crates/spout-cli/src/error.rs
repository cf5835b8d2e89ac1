//! Error handling for the spout CLI.
//!
//! Library errors (`ConfigError`, `PipelineError`) convert into [`CliError`]
//! through `#[from]`; commands add context with [`ResultExt`]. `main` turns
//! the final error into a `miette::Report` via [`cli_error_to_miette`].
//!
//! # Example
//!
//! ```rust,no_run
//! use spout_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_page(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path).with_path(path)
//! }
//! ```

mod diagnostic;

use std::path::PathBuf;

use spout_config::ConfigError;
use spout_pipeline::PipelineError;
use thiserror::Error;

pub use diagnostic::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A build step or the publisher failed
    #[error("Build error: {0}")]
    Build(#[from] PipelineError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Extension trait for adding context to results.
pub trait ResultExt<T> {
    /// Attach a path; a `NotFound` I/O error becomes [`CliError::FileNotFound`].
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error with a description of what was being done.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_with_path_maps_not_found() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        match result.with_path("src/index.html") {
            Err(CliError::FileNotFound(path)) => assert_eq!(path, PathBuf::from("src/index.html")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_with_path_keeps_other_io_errors() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(matches!(result.with_path("dist"), Err(CliError::Io(_))));
    }

    #[test]
    fn test_with_hint_appends_hint() {
        let result: std::result::Result<(), CliError> = Err(CliError::Server("bind failed".into()));
        let msg = result.with_hint("Try another --port").unwrap_err().to_string();
        assert!(msg.contains("bind failed"));
        assert!(msg.contains("Hint: Try another --port"));
    }

    #[test]
    fn test_context_prefixes_message() {
        let result: std::result::Result<(), CliError> = Err(CliError::Custom("boom".into()));
        let msg = result.context("Failed to start watcher").unwrap_err().to_string();
        assert_eq!(msg, "Failed to start watcher: boom");
    }

    #[test]
    fn test_config_error_converts() {
        let err: CliError = ConfigError::EmptyPatterns {
            field: "paths.scripts.input".into(),
        }
        .into();
        assert!(err.to_string().starts_with("Configuration error:"));
        assert!(err.to_string().contains("paths.scripts.input"));
    }
}
