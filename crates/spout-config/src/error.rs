//! Error types for configuration loading and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("'{field}' has no input patterns")]
    EmptyPatterns { field: String },

    #[error("output '{}' of {category} must be inside the output root '{}'", .path.display(), .root.display())]
    OutputOutsideRoot {
        category: String,
        path: PathBuf,
        root: PathBuf,
    },

    #[error("outputs of {first} and {second} overlap: '{}'", .path.display())]
    OverlappingOutputs {
        first: String,
        second: String,
        path: PathBuf,
    },

    #[error("output root '{}' must not be inside the source root '{}'", .output.display(), .input.display())]
    OutputInsideSource { output: PathBuf, input: PathBuf },

    #[error("output root '{}' {reason}", .output.display())]
    UnsafeOutputRoot { output: PathBuf, reason: &'static str },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Extract(Box::new(err))
    }
}
