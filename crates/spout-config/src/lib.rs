//! Configuration for the spout asset pipeline.
//!
//! The central value is [`SiteConfig`]: the [`PathTable`] that maps every asset
//! category to its input globs and output directory, plus the per-step options.
//! It is built once at startup (defaults, then `spout.toml`, then `SPOUT_`
//! environment overrides), validated, and then shared read-only with every step.

pub mod error;
pub mod loading;
pub mod options;
pub mod paths;
pub mod validation;

pub use error::{ConfigError, Result};
pub use loading::{ConfigLoader, CONFIG_FILE_NAME, ENV_PREFIX};
pub use options::{
    DeployOptions, GitUser, ImageOptions, JpegQuality, ServeOptions, SiteConfig, StyleOptions,
};
pub use paths::{Category, PathEntry, PathTable, RootedPaths};
