//! spout CLI library.
//!
//! The binary in `main.rs` is a thin wrapper around these modules so that
//! integration tests can drive commands, the dev server and the watcher
//! directly.

pub mod cli;
pub mod commands;
pub mod dev;
pub mod error;
pub mod logger;
pub mod notifier;
pub mod ui;

pub use error::{CliError, Result};
