//! Command implementations.
//!
//! - [`build`] - clean and rebuild the output tree
//! - [`watch`] - build, serve and rebuild on change
//! - [`deploy`] - build and publish to a git branch

pub mod build;
pub mod deploy;
pub mod utils;
pub mod watch;

pub use build::execute as build_execute;
pub use deploy::execute as deploy_execute;
pub use utils::Session;
pub use watch::execute as watch_execute;
