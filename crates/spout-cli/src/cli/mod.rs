//! Command-line interface definition.
//!
//! # Command Structure
//!
//! - `spout` / `spout build` - clean and rebuild the output tree
//! - `spout watch` - build, serve the output and rebuild on change
//! - `spout deploy` - build and publish the output to a git branch

mod commands;
mod validation;

use std::path::PathBuf;

use clap::{Args, Parser};

pub use commands::{Command, DeployArgs, WatchArgs};
pub use validation::{parse_host, parse_ref_name};

/// spout - a static site asset pipeline
#[derive(Parser, Debug)]
#[command(
    name = "spout",
    version,
    about = "A static site asset pipeline",
    long_about = "spout compiles Sass, minifies scripts, recompresses images and copies\n\
                  static files from src/ into dist/. It can also serve and watch the\n\
                  project, or publish dist/ to a git branch."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute (defaults to `build`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Flags accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Configuration file to load instead of `<root>/spout.toml`
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Do not raise desktop notifications for stylesheet errors
    #[arg(long, global = true)]
    pub no_notify: bool,
}
