//! Subcommands and their arguments.

use clap::{Args, Subcommand};

use super::validation::{parse_host, parse_ref_name};

#[derive(Subcommand, Debug, Clone, Default, PartialEq, Eq)]
pub enum Command {
    /// Clean the output directory and run every build step
    #[default]
    Build,

    /// Build, serve the output directory and rebuild on change
    ///
    /// Connected browsers reload after every successful rebuild.
    Watch(WatchArgs),

    /// Build and publish the output directory to a git branch
    Deploy(DeployArgs),
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchArgs {
    /// Address to bind the dev server to [default from config: 127.0.0.1]
    #[arg(long, value_parser = parse_host)]
    pub host: Option<String>,

    /// Port for the dev server [default from config: 3000]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Open the site in a browser once the server is up
    #[arg(long)]
    pub open: bool,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployArgs {
    /// Branch to publish to [default from config: gh-pages]
    #[arg(short, long, value_parser = parse_ref_name)]
    pub branch: Option<String>,

    /// Remote to push to [default from config: origin]
    #[arg(short, long, value_parser = parse_ref_name)]
    pub remote: Option<String>,

    /// Commit message [default from config: Updates]
    #[arg(short, long)]
    pub message: Option<String>,
}
