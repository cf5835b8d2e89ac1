//! spout - static site asset pipeline.
//!
//! Parses the command line, sets up logging and dispatches to a command.

use clap::Parser;
use miette::Result;
use spout_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.global.verbose, args.global.quiet, args.global.no_color);
    ui::init_colors(args.global.no_color);

    let result = match args.command.unwrap_or_default() {
        cli::Command::Build => commands::build_execute(&args.global).await,
        cli::Command::Watch(watch_args) => commands::watch_execute(&args.global, watch_args).await,
        cli::Command::Deploy(deploy_args) => {
            commands::deploy_execute(&args.global, deploy_args).await
        }
    };

    result.map_err(error::cli_error_to_miette)
}
