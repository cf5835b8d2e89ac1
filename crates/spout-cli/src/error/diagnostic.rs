//! Conversion of CLI errors into miette reports, with a hint where the fix
//! is predictable.

use miette::{miette, Report};
use spout_config::{ConfigError, CONFIG_FILE_NAME};
use spout_pipeline::{DeployError, PipelineError};

use crate::error::CliError;

pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => config_error_to_miette(e),
        CliError::Build(e) => pipeline_error_to_miette(e),
        CliError::FileNotFound(path) => miette!(
            help = "Check the path, or pass --cwd to point at the project root",
            "File not found: {}",
            path.display()
        ),
        _ => miette!("{}", err),
    }
}

fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::NotFound(path) => miette!(
            help = format!(
                "Create {} in the project root or pass an existing file to --config",
                CONFIG_FILE_NAME
            ),
            "Config file not found: {}",
            path.display()
        ),
        ConfigError::Extract(e) => miette!(
            help = "Keys are camelCase in spout.toml and SNAKE_CASE in SPOUT_ variables; unknown keys are rejected",
            "Invalid configuration: {}",
            e
        ),
        err @ ConfigError::UnsafeOutputRoot { .. } => miette!(
            help = "The output root is deleted before every build; point paths.output at a dedicated directory such as \"dist\"",
            "Configuration error: {}",
            err
        ),
        other => miette!(help = "Fix the value in spout.toml", "Configuration error: {}", other),
    }
}

fn pipeline_error_to_miette(err: PipelineError) -> Report {
    match err {
        PipelineError::Browsers(query) => miette!(
            help = "See https://browsersl.ist for the query syntax",
            "Invalid browser query: {}",
            query
        ),
        PipelineError::Deploy(DeployError::NoRepository { remote }) => miette!(
            help = format!(
                "Add the remote with `git remote add {} <url>` or set deploy.repo",
                remote
            ),
            "No repository to publish to"
        ),
        PipelineError::Deploy(DeployError::Spawn { source }) => miette!(
            help = "Install git and make sure it is on PATH",
            "Failed to run git: {}",
            source
        ),
        other => miette!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_config_has_help() {
        let report = cli_error_to_miette(CliError::Config(ConfigError::NotFound(PathBuf::from(
            "alt.toml",
        ))));
        assert!(report.to_string().contains("alt.toml"));
        let help = report.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("--config"));
    }

    #[test]
    fn test_unsafe_output_root_explains_clean() {
        let report = cli_error_to_miette(CliError::Config(ConfigError::UnsafeOutputRoot {
            output: PathBuf::from("."),
            reason: "must name a directory below the project root",
        }));
        assert!(report.to_string().contains("output root '.'"));
        let help = report.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("deleted before every build"));
    }

    #[test]
    fn test_no_repository_names_remote() {
        let report = cli_error_to_miette(CliError::Build(PipelineError::Deploy(
            DeployError::NoRepository {
                remote: "origin".into(),
            },
        )));
        let help = report.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("git remote add origin"));
    }

    #[test]
    fn test_other_errors_keep_message() {
        let report = cli_error_to_miette(CliError::Server("address in use".into()));
        assert_eq!(report.to_string(), "Server error: address in use");
    }
}
