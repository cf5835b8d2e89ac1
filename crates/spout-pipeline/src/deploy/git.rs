//! Thin async wrapper around the `git` executable.

use std::path::{Path, PathBuf};
use std::process::Output;

use tokio::process::Command;

use super::DeployError;

/// Runs git commands in one working directory.
#[derive(Debug, Clone)]
pub struct Git {
    cwd: PathBuf,
}

impl Git {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    async fn output(&self, args: &[&str]) -> Result<Output, DeployError> {
        tracing::debug!("git {} (in {})", args.join(" "), self.cwd.display());
        Command::new("git")
            .args(args)
            .current_dir(&self.cwd)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await
            .map_err(|source| DeployError::Spawn { source })
    }

    /// Run a command that must succeed and return its trimmed stdout.
    pub async fn run(&self, args: &[&str]) -> Result<String, DeployError> {
        let output = self.output(args).await?;
        if !output.status.success() {
            return Err(DeployError::Command {
                command: format!("git {}", args.join(" ")),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run a command whose exit status is the answer.
    pub async fn check(&self, args: &[&str]) -> Result<bool, DeployError> {
        Ok(self.output(args).await?.status.success())
    }
}
