//! Publishing the output tree to a git branch.
//!
//! [`GhPages`] keeps a working clone of the target repository in a cache
//! directory, replaces the branch contents with the output tree, commits when
//! something changed and pushes. The flow matches the `gh-pages` publisher
//! defaults: branch `gh-pages`, remote `origin`, message `Updates`, dotfiles
//! excluded.

mod git;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use spout_config::{DeployOptions, RootedPaths};
use thiserror::Error;
use walkdir::WalkDir;

use crate::context::BuildContext;
use crate::task::{StepReport, Task};

pub use git::Git;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("failed to run git: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed{}: {stderr}", .code.map(|c| format!(" with exit code {}", c)).unwrap_or_default())]
    Command {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("no repository to publish to: remote '{remote}' has no URL and no repo is configured")]
    NoRepository { remote: String },

    #[error("nothing to publish: {} does not exist", .0.display())]
    MissingOutput(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("copy task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl DeployError {
    fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        DeployError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// What a publish did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub repo: String,
    pub remote: String,
    pub branch: String,
    /// Where the working clone lives.
    pub clone_dir: PathBuf,
    /// Files copied into the clone.
    pub files: usize,
    /// False when the branch already matched the output tree.
    pub committed: bool,
}

/// Publishes a directory to a branch of a git repository.
#[derive(Debug, Clone)]
pub struct GhPages {
    options: DeployOptions,
    root: PathBuf,
    output: PathBuf,
}

impl GhPages {
    pub fn new(options: DeployOptions, paths: &RootedPaths) -> Self {
        Self {
            options,
            root: paths.root().to_path_buf(),
            output: paths.output().to_path_buf(),
        }
    }

    pub async fn publish(&self) -> Result<PublishReport, DeployError> {
        let opts = &self.options;
        if !self.output.is_dir() {
            return Err(DeployError::MissingOutput(self.output.clone()));
        }

        let repo = self.repo_url().await?;
        let clone_dir = self.root.join(&opts.cache_dir).join(slug(&repo));
        let git = self.prepare_clone(&repo, &clone_dir).await?;

        let remote_branch = format!("refs/remotes/{}/{}", opts.remote, opts.branch);
        if git
            .check(&["rev-parse", "--verify", "--quiet", &remote_branch])
            .await?
        {
            git.run(&["checkout", &opts.branch]).await?;
            git.run(&["reset", "--hard", &format!("{}/{}", opts.remote, opts.branch)])
                .await?;
        } else {
            tracing::info!("branch {} does not exist yet, creating it", opts.branch);
            git.run(&["checkout", "--orphan", &opts.branch]).await?;
        }

        git.run(&["rm", "--ignore-unmatch", "-r", "-f", "-q", "."]).await?;

        let (source, target, dotfiles) = (self.output.clone(), clone_dir.clone(), opts.dotfiles);
        let files = tokio::task::spawn_blocking(move || copy_tree(&source, &target, dotfiles)).await??;
        tracing::debug!("copied {} file(s) into {}", files, clone_dir.display());

        if let Some(user) = &opts.user {
            git.run(&["config", "user.name", &user.name]).await?;
            git.run(&["config", "user.email", &user.email]).await?;
        }

        git.run(&["add", "--all"]).await?;
        let unchanged = git.check(&["diff-index", "--quiet", "HEAD"]).await?;
        if unchanged {
            tracing::info!("no changes to publish");
        } else {
            git.run(&["commit", "-m", &opts.message]).await?;
        }
        git.run(&["push", "--tags", &opts.remote, &opts.branch]).await?;

        Ok(PublishReport {
            repo,
            remote: opts.remote.clone(),
            branch: opts.branch.clone(),
            clone_dir,
            files,
            committed: !unchanged,
        })
    }

    async fn repo_url(&self) -> Result<String, DeployError> {
        if let Some(repo) = &self.options.repo {
            return Ok(repo.clone());
        }
        let key = format!("remote.{}.url", self.options.remote);
        match Git::new(&self.root).run(&["config", "--get", &key]).await {
            Ok(url) if !url.is_empty() => Ok(url),
            Ok(_) | Err(DeployError::Command { .. }) => Err(DeployError::NoRepository {
                remote: self.options.remote.clone(),
            }),
            Err(err) => Err(err),
        }
    }

    /// Reuse the cached clone when there is one, otherwise clone afresh.
    async fn prepare_clone(&self, repo: &str, clone_dir: &Path) -> Result<Git, DeployError> {
        let opts = &self.options;
        let git = Git::new(clone_dir);

        if clone_dir.join(".git").is_dir() {
            tracing::debug!("reusing clone in {}", clone_dir.display());
            git.run(&["clean", "-f", "-d"]).await?;
            git.run(&["fetch", &opts.remote]).await?;
            return Ok(git);
        }

        let parent = clone_dir.parent().unwrap_or(&self.root);
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DeployError::io(parent, e))?;
        let target = clone_dir.to_string_lossy();
        let outside = Git::new(parent);

        let single = outside
            .run(&[
                "clone",
                repo,
                &target,
                "--branch",
                &opts.branch,
                "--single-branch",
                "--origin",
                &opts.remote,
                "--depth",
                "1",
            ])
            .await;
        if let Err(err) = single {
            // Usually the branch does not exist yet; fall back to a full clone.
            tracing::debug!("single-branch clone failed: {}", err);
            remove_partial_clone(clone_dir).await?;
            outside
                .run(&["clone", repo, &target, "--origin", &opts.remote])
                .await?;
        }
        Ok(git)
    }
}

async fn remove_partial_clone(dir: &Path) -> Result<(), DeployError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DeployError::io(dir, e)),
    }
}

/// Directory name for a repository URL: every run of characters that is not
/// ASCII alphanumeric becomes `-`.
fn slug(repo: &str) -> String {
    let mut out = String::with_capacity(repo.len());
    for c in repo.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Copy every file under `source` into `target`. Returns the file count.
fn copy_tree(source: &Path, target: &Path, dotfiles: bool) -> Result<usize, DeployError> {
    let mut files = 0;
    let walker = WalkDir::new(source).min_depth(1).into_iter().filter_entry(|entry| {
        let name = entry.file_name();
        name != ".git" && (dotfiles || !is_hidden(name))
    });

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            DeployError::io(path, e.into())
        })?;
        let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let dest = target.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest).map_err(|e| DeployError::io(&dest, e))?;
        } else {
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent).map_err(|e| DeployError::io(parent, e))?;
            }
            std::fs::copy(entry.path(), &dest).map_err(|e| DeployError::io(&dest, e))?;
            files += 1;
        }
    }
    Ok(files)
}

/// Publishes the output root with the configured deploy options.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeployStep;

#[async_trait]
impl Task for DeployStep {
    fn name(&self) -> &'static str {
        "deploy"
    }

    async fn run(&self, ctx: &BuildContext) -> crate::Result<StepReport> {
        let publisher = GhPages::new(ctx.config().deploy.clone(), ctx.paths());
        let published = publisher.publish().await?;
        tracing::info!(
            branch = %published.branch,
            remote = %published.remote,
            committed = published.committed,
            "published {} file(s) to {}",
            published.files,
            published.repo
        );

        let mut report = StepReport::new(self.name());
        report.outputs.push(published.clone_dir);
        Ok(report)
    }
}
