//! Shared setup for commands: resolving the project root, loading the
//! configuration and turning step reports into summary rows.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use spout_config::{ConfigLoader, SiteConfig};
use spout_pipeline::{BuildContext, StepReport};

use crate::cli::GlobalArgs;
use crate::error::{Result, ResultExt};
use crate::notifier::DesktopNotifier;
use crate::ui::StepSummary;

/// Resolve a path relative to a working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// A project root and its loaded configuration.
///
/// Commands may adjust `config` from their own flags; [`Session::context`]
/// then freezes it for the pipeline.
#[derive(Debug, Clone)]
pub struct Session {
    pub root: PathBuf,
    pub config: SiteConfig,
    pub notify: bool,
}

impl Session {
    /// Resolve `--cwd` and load `spout.toml` (or `--config`).
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let root = match &global.cwd {
            Some(dir) => resolve_path(dir, &cwd),
            None => cwd.clone(),
        };
        let root = std::fs::canonicalize(&root).with_path(&root)?;

        let mut loader = ConfigLoader::new(&root);
        if let Some(file) = &global.config {
            loader = loader.with_file(resolve_path(file, &cwd));
        }
        let config = loader.load()?;
        tracing::debug!("project root {}", root.display());

        Ok(Self {
            root,
            config,
            notify: !global.no_notify,
        })
    }

    /// Check the configuration again after command-line overrides.
    pub fn revalidate(&self) -> Result<()> {
        self.config.validate()?;
        Ok(())
    }

    pub fn context(&self) -> BuildContext {
        let ctx = BuildContext::new(&self.root, Arc::new(self.config.clone()));
        if self.notify {
            ctx.with_notifier(Arc::new(DesktopNotifier::new()))
        } else {
            ctx
        }
    }
}

/// One summary row per report. Only regular files count towards the totals.
pub fn summarize(reports: &[StepReport]) -> Vec<StepSummary> {
    reports
        .iter()
        .map(|report| {
            let sizes: Vec<u64> = report
                .outputs
                .iter()
                .filter_map(|path| std::fs::metadata(path).ok())
                .filter(|meta| meta.is_file())
                .map(|meta| meta.len())
                .collect();
            StepSummary {
                step: report.step.to_string(),
                files: sizes.len(),
                bytes: sizes.iter().sum(),
                duration: report.duration,
                notices: report.notices.len(),
            }
        })
        .collect()
}

/// Total number of skipped files across all steps.
pub fn notice_count(reports: &[StepReport]) -> usize {
    reports.iter().map(|r| r.notices.len()).sum()
}
