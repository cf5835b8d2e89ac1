//! Shared, read-only state handed to every task.

use std::path::PathBuf;
use std::sync::Arc;

use spout_config::{RootedPaths, SiteConfig};

use crate::notice::{LogNotifier, Notifier};

/// Everything a step may look at while it runs.
///
/// Cloning is cheap; the configuration is behind an `Arc` and is never
/// mutated once the context exists.
#[derive(Clone)]
pub struct BuildContext {
    config: Arc<SiteConfig>,
    paths: RootedPaths,
    notifier: Arc<dyn Notifier>,
}

impl BuildContext {
    /// Bind a configuration to a project root.
    pub fn new(root: impl Into<PathBuf>, config: Arc<SiteConfig>) -> Self {
        let paths = config.paths.rooted(&root.into());
        Self {
            config,
            paths,
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Replace the notifier used for recoverable per-file failures.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn paths(&self) -> &RootedPaths {
        &self.paths
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("root", &self.paths.root())
            .field("output", &self.paths.output())
            .finish_non_exhaustive()
    }
}
