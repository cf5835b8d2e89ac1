//! Recoverable per-file failures and how they reach the user.

use std::path::PathBuf;

/// A file that produced no output, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNotice {
    pub step: &'static str,
    pub path: PathBuf,
    pub message: String,
}

impl std::fmt::Display for FileNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Receives notices as soon as a step produces them.
///
/// Implementations must not block for long; they run on the build's async
/// tasks.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &FileNotice);
}

/// Default notifier: an error-level log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &FileNotice) {
        tracing::error!(step = notice.step, "{}", notice);
    }
}
