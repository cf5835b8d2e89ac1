//! Source tree watcher.
//!
//! Raw `notify` events are filtered and forwarded over a channel; the watch
//! loop then pulls them in batches with [`next_batch`], so a burst of saves
//! becomes a single rebuild.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::{CliError, Result, ResultExt};

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Modified(PathBuf),
    Created(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    fn from_event(kind: &EventKind, path: PathBuf) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(FileChange::Created(path)),
            EventKind::Modify(_) => Some(FileChange::Modified(path)),
            EventKind::Remove(_) => Some(FileChange::Removed(path)),
            _ => None,
        }
    }
}

/// Watches a directory recursively until dropped.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    /// Start watching `root`.
    ///
    /// # Errors
    ///
    /// Fails when `root` does not exist or the platform watcher cannot be
    /// created.
    pub fn new(root: impl AsRef<Path>) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        let root = root.as_ref();
        let root = std::fs::canonicalize(root).with_path(root)?;
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let filter_root = root.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!("watch error: {}", err);
                    return;
                }
            };
            for path in event.paths {
                if should_ignore(&path, &filter_root) {
                    continue;
                }
                if let Some(change) = FileChange::from_event(&event.kind, path) {
                    // A full channel already guarantees a pending rebuild.
                    let _ = tx.try_send(change);
                }
            }
        })
        .map_err(CliError::Watch)?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(CliError::Watch)?;

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Paths outside the root, hidden files and editor backups (`file~`) are
/// not source changes.
fn should_ignore(path: &Path, root: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return true;
    };

    let hidden = relative.components().any(|component| {
        component
            .as_os_str()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
    });
    hidden || relative.to_string_lossy().ends_with('~')
}

/// Wait for the next change, then keep collecting until `window` passes with
/// no further event. Repeated changes to one path are kept once, in first-seen
/// order. Returns `None` once the watcher is gone.
pub async fn next_batch(
    rx: &mut mpsc::Receiver<FileChange>,
    window: Duration,
) -> Option<Vec<FileChange>> {
    let first = rx.recv().await?;
    let mut seen = HashSet::new();
    seen.insert(first.path().to_path_buf());
    let mut batch = vec![first];

    while let Ok(Some(change)) = tokio::time::timeout(window, rx.recv()).await {
        if seen.insert(change.path().to_path_buf()) {
            batch.push(change);
        }
    }
    Some(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_should_ignore_hidden_and_backups() {
        let root = PathBuf::from("/project/src");
        assert!(should_ignore(Path::new("/project/src/.git/index"), &root));
        assert!(should_ignore(Path::new("/project/src/sass/.main.scss.swp"), &root));
        assert!(should_ignore(Path::new("/project/src/js/app.js~"), &root));
        assert!(should_ignore(Path::new("/project/dist/app.js"), &root));
        assert!(!should_ignore(Path::new("/project/src/js/app.js"), &root));
    }

    #[tokio::test]
    async fn test_burst_becomes_one_batch() {
        let (tx, mut rx) = mpsc::channel(16);
        tx.send(FileChange::Modified("a.scss".into())).await.unwrap();
        tx.send(FileChange::Modified("a.scss".into())).await.unwrap();
        tx.send(FileChange::Created("b.js".into())).await.unwrap();

        let batch = next_batch(&mut rx, Duration::from_millis(50)).await.unwrap();
        assert_eq!(
            batch,
            [
                FileChange::Modified("a.scss".into()),
                FileChange::Created("b.js".into())
            ]
        );
    }

    #[tokio::test]
    async fn test_events_after_window_start_a_new_batch() {
        let (tx, mut rx) = mpsc::channel(16);
        tx.send(FileChange::Modified("a.scss".into())).await.unwrap();

        let sender = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            tx.send(FileChange::Removed("c.png".into())).await.unwrap();
        });

        let first = next_batch(&mut rx, Duration::from_millis(20)).await.unwrap();
        assert_eq!(first.len(), 1);
        let second = next_batch(&mut rx, Duration::from_millis(20)).await.unwrap();
        assert_eq!(second, [FileChange::Removed("c.png".into())]);

        sender.await.unwrap();
        assert!(next_batch(&mut rx, Duration::from_millis(20)).await.is_none());
    }

    #[test]
    fn test_missing_root_is_file_not_found() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("src");
        assert!(matches!(
            FileWatcher::new(&missing),
            Err(CliError::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reports_file_writes() {
        let dir = TempDir::new().unwrap();
        let (watcher, mut rx) = FileWatcher::new(dir.path()).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        std::fs::write(watcher.root().join("main.scss"), "a{}").unwrap();
        let batch = tokio::time::timeout(
            Duration::from_secs(5),
            next_batch(&mut rx, Duration::from_millis(100)),
        )
        .await
        .expect("no change reported")
        .unwrap();
        assert!(batch.iter().any(|c| c.path().ends_with("main.scss")));
    }
}
