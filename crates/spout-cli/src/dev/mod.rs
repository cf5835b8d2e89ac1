//! Development server: static serving of the output tree, a reload channel
//! over Server-Sent Events, and the source watcher that drives rebuilds.

pub mod server;
pub mod state;
pub mod watcher;

pub use server::DevServer;
pub use state::{BuildStatus, DevServerState, SharedState};
pub use watcher::{next_batch, FileChange, FileWatcher};

use serde::{Deserialize, Serialize};

/// Events pushed to connected browsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DevEvent {
    BuildStarted,

    /// Clients reload on this event.
    BuildCompleted { duration_ms: u64 },

    BuildFailed { error: String },

    ClientConnected { id: usize },
}
