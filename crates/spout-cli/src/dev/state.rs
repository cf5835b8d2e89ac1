//! Shared state for the development server: the last build outcome and the
//! connected reload clients.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::dev::DevEvent;

/// Events buffered per client before new ones are dropped for it.
const CLIENT_BUFFER: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    NotStarted,
    InProgress { started_at: Instant },
    Success { duration_ms: u64 },
    Failed { error: String },
}

impl BuildStatus {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, BuildStatus::InProgress { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            BuildStatus::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Senders for every connected SSE client, by id.
pub type ClientRegistry = Arc<RwLock<HashMap<usize, mpsc::Sender<String>>>>;

pub struct DevServerState {
    status: RwLock<BuildStatus>,
    clients: ClientRegistry,
    next_client_id: RwLock<usize>,
}

impl DevServerState {
    pub fn new() -> Self {
        Self {
            status: RwLock::new(BuildStatus::NotStarted),
            clients: Arc::new(RwLock::new(HashMap::new())),
            next_client_id: RwLock::new(0),
        }
    }

    pub fn start_build(&self) {
        *self.status.write() = BuildStatus::InProgress {
            started_at: Instant::now(),
        };
    }

    pub fn complete_build(&self, duration_ms: u64) {
        *self.status.write() = BuildStatus::Success { duration_ms };
    }

    pub fn fail_build(&self, error: String) {
        *self.status.write() = BuildStatus::Failed { error };
    }

    pub fn status(&self) -> BuildStatus {
        self.status.read().clone()
    }

    /// Register a new SSE client, returning its id and event receiver.
    pub fn register_client(&self) -> (usize, mpsc::Receiver<String>) {
        let id = {
            let mut next_id = self.next_client_id.write();
            let id = *next_id;
            *next_id += 1;
            id
        };

        let (tx, rx) = mpsc::channel(CLIENT_BUFFER);
        self.clients.write().insert(id, tx);
        (id, rx)
    }

    pub fn unregister_client(&self, id: usize) {
        self.clients.write().remove(&id);
    }

    /// Send an event to every client without waiting on any of them.
    ///
    /// Clients whose connection is gone are dropped; a client that is not
    /// keeping up misses the event. Returns how many clients received it.
    pub fn broadcast(&self, event: &DevEvent) -> usize {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!("failed to serialize dev event: {}", err);
                return 0;
            }
        };

        let clients = self.clients.read().clone();
        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, tx) in clients {
            match tx.try_send(json.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::debug!("client {} is lagging, event dropped", id);
                }
                Err(TrySendError::Closed(_)) => closed.push(id),
            }
        }

        for id in closed {
            self.unregister_client(id);
        }
        delivered
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }
}

impl Default for DevServerState {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedState = Arc<DevServerState>;
