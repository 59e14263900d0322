use super::connection::{ConnectionState, ConnectionStatus};
use crate::infrastructure::{Backoff, TaskManager};
use std::time::Duration;
use tokio::sync::watch;

/// Consolidated mutable state for RealtimeClient
/// Using a single struct keeps generation checks and the mutations they guard under one lock
pub struct ClientState {
    /// Bumped on every connection attempt and on disconnect; handlers of older
    /// generations are ignored
    pub generation: u64,

    /// Reconnect attempt counter and delay schedule
    pub backoff: Backoff,

    /// Reader and reconnect-timer tasks
    pub task_manager: TaskManager,

    /// Whether the disconnect was manual (prevents auto-reconnect)
    pub was_manual_disconnect: bool,

    /// Reconnect attempts ran out
    pub exhausted: bool,

    status_tx: watch::Sender<ConnectionStatus>,
}

impl ClientState {
    pub fn new(base_interval: Duration, max_attempts: u32) -> Self {
        let (status_tx, _) = watch::channel(ConnectionStatus::default());
        Self {
            generation: 0,
            backoff: Backoff::new(base_interval, max_attempts),
            task_manager: TaskManager::new(),
            was_manual_disconnect: false,
            exhausted: false,
            status_tx,
        }
    }

    /// Start a new connection attempt and return its generation
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn status_receiver(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    /// Notify status watchers
    pub fn publish(&self, state: ConnectionState) {
        let status = ConnectionStatus {
            state,
            attempts: self.backoff.attempts(),
            exhausted: self.exhausted,
        };
        self.status_tx.send_replace(status);
        tracing::trace!("Published status {:?}", status);
    }
}
