use futures::future::BoxFuture;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Owns the client's background tasks: the frame reader of the live
/// connection and the single pending reconnect timer.
#[derive(Default)]
pub struct TaskManager {
    reader: Option<JoinHandle<()>>,
    reconnect: Option<JoinHandle<()>>,
}

impl TaskManager {
    /// Create a new empty task manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the reader for a new connection, aborting the previous one
    pub fn spawn_reader<F>(&mut self, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.abort_reader();
        self.reader = Some(tokio::spawn(future));
    }

    pub fn abort_reader(&mut self) {
        if let Some(handle) = self.reader.take() {
            handle.abort();
        }
    }

    /// Run `task` after `delay`, replacing any timer still pending
    pub fn schedule_reconnect(&mut self, delay: Duration, task: BoxFuture<'static, ()>) {
        self.cancel_reconnect();
        self.reconnect = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Forget the timer handle without aborting it; called by the timer task itself once it fires
    pub fn release_reconnect(&mut self) {
        self.reconnect = None;
    }

    /// Abort the pending reconnect timer. Returns whether one was pending.
    pub fn cancel_reconnect(&mut self) -> bool {
        match self.reconnect.take() {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                pending
            }
            None => false,
        }
    }

    pub fn has_pending_reconnect(&self) -> bool {
        self.reconnect
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Abort all tasks without waiting
    pub fn abort_all(&mut self) {
        self.cancel_reconnect();
        self.abort_reader();
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        self.abort_all();
    }
}
