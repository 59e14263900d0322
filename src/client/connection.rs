use crate::types::error::Result;
use crate::websocket::FrameSink;
use futures::SinkExt;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    Error,
}

/// Snapshot published to status watchers on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    /// Reconnect attempts made since the last successful open
    pub attempts: u32,
    /// Reconnection gave up; stays set until the next manual connect or open
    pub exhausted: bool,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            state: ConnectionState::Closed,
            attempts: 0,
            exhausted: false,
        }
    }
}

/// Owns the write half of the live connection and its state
pub struct ConnectionManager {
    writer: Mutex<Option<FrameSink>>,
    state: RwLock<ConnectionState>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            writer: Mutex::new(None),
            state: RwLock::new(ConnectionState::Closed),
        }
    }

    /// Sets the write sink (called after a successful handshake)
    pub async fn set_writer(&self, writer: FrameSink) {
        *self.writer.lock().await = Some(writer);
    }

    /// Gets the current connection state
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Sets the connection state
    pub async fn set_state(&self, new_state: ConnectionState) {
        *self.state.write().await = new_state;
    }

    /// Checks if currently connected
    pub async fn is_connected(&self) -> bool {
        *self.state.read().await == ConnectionState::Open
    }

    /// Writes one text frame. Without a writer this is a no-op.
    pub async fn send_text(&self, text: String) -> Result<()> {
        let mut writer = self.writer.lock().await;
        if let Some(sink) = writer.as_mut() {
            sink.send(text).await?;
        }
        Ok(())
    }

    /// Closes the connection if one is live and clears the handle
    pub async fn close(&self) -> Result<()> {
        let sink = self.writer.lock().await.take();
        self.set_state(ConnectionState::Closed).await;

        if let Some(mut sink) = sink {
            sink.close().await?;
        }
        Ok(())
    }

    /// Drops the writer without a close handshake (peer already went away).
    /// Returns whether a writer was live.
    pub async fn clear_writer(&self) -> bool {
        self.writer.lock().await.take().is_some()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
