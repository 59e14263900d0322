// WebSocket module - Transport seam between the client and the socket library
mod factory;

pub use factory::WebSocketFactory;

use crate::types::{RealtimeError, Result};
use futures::future::BoxFuture;
use futures::{Sink, Stream};
use std::pin::Pin;

/// One inbound frame, reduced to what the client acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Close { code: Option<u16>, reason: String },
    /// Binary and control frames; carries a description for logging
    Ignored(String),
}

/// Write half of a connection; accepts serialized JSON text
pub type FrameSink = Pin<Box<dyn Sink<String, Error = RealtimeError> + Send>>;

/// Read half of a connection
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Frame>> + Send>>;

/// Opens connections for the client. Swapped for a double in tests.
pub trait Connector: Send + Sync {
    fn connect(&self, url: String) -> BoxFuture<'static, Result<(FrameSink, FrameStream)>>;
}
