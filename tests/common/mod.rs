#![allow(dead_code)]

use futures::channel::mpsc::{UnboundedSender, unbounded};
use futures::future::BoxFuture;
use futures::Sink;
use shop_realtime_rs::services::{CacheInvalidator, CacheScope};
use shop_realtime_rs::{
    Connector, Frame, FrameSink, FrameStream, MemoryTokenStore, NotificationLevel, Notifier,
    RealtimeClient, RealtimeClientOptions, RealtimeError, Result,
};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::Instant;

/// Options used by most tests: 100ms base interval, 3 attempts
pub fn options() -> RealtimeClientOptions {
    RealtimeClientOptions {
        page_origin: "https://shop.example.com".to_string(),
        reconnect_interval_ms: 100,
        max_reconnect_attempts: 3,
        ..RealtimeClientOptions::for_shop(7)
    }
}

/// Lets spawned tasks drain without reaching any reconnect timer
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

pub struct Harness {
    pub client: RealtimeClient,
    pub notifier: Arc<RecordingNotifier>,
    pub cache: Arc<RecordingCache>,
    pub tokens: Arc<MemoryTokenStore>,
}

pub fn harness(options: RealtimeClientOptions, connector: &MockConnector) -> Harness {
    let notifier = Arc::new(RecordingNotifier::default());
    let cache = Arc::new(RecordingCache::default());
    let tokens = Arc::new(MemoryTokenStore::new());

    let client = RealtimeClient::builder(options)
        .expect("valid options")
        .connector(Arc::new(connector.clone()))
        .notifier(notifier.clone())
        .cache_invalidator(cache.clone())
        .token_store(tokens.clone())
        .build();

    Harness {
        client,
        notifier,
        cache,
        tokens,
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(NotificationLevel, String)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(NotificationLevel, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn count(&self, level: NotificationLevel) -> usize {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingCache {
    scopes: Mutex<Vec<CacheScope>>,
}

impl RecordingCache {
    pub fn scopes(&self) -> Vec<CacheScope> {
        self.scopes.lock().unwrap().clone()
    }
}

impl CacheInvalidator for RecordingCache {
    fn invalidate(&self, scope: CacheScope) {
        self.scopes.lock().unwrap().push(scope);
    }
}

/// Write half double: records every frame and whether it was closed
struct RecordingSink {
    writes: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl Sink<String> for RecordingSink {
    type Error = RealtimeError;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn start_send(self: Pin<&mut Self>, item: String) -> Result<()> {
        self.writes.lock().unwrap().push(item);
        Ok(())
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.closed.store(true, Ordering::SeqCst);
        Poll::Ready(Ok(()))
    }
}

/// Server side of one accepted mock connection
pub struct MockServer {
    inbound: UnboundedSender<Result<Frame>>,
    writes: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl MockServer {
    pub fn push_text(&self, text: &str) {
        self.inbound
            .unbounded_send(Ok(Frame::Text(text.to_string())))
            .expect("client reader is gone");
    }

    pub fn push_close(&self) {
        self.inbound
            .unbounded_send(Ok(Frame::Close {
                code: Some(1001),
                reason: "going away".to_string(),
            }))
            .expect("client reader is gone");
    }

    pub fn push_error(&self) {
        self.inbound
            .unbounded_send(Err(RealtimeError::Connection("reset by peer".to_string())))
            .expect("client reader is gone");
    }

    /// Frames the client wrote, in order
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    /// Whether the client closed its write half
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct Attempt {
    pub at: Instant,
    pub url: String,
}

struct ConnectorState {
    script: VecDeque<bool>,
    default_accept: bool,
    handshake_delay: Duration,
    attempts: Vec<Attempt>,
    servers: VecDeque<MockServer>,
}

/// Scripted transport double. Each attempt pops the next accept/refuse
/// decision from the script and falls back to the default when it is empty.
#[derive(Clone)]
pub struct MockConnector {
    state: Arc<Mutex<ConnectorState>>,
}

impl MockConnector {
    fn with_default(default_accept: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(ConnectorState {
                script: VecDeque::new(),
                default_accept,
                handshake_delay: Duration::ZERO,
                attempts: Vec::new(),
                servers: VecDeque::new(),
            })),
        }
    }

    pub fn accepting() -> Self {
        Self::with_default(true)
    }

    pub fn refusing() -> Self {
        Self::with_default(false)
    }

    pub fn scripted(script: &[bool], default_accept: bool) -> Self {
        let connector = Self::with_default(default_accept);
        connector.state.lock().unwrap().script = script.iter().copied().collect();
        connector
    }

    pub fn with_handshake_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().handshake_delay = delay;
        self
    }

    pub fn set_default_accept(&self, accept: bool) {
        self.state.lock().unwrap().default_accept = accept;
    }

    pub fn attempts(&self) -> Vec<Attempt> {
        self.state.lock().unwrap().attempts.clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.state.lock().unwrap().attempts.len()
    }

    /// Oldest accepted connection not yet handed to the test
    pub fn take_server(&self) -> Option<MockServer> {
        self.state.lock().unwrap().servers.pop_front()
    }
}

impl Connector for MockConnector {
    fn connect(&self, url: String) -> BoxFuture<'static, Result<(FrameSink, FrameStream)>> {
        let mut state = self.state.lock().unwrap();
        state.attempts.push(Attempt {
            at: Instant::now(),
            url,
        });

        let accept = state.script.pop_front().unwrap_or(state.default_accept);
        let delay = state.handshake_delay;

        let halves = if accept {
            let (inbound_tx, inbound_rx) = unbounded::<Result<Frame>>();
            let writes = Arc::new(Mutex::new(Vec::new()));
            let closed = Arc::new(AtomicBool::new(false));

            state.servers.push_back(MockServer {
                inbound: inbound_tx,
                writes: Arc::clone(&writes),
                closed: Arc::clone(&closed),
            });

            let sink: FrameSink = Box::pin(RecordingSink { writes, closed });
            let stream: FrameStream = Box::pin(inbound_rx);
            Some((sink, stream))
        } else {
            None
        };

        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            halves.ok_or_else(|| RealtimeError::Connection("connection refused".to_string()))
        })
    }
}
