use super::{
    ClientState, ConnectionManager, ConnectionState, ConnectionStatus, RealtimeClientBuilder,
    RealtimeClientOptions, build_endpoint_url,
};
use crate::messaging::{MessageRouter, Routed, ShopEvent, Subscription, SubscriptionRegistry};
use crate::services::{NotificationLevel, Notifier, TokenStore};
use crate::types::{RealtimeError, Result};
use crate::websocket::{Connector, Frame, FrameSink, FrameStream};
use futures::future::BoxFuture;
use futures::{FutureExt, SinkExt};
use futures::stream::StreamExt;
use serde::Serialize;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use url::Url;

const CONNECTED_MESSAGE: &str = "Connected to real-time updates";
const CONNECTION_LOST_MESSAGE: &str = "Real-time connection lost, reconnecting";
const CONNECTION_ERROR_MESSAGE: &str = "Real-time connection error";
const EXHAUSTED_MESSAGE: &str = "Real-time updates disabled: could not reconnect";

/// Realtime notification client for one shop.
///
/// `RealtimeClient` keeps one WebSocket open to the shop's event stream,
/// reconnects with exponential backoff when it drops, runs the built-in
/// effects for order and task events, and fans every event out to
/// subscribers registered by type.
///
/// The client is a cheap `Clone` handle. Build it once at the composition
/// root and hand clones to whatever needs the connection status or the
/// pub/sub registry.
///
/// # Example
///
/// ```no_run
/// use shop_realtime_rs::{RealtimeClient, RealtimeClientOptions, ShopEvent};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RealtimeClient::new(RealtimeClientOptions {
///     page_origin: "https://crm.example.com".to_string(),
///     ..RealtimeClientOptions::for_shop(42)
/// })?;
///
/// let subscription = client.subscribe(ShopEvent::OrderCreated, |data| {
///     println!("new order: {}", data);
/// });
///
/// client.connect().await?;
/// // ...
/// subscription.unsubscribe();
/// client.disconnect().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RealtimeClient {
    pub(crate) options: RealtimeClientOptions,

    // Injected collaborators
    pub(crate) connector: Arc<dyn Connector>,
    pub(crate) token_store: Arc<dyn TokenStore>,
    pub(crate) notifier: Arc<dyn Notifier>,

    pub(crate) registry: SubscriptionRegistry,
    pub(crate) router: Arc<MessageRouter>,

    // Connection manager
    pub(crate) connection: Arc<ConnectionManager>,

    // Consolidated mutable state
    pub(crate) state: Arc<RwLock<ClientState>>,
    pub(crate) status_rx: watch::Receiver<ConnectionStatus>,
}

impl RealtimeClient {
    /// Creates a client with the default collaborators (tungstenite
    /// transport, in-memory token store, tracing notifier, no cache).
    ///
    /// Use [`RealtimeClient::builder`] to inject your own.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::Config`] or [`RealtimeError::UrlParse`] when
    /// the options do not validate.
    pub fn new(options: RealtimeClientOptions) -> Result<Self> {
        RealtimeClientBuilder::new(options).map(|builder| builder.build())
    }

    pub fn builder(options: RealtimeClientOptions) -> Result<RealtimeClientBuilder> {
        RealtimeClientBuilder::new(options)
    }

    /// Opens the connection.
    ///
    /// Resolves once the handshake has succeeded or failed. A failed
    /// handshake is returned to the caller and also starts the reconnect
    /// cycle, exactly like a dropped connection. Calling `connect` while
    /// already connecting or connected does nothing.
    ///
    /// A manual `connect` clears a previous manual disconnect and restarts
    /// the reconnect budget.
    ///
    /// # Errors
    ///
    /// Returns the handshake error, or a URL error if the endpoint cannot be
    /// built.
    pub async fn connect(&self) -> Result<()> {
        self.start_attempt(true).await
    }

    /// Closes the connection and cancels any pending reconnect.
    ///
    /// Safe to call repeatedly and in any state. Events still in flight from
    /// the closed connection are discarded.
    pub async fn disconnect(&self) {
        let mut state = self.state.write().await;
        state.was_manual_disconnect = true;
        state.next_generation();

        if state.task_manager.cancel_reconnect() {
            tracing::info!("Cancelled pending reconnect");
        }
        state.task_manager.abort_reader();

        if let Err(e) = self.connection.close().await {
            tracing::warn!("Error while closing connection: {}", e);
        }
        state.publish(ConnectionState::Closed);
        drop(state);

        tracing::info!("Disconnected from shop {} event stream", self.options.shop_id);
    }

    /// Sends `payload` as a JSON text frame.
    ///
    /// When the connection is not open the payload is dropped and `Ok(())`
    /// is returned; nothing is queued.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload does not serialize or the socket
    /// write fails.
    pub async fn send<T>(&self, payload: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        if !self.connection.is_connected().await {
            tracing::debug!("Not connected, dropping outbound message");
            return Ok(());
        }

        let json = serde_json::to_string(payload)?;
        self.connection.send_text(json).await
    }

    /// Registers `callback` for every message of type `event`.
    ///
    /// The returned [`Subscription`] removes exactly this callback when
    /// [`unsubscribe`](Subscription::unsubscribe) is called.
    pub fn subscribe<F>(&self, event: impl Into<ShopEvent>, callback: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.registry.subscribe(event, callback)
    }

    pub fn subscriber_count(&self, event: impl Into<ShopEvent>) -> usize {
        self.registry.subscriber_count(event)
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// Watch channel that yields every status transition
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    pub fn current_status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.connection.state().await
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.is_connected().await
    }

    /// Whether a reconnect timer is waiting to fire
    pub async fn has_pending_reconnect(&self) -> bool {
        self.state.read().await.task_manager.has_pending_reconnect()
    }

    pub fn options(&self) -> &RealtimeClientOptions {
        &self.options
    }

    /// Endpoint URL for the next attempt, token included when stored
    pub fn endpoint_url(&self) -> Result<Url> {
        let token = match self.token_store.get(&self.options.token_key) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Could not read auth token, connecting without it: {}", e);
                None
            }
        };
        build_endpoint_url(&self.options, token.as_deref())
    }

    async fn start_attempt(&self, manual: bool) -> Result<()> {
        let generation = {
            let mut state = self.state.write().await;

            let current = self.connection.state().await;
            if current == ConnectionState::Open || current == ConnectionState::Connecting {
                return Ok(());
            }

            if manual {
                state.was_manual_disconnect = false;
                state.exhausted = false;
                state.backoff.reset();
            } else if state.was_manual_disconnect {
                tracing::info!("Manual disconnect detected, will not attempt to reconnect");
                return Ok(());
            }

            let generation = state.next_generation();
            self.connection.set_state(ConnectionState::Connecting).await;
            state.publish(ConnectionState::Connecting);
            generation
        };

        let url = match self.endpoint_url() {
            Ok(url) => url,
            Err(e) => {
                self.handle_error(generation, &e).await;
                self.handle_close(generation).await;
                return Err(e);
            }
        };
        tracing::info!(
            "Connecting to {}://{}{}",
            url.scheme(),
            url.host_str().unwrap_or_default(),
            url.path()
        );

        match self.connector.connect(url.into()).await {
            Ok((sink, stream)) => {
                self.handle_open(generation, sink, stream).await;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Connection attempt failed: {}", e);
                self.handle_error(generation, &e).await;
                self.handle_close(generation).await;
                Err(e)
            }
        }
    }

    async fn handle_open(&self, generation: u64, mut sink: FrameSink, stream: FrameStream) {
        let mut state = self.state.write().await;
        if !state.is_current(generation) {
            drop(state);
            tracing::debug!("Discarding connection from superseded attempt {}", generation);
            if let Err(e) = sink.close().await {
                tracing::debug!("Closing superseded connection failed: {}", e);
            }
            return;
        }

        self.connection.set_writer(sink).await;
        self.connection.set_state(ConnectionState::Open).await;
        state.backoff.reset();
        state.exhausted = false;

        let reader = self.clone();
        let watchdog = self.clone();
        state.task_manager.spawn_reader(async move {
            let outcome = AssertUnwindSafe(reader.read_loop(generation, stream))
                .catch_unwind()
                .await;
            if outcome.is_err() {
                tracing::error!("Read task for attempt {} panicked", generation);
                watchdog.handle_close(generation).await;
            }
        });
        state.publish(ConnectionState::Open);
        drop(state);

        tracing::info!("Connected to shop {} event stream", self.options.shop_id);
        self.notifier.notify(NotificationLevel::Success, CONNECTED_MESSAGE);
    }

    async fn read_loop(self, generation: u64, mut stream: FrameStream) {
        tracing::debug!("Starting read task for attempt {}", generation);

        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Frame::Text(text)) => self.handle_message(generation, &text).await,
                Ok(Frame::Close { code, reason }) => {
                    tracing::warn!(
                        "Server closed connection: code={:?}, reason='{}'",
                        code,
                        reason
                    );
                    self.handle_close(generation).await;
                    return;
                }
                Ok(Frame::Ignored(kind)) => {
                    tracing::debug!("Ignoring {} frame", kind);
                }
                Err(e) => {
                    tracing::error!("WebSocket read error: {}", e);
                    self.handle_error(generation, &e).await;
                    self.handle_close(generation).await;
                    return;
                }
            }
        }

        tracing::warn!("Server closed connection without close frame");
        self.handle_close(generation).await;
    }

    /// Routing happens under the state read guard, so once `disconnect`
    /// returns no subscriber sees another event from this connection.
    async fn handle_message(&self, generation: u64, text: &str) {
        let state = self.state.read().await;
        if !state.is_current(generation) {
            tracing::debug!("Ignoring frame from superseded attempt {}", generation);
            return;
        }
        let routed = self.router.route(text);
        drop(state);

        if let Routed::Reply(reply) = routed {
            if let Err(e) = self.send(&reply).await {
                tracing::warn!("Failed to send {} reply: {}", reply.event, e);
            }
        }
    }

    async fn handle_error(&self, generation: u64, error: &RealtimeError) {
        let state = self.state.read().await;
        if !state.is_current(generation) {
            return;
        }
        self.connection.set_state(ConnectionState::Error).await;
        state.publish(ConnectionState::Error);
        drop(state);

        tracing::debug!("Connection error on attempt {}: {}", generation, error);
        self.notifier.notify(NotificationLevel::Error, CONNECTION_ERROR_MESSAGE);
    }

    async fn handle_close(&self, generation: u64) {
        let mut state = self.state.write().await;
        if !state.is_current(generation) {
            tracing::debug!("Ignoring close from superseded attempt {}", generation);
            return;
        }

        let was_open = self.connection.clear_writer().await;
        self.connection.set_state(ConnectionState::Closed).await;

        let mut notice = was_open.then_some((NotificationLevel::Warning, CONNECTION_LOST_MESSAGE));

        if self.options.reconnect && !state.was_manual_disconnect {
            match state.backoff.next_delay() {
                Some(delay) => {
                    tracing::info!(
                        "Reconnecting in {:?} (attempt {}/{})",
                        delay,
                        state.backoff.attempts(),
                        state.backoff.max_attempts()
                    );
                    let task = self.clone().reconnect_task(generation);
                    state.task_manager.schedule_reconnect(delay, task);
                }
                None => {
                    if !state.exhausted {
                        state.exhausted = true;
                        tracing::error!(
                            "Giving up after {} reconnect attempts",
                            state.backoff.attempts()
                        );
                        notice = Some((NotificationLevel::Warning, EXHAUSTED_MESSAGE));
                    }
                }
            }
        }

        state.publish(ConnectionState::Closed);
        drop(state);

        if let Some((level, message)) = notice {
            self.notifier.notify(level, message);
        }
    }

    /// Body of the reconnect timer. Boxed so the connect/close/reconnect
    /// cycle does not make an infinitely sized future type.
    fn reconnect_task(self, scheduled_by: u64) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            {
                let mut state = self.state.write().await;
                state.task_manager.release_reconnect();
                if !state.is_current(scheduled_by) || state.was_manual_disconnect {
                    return;
                }
            }

            tracing::info!("Attempting to reconnect...");
            if let Err(e) = self.start_attempt(false).await {
                tracing::warn!("Reconnection attempt failed: {}", e);
            }
        })
    }
}
