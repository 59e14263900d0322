use super::{ClientState, ConnectionManager, RealtimeClient};
use crate::messaging::{MessageRouter, SubscriptionRegistry};
use crate::services::{
    CacheInvalidator, MemoryTokenStore, NoopCacheInvalidator, Notifier, TokenStore,
    TracingNotifier,
};
use crate::types::{
    DEFAULT_ENDPOINT, DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_PAGE_ORIGIN,
    DEFAULT_RECONNECT_INTERVAL, DEFAULT_TOKEN_KEY, RealtimeError, Result,
};
use crate::websocket::{Connector, WebSocketFactory};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use url::Url;

/// Environment variable prefix read by [`RealtimeClientOptions::from_env`]
pub const ENV_PREFIX: &str = "SHOP_REALTIME_";

#[derive(Debug, Clone)]
pub struct RealtimeClientOptions {
    /// Shop (tenant) the event stream is scoped to
    pub shop_id: u64,
    /// Endpoint name, the `{endpoint}` in `/ws/{endpoint}/{shop_id}/`
    pub endpoint: String,
    /// Origin of the hosting page; its scheme picks `ws` or `wss`
    pub page_origin: String,
    /// Backend `host:port` used instead of the page host in local development
    pub dev_backend_host: Option<String>,
    /// Reconnect automatically after the connection drops
    pub reconnect: bool,
    /// Base reconnect delay in milliseconds
    pub reconnect_interval_ms: u64,
    /// Consecutive reconnect attempts before giving up
    pub max_reconnect_attempts: u32,
    /// Token store key holding the auth token
    pub token_key: String,
}

impl Default for RealtimeClientOptions {
    fn default() -> Self {
        Self {
            shop_id: 0,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_origin: DEFAULT_PAGE_ORIGIN.to_string(),
            dev_backend_host: None,
            reconnect: true,
            reconnect_interval_ms: DEFAULT_RECONNECT_INTERVAL,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            token_key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }
}

impl RealtimeClientOptions {
    pub fn for_shop(shop_id: u64) -> Self {
        Self {
            shop_id,
            ..Default::default()
        }
    }

    /// Loads options from `SHOP_REALTIME_*` environment variables.
    ///
    /// Unset variables keep their default; `SHOP_REALTIME_SHOP_ID` is required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));
        let mut options = Self::default();

        let shop_id = var("SHOP_ID")
            .ok_or_else(|| RealtimeError::Config(format!("{}SHOP_ID is not set", ENV_PREFIX)))?;
        options.shop_id = parse_var("SHOP_ID", &shop_id)?;

        if let Some(endpoint) = var("ENDPOINT") {
            options.endpoint = endpoint;
        }
        if let Some(origin) = var("PAGE_ORIGIN") {
            options.page_origin = origin;
        }
        options.dev_backend_host = var("DEV_BACKEND_HOST").filter(|host| !host.is_empty());
        if let Some(reconnect) = var("RECONNECT") {
            options.reconnect = parse_var("RECONNECT", &reconnect)?;
        }
        if let Some(interval) = var("RECONNECT_INTERVAL_MS") {
            options.reconnect_interval_ms = parse_var("RECONNECT_INTERVAL_MS", &interval)?;
        }
        if let Some(max) = var("MAX_RECONNECT_ATTEMPTS") {
            options.max_reconnect_attempts = parse_var("MAX_RECONNECT_ATTEMPTS", &max)?;
        }
        if let Some(key) = var("TOKEN_KEY") {
            options.token_key = key;
        }

        Ok(options)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.shop_id == 0 {
            return Err(RealtimeError::Config("shop id is required".to_string()));
        }
        if self.endpoint.trim_matches('/').is_empty() {
            return Err(RealtimeError::Config("endpoint name is required".to_string()));
        }
        if self.reconnect_interval_ms == 0 {
            return Err(RealtimeError::Config(
                "reconnect interval must be positive".to_string(),
            ));
        }
        if self.token_key.is_empty() {
            return Err(RealtimeError::Config("token key is required".to_string()));
        }
        Url::parse(&self.page_origin)?;
        if let Some(host) = self.dev_backend_host.as_deref() {
            validate_backend_host(host)?;
        }
        Ok(())
    }
}

/// A backend override is a bare `host[:port]`; schemes and paths are rejected
fn validate_backend_host(host: &str) -> Result<()> {
    let invalid = |why: &str| {
        RealtimeError::Config(format!("invalid dev backend host '{}': {}", host, why))
    };

    if host.contains("://") {
        return Err(invalid("expected host[:port] without a scheme"));
    }
    let parsed = Url::parse(&format!("ws://{}/", host.trim_end_matches('/')))
        .map_err(|e| invalid(&e.to_string()))?;
    if parsed.host_str().is_none_or(str::is_empty) || parsed.path() != "/" {
        return Err(invalid("expected host[:port]"));
    }
    Ok(())
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| {
        RealtimeError::Config(format!("invalid {}{}='{}': {}", ENV_PREFIX, name, raw, e))
    })
}

/// Builder for RealtimeClient; the place collaborators are injected
pub struct RealtimeClientBuilder {
    options: RealtimeClientOptions,
    connector: Arc<dyn Connector>,
    token_store: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    cache: Arc<dyn CacheInvalidator>,
}

impl RealtimeClientBuilder {
    /// Create a new builder
    pub fn new(options: RealtimeClientOptions) -> Result<Self> {
        options.validate()?;

        Ok(Self {
            options,
            connector: Arc::new(WebSocketFactory),
            token_store: Arc::new(MemoryTokenStore::new()),
            notifier: Arc::new(TracingNotifier),
            cache: Arc::new(NoopCacheInvalidator),
        })
    }

    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn token_store(mut self, token_store: Arc<dyn TokenStore>) -> Self {
        self.token_store = token_store;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn cache_invalidator(mut self, cache: Arc<dyn CacheInvalidator>) -> Self {
        self.cache = cache;
        self
    }

    /// Build the client. Nothing connects until [`RealtimeClient::connect`].
    pub fn build(self) -> RealtimeClient {
        let client_state = ClientState::new(
            self.options.reconnect_interval(),
            self.options.max_reconnect_attempts,
        );
        let status_rx = client_state.status_receiver();

        let registry = SubscriptionRegistry::new();
        let router = MessageRouter::new(registry.clone(), Arc::clone(&self.notifier), self.cache);

        tracing::debug!("Built realtime client for shop {}", self.options.shop_id);

        RealtimeClient {
            options: self.options,
            connector: self.connector,
            token_store: self.token_store,
            notifier: self.notifier,
            registry,
            router: Arc::new(router),
            connection: Arc::new(ConnectionManager::new()),
            state: Arc::new(RwLock::new(client_state)),
            status_rx,
        }
    }
}
