/// Inbound/outbound event type strings (magic strings layer)
pub mod event_types {
    pub const PING: &str = "ping";
    pub const PONG: &str = "pong";
    pub const CONNECTION: &str = "connection";
    pub const ORDER_CREATED: &str = "order_created";
    pub const ORDER_UPDATED: &str = "order_updated";
    pub const STATUS_CHANGED: &str = "status_changed";
    pub const TASK_ASSIGNED: &str = "task_assigned";
}

/// Fixed path segment every realtime endpoint lives under
pub const WS_PATH_PREFIX: &str = "ws";

/// Default endpoint name (`/ws/notifications/{shop_id}/`)
pub const DEFAULT_ENDPOINT: &str = "notifications";

/// Query parameter carrying the auth token
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Token store key the auth token is saved under
pub const DEFAULT_TOKEN_KEY: &str = "access_token";

/// Origin assumed when none is configured
pub const DEFAULT_PAGE_ORIGIN: &str = "http://localhost:3000";

/// Default base reconnect interval (milliseconds)
pub const DEFAULT_RECONNECT_INTERVAL: u64 = 3000;

/// Default ceiling on consecutive reconnect attempts
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Growth factor applied per failed attempt
pub const RECONNECT_BACKOFF_FACTOR: f64 = 1.5;
