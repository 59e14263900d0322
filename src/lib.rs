//! # Shop Realtime
//!
//! Realtime notification client for the flower-shop CRM: one WebSocket per
//! shop, automatic reconnection with capped exponential backoff, built-in
//! cache invalidation and notifications for order and task events, and a
//! pub/sub registry keyed by event type.
//!
//! ## Example
//!
//! ```no_run
//! use shop_realtime_rs::{RealtimeClient, RealtimeClientOptions, ShopEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RealtimeClient::new(RealtimeClientOptions {
//!         page_origin: "https://crm.example.com".to_string(),
//!         ..RealtimeClientOptions::for_shop(42)
//!     })?;
//!
//!     let _orders = client.subscribe(ShopEvent::OrderCreated, |data| {
//!         println!("order created: {}", data);
//!     });
//!
//!     client.connect().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod infrastructure;
pub mod messaging;
pub mod services;
pub mod types;
pub mod websocket;

pub use client::{
    ConnectionState, ConnectionStatus, RealtimeClient, RealtimeClientBuilder,
    RealtimeClientOptions,
};
pub use messaging::{ShopEvent, Subscription, SubscriptionRegistry};
pub use services::{
    CacheInvalidator, CacheScope, FileTokenStore, MemoryTokenStore, NotificationLevel, Notifier,
    TokenStore, TracingNotifier,
};
pub use types::{InboundMessage, OutboundMessage, RealtimeError, Result};
pub use websocket::{Connector, Frame, FrameSink, FrameStream, WebSocketFactory};
