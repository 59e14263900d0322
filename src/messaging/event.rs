use crate::types::constants::event_types;
use serde::{Deserialize, Serialize};

/// Type-safe event tags carried in the `type` field of every frame
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShopEvent {
    /// Server keep-alive probe, answered with `Pong`
    Ping,

    /// Client keep-alive reply
    Pong,

    /// Handshake acknowledgement sent right after the socket opens
    Connection,

    /// A new order was placed
    OrderCreated,

    /// An existing order was edited
    OrderUpdated,

    /// An order moved to a different status
    StatusChanged,

    /// A task was assigned to the current user
    TaskAssigned,

    /// Any other event type; no built-in effect, still delivered to subscribers
    Custom(String),
}

impl ShopEvent {
    /// Parse a string into a ShopEvent
    pub fn parse(s: &str) -> Self {
        match s {
            event_types::PING => Self::Ping,
            event_types::PONG => Self::Pong,
            event_types::CONNECTION => Self::Connection,
            event_types::ORDER_CREATED => Self::OrderCreated,
            event_types::ORDER_UPDATED => Self::OrderUpdated,
            event_types::STATUS_CHANGED => Self::StatusChanged,
            event_types::TASK_ASSIGNED => Self::TaskAssigned,
            _ => Self::Custom(s.to_string()),
        }
    }

    /// Convert event to string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ping => event_types::PING,
            Self::Pong => event_types::PONG,
            Self::Connection => event_types::CONNECTION,
            Self::OrderCreated => event_types::ORDER_CREATED,
            Self::OrderUpdated => event_types::ORDER_UPDATED,
            Self::StatusChanged => event_types::STATUS_CHANGED,
            Self::TaskAssigned => event_types::TASK_ASSIGNED,
            Self::Custom(s) => s,
        }
    }

    /// Whether the client runs a built-in effect for this event
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl From<&str> for ShopEvent {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for ShopEvent {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ShopEvent> for String {
    fn from(event: ShopEvent) -> Self {
        match event {
            ShopEvent::Custom(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ShopEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
