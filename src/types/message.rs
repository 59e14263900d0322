use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ShopEvent;

/// Envelope of every frame the server pushes: `{"type": ..., "data": {...}}`.
///
/// Only the `type` tag is required. `ping` carries no data and the
/// `connection` handshake carries a top-level `status` instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub event: ShopEvent,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl InboundMessage {
    pub fn new(event: impl Into<ShopEvent>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
            status: None,
        }
    }

    /// Parses a raw text frame
    pub fn parse(raw: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Client-to-server message. `data` is omitted from the wire when null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboundMessage {
    #[serde(rename = "type")]
    pub event: ShopEvent,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl OutboundMessage {
    pub fn new(event: impl Into<ShopEvent>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Keep-alive reply to a server `ping`
    pub fn pong() -> Self {
        Self::new(ShopEvent::Pong, Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_known_event() {
        let message =
            InboundMessage::parse(r#"{"type":"order_created","data":{"id":7}}"#).unwrap();
        assert_eq!(message.event, ShopEvent::OrderCreated);
        assert_eq!(message.data, json!({"id": 7}));
        assert_eq!(message.status, None);
    }

    #[test]
    fn test_parse_ping_without_data() {
        let message = InboundMessage::parse(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(message.event, ShopEvent::Ping);
        assert_eq!(message.data, Value::Null);
    }

    #[test]
    fn test_parse_connection_handshake() {
        let message =
            InboundMessage::parse(r#"{"type":"connection","status":"connected"}"#).unwrap();
        assert_eq!(message.event, ShopEvent::Connection);
        assert_eq!(message.status.as_deref(), Some("connected"));
    }

    #[test]
    fn test_parse_unknown_event_is_custom() {
        let message = InboundMessage::parse(r#"{"type":"stock_low","data":{"sku":"ROSE"}}"#)
            .unwrap();
        assert_eq!(message.event, ShopEvent::Custom("stock_low".to_string()));
    }

    #[test]
    fn test_parse_rejects_malformed_frames() {
        assert!(InboundMessage::parse("not json").is_err());
        assert!(InboundMessage::parse(r#"{"data":{}}"#).is_err());
        assert!(InboundMessage::parse("[1,2,3]").is_err());
    }

    #[test]
    fn test_pong_serialization_omits_data() {
        let json = serde_json::to_string(&OutboundMessage::pong()).unwrap();
        assert_eq!(json, r#"{"type":"pong"}"#);
    }

    #[test]
    fn test_outbound_with_data() {
        let message = OutboundMessage::new("mark_read", json!({"id": 3}));
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value, json!({"type": "mark_read", "data": {"id": 3}}));
    }
}
