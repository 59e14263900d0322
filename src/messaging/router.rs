use super::{ShopEvent, SubscriptionRegistry};
use crate::services::{CacheInvalidator, CacheScope, NotificationLevel, Notifier};
use crate::types::message::{InboundMessage, OutboundMessage};
use serde_json::Value;
use std::sync::Arc;

/// What happened to one inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// Frame was not valid JSON or lacked a `type`
    Dropped,
    /// Frame must be answered immediately; nothing was dispatched
    Reply(OutboundMessage),
    /// Built-in effects ran and `delivered` subscribers were invoked
    Dispatched { event: ShopEvent, delivered: usize },
}

/// Routes incoming frames to built-in effects and the subscription registry
pub struct MessageRouter {
    registry: SubscriptionRegistry,
    notifier: Arc<dyn Notifier>,
    cache: Arc<dyn CacheInvalidator>,
}

impl MessageRouter {
    pub fn new(
        registry: SubscriptionRegistry,
        notifier: Arc<dyn Notifier>,
        cache: Arc<dyn CacheInvalidator>,
    ) -> Self {
        Self {
            registry,
            notifier,
            cache,
        }
    }

    /// Routes one raw text frame
    pub fn route(&self, raw: &str) -> Routed {
        let message = match InboundMessage::parse(raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!("Dropping malformed frame: {} - Raw: {}", e, raw);
                return Routed::Dropped;
            }
        };

        if message.event == ShopEvent::Ping {
            tracing::trace!("Received ping, replying with pong");
            return Routed::Reply(OutboundMessage::pong());
        }

        self.apply_effects(&message);

        let delivered = self.registry.dispatch(&message.event, &message.data);
        tracing::debug!(
            "Routed event {} to {} subscriber(s)",
            message.event,
            delivered
        );

        Routed::Dispatched {
            event: message.event,
            delivered,
        }
    }

    /// Built-in reaction to known event types
    fn apply_effects(&self, message: &InboundMessage) {
        let data = &message.data;

        match message.event {
            ShopEvent::Connection => {
                tracing::debug!(
                    "Server acknowledged connection (status={})",
                    message.status.as_deref().unwrap_or("unknown")
                );
            }
            ShopEvent::OrderCreated => {
                self.cache.invalidate(CacheScope::Orders);
                self.cache.invalidate(CacheScope::Dashboard);

                let text = match order_label(data) {
                    Some(label) => format!("New order {}", label),
                    None => "New order received".to_string(),
                };
                self.notifier.notify(NotificationLevel::Info, &text);
            }
            ShopEvent::OrderUpdated => {
                self.cache.invalidate(CacheScope::Orders);
                if let Some(id) = order_id(data) {
                    self.cache.invalidate(CacheScope::Order(id));
                }
            }
            ShopEvent::StatusChanged => {
                self.cache.invalidate(CacheScope::Orders);
                if let Some(id) = order_id(data) {
                    self.cache.invalidate(CacheScope::Order(id));
                }

                let label = order_label(data).unwrap_or_else(|| "order".to_string());
                let text = match status(data) {
                    Some(status) => format!("Order {} status changed to {}", label, status),
                    None => format!("Order {} status changed", label),
                };
                self.notifier.notify(NotificationLevel::Info, &text);
            }
            ShopEvent::TaskAssigned => {
                self.cache.invalidate(CacheScope::Tasks);

                let text = match data.get("title").and_then(Value::as_str) {
                    Some(title) => format!("New task assigned: {}", title),
                    None => "New task assigned".to_string(),
                };
                self.notifier.notify(NotificationLevel::Info, &text);
            }
            ShopEvent::Ping | ShopEvent::Pong | ShopEvent::Custom(_) => {}
        }
    }
}

fn order_id(data: &Value) -> Option<i64> {
    data.get("id")
        .or_else(|| data.get("order_id"))
        .and_then(Value::as_i64)
}

fn order_label(data: &Value) -> Option<String> {
    match data.get("order_number") {
        Some(Value::String(number)) => Some(format!("#{}", number)),
        Some(Value::Number(number)) => Some(format!("#{}", number)),
        _ => order_id(data).map(|id| format!("#{}", id)),
    }
}

fn status(data: &Value) -> Option<&str> {
    data.get("new_status")
        .or_else(|| data.get("status"))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingNotifier(Mutex<Vec<(NotificationLevel, String)>>);

    impl Notifier for RecordingNotifier {
        fn notify(&self, level: NotificationLevel, message: &str) {
            self.0.lock().unwrap().push((level, message.to_string()));
        }
    }

    #[derive(Default)]
    struct RecordingCache(Mutex<Vec<CacheScope>>);

    impl CacheInvalidator for RecordingCache {
        fn invalidate(&self, scope: CacheScope) {
            self.0.lock().unwrap().push(scope);
        }
    }

    fn router() -> (
        MessageRouter,
        SubscriptionRegistry,
        Arc<RecordingNotifier>,
        Arc<RecordingCache>,
    ) {
        let registry = SubscriptionRegistry::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let cache = Arc::new(RecordingCache::default());
        let router = MessageRouter::new(registry.clone(), notifier.clone(), cache.clone());
        (router, registry, notifier, cache)
    }

    #[test]
    fn test_ping_replies_pong_without_dispatch() {
        let (router, registry, notifier, _) = router();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);
        let _sub = registry.subscribe(ShopEvent::Ping, move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        let routed = router.route(r#"{"type":"ping"}"#);

        assert_eq!(routed, Routed::Reply(OutboundMessage::pong()));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(notifier.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_frame_is_dropped() {
        let (router, _, notifier, cache) = router();
        assert_eq!(router.route("{not json"), Routed::Dropped);
        assert_eq!(router.route(r#"{"data":{"id":1}}"#), Routed::Dropped);
        assert!(notifier.0.lock().unwrap().is_empty());
        assert!(cache.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_order_created_invalidates_and_notifies() {
        let (router, registry, notifier, cache) = router();
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = Arc::clone(&seen);
        let _sub = registry.subscribe(ShopEvent::OrderCreated, move |data| {
            *seen_clone.lock().unwrap() = Some(data.clone());
        });

        let routed =
            router.route(r#"{"type":"order_created","data":{"id":12,"order_number":"A-12"}}"#);

        assert_eq!(
            routed,
            Routed::Dispatched {
                event: ShopEvent::OrderCreated,
                delivered: 1
            }
        );
        assert_eq!(
            *cache.0.lock().unwrap(),
            vec![CacheScope::Orders, CacheScope::Dashboard]
        );
        assert_eq!(
            *notifier.0.lock().unwrap(),
            vec![(NotificationLevel::Info, "New order #A-12".to_string())]
        );
        assert_eq!(
            *seen.lock().unwrap(),
            Some(json!({"id": 12, "order_number": "A-12"}))
        );
    }

    #[test]
    fn test_order_updated_refreshes_single_order_silently() {
        let (router, _, notifier, cache) = router();
        router.route(r#"{"type":"order_updated","data":{"order_id":5}}"#);

        assert_eq!(
            *cache.0.lock().unwrap(),
            vec![CacheScope::Orders, CacheScope::Order(5)]
        );
        assert!(notifier.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_status_changed_message() {
        let (router, _, notifier, cache) = router();
        router.route(r#"{"type":"status_changed","data":{"id":9,"new_status":"delivered"}}"#);

        assert_eq!(
            *cache.0.lock().unwrap(),
            vec![CacheScope::Orders, CacheScope::Order(9)]
        );
        assert_eq!(
            notifier.0.lock().unwrap()[0].1,
            "Order #9 status changed to delivered"
        );
    }

    #[test]
    fn test_task_assigned_without_title() {
        let (router, _, notifier, cache) = router();
        router.route(r#"{"type":"task_assigned","data":{}}"#);

        assert_eq!(*cache.0.lock().unwrap(), vec![CacheScope::Tasks]);
        assert_eq!(notifier.0.lock().unwrap()[0].1, "New task assigned");
    }

    #[test]
    fn test_unknown_type_skips_effects_but_reaches_subscribers() {
        let (router, registry, notifier, cache) = router();
        let _sub = registry.subscribe("bouquet_ready", |_| {});

        let routed = router.route(r#"{"type":"bouquet_ready","data":{"id":3}}"#);

        assert_eq!(
            routed,
            Routed::Dispatched {
                event: ShopEvent::Custom("bouquet_ready".into()),
                delivered: 1
            }
        );
        assert!(notifier.0.lock().unwrap().is_empty());
        assert!(cache.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_connection_handshake_has_no_effects() {
        let (router, _, notifier, cache) = router();
        let routed = router.route(r#"{"type":"connection","status":"connected"}"#);

        assert_eq!(
            routed,
            Routed::Dispatched {
                event: ShopEvent::Connection,
                delivered: 0
            }
        );
        assert!(notifier.0.lock().unwrap().is_empty());
        assert!(cache.0.lock().unwrap().is_empty());
    }
}
