use super::ShopEvent;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use uuid::Uuid;

/// Subscriber callback, invoked with the `data` of each matching message
pub type Callback = Arc<dyn Fn(&Value) + Send + Sync + 'static>;

/// Identifies one registration inside its event bucket
pub type SubscriptionId = Uuid;

type Buckets = HashMap<String, Vec<(SubscriptionId, Callback)>>;

fn lock(buckets: &Mutex<Buckets>) -> MutexGuard<'_, Buckets> {
    // A panicking subscriber never runs while the lock is held, so the map is intact
    buckets.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Event-type keyed pub/sub registry shared by every consumer of a client.
///
/// Buckets are created on first subscribe and removed as soon as their last
/// subscriber leaves. Dispatch works on a snapshot, so callbacks may
/// subscribe or unsubscribe (themselves or others) while being invoked.
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    buckets: Arc<Mutex<Buckets>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` under `event` and returns its handle
    pub fn subscribe<F>(&self, event: impl Into<ShopEvent>, callback: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let event: ShopEvent = event.into();
        let id = Uuid::new_v4();

        lock(&self.buckets)
            .entry(event.as_str().to_string())
            .or_default()
            .push((id, Arc::new(callback)));

        tracing::debug!("Subscribed {} to '{}'", id, event);

        Subscription {
            event,
            id,
            buckets: Arc::downgrade(&self.buckets),
        }
    }

    /// Delivers `data` to every subscriber of `event`, returning how many were invoked.
    ///
    /// A panicking callback is logged and skipped; the remaining subscribers
    /// still run and the caller keeps going.
    pub fn dispatch(&self, event: &ShopEvent, data: &Value) -> usize {
        let snapshot: Vec<Callback> = {
            let buckets = lock(&self.buckets);
            match buckets.get(event.as_str()) {
                Some(subscribers) => subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
                None => return 0,
            }
        };

        for callback in &snapshot {
            if catch_unwind(AssertUnwindSafe(|| callback(data))).is_err() {
                tracing::error!("Subscriber for '{}' panicked", event);
            }
        }
        snapshot.len()
    }

    /// Number of live subscribers for `event` (0 when the bucket does not exist)
    pub fn subscriber_count(&self, event: impl Into<ShopEvent>) -> usize {
        let event: ShopEvent = event.into();
        lock(&self.buckets)
            .get(event.as_str())
            .map_or(0, Vec::len)
    }

    /// Event types that currently have at least one subscriber
    pub fn event_types(&self) -> Vec<String> {
        lock(&self.buckets).keys().cloned().collect()
    }

    fn remove(buckets: &Mutex<Buckets>, event: &ShopEvent, id: SubscriptionId) -> bool {
        let mut buckets = lock(buckets);
        let Some(subscribers) = buckets.get_mut(event.as_str()) else {
            return false;
        };

        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        let removed = subscribers.len() != before;

        if subscribers.is_empty() {
            buckets.remove(event.as_str());
        }
        removed
    }
}

/// Handle returned by [`SubscriptionRegistry::subscribe`].
///
/// Dropping the handle keeps the callback registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
#[derive(Debug)]
pub struct Subscription {
    event: ShopEvent,
    id: SubscriptionId,
    buckets: Weak<Mutex<Buckets>>,
}

impl Subscription {
    pub fn event(&self) -> &ShopEvent {
        &self.event
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes exactly this callback. Returns `false` if the registry is gone.
    pub fn unsubscribe(self) -> bool {
        let Some(buckets) = self.buckets.upgrade() else {
            return false;
        };
        let removed = SubscriptionRegistry::remove(&buckets, &self.event, self.id);
        if removed {
            tracing::debug!("Unsubscribed {} from '{}'", self.id, self.event);
        }
        removed
    }
}
