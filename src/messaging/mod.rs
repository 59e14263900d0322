// Messaging module - Event tags, subscription registry and inbound routing
pub mod event;
pub mod registry;
pub mod router;

pub use event::ShopEvent;
pub use registry::{Callback, Subscription, SubscriptionId, SubscriptionRegistry};
pub use router::{MessageRouter, Routed};
