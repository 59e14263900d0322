// Services module - Collaborators the client consumes as injected trait objects
pub mod cache;
pub mod notifier;
pub mod token_store;

pub use cache::{CacheInvalidator, CacheScope, NoopCacheInvalidator};
pub use notifier::{NotificationLevel, Notifier, TracingNotifier};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
