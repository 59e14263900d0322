/// Slice of cached server state that an event makes stale
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheScope {
    /// Order lists
    Orders,
    /// A single order by id
    Order(i64),
    /// Dashboard counters and widgets
    Dashboard,
    /// Task lists
    Tasks,
}

impl std::fmt::Display for CacheScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Orders => write!(f, "orders"),
            Self::Order(id) => write!(f, "orders/{}", id),
            Self::Dashboard => write!(f, "dashboard"),
            Self::Tasks => write!(f, "tasks"),
        }
    }
}

/// Refreshes cached query state when the server reports a change
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, scope: CacheScope);
}

/// Invalidator for consumers that keep no cache
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCacheInvalidator;

impl CacheInvalidator for NoopCacheInvalidator {
    fn invalidate(&self, scope: CacheScope) {
        tracing::trace!("Ignoring invalidation of {}", scope);
    }
}
