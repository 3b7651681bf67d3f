//! Cache configuration.

use std::time::Duration;

/// Configuration for one cache instance.
///
/// `name` and `cluster_event` are fixed for the cache's lifetime; the
/// provider rejects duplicate names.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Maximum number of live entries.
    pub size: u64,

    /// Identifier used in metrics and logs.
    pub name: &'static str,

    /// TTL applied on `set` unless overridden with `set_with_expiry`.
    pub default_expiry: Duration,

    /// Partition entries into independently managed buckets by key hash.
    /// Only worth it for high-contention caches (roles, user profiles).
    pub striped: bool,

    /// Bucket count when `striped` is set.
    pub striped_buckets: usize,

    /// Cluster event carrying this cache's invalidations. `None` means the
    /// cache is only ever invalidated locally.
    pub cluster_event: Option<&'static str>,

    /// Allow predicate-based removal (`remove_by_predicate`). Costs a
    /// little on every read, so it is opt-in.
    pub invalidation_closures: bool,
}

impl CacheOptions {
    /// Create options with the given name, size and default TTL.
    pub fn new(name: &'static str, size: u64, default_expiry: Duration) -> Self {
        Self {
            size,
            name,
            default_expiry,
            striped: false,
            striped_buckets: 0,
            cluster_event: None,
            invalidation_closures: false,
        }
    }

    /// Stripe the cache across `buckets` shards.
    #[must_use]
    pub fn striped(mut self, buckets: usize) -> Self {
        self.striped = true;
        self.striped_buckets = buckets;
        self
    }

    /// Associate the cache with a cluster invalidation event.
    #[must_use]
    pub fn cluster_event(mut self, event: &'static str) -> Self {
        self.cluster_event = Some(event);
        self
    }

    /// Enable predicate-based removal.
    #[must_use]
    pub fn invalidation_closures(mut self) -> Self {
        self.invalidation_closures = true;
        self
    }
}
