//! Strata - Decorating Local-Cache Layer
//!
//! A read-through cache layer that sits between the application and the
//! authoritative store of a multi-tenant messaging platform. Replicas in a
//! cluster are kept coherent with best-effort invalidation messages.
//!
//! ## Architecture
//!
//! - `model` - Entity types (channels, users, roles, emoji, posts, ...)
//! - `cache` - LRU/TTL caching with Moka, typed per cache
//! - `cluster` - Best-effort invalidation bus and event names
//! - `metrics` - Hit/miss/invalidation counters
//! - `store` - Base-store traits the layer decorates
//! - `localcache` - The decorator itself, one module per sub-store
//!
//! The layer presents the same [`store::Store`] interface as the base store;
//! callers never know they are talking to a cache.

pub mod cache;
pub mod cluster;
pub mod localcache;
pub mod metrics;
pub mod model;
pub mod store;

pub use cache::{CacheError, CacheOptions, CacheProvider, TypedCache};
pub use cluster::{ClusterBus, ClusterMessage, LoopbackBus, SendType};
pub use localcache::LocalCacheLayer;
pub use metrics::{CounterMetrics, MetricsSink, NoopMetrics};
pub use store::{RequestContext, Store, StoreError, StoreResult};
