//! Cache module - typed, bounded, TTL-backed caching on Moka.
//!
//! Each cache in the layer is a [`TypedCache`] created by a
//! [`CacheProvider`] from a [`CacheOptions`] description. Caches are
//! size-bounded, expire entries after a per-entry TTL, optionally stripe
//! entries across independently managed buckets, and carry the name of the
//! cluster event their invalidations travel on.
//!
//! Values are stored and returned as owned clones, so a caller mutating a
//! value it got back can never corrupt cached state.

mod config;
mod provider;
mod typed;

pub use config::CacheOptions;
pub use provider::CacheProvider;
pub use typed::TypedCache;

use thiserror::Error;

/// Errors surfaced by cache operations.
///
/// A miss is the sentinel [`CacheError::KeyNotFound`]; anything else is a
/// backend failure the decorator absorbs: treated as a miss on reads,
/// logged and skipped on writes. Cache errors never reach callers of the
/// layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    /// The key is absent or its entry has expired.
    #[error("key not found")]
    KeyNotFound,
    /// The cache backend rejected the operation.
    #[error("cache backend error: {0}")]
    Backend(String),
}
