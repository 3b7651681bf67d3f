//! Typed cache wrapper around Moka.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::sync::Cache;

use super::{CacheError, CacheOptions};

/// Keys handed to a [`TypedCache::scan`] callback per batch.
const SCAN_BATCH_SIZE: usize = 100;

/// A stored value together with the TTL it was written with.
#[derive(Clone)]
struct Entry<T> {
    value: T,
    ttl: Duration,
}

/// Expiry policy that honors the TTL carried by each entry.
struct PerEntryExpiry;

impl<T> Expiry<String, Entry<T>> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry<T>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry<T>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// A typed cache that provides the layer's cache contract over Moka.
///
/// - Thread-safe; cloning is cheap and shares the underlying cache.
/// - Size-bounded with per-entry TTL.
/// - Optionally striped: entries are routed to one of N buckets by key
///   hash so hot caches spread their internal housekeeping.
/// - Values go in and come out as owned clones; every cached type owns its
///   data, which makes a clone a deep copy.
pub struct TypedCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    buckets: Arc<[Cache<String, Entry<T>>]>,
    name: &'static str,
    cluster_event: Option<&'static str>,
    default_expiry: Duration,
}

impl<T> Clone for TypedCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            buckets: Arc::clone(&self.buckets),
            name: self.name,
            cluster_event: self.cluster_event,
            default_expiry: self.default_expiry,
        }
    }
}

impl<T> TypedCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Build a cache from its options.
    pub fn new(options: &CacheOptions) -> Self {
        let bucket_count = if options.striped {
            options.striped_buckets.max(1)
        } else {
            1
        };
        // Per-bucket capacity, rounded up so the total still covers `size`.
        let capacity = options.size.div_ceil(bucket_count as u64);

        let buckets: Vec<Cache<String, Entry<T>>> = (0..bucket_count)
            .map(|_| {
                let mut builder = Cache::builder()
                    .max_capacity(capacity)
                    .expire_after(PerEntryExpiry);
                if options.invalidation_closures {
                    builder = builder.support_invalidation_closures();
                }
                builder.build()
            })
            .collect();

        Self {
            buckets: buckets.into(),
            name: options.name,
            cluster_event: options.cluster_event,
            default_expiry: options.default_expiry,
        }
    }

    /// The configured cache name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The cluster event this cache's invalidations travel on, if any.
    pub fn cluster_event(&self) -> Option<&'static str> {
        self.cluster_event
    }

    fn bucket(&self, key: &str) -> &Cache<String, Entry<T>> {
        if self.buckets.len() == 1 {
            return &self.buckets[0];
        }
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.buckets[(hasher.finish() % self.buckets.len() as u64) as usize]
    }

    /// Store `value` under `key` with the default TTL.
    pub fn set(&self, key: &str, value: T) -> Result<(), CacheError> {
        self.set_with_expiry(key, value, self.default_expiry)
    }

    /// Store `value` under `key`, expiring after `ttl`.
    pub fn set_with_expiry(&self, key: &str, value: T, ttl: Duration) -> Result<(), CacheError> {
        self.bucket(key).insert(key.to_string(), Entry { value, ttl });
        Ok(())
    }

    /// Fetch a deep copy of the value under `key`.
    ///
    /// Returns [`CacheError::KeyNotFound`] when the key is absent or its
    /// entry has expired.
    pub fn get(&self, key: &str) -> Result<T, CacheError> {
        self.bucket(key)
            .get(key)
            .map(|entry| entry.value)
            .ok_or(CacheError::KeyNotFound)
    }

    /// Fetch each key in `keys`, with a per-index result.
    pub fn multi_get(&self, keys: &[String]) -> Vec<Result<T, CacheError>> {
        keys.iter().map(|key| self.get(key)).collect()
    }

    /// Remove the entry under `key`. No-op when absent.
    pub fn remove(&self, key: &str) {
        self.bucket(key).invalidate(key);
    }

    /// Remove every entry whose key matches `predicate`.
    ///
    /// Requires the cache to be built with
    /// [`CacheOptions::invalidation_closures`]; otherwise the backend
    /// rejects the closure and callers fall back to [`TypedCache::purge`].
    pub fn remove_by_predicate<F>(&self, predicate: F) -> Result<(), CacheError>
    where
        F: Fn(&str) -> bool + Clone + Send + Sync + 'static,
    {
        for bucket in self.buckets.iter() {
            let pred = predicate.clone();
            bucket
                .invalidate_entries_if(move |key, _entry| pred(key))
                .map_err(|err| CacheError::Backend(err.to_string()))?;
        }
        Ok(())
    }

    /// Remove every entry.
    pub fn purge(&self) {
        for bucket in self.buckets.iter() {
            bucket.invalidate_all();
        }
    }

    /// The number of live entries.
    pub fn len(&self) -> usize {
        // Flush pending maintenance so evictions and expirations are
        // reflected in the count.
        self.buckets
            .iter()
            .map(|bucket| {
                bucket.run_pending_tasks();
                bucket.entry_count() as usize
            })
            .sum()
    }

    /// Whether the cache has no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate all live keys in batches, calling `f` per batch.
    ///
    /// Each batch is a coherent snapshot; writes interleaved with the scan
    /// may or may not appear in later batches. Stops at the first callback
    /// error.
    pub fn scan<E, F>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&[String]) -> Result<(), E>,
    {
        let mut batch = Vec::with_capacity(SCAN_BATCH_SIZE);
        for bucket in self.buckets.iter() {
            for (key, _entry) in bucket.iter() {
                batch.push(key.as_ref().clone());
                if batch.len() == SCAN_BATCH_SIZE {
                    f(&batch)?;
                    batch.clear();
                }
            }
        }
        if !batch.is_empty() {
            f(&batch)?;
        }
        Ok(())
    }
}

impl<T> std::fmt::Debug for TypedCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedCache")
            .field("name", &self.name)
            .field("buckets", &self.buckets.len())
            .field("cluster_event", &self.cluster_event)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(name: &'static str, size: u64) -> CacheOptions {
        CacheOptions::new(name, size, Duration::from_secs(60))
    }

    #[test]
    fn test_get_miss_is_key_not_found() {
        let cache: TypedCache<String> = TypedCache::new(&options("misses", 10));
        assert_eq!(cache.get("absent"), Err(CacheError::KeyNotFound));
    }

    #[test]
    fn test_set_then_get() {
        let cache: TypedCache<i64> = TypedCache::new(&options("counts", 10));
        cache.set("c1", 42).unwrap();
        assert_eq!(cache.get("c1"), Ok(42));
    }

    #[test]
    fn test_ttl_expiry() {
        let cache: TypedCache<i64> = TypedCache::new(&options("ttl", 10));
        cache
            .set_with_expiry("k", 7, Duration::from_millis(30))
            .unwrap();
        assert_eq!(cache.get("k"), Ok(7));

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(cache.get("k"), Err(CacheError::KeyNotFound));
    }

    #[test]
    fn test_size_bound() {
        let cache: TypedCache<usize> = TypedCache::new(&options("bounded", 5));
        for i in 0..6 {
            cache.set(&format!("k{i}"), i).unwrap();
        }
        assert!(cache.len() <= 5);
    }

    #[test]
    fn test_deep_copy_isolation() {
        let cache: TypedCache<Vec<String>> = TypedCache::new(&options("deep", 10));
        cache.set("k", vec!["a".to_string()]).unwrap();

        let mut copy = cache.get("k").unwrap();
        copy.push("mutated".to_string());

        assert_eq!(cache.get("k").unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn test_remove_and_purge() {
        let cache: TypedCache<i64> = TypedCache::new(&options("rm", 10));
        cache.set("a", 1).unwrap();
        cache.set("b", 2).unwrap();

        cache.remove("a");
        assert_eq!(cache.get("a"), Err(CacheError::KeyNotFound));
        assert_eq!(cache.get("b"), Ok(2));

        cache.purge();
        assert_eq!(cache.get("b"), Err(CacheError::KeyNotFound));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_striped_routing() {
        let cache: TypedCache<i64> =
            TypedCache::new(&options("striped", 100).striped(8));
        for i in 0..50 {
            cache.set(&format!("key-{i}"), i).unwrap();
        }
        for i in 0..50 {
            assert_eq!(cache.get(&format!("key-{i}")), Ok(i));
        }
        assert_eq!(cache.len(), 50);
    }

    #[test]
    fn test_multi_get_partial() {
        let cache: TypedCache<i64> = TypedCache::new(&options("multi", 10));
        cache.set("a", 1).unwrap();
        cache.set("c", 3).unwrap();

        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let results = cache.multi_get(&keys);
        assert_eq!(results[0], Ok(1));
        assert_eq!(results[1], Err(CacheError::KeyNotFound));
        assert_eq!(results[2], Ok(3));
    }

    #[test]
    fn test_scan_visits_all_keys() {
        let cache: TypedCache<i64> = TypedCache::new(&options("scan", 500));
        for i in 0..250 {
            cache.set(&format!("k{i}"), i).unwrap();
        }

        let mut seen = Vec::new();
        cache
            .scan(|batch| {
                assert!(batch.len() <= 100);
                seen.extend_from_slice(batch);
                Ok::<(), ()>(())
            })
            .unwrap();

        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 250);
    }

    #[test]
    fn test_scan_stops_on_error() {
        let cache: TypedCache<i64> = TypedCache::new(&options("scan_err", 500));
        for i in 0..250 {
            cache.set(&format!("k{i}"), i).unwrap();
        }

        let mut calls = 0;
        let result = cache.scan(|_batch| {
            calls += 1;
            Err("boom")
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_remove_by_predicate() {
        let cache: TypedCache<i64> =
            TypedCache::new(&options("pred", 10).invalidation_closures());
        cache.set("p1:u1", 1).unwrap();
        cache.set("p1:u2", 2).unwrap();
        cache.set("p2:u1", 3).unwrap();

        cache
            .remove_by_predicate(|key| key.starts_with("p1:"))
            .unwrap();

        assert_eq!(cache.get("p1:u1"), Err(CacheError::KeyNotFound));
        assert_eq!(cache.get("p1:u2"), Err(CacheError::KeyNotFound));
        assert_eq!(cache.get("p2:u1"), Ok(3));
    }

    #[test]
    fn test_remove_by_predicate_requires_closures() {
        let cache: TypedCache<i64> = TypedCache::new(&options("no_pred", 10));
        cache.set("a", 1).unwrap();

        let result = cache.remove_by_predicate(|_| true);
        assert!(matches!(result, Err(CacheError::Backend(_))));
        // Entry untouched; callers fall back to purge.
        assert_eq!(cache.get("a"), Ok(1));
    }
}
