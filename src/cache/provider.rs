//! Cache provider - factory for the layer's caches.

use std::collections::HashSet;

use parking_lot::Mutex;
use tracing::debug;

use super::{CacheError, CacheOptions, TypedCache};

/// Factory producing [`TypedCache`] instances.
///
/// Names are unique per provider; building two caches with the same name
/// is a wiring bug and is rejected so metrics stay unambiguous.
#[derive(Default)]
pub struct CacheProvider {
    names: Mutex<HashSet<&'static str>>,
}

impl CacheProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache from `options`, registering its name.
    pub fn new_cache<T>(&self, options: &CacheOptions) -> Result<TypedCache<T>, CacheError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut names = self.names.lock();
        if !names.insert(options.name) {
            return Err(CacheError::Backend(format!(
                "duplicate cache name: {}",
                options.name
            )));
        }
        debug!(name = options.name, size = options.size, "creating cache");
        Ok(TypedCache::new(options))
    }

    /// Names of every cache built so far.
    pub fn cache_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.names.lock().iter().copied().collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for CacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheProvider")
            .field("caches", &self.cache_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_rejects_duplicate_names() {
        let provider = CacheProvider::new();
        let options = CacheOptions::new("dup", 10, Duration::from_secs(1));

        let first: Result<TypedCache<i64>, _> = provider.new_cache(&options);
        assert!(first.is_ok());

        let second: Result<TypedCache<i64>, _> = provider.new_cache(&options);
        assert!(matches!(second, Err(CacheError::Backend(_))));
    }

    #[test]
    fn test_tracks_names() {
        let provider = CacheProvider::new();
        let _a: TypedCache<i64> = provider
            .new_cache(&CacheOptions::new("b_cache", 10, Duration::from_secs(1)))
            .unwrap();
        let _b: TypedCache<String> = provider
            .new_cache(&CacheOptions::new("a_cache", 10, Duration::from_secs(1)))
            .unwrap();

        assert_eq!(provider.cache_names(), vec!["a_cache", "b_cache"]);
    }
}
