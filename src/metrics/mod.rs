//! Cache metrics - hit/miss/invalidation counters per cache name.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

/// Sink for the layer's cache counters.
///
/// Implementations must be cheap: these are called on every decorated
/// read. Counters only; latency belongs to the base store's own
/// instrumentation.
pub trait MetricsSink: Send + Sync {
    fn cache_hit(&self, name: &str);
    fn cache_miss(&self, name: &str);
    fn cache_invalidation(&self, name: &str);
}

/// Sink that drops everything. The default when no metrics backend is
/// wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn cache_hit(&self, _name: &str) {}
    fn cache_miss(&self, _name: &str) {}
    fn cache_invalidation(&self, _name: &str) {}
}

/// Per-cache counters for one kind of event.
#[derive(Default)]
struct Counters(DashMap<String, AtomicU64>);

impl Counters {
    fn increment(&self, name: &str) {
        self.0
            .entry(name.to_string())
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    fn get(&self, name: &str) -> u64 {
        self.0
            .get(name)
            .map(|counter| counter.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

/// In-memory counter sink, readable for export and assertions.
#[derive(Default)]
pub struct CounterMetrics {
    hits: Counters,
    misses: Counters,
    invalidations: Counters,
}

impl CounterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self, name: &str) -> u64 {
        self.hits.get(name)
    }

    pub fn misses(&self, name: &str) -> u64 {
        self.misses.get(name)
    }

    pub fn invalidations(&self, name: &str) -> u64 {
        self.invalidations.get(name)
    }
}

impl MetricsSink for CounterMetrics {
    fn cache_hit(&self, name: &str) {
        self.hits.increment(name);
    }

    fn cache_miss(&self, name: &str) {
        self.misses.increment(name);
    }

    fn cache_invalidation(&self, name: &str) {
        self.invalidations.increment(name);
    }
}
