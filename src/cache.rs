//! Path resolution caching.
//!
//! Every navigation resolves a path against the [`RouteTable`](crate::RouteTable)
//! to find its route name. [`ResolveCache`] keeps recent results in an LRU so
//! that back/forward through a long history does not re-walk the table.
//! Gated behind the `cache` feature.
//!
//! ```
//! use gpui_route_state::cache::ResolveCache;
//! use gpui_route_state::RouteTable;
//!
//! let table = RouteTable::new().route("events", "/events");
//! let mut cache = ResolveCache::new();
//!
//! assert_eq!(cache.resolve(&table, "/events").unwrap().name, "events");
//! assert_eq!(cache.resolve(&table, "/events").unwrap().name, "events");
//! assert_eq!(cache.stats().hits, 1);
//! assert_eq!(cache.stats().misses, 1);
//! ```

use crate::routes::{ResolvedRoute, RouteTable};
use crate::{debug_log, trace_log};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Hit/miss counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    /// Number of [`ResolveCache::clear`] calls.
    pub invalidations: usize,
}

impl CacheStats {
    /// Hit rate in `0.0..=1.0`, `0.0` before any lookup.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU of path → resolution result. Misses (`None`) are cached too.
#[derive(Debug)]
pub struct ResolveCache {
    entries: LruCache<String, Option<ResolvedRoute>>,
    stats: CacheStats,
}

impl ResolveCache {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
        Some(capacity) => capacity,
        None => unreachable!(),
    };

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Resolve through the cache. Only the path part of `path` is used as key.
    pub fn resolve(&mut self, table: &RouteTable, path: &str) -> Option<ResolvedRoute> {
        let key = path.split(['?', '#']).next().unwrap_or_default();
        if let Some(hit) = self.entries.get(key) {
            self.stats.hits += 1;
            trace_log!("Resolve cache hit for '{}'", key);
            return hit.clone();
        }

        self.stats.misses += 1;
        trace_log!("Resolve cache miss for '{}'", key);
        let resolved = table.resolve(key);
        self.entries.put(key.to_string(), resolved.clone());
        resolved
    }

    /// Drop every entry. Call after the route table changes.
    pub fn clear(&mut self) {
        let len = self.entries.len();
        self.entries.clear();
        self.stats.invalidations += 1;
        debug_log!(
            "Resolve cache cleared: {} entries removed (hit rate {:.1}%)",
            len,
            self.stats.hit_rate() * 100.0
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl Default for ResolveCache {
    fn default() -> Self {
        Self::new()
    }
}
