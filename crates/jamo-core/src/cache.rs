//! Bounded least-recently-used cache for service responses.
//!
//! Keys are built with [`cache_key`] so translation and correction entries
//! never collide. There is no expiry; eviction is purely capacity-driven.

use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::trace;

/// `"{operation}_{param1}_{param2}_{text}"`, case-sensitive.
pub fn cache_key(operation: &str, param1: &str, param2: &str, text: &str) -> String {
    format!("{operation}_{param1}_{param2}_{text}")
}

/// Hit/miss counters since construction or the last `clear()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

pub struct ResponseCache {
    entries: LruCache<String, String>,
    stats: CacheStats,
}

impl ResponseCache {
    /// A capacity of zero is clamped to one.
    pub fn new(max_items: usize) -> Self {
        let cap = NonZeroUsize::new(max_items).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    /// Look up a key, refreshing its recency on hit.
    pub fn get(&mut self, key: &str) -> Option<String> {
        match self.entries.get(key) {
            Some(value) => {
                self.stats.hits += 1;
                Some(value.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Insert or refresh a key. Evicts the least-recently-used entry when full.
    pub fn set(&mut self, key: String, value: String) {
        if let Some((evicted, _)) = self.entries.push(key.clone(), value) {
            if evicted != key {
                trace!(%evicted, "cache evict");
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Hit rate as a percentage, `None` before the first lookup.
    pub fn hit_rate(&self) -> Option<f32> {
        let total = self.stats.hits + self.stats.misses;
        if total == 0 {
            return None;
        }
        Some(self.stats.hits as f32 * 100.0 / total as f32)
    }
}
