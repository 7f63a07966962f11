// Response cache - TTL-aware LRU memoization of RAG answers
// Author: kelexine (https://github.com/kelexine)

use crate::cache::models::{CacheConfig, CacheEntry, CacheKey, CacheStats};
use crate::metrics;
use crate::models::{RagConfig, RagMetrics};
use crate::utils::logging::preview;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tracing::debug;

struct Inner {
    entries: LruCache<CacheKey, CacheEntry>,
    hits: u64,
    misses: u64,
}

/// Bounded response cache keyed by normalized question and configuration.
///
/// Entries older than the TTL are dropped lazily on lookup; when full, an
/// insert of a new key evicts the least recently used entry. All mutation
/// happens under one lock so the hit/miss counters always add up to the
/// number of `get` calls.
pub struct ResponseCache {
    config: CacheConfig,
    inner: Mutex<Inner>,
}

impl ResponseCache {
    /// Create a new response cache
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            config: CacheConfig {
                max_size: capacity.get(),
                ..config
            },
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Look up a response. A hit increments the entry's hit count and marks
    /// it most recently used; an expired entry is removed and counts as a miss.
    pub fn get(&self, question: &str, config: Option<&RagConfig>) -> Option<CacheEntry> {
        let key = CacheKey::new(question, config);
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let fresh = inner
            .entries
            .peek(&key)
            .map(|entry| !entry.is_expired(self.config.ttl));

        match fresh {
            Some(true) => {
                inner.hits += 1;
                let entry = inner.entries.get_mut(&key)?;
                entry.hit_count += 1;
                debug!(
                    "[Cache HIT] Question: \"{}\" (hit count: {})",
                    preview(question, 50),
                    entry.hit_count
                );
                metrics::record_cache_hit();
                Some(entry.clone())
            }
            Some(false) => {
                inner.entries.pop(&key);
                inner.misses += 1;
                debug!("[Cache EXPIRED] Question: \"{}\"", preview(question, 50));
                metrics::record_cache_expired();
                metrics::record_cache_miss();
                metrics::update_cache_entries(inner.entries.len());
                None
            }
            None => {
                inner.misses += 1;
                debug!("[Cache MISS] Question: \"{}\"", preview(question, 50));
                metrics::record_cache_miss();
                None
            }
        }
    }

    /// Store a response, replacing any entry for the same key. Inserting a new
    /// key into a full cache evicts the least recently used entry first.
    pub fn set(
        &self,
        question: &str,
        response: String,
        query_metrics: RagMetrics,
        config: Option<&RagConfig>,
    ) {
        let key = CacheKey::new(question, config);
        let entry = CacheEntry::new(response, query_metrics);
        let mut inner = self.inner.lock();

        if let Some((displaced, _)) = inner.entries.push(key.clone(), entry) {
            // push hands back the old value for a replaced key too
            if displaced != key {
                debug!("[Cache EVICT] Removed least recently used entry");
                metrics::record_cache_eviction();
            }
        }

        debug!("[Cache SET] Cached response for: \"{}\"", preview(question, 50));
        metrics::record_cache_set();
        metrics::update_cache_entries(inner.entries.len());
    }

    /// `hits / (hits + misses)`, or 0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let inner = self.inner.lock();
        Self::rate(inner.hits, inner.misses)
    }

    fn rate(hits: u64, misses: u64) -> f64 {
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Remove all entries and reset the counters.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.hits = 0;
        inner.misses = 0;
        metrics::update_cache_entries(0);
        debug!("[Cache CLEAR] Cache cleared");
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            size: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
            hit_rate: Self::rate(inner.hits, inner.misses),
            max_size: self.config.max_size,
            ttl: self.config.ttl.as_millis() as u64,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a live entry exists, without touching recency or counters.
    pub fn contains(&self, question: &str, config: Option<&RagConfig>) -> bool {
        let key = CacheKey::new(question, config);
        self.inner
            .lock()
            .entries
            .peek(&key)
            .is_some_and(|entry| !entry.is_expired(self.config.ttl))
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
