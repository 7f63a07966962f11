//! Cache configuration, entry and statistics models.

// Author: kelexine (https://github.com/kelexine)

use crate::models::{RagConfig, RagMetrics};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

/// Configuration for the response cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached responses. Values below 1 are treated as 1.
    pub max_size: usize,
    /// Age after which an entry is treated as absent.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    /// Provides default values for cache configuration.
    ///
    /// - `max_size`: 100
    /// - `ttl`: 1 hour
    fn default() -> Self {
        Self {
            max_size: 100,
            ttl: Duration::from_secs(60 * 60),
        }
    }
}

/// Lookup key: normalized question text plus the configuration fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Questions are compared lowercased and trimmed; a missing configuration
    /// is keyed as `default`.
    pub fn new(question: &str, config: Option<&RagConfig>) -> Self {
        let config_key = config
            .map(RagConfig::fingerprint)
            .unwrap_or_else(|| "default".to_string());
        Self(format!("{}:{}", question.trim().to_lowercase(), config_key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A cached response with the metrics of the run that produced it.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub response: String,
    pub metrics: RagMetrics,
    /// Wall-clock creation time, reported to callers.
    pub timestamp: DateTime<Utc>,
    /// Number of times this entry has been served.
    pub hit_count: u64,
    /// Monotonic creation time, used for TTL checks.
    created_at: Instant,
}

impl CacheEntry {
    pub fn new(response: String, metrics: RagMetrics) -> Self {
        Self {
            response,
            metrics,
            timestamp: Utc::now(),
            hit_count: 0,
            created_at: Instant::now(),
        }
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() >= ttl
    }
}

/// Statistics for cache operations.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of live entries (expired entries are counted until next touched).
    pub size: usize,
    /// Number of lookups served from the cache.
    pub hits: u64,
    /// Number of lookups that found nothing or an expired entry.
    pub misses: u64,
    pub hit_rate: f64,
    pub max_size: usize,
    /// TTL in milliseconds.
    pub ttl: u64,
}
