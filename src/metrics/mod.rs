// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics,
    init,
    REQUESTS_TOTAL,
    REQUEST_DURATION,
    QUERIES_TOTAL,
    STAGE_DURATION,
    STAGE_FALLBACKS,
    TOKENS_TOTAL,
    THRESHOLD_VIOLATIONS,
    CACHE_OPERATIONS,
    CACHE_ENTRIES,
};

/// Helper to record request metrics
pub fn record_request(method: &str, endpoint: &str, status_code: u16, duration_secs: f64) {
    REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status_code.to_string()])
        .inc();

    REQUEST_DURATION
        .with_label_values(&[method, endpoint])
        .observe(duration_secs);
}

/// Helper to record the outcome of a monitored query
pub fn record_query(outcome: &str) {
    QUERIES_TOTAL.with_label_values(&[outcome]).inc();
}

/// Helper to record a pipeline stage duration
pub fn record_stage(stage: &str, duration_ms: u64) {
    STAGE_DURATION
        .with_label_values(&[stage])
        .observe(duration_ms as f64 / 1000.0);
}

pub fn record_stage_fallback(stage: &str) {
    STAGE_FALLBACKS.with_label_values(&[stage]).inc();
}

/// Helper to record token usage
pub fn record_tokens(tokens: u64) {
    if tokens > 0 {
        TOKENS_TOTAL.inc_by(tokens);
    }
}

pub fn record_threshold_violation(threshold: &str) {
    THRESHOLD_VIOLATIONS.with_label_values(&[threshold]).inc();
}

/// Helpers to record response cache operations
pub fn record_cache_hit() {
    CACHE_OPERATIONS.with_label_values(&["hit"]).inc();
}

pub fn record_cache_miss() {
    CACHE_OPERATIONS.with_label_values(&["miss"]).inc();
}

pub fn record_cache_set() {
    CACHE_OPERATIONS.with_label_values(&["set"]).inc();
}

pub fn record_cache_eviction() {
    CACHE_OPERATIONS.with_label_values(&["evict"]).inc();
}

pub fn record_cache_expired() {
    CACHE_OPERATIONS.with_label_values(&["expire"]).inc();
}

pub fn update_cache_entries(count: usize) {
    CACHE_ENTRIES.set(count as f64);
}
