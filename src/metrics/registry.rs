// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_gauge_with_registry,
    register_histogram_vec_with_registry, register_int_counter_with_registry, CounterVec,
    Encoder, Gauge, HistogramVec, IntCounter, Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // HTTP METRICS
    // ============================================================================

    /// Total number of HTTP requests
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status_code"],
        REGISTRY
    ).unwrap();

    /// Request duration histogram
    pub static ref REQUEST_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("http_request_duration_seconds", "Request duration in seconds")
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0]),
        &["method", "endpoint"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // PIPELINE METRICS
    // ============================================================================

    /// Monitored queries by outcome
    pub static ref QUERIES_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("rag_queries_total", "Total monitored RAG queries"),
        &["outcome"], // outcome: served, cached, failed
        REGISTRY
    ).unwrap();

    /// Pipeline stage duration
    pub static ref STAGE_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("rag_stage_duration_seconds", "RAG pipeline stage duration")
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 10.0, 15.0]),
        &["stage"], // stage: enhance, search, format, total
        REGISTRY
    ).unwrap();

    /// Stages that failed and were replaced by their degraded result
    pub static ref STAGE_FALLBACKS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("rag_stage_fallbacks_total", "Total stage failures recovered by fallback"),
        &["stage"],
        REGISTRY
    ).unwrap();

    /// Estimated tokens processed
    pub static ref TOKENS_TOTAL: IntCounter = register_int_counter_with_registry!(
        Opts::new("rag_tokens_total", "Estimated tokens processed"),
        REGISTRY
    ).unwrap();

    /// Threshold violations
    pub static ref THRESHOLD_VIOLATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("rag_threshold_violations_total", "Total performance threshold violations"),
        &["threshold"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // CACHE METRICS
    // ============================================================================

    /// Cache operations
    pub static ref CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("rag_cache_operations_total", "Total response cache operations"),
        &["operation"], // operation: hit, miss, set, evict, expire
        REGISTRY
    ).unwrap();

    /// Current cache entries
    pub static ref CACHE_ENTRIES: Gauge = register_gauge_with_registry!(
        Opts::new("rag_cache_entries", "Current number of cached responses"),
        REGISTRY
    ).unwrap();
}

/// Register every collector so `/metrics` lists them before first use.
pub fn init() {
    lazy_static::initialize(&REQUESTS_TOTAL);
    lazy_static::initialize(&REQUEST_DURATION);
    lazy_static::initialize(&QUERIES_TOTAL);
    lazy_static::initialize(&STAGE_DURATION);
    lazy_static::initialize(&STAGE_FALLBACKS);
    lazy_static::initialize(&TOKENS_TOTAL);
    lazy_static::initialize(&THRESHOLD_VIOLATIONS);
    lazy_static::initialize(&CACHE_OPERATIONS);
    lazy_static::initialize(&CACHE_ENTRIES);
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    init();

    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
