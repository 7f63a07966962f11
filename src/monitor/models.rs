//! Threshold configuration and summary statistics for the performance monitor.

// Author: kelexine (https://github.com/kelexine)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ceilings checked against every recorded query. Exceeding one only logs a
/// warning; requests are never aborted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceThresholds {
    /// Default: `10000` ms
    #[serde(default = "default_max_total_time")]
    pub max_total_time_ms: u64,

    /// Default: `2000` ms
    #[serde(default = "default_max_enhancement_time")]
    pub max_query_enhancement_time_ms: u64,

    /// Default: `3000` ms
    #[serde(default = "default_max_search_time")]
    pub max_vector_search_time_ms: u64,

    /// Default: `5000` ms
    #[serde(default = "default_max_formatting_time")]
    pub max_response_formatting_time_ms: u64,

    /// Default: `2000`
    #[serde(default = "default_max_tokens")]
    pub max_tokens_per_query: u64,
}

impl Default for PerformanceThresholds {
    fn default() -> Self {
        Self {
            max_total_time_ms: default_max_total_time(),
            max_query_enhancement_time_ms: default_max_enhancement_time(),
            max_vector_search_time_ms: default_max_search_time(),
            max_response_formatting_time_ms: default_max_formatting_time(),
            max_tokens_per_query: default_max_tokens(),
        }
    }
}

fn default_max_total_time() -> u64 {
    10_000
}

fn default_max_enhancement_time() -> u64 {
    2_000
}

fn default_max_search_time() -> u64 {
    3_000
}

fn default_max_formatting_time() -> u64 {
    5_000
}

fn default_max_tokens() -> u64 {
    2_000
}

/// Which ceiling a record exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    TotalTime,
    QueryEnhancementTime,
    VectorSearchTime,
    ResponseFormattingTime,
    Tokens,
}

impl Threshold {
    pub fn as_str(&self) -> &'static str {
        match self {
            Threshold::TotalTime => "total_time",
            Threshold::QueryEnhancementTime => "query_enhancement_time",
            Threshold::VectorSearchTime => "vector_search_time",
            Threshold::ResponseFormattingTime => "response_formatting_time",
            Threshold::Tokens => "tokens",
        }
    }
}

/// A single threshold breach, with the observed value and the limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdViolation {
    pub threshold: Threshold,
    pub actual: u64,
    pub limit: u64,
}

impl fmt::Display for ThresholdViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, unit) = match self.threshold {
            Threshold::TotalTime => ("Total time", "ms"),
            Threshold::QueryEnhancementTime => ("Query enhancement time", "ms"),
            Threshold::VectorSearchTime => ("Vector search time", "ms"),
            Threshold::ResponseFormattingTime => ("Response formatting time", "ms"),
            Threshold::Tokens => ("Token usage", ""),
        };
        write!(
            f,
            "{} ({}{}) exceeded threshold ({}{})",
            label, self.actual, unit, self.limit, unit
        )
    }
}

/// Mean of the recorded history, rounded to whole milliseconds/tokens.
/// Every field is `None` when nothing has been recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_enhancement_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_search_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_formatting_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    /// Not rounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_hit_rate: Option<f64>,
}

impl AverageMetrics {
    pub fn is_empty(&self) -> bool {
        self.total_time_ms.is_none()
    }
}

/// Nearest-rank latency percentiles over `total_time_ms`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Percentiles {
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
}

/// Snapshot of the monitor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStats {
    pub total_queries: usize,
    pub averages: AverageMetrics,
    pub percentiles: Percentiles,
    pub thresholds: PerformanceThresholds,
}
