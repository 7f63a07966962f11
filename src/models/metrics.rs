// Per-query metrics and the monitored query result
// Author: kelexine (https://github.com/kelexine)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timing and cost profile of one RAG query attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagMetrics {
    pub query_enhancement_time_ms: u64,
    pub vector_search_time_ms: u64,
    pub response_formatting_time_ms: u64,
    pub total_time_ms: u64,
    /// Estimated from text length, roughly 4 characters per token.
    pub tokens_used: u64,
    /// Cache hit rate observed when this record was produced.
    pub cache_hit_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_count: Option<usize>,
}

impl RagMetrics {
    /// `ceil((len(question) + len(response)) / 4)`, counted in characters.
    pub fn estimate_tokens(question: &str, response: &str) -> u64 {
        let chars = question.chars().count() + response.chars().count();
        chars.div_ceil(4) as u64
    }
}

/// Outcome of `RagService::monitored_query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredResult {
    pub response: String,
    pub metrics: RagMetrics,
    pub cached: bool,
    pub timestamp: DateTime<Utc>,
    /// False only when the query failed and `response` is the apology text.
    pub success: bool,
}
