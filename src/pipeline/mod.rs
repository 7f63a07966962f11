//! Monitored RAG pipeline.
//!
//! A question first goes to the response cache. On a miss it runs through
//! three sequential stages under one timeout:
//!
//! 1. query enhancement (LLM, optional)
//! 2. vector search
//! 3. interview-style response formatting (LLM, optional)
//!
//! Every miss is recorded by the performance monitor and written back to the
//! cache. The `stats` submodule exposes the read-only views and the reset.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod backend;
pub mod service;
pub mod stats;

pub use backend::{LlmBackend, VectorSearch};
pub use service::{BatchProgress, RagService};
pub use stats::{HealthReport, HealthStatus, LivenessSummary, MetricsExport, PerformanceStats};

use serde::{Deserialize, Serialize};

/// Returned in place of an answer when the query fails or times out.
pub const APOLOGY_RESPONSE: &str =
    "I apologize, but I encountered an error processing your question. Please try again.";

/// Returned when the vector search finds nothing.
pub const NO_RESULTS_RESPONSE: &str = "No relevant information found.";

/// Per-query knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    /// Consult and populate the response cache.
    pub use_cache: bool,
    /// Budget for the enhance/search/format sequence.
    pub timeout_ms: u64,
    /// Degrade failed stages instead of failing the whole query.
    pub fallback_to_basic: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            timeout_ms: 15_000,
            fallback_to_basic: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Enhance,
    Search,
    Format,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Enhance => "enhance",
            Stage::Search => "search",
            Stage::Format => "format",
        }
    }

    fn fallback_description(&self) -> &'static str {
        match self {
            Stage::Enhance => "the original question",
            Stage::Search => "an empty result set",
            Stage::Format => "raw result text",
        }
    }
}
