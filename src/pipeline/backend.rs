//! Collaborator interfaces the orchestrator calls out to.
//!
//! The pipeline only depends on these traits; `llm::GroqClient` and the
//! stores in `vector` are the production implementations, and tests plug
//! in scripted fakes.

// Author: kelexine (https://github.com/kelexine)

use crate::error::Result;
use crate::models::{RagConfig, SearchResult};
use async_trait::async_trait;

/// Query enhancement and interview-style response formatting.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Capability check; no side effects. Governs both enhancement and formatting.
    fn is_available(&self) -> bool;

    /// Rewrite a question into a better search query.
    async fn enhance_query(&self, question: &str, config: Option<&RagConfig>) -> Result<String>;

    /// Compose the final answer from search results.
    async fn format_for_interview(
        &self,
        results: &[SearchResult],
        question: &str,
        config: Option<&RagConfig>,
    ) -> Result<String>;
}

/// Similarity search over the profile corpus.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// An empty result set is not an error. With `use_internal_enhancement`
    /// the backend may enhance the query itself before searching.
    async fn search(&self, query: &str, use_internal_enhancement: bool) -> Result<Vec<SearchResult>>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}
