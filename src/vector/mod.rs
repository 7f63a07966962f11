// Vector search backends
// Author: kelexine (https://github.com/kelexine)

mod mock;
mod upstash;

pub use mock::MockVectorStore;
pub use upstash::UpstashVectorStore;

use crate::config::{VectorConfig, VectorProvider};
use crate::error::{RagError, Result};
use crate::pipeline::{LlmBackend, VectorSearch};
use crate::utils::logging::sanitize;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the configured backend. `llm` is only used when a caller asks the
/// store to enhance queries itself.
pub fn build_vector_store(
    config: &VectorConfig,
    llm: Option<Arc<dyn LlmBackend>>,
) -> Result<Arc<dyn VectorSearch>> {
    let store: Arc<dyn VectorSearch> = match config.provider {
        VectorProvider::Mock => {
            let mut store = MockVectorStore::new(config.top_k);
            if let Some(llm) = llm {
                store = store.with_llm(llm);
            }
            Arc::new(store)
        }
        VectorProvider::Upstash => {
            let url = config
                .url
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| RagError::Config("vector.url is required for upstash".to_string()))?;
            let token = config
                .token
                .clone()
                .ok_or_else(|| RagError::Config("vector.token is required for upstash".to_string()))?;

            let mut store = UpstashVectorStore::new(url, token, config.top_k)?;
            if let Some(llm) = llm {
                store = store.with_llm(llm);
            }
            Arc::new(store)
        }
    };

    info!("[VectorDB] Initialized with provider: {}", store.provider_name());
    Ok(store)
}

/// Enhance a query with the attached LLM, keeping the original on failure
/// or when no LLM is usable.
pub(crate) async fn enhance_for_search(llm: Option<&dyn LlmBackend>, query: &str) -> String {
    let Some(llm) = llm.filter(|l| l.is_available()) else {
        return query.to_string();
    };

    match llm.enhance_query(query, None).await {
        Ok(enhanced) => enhanced,
        Err(e) => {
            warn!(
                "[VectorDB] Query enhancement failed, using original: {}",
                sanitize(&e.to_string())
            );
            query.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ApiKey;
    use crate::models::{RagConfig, SearchResult};
    use async_trait::async_trait;

    struct Rewriter {
        fail: bool,
    }

    #[async_trait]
    impl LlmBackend for Rewriter {
        fn is_available(&self) -> bool {
            true
        }

        async fn enhance_query(&self, _question: &str, _config: Option<&RagConfig>) -> Result<String> {
            if self.fail {
                Err(RagError::LlmApi("boom".to_string()))
            } else {
                Ok("team leadership mentored".to_string())
            }
        }

        async fn format_for_interview(
            &self,
            _results: &[SearchResult],
            _question: &str,
            _config: Option<&RagConfig>,
        ) -> Result<String> {
            Ok(String::new())
        }
    }

    fn vector_config(provider: VectorProvider) -> VectorConfig {
        VectorConfig {
            provider,
            url: None,
            token: None,
            top_k: 2,
        }
    }

    #[test]
    fn test_upstash_requires_url_and_token() {
        let err = build_vector_store(&vector_config(VectorProvider::Upstash), None).err().unwrap();
        assert!(matches!(err, RagError::Config(_)));

        let mut config = vector_config(VectorProvider::Upstash);
        config.url = Some("https://example.upstash.io".to_string());
        let err = build_vector_store(&config, None).err().unwrap();
        assert!(matches!(err, RagError::Config(_)));

        config.token = Some(ApiKey::new("tok"));
        let store = build_vector_store(&config, None).unwrap();
        assert_eq!(store.provider_name(), "upstash");
    }

    #[tokio::test]
    async fn test_internal_enhancement_only_when_requested() {
        let llm: Arc<dyn LlmBackend> = Arc::new(Rewriter { fail: false });
        let store = build_vector_store(&vector_config(VectorProvider::Mock), Some(llm)).unwrap();

        let enhanced = store.search("qqq", true).await.unwrap();
        assert!(enhanced[0].content.starts_with("Team Leadership"));

        let plain = store.search("qqq", false).await.unwrap();
        assert!(plain[0].content.starts_with("Full-stack developer"));
    }

    #[tokio::test]
    async fn test_failed_enhancement_keeps_original_query() {
        let llm = Rewriter { fail: true };
        assert_eq!(enhance_for_search(Some(&llm as &dyn LlmBackend), "original").await, "original");
        assert_eq!(enhance_for_search(None, "original").await, "original");
    }
}
