// Upstash Vector REST client
// Author: kelexine (https://github.com/kelexine)

use super::enhance_for_search;
use crate::error::{RagError, Result, UpstreamKind};
use crate::llm::ApiKey;
use crate::models::SearchResult;
use crate::pipeline::{LlmBackend, VectorSearch};
use crate::utils::logging::sanitize;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryDataRequest<'a> {
    data: &'a str,
    top_k: usize,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryDataResponse {
    #[serde(default)]
    result: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
    #[serde(default)]
    data: Option<String>,
}

impl From<QueryMatch> for SearchResult {
    fn from(m: QueryMatch) -> Self {
        let content = m
            .metadata
            .as_ref()
            .and_then(|meta| meta.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .or(m.data)
            .unwrap_or_default();

        SearchResult {
            content,
            score: m.score,
            metadata: m.metadata,
        }
    }
}

/// Text query against an Upstash Vector index with a built-in embedding model.
pub struct UpstashVectorStore {
    http_client: Client,
    url: String,
    token: ApiKey,
    top_k: usize,
    llm: Option<Arc<dyn LlmBackend>>,
}

impl UpstashVectorStore {
    pub fn new(url: &str, token: ApiKey, top_k: usize) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .use_rustls_tls()
            .build()
            .map_err(|e| RagError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            url: url.trim_end_matches('/').to_string(),
            token,
            top_k,
            llm: None,
        })
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmBackend>) -> Self {
        self.llm = Some(llm);
        self
    }
}

#[async_trait]
impl VectorSearch for UpstashVectorStore {
    async fn search(&self, query: &str, use_internal_enhancement: bool) -> Result<Vec<SearchResult>> {
        let query = if use_internal_enhancement {
            enhance_for_search(self.llm.as_deref(), query).await
        } else {
            query.to_string()
        };

        let url = format!("{}/query-data", self.url);
        debug!("[VectorDB] Querying Upstash at {}", url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.token.expose())
            .json(&QueryDataRequest {
                data: &query,
                top_k: self.top_k,
                include_metadata: true,
            })
            .send()
            .await
            .map_err(|e| RagError::VectorSearch(format!("HTTP error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = sanitize(&response.text().await.unwrap_or_default());
            error!("Upstash query failed: HTTP {} - {}", status, body);
            return Err(RagError::from_upstream(status.as_u16(), body, UpstreamKind::Vector));
        }

        let parsed: QueryDataResponse = response
            .json()
            .await
            .map_err(|e| RagError::VectorSearch(format!("Response parsing error: {}", e)))?;

        Ok(parsed.result.into_iter().map(SearchResult::from).collect())
    }

    fn provider_name(&self) -> &str {
        "upstash"
    }
}
