// Groq chat completion client implementing the pipeline's LLM backend
// Author: kelexine (https://github.com/kelexine)

use super::prompts::{query_enhancement_prompt, response_formatting_prompt};
use super::{ApiKey, ChatMessage, ChatRequest, ChatResponse};
use crate::config::LlmConfig;
use crate::error::{RagError, Result, UpstreamKind};
use crate::models::search::concatenate;
use crate::models::{detect_interview_type, RagConfig, SearchResult};
use crate::pipeline::LlmBackend;
use crate::utils::logging::{preview, sanitize};
use crate::utils::retry::with_retry;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

/// Completion budget for query enhancement.
const ENHANCEMENT_MAX_TOKENS: u32 = 150;

/// Returned by formatting when the search produced no usable text.
const NO_CONTEXT_RESPONSE: &str = "I don't have specific experience in that area to share.";

/// Client for an OpenAI-compatible chat completion API.
///
/// Without an API key the client reports itself unavailable and the
/// orchestrator skips both LLM stages.
pub struct GroqClient {
    http_client: Client,
    config: LlmConfig,
}

impl GroqClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .use_rustls_tls()
            .build()
            .map_err(|e| RagError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created LLM HTTP client for {}", config.api_base_url);

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.api_base_url
    }

    /// Interview config used when the caller passes none: detected from the
    /// question, with the configured fast/powerful models.
    fn resolve_config(&self, question: &str, config: Option<&RagConfig>) -> RagConfig {
        match config {
            Some(c) => c.clone(),
            None => {
                let detected = detect_interview_type(question);
                debug!("Auto-detected interview type: {}", detected);
                let mut auto = detected.config();
                auto.query_model = self.config.fast_model.clone();
                auto.response_model = self.config.powerful_model.clone();
                auto
            }
        }
    }

    /// Call `chat/completions` with retry. Returns the first choice's text,
    /// `None` when the completion was empty.
    async fn complete(
        &self,
        operation: &str,
        request: ChatRequest,
    ) -> Result<Option<String>> {
        let key = self
            .config
            .api_key
            .as_ref()
            .map(ApiKey::expose)
            .ok_or_else(|| RagError::Config("LLM API key not configured".to_string()))?;
        let url = format!("{}/chat/completions", self.config.api_base_url.trim_end_matches('/'));

        let (http, url, request) = (&self.http_client, &url, &request);

        let response: ChatResponse = with_retry(operation, self.config.max_retries, || async move {
            let response = http
                .post(url)
                .bearer_auth(key)
                .json(request)
                .send()
                .await
                .map_err(|e| (500, format!("HTTP error: {}", e)))?;

            let status = response.status();
            let response_text = response.text().await.unwrap_or_default();

            if !status.is_success() {
                let error_msg =
                    Self::extract_error_message(&response_text).unwrap_or(response_text);
                return Err((status.as_u16(), error_msg));
            }

            serde_json::from_str::<ChatResponse>(&response_text)
                .map_err(|e| (502, format!("Response parsing error: {}", e)))
        })
        .await
        .map_err(|(status, body)| {
            let body = sanitize(&body);
            error!("{} failed: HTTP {} - {}", operation, status, body);
            RagError::from_upstream(status, body, UpstreamKind::Llm)
        })?;

        Ok(response.first_text())
    }

    /// Extract error message from API response JSON
    fn extract_error_message(response_text: &str) -> Option<String> {
        #[derive(serde::Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(serde::Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
            #[serde(rename = "type")]
            kind: Option<String>,
        }

        serde_json::from_str::<ErrorResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .and_then(|e| e.message.or(e.kind))
    }
}

#[async_trait]
impl LlmBackend for GroqClient {
    fn is_available(&self) -> bool {
        self.config
            .api_key
            .as_ref()
            .is_some_and(|k| !k.expose().trim().is_empty())
    }

    async fn enhance_query(&self, question: &str, config: Option<&RagConfig>) -> Result<String> {
        let config = self.resolve_config(question, config);
        let request = ChatRequest {
            model: config.query_model.clone(),
            messages: vec![ChatMessage::user(query_enhancement_prompt(question, &config))],
            temperature: config.query_temperature,
            max_tokens: ENHANCEMENT_MAX_TOKENS,
        };

        match self.complete("Query enhancement", request).await? {
            Some(enhanced) => {
                debug!(
                    "[LLM Query Enhancement] \"{}\" -> \"{}\"",
                    preview(question, 60),
                    preview(&enhanced, 120)
                );
                Ok(enhanced)
            }
            None => {
                debug!("[LLM Query Enhancement] Empty completion, using original query");
                Ok(question.to_string())
            }
        }
    }

    async fn format_for_interview(
        &self,
        results: &[SearchResult],
        question: &str,
        config: Option<&RagConfig>,
    ) -> Result<String> {
        let context = concatenate(results);
        if context.trim().is_empty() {
            return Ok(NO_CONTEXT_RESPONSE.to_string());
        }

        let config = self.resolve_config(question, config);
        let request = ChatRequest {
            model: config.response_model.clone(),
            messages: vec![ChatMessage::user(response_formatting_prompt(
                question, &context, &config,
            ))],
            temperature: config.response_temperature,
            max_tokens: config.max_tokens,
        };

        let formatted = self
            .complete("Response formatting", request)
            .await?
            .ok_or_else(|| RagError::Formatting("LLM returned an empty completion".to_string()))?;

        debug!(
            "[LLM Response Formatting] Generated {} character {} response",
            formatted.chars().count(),
            config.interview_type
        );
        Ok(formatted)
    }
}
