// Error types for the twinrag service
// Author: kelexine (https://github.com/kelexine)

use crate::utils::logging::sanitize;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("Vector search error: {0}")]
    VectorSearch(String),

    #[error("Response formatting error: {0}")]
    Formatting(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited: {0}")]
    TooManyRequests(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("RAG query timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RagError {
    /// Map an upstream HTTP status and body onto the matching variant.
    /// `context` selects the variant used for non-specific failures.
    /// The body is redacted before it is embedded.
    pub fn from_upstream(status: u16, body: String, context: UpstreamKind) -> Self {
        let body = sanitize(&body);
        match status {
            429 => RagError::TooManyRequests(body),
            503 | 504 => RagError::ServiceUnavailable(format!("Upstream unavailable: {}", body)),
            _ => match context {
                UpstreamKind::Llm => RagError::LlmApi(format!("HTTP {}: {}", status, body)),
                UpstreamKind::Vector => RagError::VectorSearch(format!("HTTP {}: {}", status, body)),
            },
        }
    }
}

/// Which upstream a failed call was talking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamKind {
    Llm,
    Vector,
}

// Convert RagError to HTTP responses for Axum
impl IntoResponse for RagError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            RagError::InvalidRequest(_) | RagError::Json(_) => {
                (StatusCode::BAD_REQUEST, "invalid_request_error")
            }
            RagError::TooManyRequests(_) => (StatusCode::TOO_MANY_REQUESTS, "rate_limit_error"),
            RagError::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable_error"),
            RagError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "timeout_error"),
            RagError::LlmApi(_) | RagError::VectorSearch(_) | RagError::Http(_) => {
                (StatusCode::BAD_GATEWAY, "upstream_error")
            }
            RagError::Config(_) | RagError::ConfigParsing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "api_error"),
        };

        let body = json!({
            "success": false,
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RagError>;
