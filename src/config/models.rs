//! Configuration data structures for the twinrag service.
//!
//! This module defines the schema for the application settings, including
//! server parameters, the LLM and vector search collaborators, and the
//! cache/monitoring knobs of the RAG pipeline.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::cache::CacheConfig;
use crate::llm::ApiKey;
use crate::monitor::PerformanceThresholds;
use crate::pipeline::QueryOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, workers).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream LLM (Groq) settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Vector search backend settings.
    #[serde(default)]
    pub vector: VectorConfig,

    /// Response cache, metrics history and pipeline defaults.
    #[serde(default)]
    pub monitoring: MonitoringConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `3000`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of tokio worker threads.
    /// Default: Number of logical CPU cores.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Whether to gzip HTTP responses.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub enable_compression: bool,
}

/// Settings for the OpenAI-compatible chat completion API (Groq).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the chat completion API.
    /// Default: `https://api.groq.com/openai/v1`
    #[serde(default = "default_llm_base_url")]
    pub api_base_url: String,

    /// API key. When absent, query enhancement and formatting are reported
    /// as unavailable and the pipeline concatenates raw search results.
    #[serde(default)]
    pub api_key: Option<ApiKey>,

    /// Model used for query enhancement when no interview config is given.
    /// Default: `llama-3.1-8b-instant`
    #[serde(default = "default_fast_model")]
    pub fast_model: String,

    /// Model used for response formatting when no interview config is given.
    /// Default: `llama-3.3-70b-versatile`
    #[serde(default = "default_powerful_model")]
    pub powerful_model: String,

    /// Per-request timeout in seconds.
    /// Default: `30`
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of attempts for retryable failures (429/5xx).
    /// Default: `3`
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Which vector search backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorProvider {
    Mock,
    Upstash,
}

/// Settings for the vector search backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Backend provider.
    /// Default: `mock`
    #[serde(default = "default_vector_provider")]
    pub provider: VectorProvider,

    /// REST endpoint of the index (Upstash only).
    #[serde(default)]
    pub url: Option<String>,

    /// REST token of the index (Upstash only).
    #[serde(default)]
    pub token: Option<ApiKey>,

    /// Number of results returned per search.
    /// Default: `5`
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

/// Settings for the response cache, the metrics history and pipeline defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Whether responses are cached by default.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Maximum number of cached responses.
    /// Default: `100`
    #[serde(default = "default_cache_max_size")]
    pub cache_max_size: usize,

    /// Age after which a cached response is discarded, in seconds.
    /// Default: `3600` (1 hour)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,

    /// Number of most recent per-query metrics kept for statistics.
    /// Default: `1000`
    #[serde(default = "default_history")]
    pub max_metrics_history: usize,

    /// Timeout for the enhance/search/format sequence, in milliseconds.
    /// Default: `15000`
    #[serde(default = "default_query_timeout")]
    pub query_timeout_ms: u64,

    /// Whether stage failures degrade instead of failing the query.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub fallback_to_basic: bool,

    /// Ceilings used for performance warnings.
    #[serde(default)]
    pub thresholds: PerformanceThresholds,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Whether to mask API keys in logged upstream errors.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub sanitize_secrets: bool,
}

impl MonitoringConfig {
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_size: self.cache_max_size,
            ttl: Duration::from_secs(self.cache_ttl_seconds),
        }
    }

    /// Default per-query options derived from this configuration.
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            use_cache: self.cache_enabled,
            timeout_ms: self.query_timeout_ms,
            fallback_to_basic: self.fallback_to_basic,
        }
    }
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
            enable_compression: true,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_llm_base_url(),
            api_key: None,
            fast_model: default_fast_model(),
            powerful_model: default_powerful_model(),
            timeout_seconds: default_llm_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            provider: default_vector_provider(),
            url: None,
            token: None,
            top_k: default_top_k(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_max_size: default_cache_max_size(),
            cache_ttl_seconds: default_cache_ttl(),
            max_metrics_history: default_history(),
            query_timeout_ms: default_query_timeout(),
            fallback_to_basic: true,
            thresholds: PerformanceThresholds::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            sanitize_secrets: true,
        }
    }
}

// Helper functions for serde defaults and shared constants
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_true() -> bool {
    true
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_fast_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_powerful_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_llm_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_vector_provider() -> VectorProvider {
    VectorProvider::Mock
}

fn default_top_k() -> usize {
    5
}

fn default_cache_max_size() -> usize {
    100
}

fn default_cache_ttl() -> u64 {
    3600 // 1 hour
}

fn default_history() -> usize {
    1000
}

fn default_query_timeout() -> u64 {
    15_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
