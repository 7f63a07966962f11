// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::routes::AppState;
use crate::error::{RagError, Result};
use crate::metrics::gather_metrics;
use crate::models::{detect_interview_type, InterviewType, RagConfig};
use crate::pipeline::{HealthStatus, QueryOptions};
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

const API_VERSION: &str = "1.0";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: HashMap<String, HealthCheck>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
}

impl HealthCheck {
    fn new(status: &str, message: String) -> Self {
        Self {
            status: status.to_string(),
            message,
        }
    }
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let summary = state.service.health_summary();
    let mut checks = HashMap::new();

    let cache_status = match summary.status {
        HealthStatus::Healthy => "ok",
        HealthStatus::Degraded => "warning",
    };
    checks.insert(
        "cache".to_string(),
        HealthCheck::new(
            cache_status,
            format!(
                "{} entries, hit rate {:.1}% over {} queries",
                summary.cache_size,
                summary.cache_hit_rate * 100.0,
                summary.total_queries
            ),
        ),
    );

    let llm_check = if state.service.llm_available() {
        HealthCheck::new("ok", format!("API base: {}", state.config.llm.api_base_url))
    } else {
        HealthCheck::new(
            "warning",
            "No API key configured, returning raw search results".to_string(),
        )
    };
    checks.insert("llm".to_string(), llm_check);

    checks.insert(
        "vector_search".to_string(),
        HealthCheck::new("ok", format!("Provider: {}", state.service.search_provider())),
    );

    Json(HealthResponse {
        status: summary.status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredRagRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub interview_type: Option<String>,
    #[serde(default)]
    pub use_cache: Option<bool>,
    /// Milliseconds
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub fallback_to_basic: Option<bool>,
    #[serde(default)]
    pub auto_detect: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub interview_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub action: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClearQuery {
    pub confirm: Option<bool>,
}

/// An unknown interview type is not fatal: the query runs without one.
fn resolve_interview_config(
    interview_type: Option<&str>,
    auto_detect: bool,
    question: &str,
) -> Option<RagConfig> {
    if let Some(name) = interview_type {
        return match name.parse::<InterviewType>() {
            Ok(t) => Some(t.config()),
            Err(e) => {
                warn!("Ignoring interview type: {}", e);
                None
            }
        };
    }

    if auto_detect {
        let detected = detect_interview_type(question);
        debug!("Auto-detected interview type: {}", detected);
        return Some(detected.config());
    }

    None
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        warn!("Failed to deserialize request: {}", e);
        RagError::InvalidRequest(format!("JSON deserialization error: {}", e))
    })
}

fn meta(started: Instant) -> Value {
    json!({
        "processingTime": started.elapsed().as_millis() as u64,
        "apiVersion": API_VERSION,
    })
}

/// POST /api/monitored-rag
pub async fn monitored_rag_handler(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<Value>> {
    let started = Instant::now();
    let req: MonitoredRagRequest = parse_body(&body)?;

    let question = req
        .question
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| RagError::InvalidRequest("Question is required".to_string()))?;

    let config = resolve_interview_config(req.interview_type.as_deref(), req.auto_detect, question);

    let defaults = state.service.default_options();
    let options = QueryOptions {
        use_cache: req.use_cache.unwrap_or(defaults.use_cache),
        timeout_ms: req.timeout.unwrap_or(defaults.timeout_ms),
        fallback_to_basic: req.fallback_to_basic.unwrap_or(defaults.fallback_to_basic),
    };

    info!(
        "Received monitored RAG request: interview_type={}, use_cache={}, timeout={}ms",
        config
            .as_ref()
            .map(|c| c.interview_type.as_str())
            .unwrap_or("none"),
        options.use_cache,
        options.timeout_ms
    );

    let result = state
        .service
        .monitored_query(question, config.as_ref(), options)
        .await;

    Ok(Json(json!({
        "success": result.success,
        "data": {
            "question": question,
            "response": result.response,
            "cached": result.cached,
            "timestamp": result.timestamp,
            "metrics": result.metrics,
            "interviewType": config.as_ref().map(|c| c.interview_type.as_str()),
        },
        "meta": meta(started),
    })))
}

/// POST /api/monitored-rag/batch
pub async fn batch_handler(State(state): State<AppState>, body: String) -> Result<Json<Value>> {
    let started = Instant::now();
    let req: BatchRequest = parse_body(&body)?;

    let questions: Vec<String> = req
        .questions
        .iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();
    if questions.is_empty() {
        return Err(RagError::InvalidRequest(
            "At least one question is required".to_string(),
        ));
    }

    let config = req
        .interview_type
        .as_deref()
        .and_then(|name| resolve_interview_config(Some(name), false, ""));

    let results = state
        .service
        .monitored_batch_query(&questions, config.as_ref(), 1, |progress| {
            debug!(
                "[Batch] {}/{} done ({} failed), ~{}ms remaining",
                progress.completed + progress.failed,
                progress.total,
                progress.failed,
                progress.estimated_time_remaining_ms
            );
        })
        .await;

    let failed = results.iter().filter(|r| !r.success).count();
    let cached = results.iter().filter(|r| r.cached).count();
    let items: Vec<Value> = questions
        .iter()
        .zip(&results)
        .map(|(question, result)| {
            json!({
                "question": question,
                "success": result.success,
                "response": result.response,
                "cached": result.cached,
                "metrics": result.metrics,
            })
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "data": {
            "results": items,
            "summary": {
                "total": results.len(),
                "successful": results.len() - failed,
                "failed": failed,
                "cached": cached,
            },
        },
        "meta": meta(started),
    })))
}

/// GET /api/monitored-rag?action=stats|metrics|cache
pub async fn stats_handler(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Response> {
    let data = match query.action.as_deref() {
        Some("stats") => serde_json::to_value(state.service.get_performance_stats())?,
        Some("metrics") => serde_json::to_value(state.service.export_metrics())?,
        Some("cache") => serde_json::to_value(state.service.get_cache_stats())?,
        None => serde_json::to_value(state.service.health_summary())?,
        Some(other) => {
            return Err(RagError::InvalidRequest(format!(
                "Unknown action '{}'. Expected one of: stats, metrics, cache",
                other
            )))
        }
    };

    Ok(Json(json!({ "success": true, "data": data })).into_response())
}

/// DELETE /api/monitored-rag?confirm=true
pub async fn clear_handler(
    State(state): State<AppState>,
    Query(query): Query<ClearQuery>,
) -> Result<Json<Value>> {
    if query.confirm != Some(true) {
        return Err(RagError::InvalidRequest(
            "Add ?confirm=true to clear all caches and metrics".to_string(),
        ));
    }

    state.service.clear_monitoring();

    Ok(Json(json!({
        "success": true,
        "message": "All caches and metrics cleared",
        "timestamp": chrono::Utc::now(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_explicit_type() {
        let config = resolve_interview_config(Some("technical"), false, "anything").unwrap();
        assert_eq!(config.interview_type, InterviewType::Technical);
    }

    #[test]
    fn test_unknown_type_runs_without_config() {
        assert!(resolve_interview_config(Some("astrology"), true, "debug the api").is_none());
    }

    #[test]
    fn test_auto_detect_only_when_asked() {
        assert!(resolve_interview_config(None, false, "How do you debug SQL?").is_none());
        let detected = resolve_interview_config(None, true, "How do you debug SQL?").unwrap();
        assert_eq!(detected.interview_type, InterviewType::Technical);
    }

    #[test]
    fn test_request_defaults() {
        let req: MonitoredRagRequest = serde_json::from_str(r#"{"question":"hi"}"#).unwrap();
        assert!(req.use_cache.is_none());
        assert!(req.timeout.is_none());
        assert!(!req.auto_detect);
    }
}
