// Monitored RAG query orchestration
// Author: kelexine (https://github.com/kelexine)

use super::backend::{LlmBackend, VectorSearch};
use super::{QueryOptions, Stage, APOLOGY_RESPONSE, NO_RESULTS_RESPONSE};
use crate::cache::ResponseCache;
use crate::config::MonitoringConfig;
use crate::error::{RagError, Result};
use crate::metrics;
use crate::models::search::concatenate;
use crate::models::{MonitoredResult, RagConfig, RagMetrics};
use crate::monitor::PerformanceMonitor;
use crate::utils::logging::{preview, sanitize};
use chrono::Utc;
use futures::StreamExt;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Owns the response cache and the performance monitor and runs queries
/// through the enhance → search → format pipeline.
///
/// Built once at startup and shared behind an `Arc`; every request handler
/// talks to the same instance.
pub struct RagService {
    llm: Arc<dyn LlmBackend>,
    search: Arc<dyn VectorSearch>,
    pub(super) cache: ResponseCache,
    pub(super) monitor: PerformanceMonitor,
    defaults: QueryOptions,
    /// Held shared while reading or writing cache + monitor together, and
    /// exclusively by `clear_monitoring`, so a half-cleared state is never seen.
    pub(super) gate: RwLock<()>,
}

/// Progress report for batch queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub estimated_time_remaining_ms: u64,
}

impl RagService {
    pub fn new(
        llm: Arc<dyn LlmBackend>,
        search: Arc<dyn VectorSearch>,
        config: &MonitoringConfig,
    ) -> Self {
        Self::from_parts(
            llm,
            search,
            ResponseCache::new(config.cache_config()),
            PerformanceMonitor::new(config.max_metrics_history, config.thresholds.clone()),
        )
        .with_default_options(config.query_options())
    }

    pub fn from_parts(
        llm: Arc<dyn LlmBackend>,
        search: Arc<dyn VectorSearch>,
        cache: ResponseCache,
        monitor: PerformanceMonitor,
    ) -> Self {
        Self {
            llm,
            search,
            cache,
            monitor,
            defaults: QueryOptions::default(),
            gate: RwLock::new(()),
        }
    }

    pub fn with_default_options(mut self, options: QueryOptions) -> Self {
        self.defaults = options;
        self
    }

    /// Options applied when a caller does not override them.
    pub fn default_options(&self) -> QueryOptions {
        self.defaults.clone()
    }

    pub fn llm_available(&self) -> bool {
        self.llm.is_available()
    }

    pub fn search_provider(&self) -> &str {
        self.search.provider_name()
    }

    /// Answer a question through the cache and the monitored pipeline.
    ///
    /// Never fails: stage errors are either degraded (with
    /// `fallback_to_basic`) or turned into the apology response, which is
    /// also returned when the stages exceed `timeout_ms`.
    pub async fn monitored_query(
        &self,
        question: &str,
        config: Option<&RagConfig>,
        options: QueryOptions,
    ) -> MonitoredResult {
        let span = info_span!("rag_query", query_id = %Uuid::new_v4());
        self.run_query(question, config, options).instrument(span).await
    }

    async fn run_query(
        &self,
        question: &str,
        config: Option<&RagConfig>,
        options: QueryOptions,
    ) -> MonitoredResult {
        if options.use_cache {
            if let Some(entry) = self.cache.get(question, config) {
                metrics::record_query("cached");
                let mut cached_metrics = entry.metrics;
                cached_metrics.cache_hit_rate = self.cache.hit_rate();
                return MonitoredResult {
                    response: entry.response,
                    metrics: cached_metrics,
                    cached: true,
                    timestamp: entry.timestamp,
                    success: true,
                };
            }
        }

        let started = Instant::now();
        let mut partial = RagMetrics {
            cache_hit_rate: self.cache.hit_rate(),
            interview_type: config.map(|c| c.interview_type.as_str().to_string()),
            ..Default::default()
        };

        let outcome = tokio::time::timeout(
            Duration::from_millis(options.timeout_ms),
            self.run_stages(question, config, options.fallback_to_basic, &mut partial),
        )
        .await;

        partial.total_time_ms = elapsed_ms(started);

        match outcome {
            Ok(Ok(response)) => self.finalize(question, config, &options, response, partial),
            Ok(Err(e)) => self.fail(e, partial),
            Err(_) => self.fail(
                RagError::Timeout {
                    timeout_ms: options.timeout_ms,
                },
                partial,
            ),
        }
    }

    /// Enhance, search and format in order, filling in stage timings as they
    /// complete. Returns the response text.
    async fn run_stages(
        &self,
        question: &str,
        config: Option<&RagConfig>,
        fallback_to_basic: bool,
        partial: &mut RagMetrics,
    ) -> Result<String> {
        // Step 1: Query Enhancement
        let mut query = question.to_string();
        if self.llm.is_available() {
            let start = Instant::now();
            let enhanced = self.llm.enhance_query(question, config).await;
            partial.query_enhancement_time_ms = elapsed_ms(start);
            metrics::record_stage(Stage::Enhance.as_str(), partial.query_enhancement_time_ms);

            match enhanced {
                Ok(enhanced) => {
                    debug!("Enhanced query: \"{}\"", preview(&enhanced, 80));
                    query = enhanced;
                }
                Err(e) => self.degrade(Stage::Enhance, e, fallback_to_basic)?,
            }
        }

        // Step 2: Vector Search (enhancement already applied or deliberately skipped)
        let start = Instant::now();
        let searched = self.search.search(&query, false).await;
        partial.vector_search_time_ms = elapsed_ms(start);
        metrics::record_stage(Stage::Search.as_str(), partial.vector_search_time_ms);

        let results = match searched {
            Ok(results) => results,
            Err(e) => {
                partial.result_count = Some(0);
                self.degrade(Stage::Search, e, fallback_to_basic)?;
                Vec::new()
            }
        };
        partial.result_count = Some(results.len());

        // Step 3: Response Formatting
        if results.is_empty() {
            partial.response_formatting_time_ms = 0;
            return Ok(NO_RESULTS_RESPONSE.to_string());
        }

        if !self.llm.is_available() {
            partial.response_formatting_time_ms = 0;
            return Ok(concatenate(&results));
        }

        let start = Instant::now();
        let formatted = self.llm.format_for_interview(&results, question, config).await;
        partial.response_formatting_time_ms = elapsed_ms(start);
        metrics::record_stage(Stage::Format.as_str(), partial.response_formatting_time_ms);

        match formatted {
            Ok(text) => Ok(text),
            Err(e) => {
                self.degrade(Stage::Format, e, fallback_to_basic)?;
                Ok(concatenate(&results))
            }
        }
    }

    /// Log a stage failure and decide whether the query continues.
    fn degrade(&self, stage: Stage, e: RagError, fallback_to_basic: bool) -> Result<()> {
        if !fallback_to_basic {
            return Err(e);
        }
        warn!(
            "[Monitoring] {} stage failed, falling back to {}: {}",
            stage.as_str(),
            stage.fallback_description(),
            sanitize(&e.to_string())
        );
        metrics::record_stage_fallback(stage.as_str());
        Ok(())
    }

    fn finalize(
        &self,
        question: &str,
        config: Option<&RagConfig>,
        options: &QueryOptions,
        response: String,
        mut final_metrics: RagMetrics,
    ) -> MonitoredResult {
        final_metrics.tokens_used = RagMetrics::estimate_tokens(question, &response);

        {
            let _gate = self.gate.read();
            self.monitor.record_metrics(final_metrics.clone());
            if options.use_cache {
                self.cache
                    .set(question, response.clone(), final_metrics.clone(), config);
            }
        }

        info!(
            total_time_ms = final_metrics.total_time_ms,
            enhancement_ms = final_metrics.query_enhancement_time_ms,
            search_ms = final_metrics.vector_search_time_ms,
            formatting_ms = final_metrics.response_formatting_time_ms,
            tokens = final_metrics.tokens_used,
            results = final_metrics.result_count.unwrap_or(0),
            cached = false,
            "[RAG Performance]"
        );
        metrics::record_query("served");
        metrics::record_stage("total", final_metrics.total_time_ms);
        metrics::record_tokens(final_metrics.tokens_used);

        MonitoredResult {
            response,
            metrics: final_metrics,
            cached: false,
            timestamp: Utc::now(),
            success: true,
        }
    }

    fn fail(&self, e: RagError, partial: RagMetrics) -> MonitoredResult {
        error!(
            total_time_ms = partial.total_time_ms,
            "[Monitoring] RAG query failed: {}",
            sanitize(&e.to_string())
        );

        {
            let _gate = self.gate.read();
            self.monitor.record_metrics(partial.clone());
        }
        metrics::record_query("failed");

        MonitoredResult {
            response: APOLOGY_RESPONSE.to_string(),
            metrics: partial,
            cached: false,
            timestamp: Utc::now(),
            success: false,
        }
    }

    /// Run several questions with the service defaults, at most `concurrency`
    /// at a time, reporting progress after each one. Results keep input order.
    pub async fn monitored_batch_query<F>(
        &self,
        questions: &[String],
        config: Option<&RagConfig>,
        concurrency: usize,
        mut on_progress: F,
    ) -> Vec<MonitoredResult>
    where
        F: FnMut(&BatchProgress),
    {
        let started = Instant::now();
        let total = questions.len();
        let options = self.default_options();
        let mut results = Vec::with_capacity(total);
        let mut failed = 0;

        let queries: Vec<_> = questions
            .iter()
            .map(|question| self.monitored_query(question, config, options.clone()))
            .collect();
        let mut pending = futures::stream::iter(queries).buffered(concurrency.max(1));

        while let Some(result) = pending.next().await {
            if !result.success {
                failed += 1;
            }
            results.push(result);

            let done = results.len();
            let avg_ms = elapsed_ms(started) as f64 / done as f64;
            on_progress(&BatchProgress {
                total,
                completed: done - failed,
                failed,
                estimated_time_remaining_ms: (avg_ms * (total - done) as f64).round() as u64,
            });
        }

        info!(
            "[Batch Complete] Processed {} questions in {}ms (success: {}, failed: {})",
            total,
            elapsed_ms(started),
            total - failed,
            failed
        );

        results
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
