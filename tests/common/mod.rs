// Scripted collaborators shared by the integration tests
// Author: kelexine (https://github.com/kelexine)

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use twinrag::cache::{CacheConfig, ResponseCache};
use twinrag::error::{RagError, Result};
use twinrag::models::{RagConfig, SearchResult};
use twinrag::monitor::{PerformanceMonitor, PerformanceThresholds};
use twinrag::pipeline::{LlmBackend, RagService, VectorSearch};

/// What a scripted stage does when called.
#[derive(Clone)]
pub enum Step<T> {
    Return(T),
    /// Sleep (on the tokio clock), then return.
    Delay(u64, T),
    Fail,
    Hang,
}

impl<T: Clone> Step<T> {
    async fn run(&self, stage: &str) -> Result<T> {
        match self {
            Step::Return(v) => Ok(v.clone()),
            Step::Delay(ms, v) => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                Ok(v.clone())
            }
            Step::Fail => Err(RagError::LlmApi(format!("{} failed", stage))),
            Step::Hang => std::future::pending().await,
        }
    }
}

pub struct ScriptedLlm {
    pub available: bool,
    pub enhance: Step<String>,
    pub format: Step<String>,
    pub enhance_calls: Mutex<Vec<String>>,
    pub format_calls: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(enhance: Step<String>, format: Step<String>) -> Self {
        Self {
            available: true,
            enhance,
            format,
            enhance_calls: Mutex::new(Vec::new()),
            format_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        let mut llm = Self::new(Step::Fail, Step::Fail);
        llm.available = false;
        llm
    }
}

#[async_trait]
impl LlmBackend for ScriptedLlm {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn enhance_query(&self, question: &str, _config: Option<&RagConfig>) -> Result<String> {
        self.enhance_calls.lock().push(question.to_string());
        self.enhance.run("enhance").await
    }

    async fn format_for_interview(
        &self,
        _results: &[SearchResult],
        question: &str,
        _config: Option<&RagConfig>,
    ) -> Result<String> {
        self.format_calls.lock().push(question.to_string());
        self.format.run("format").await
    }
}

pub struct ScriptedSearch {
    pub step: Step<Vec<SearchResult>>,
    pub queries: Mutex<Vec<(String, bool)>>,
}

impl ScriptedSearch {
    pub fn new(step: Step<Vec<SearchResult>>) -> Self {
        Self {
            step,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorSearch for ScriptedSearch {
    async fn search(&self, query: &str, use_internal_enhancement: bool) -> Result<Vec<SearchResult>> {
        self.queries
            .lock()
            .push((query.to_string(), use_internal_enhancement));
        match self.step.run("search").await {
            Err(_) => Err(RagError::VectorSearch("search failed".to_string())),
            other => other,
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

pub fn profile_results() -> Vec<SearchResult> {
    vec![
        SearchResult::new("Built 10+ production APIs", 0.9),
        SearchResult::new("Led a team of 5 developers", 0.8),
    ]
}

pub fn service(llm: Arc<ScriptedLlm>, search: Arc<ScriptedSearch>) -> RagService {
    RagService::from_parts(
        llm,
        search,
        ResponseCache::new(CacheConfig::default()),
        PerformanceMonitor::new(1000, PerformanceThresholds::default()),
    )
}
