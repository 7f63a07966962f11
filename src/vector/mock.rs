// In-memory profile corpus with keyword scoring, for development and tests
// Author: kelexine (https://github.com/kelexine)

use super::enhance_for_search;
use crate::error::Result;
use crate::models::SearchResult;
use crate::pipeline::{LlmBackend, VectorSearch};
use async_trait::async_trait;
use serde_json::json;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// Score added per query word found in an item.
const KEYWORD_BOOST: f32 = 0.05;

/// (content, base score, section, category)
const PROFILE: &[(&str, f32, &str, &str)] = &[
    (
        "Full-stack developer with 5+ years of experience in Python, JavaScript, and TypeScript. Successfully built and deployed 15+ production applications.",
        0.92, "overview", "experience",
    ),
    (
        "FastAPI expertise: Built 10+ production APIs serving 1000+ daily queries. Implemented authentication, rate limiting, and comprehensive API documentation.",
        0.90, "technical_skills", "backend",
    ),
    (
        "Next.js and React: Developed 5+ production web applications with 50+ reusable components. Expert in server-side rendering and static site generation.",
        0.88, "technical_skills", "frontend",
    ),
    (
        "AI/ML Projects: Implemented RAG systems with 95% accuracy using OpenAI and Groq APIs. Built digital twin platform serving 1000+ daily queries.",
        0.87, "projects", "ai_ml",
    ),
    (
        "Database Design: Designed schemas for PostgreSQL (3+ projects), MongoDB (2 projects), and implemented Redis caching for 40% performance improvement.",
        0.85, "technical_skills", "database",
    ),
    (
        "DevOps Excellence: Set up CI/CD pipelines reducing deployment time by 60%. Docker containerization and automated testing for all projects.",
        0.84, "achievements", "devops",
    ),
    (
        "Vector Databases: Implemented Upstash and Pinecone for semantic search in 3 production projects. Expert in embeddings and similarity search.",
        0.83, "technical_skills", "vector_db",
    ),
    (
        "Real-time Analytics Dashboard: Built system handling 10,000+ concurrent users with WebSocket integration and live data updates.",
        0.82, "projects", "analytics",
    ),
    (
        "Team Leadership: Led teams of 3-5 developers on multiple projects. Mentored junior developers and conducted code reviews.",
        0.80, "soft_skills", "leadership",
    ),
    (
        "MCP Server Integration: Reduced API latency by 40% through optimized caching and request batching. Implemented Model Context Protocol for AI systems.",
        0.79, "projects", "optimization",
    ),
];

/// Keyword-scored search over a fixed professional profile.
pub struct MockVectorStore {
    top_k: usize,
    llm: Option<Arc<dyn LlmBackend>>,
}

impl MockVectorStore {
    pub fn new(top_k: usize) -> Self {
        Self { top_k, llm: None }
    }

    /// Attach an LLM used when a search asks for internal enhancement.
    pub fn with_llm(mut self, llm: Arc<dyn LlmBackend>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn corpus_size() -> usize {
        PROFILE.len()
    }

    fn score(&self, query: &str) -> Vec<SearchResult> {
        let query = query.to_lowercase();
        let keywords: Vec<&str> = query.split_whitespace().collect();

        let mut scored: Vec<SearchResult> = PROFILE
            .iter()
            .map(|(content, base, section, category)| {
                let lower = content.to_lowercase();
                let matches = keywords.iter().filter(|k| lower.contains(**k)).count();
                let score = (base + KEYWORD_BOOST * matches as f32).min(1.0);
                SearchResult::new(*content, score).with_metadata(json!({
                    "source": "profile",
                    "section": section,
                    "category": category,
                }))
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(self.top_k);
        scored
    }
}

#[async_trait]
impl VectorSearch for MockVectorStore {
    async fn search(&self, query: &str, use_internal_enhancement: bool) -> Result<Vec<SearchResult>> {
        let query = if use_internal_enhancement {
            enhance_for_search(self.llm.as_deref(), query).await
        } else {
            query.to_string()
        };

        debug!("[VectorDB] Using mock data for query: {}", query);
        Ok(self.score(&query))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_top_k_sorted() {
        let store = MockVectorStore::new(3);
        let results = store.search("anything", false).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_keyword_boost_reorders_results() {
        let store = MockVectorStore::new(1);
        let results = store.search("team leadership mentored", false).await.unwrap();
        assert!(results[0].content.starts_with("Team Leadership"));
        assert!((results[0].score - 0.95).abs() < 1e-4);
        assert_eq!(results[0].metadata.as_ref().unwrap()["category"], "leadership");
    }

    #[tokio::test]
    async fn test_score_capped_at_one() {
        let store = MockVectorStore::new(1);
        let results = store
            .search("full-stack developer with years of experience in python", false)
            .await
            .unwrap();
        assert_eq!(results[0].score, 1.0);
    }

    #[tokio::test]
    async fn test_top_k_larger_than_corpus() {
        let store = MockVectorStore::new(50);
        let results = store.search("react", false).await.unwrap();
        assert_eq!(results.len(), MockVectorStore::corpus_size());
    }
}
