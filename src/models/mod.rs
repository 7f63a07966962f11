//! Data models shared across the RAG pipeline.
//!
//! This module contains the type definitions used by:
//! - Per-query metrics and the monitored result (`metrics`)
//! - Vector search results (`search`)
//! - Interview-style configurations and type detection (`interview`)

// Author: kelexine (https://github.com/kelexine)

pub mod interview;
pub mod metrics;
pub mod search;

pub use interview::{detect_interview_type, InterviewType, RagConfig};
pub use metrics::{MonitoredResult, RagMetrics};
pub use search::SearchResult;
