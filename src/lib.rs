// twinrag - monitored and cached RAG service for a professional digital twin
// Author: kelexine (https://github.com/kelexine)

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod metrics;
pub mod models;
pub mod monitor;
pub mod pipeline;
pub mod server;
pub mod utils;
pub mod vector;
