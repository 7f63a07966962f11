//! Utility functions and helpers for the twinrag service.
//!
//! This module provides cross-cutting concerns like structured logging,
//! secret sanitization, and retry logic with backoff for upstream calls.
//!
//! # Submodules
//!
//! - `logging`: Tracing and logging initialization with secret filters.
//! - `retry`: Retry mechanisms that respect upstream rate limit hints.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod logging;
pub mod retry;
