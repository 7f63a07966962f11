//! Structured logging and secret-scrubbing trace utilities.
//!
//! This module configures the `tracing` ecosystem for the application,
//! supporting multiple output formats and providing utilities to prevent
//! API keys from leaking into logs via echoed upstream error bodies.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static SANITIZE: AtomicBool = AtomicBool::new(true);

/// Initializes the global tracing subscriber for the application.
///
/// Supports two output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `pretty` (default): Human-readable, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    SANITIZE.store(config.sanitize_secrets, Ordering::Relaxed);

    // Configure filter from environment or config file
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

/// Sanitizes secrets from text that is about to be logged.
///
/// Replaces Groq API keys (`gsk_...`) and the credential part of
/// `Bearer ...` headers with a `\[REDACTED\]` placeholder. Disabled when
/// `logging.sanitize_secrets` is false.
pub fn sanitize(input: &str) -> String {
    if !SANITIZE.load(Ordering::Relaxed) {
        return input.to_string();
    }

    let mut result = redact_after(input, "gsk_", "[REDACTED_API_KEY]", true);
    result = redact_after(&result, "Bearer ", "[REDACTED]", false);
    result
}

/// Replace every token starting at `marker` up to the next delimiter.
/// With `include_marker` the marker itself is replaced too.
fn redact_after(input: &str, marker: &str, placeholder: &str, include_marker: bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(marker) {
        let token_start = pos + marker.len();
        let end = rest[token_start..]
            .find(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == ',')
            .map(|i| token_start + i)
            .unwrap_or(rest.len());

        out.push_str(&rest[..pos]);
        if !include_marker {
            out.push_str(marker);
        }
        out.push_str(placeholder);
        rest = &rest[end..];
    }

    out.push_str(rest);
    out
}

/// Shorten a question for log lines.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
