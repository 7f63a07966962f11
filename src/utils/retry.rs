// Retry logic with upstream "try again in" hint support
// Author: kelexine (https://github.com/kelexine)

use backoff::{backoff::Backoff, ExponentialBackoff};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

static TRY_AGAIN: OnceLock<Regex> = OnceLock::new();

/// Parse the retry hint Groq embeds in rate limit errors
/// (e.g. "Please try again in 7.66s", "try again in 350ms").
/// Returns the suggested delay, capped at 60 seconds.
pub fn parse_retry_delay(error_body: &str) -> Option<Duration> {
    let re = TRY_AGAIN.get_or_init(|| {
        Regex::new(r"try again in ([0-9]+(?:\.[0-9]+)?)(ms|s)").expect("valid retry hint regex")
    });

    let caps = re.captures(error_body)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let seconds = match caps.get(2)?.as_str() {
        "ms" => value / 1000.0,
        _ => value,
    };

    // Cap at 60 seconds
    let capped_seconds = seconds.min(60.0);
    Some(Duration::from_millis((capped_seconds * 1000.0) as u64))
}

/// Create exponential backoff configuration for retries
pub fn create_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        current_interval: Duration::from_millis(250),
        initial_interval: Duration::from_millis(250),
        randomization_factor: 0.3,
        multiplier: 2.0,
        max_interval: Duration::from_secs(5),
        max_elapsed_time: Some(Duration::from_secs(30)),
        ..Default::default()
    }
}

/// Determine if an HTTP status code is retryable
pub fn is_retryable(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Execute an upstream call with retry logic.
/// - Uses the upstream retry hint if available
/// - Falls back to exponential backoff
/// - Gives up after `max_attempts`
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    max_attempts: u32,
    mut operation: F,
) -> Result<T, (u16, String)>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, (u16, String)>>,
{
    let mut backoff = create_backoff();
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result);
            }
            Err((status, error_body)) => {
                if !is_retryable(status) || attempt >= max_attempts {
                    return Err((status, error_body));
                }

                let delay = match parse_retry_delay(&error_body) {
                    Some(hint) => hint,
                    None => backoff.next_backoff().unwrap_or(Duration::from_secs(5)),
                };
                debug!(
                    "{} failed with {} (attempt {}), retrying after {}ms",
                    operation_name,
                    status,
                    attempt,
                    delay.as_millis()
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}
