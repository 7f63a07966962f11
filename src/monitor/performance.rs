// Performance monitor - bounded metrics history with averages and percentiles
// Author: kelexine (https://github.com/kelexine)

use super::models::{
    AverageMetrics, MonitorStats, Percentiles, PerformanceThresholds, Threshold, ThresholdViolation,
};
use crate::metrics;
use crate::models::RagMetrics;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Ring buffer of the most recent per-query metrics.
pub struct PerformanceMonitor {
    history: Mutex<VecDeque<RagMetrics>>,
    max_history: usize,
    thresholds: PerformanceThresholds,
}

impl PerformanceMonitor {
    pub fn new(max_history: usize, thresholds: PerformanceThresholds) -> Self {
        let max_history = max_history.max(1);
        Self {
            history: Mutex::new(VecDeque::with_capacity(max_history.min(1024))),
            max_history,
            thresholds,
        }
    }

    /// Append a record, dropping the oldest once the history is full, then
    /// check it against the thresholds. Violations are logged and returned;
    /// they never fail the query.
    pub fn record_metrics(&self, record: RagMetrics) -> Vec<ThresholdViolation> {
        let violations = self.check_thresholds(&record);

        {
            let mut history = self.history.lock();
            history.push_back(record);
            while history.len() > self.max_history {
                history.pop_front();
            }
        }

        if !violations.is_empty() {
            for violation in &violations {
                metrics::record_threshold_violation(violation.threshold.as_str());
            }
            warn!(
                "[Performance Warning] {}",
                violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            );
        }

        violations
    }

    fn check_thresholds(&self, m: &RagMetrics) -> Vec<ThresholdViolation> {
        let t = &self.thresholds;
        [
            (Threshold::TotalTime, m.total_time_ms, t.max_total_time_ms),
            (
                Threshold::QueryEnhancementTime,
                m.query_enhancement_time_ms,
                t.max_query_enhancement_time_ms,
            ),
            (
                Threshold::VectorSearchTime,
                m.vector_search_time_ms,
                t.max_vector_search_time_ms,
            ),
            (
                Threshold::ResponseFormattingTime,
                m.response_formatting_time_ms,
                t.max_response_formatting_time_ms,
            ),
            (Threshold::Tokens, m.tokens_used, t.max_tokens_per_query),
        ]
        .into_iter()
        .filter(|(_, actual, limit)| actual > limit)
        .map(|(threshold, actual, limit)| ThresholdViolation {
            threshold,
            actual,
            limit,
        })
        .collect()
    }

    pub fn average_metrics(&self) -> AverageMetrics {
        let history = self.history.lock();
        if history.is_empty() {
            return AverageMetrics::default();
        }

        let count = history.len() as f64;
        let mean = |f: fn(&RagMetrics) -> u64| -> u64 {
            let sum: u64 = history.iter().map(f).sum();
            (sum as f64 / count).round() as u64
        };

        AverageMetrics {
            total_time_ms: Some(mean(|m| m.total_time_ms)),
            query_enhancement_time_ms: Some(mean(|m| m.query_enhancement_time_ms)),
            vector_search_time_ms: Some(mean(|m| m.vector_search_time_ms)),
            response_formatting_time_ms: Some(mean(|m| m.response_formatting_time_ms)),
            tokens_used: Some(mean(|m| m.tokens_used)),
            cache_hit_rate: Some(history.iter().map(|m| m.cache_hit_rate).sum::<f64>() / count),
        }
    }

    pub fn percentiles(&self) -> Percentiles {
        let mut times: Vec<u64> = self.history.lock().iter().map(|m| m.total_time_ms).collect();
        if times.is_empty() {
            return Percentiles::default();
        }
        times.sort_unstable();

        Percentiles {
            p50: nearest_rank(&times, 50.0),
            p95: nearest_rank(&times, 95.0),
            p99: nearest_rank(&times, 99.0),
        }
    }

    pub fn stats(&self) -> MonitorStats {
        MonitorStats {
            total_queries: self.len(),
            averages: self.average_metrics(),
            percentiles: self.percentiles(),
            thresholds: self.thresholds.clone(),
        }
    }

    pub fn thresholds(&self) -> &PerformanceThresholds {
        &self.thresholds
    }

    pub fn len(&self) -> usize {
        self.history.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
        debug!("[Performance Monitor] Metrics history cleared");
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(1000, PerformanceThresholds::default())
    }
}

/// Nearest-rank percentile of an ascending, non-empty slice:
/// index `ceil(p/100 * n) - 1`, clamped to the slice.
pub fn nearest_rank(sorted: &[u64], p: f64) -> u64 {
    let n = sorted.len();
    let rank = ((p / 100.0) * n as f64).ceil() as isize - 1;
    let index = rank.clamp(0, n as isize - 1) as usize;
    sorted[index]
}
