// Statistics, health export and reset for the monitored pipeline
// Author: kelexine (https://github.com/kelexine)

use super::service::RagService;
use crate::cache::CacheStats;
use crate::monitor::{AverageMetrics, MonitorStats, Percentiles, PerformanceThresholds};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Hit rate above which the cache is considered effective.
const HEALTHY_HIT_RATE: f64 = 0.3;

/// Cache and monitor snapshot taken together.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceStats {
    pub cache: CacheStats,
    pub performance: MonitorStats,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Advisory only.
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSummary {
    pub hit_rate: f64,
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub total_queries: usize,
    pub averages: AverageMetrics,
    pub percentiles: Percentiles,
}

/// Dashboard/export view with health assessment.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsExport {
    pub timestamp: DateTime<Utc>,
    pub cache: CacheSummary,
    pub performance: PerformanceSummary,
    pub health: HealthReport,
}

/// Cheap liveness view used by health endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LivenessSummary {
    pub status: HealthStatus,
    pub total_queries: usize,
    pub cache_hit_rate: f64,
    pub cache_size: usize,
}

impl RagService {
    pub fn get_performance_stats(&self) -> PerformanceStats {
        let _gate = self.gate.read();
        PerformanceStats {
            cache: self.cache.stats(),
            performance: self.monitor.stats(),
            timestamp: Utc::now(),
        }
    }

    pub fn get_cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn export_metrics(&self) -> MetricsExport {
        let stats = self.get_performance_stats();
        let status = if stats.cache.hit_rate > HEALTHY_HIT_RATE {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };
        let recommendations = health_recommendations(&stats, &stats.performance.thresholds);

        MetricsExport {
            timestamp: Utc::now(),
            cache: CacheSummary {
                hit_rate: stats.cache.hit_rate,
                size: stats.cache.size,
                hits: stats.cache.hits,
                misses: stats.cache.misses,
            },
            performance: PerformanceSummary {
                total_queries: stats.performance.total_queries,
                averages: stats.performance.averages,
                percentiles: stats.performance.percentiles,
            },
            health: HealthReport {
                status,
                recommendations,
            },
        }
    }

    /// Healthy while the cache is warming up (fewer than 10 queries) or
    /// serving more than 20% of lookups.
    pub fn health_summary(&self) -> LivenessSummary {
        let stats = self.get_performance_stats();
        let healthy = stats.cache.hit_rate > 0.2 || stats.performance.total_queries < 10;
        LivenessSummary {
            status: if healthy {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
            total_queries: stats.performance.total_queries,
            cache_hit_rate: stats.cache.hit_rate,
            cache_size: stats.cache.size,
        }
    }

    /// Clear the response cache and the metrics history together.
    pub fn clear_monitoring(&self) {
        let _gate = self.gate.write();
        self.cache.clear();
        self.monitor.clear_history();
        info!("[Monitoring] All caches and metrics cleared");
    }
}

/// Independent advisory rules over a stats snapshot.
pub fn health_recommendations(
    stats: &PerformanceStats,
    thresholds: &PerformanceThresholds,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if stats.cache.hit_rate < HEALTHY_HIT_RATE {
        recommendations.push("Low cache hit rate. Consider increasing cache size or TTL.".to_string());
    }

    let avg_total = stats.performance.averages.total_time_ms.unwrap_or(0);
    if avg_total > thresholds.max_total_time_ms {
        recommendations.push(
            "Average query time exceeds threshold. Consider optimizing query enhancement or using faster models."
                .to_string(),
        );
    }

    let p95 = stats.performance.percentiles.p95 as f64;
    if p95 > thresholds.max_total_time_ms as f64 * 1.5 {
        recommendations.push(
            "95th percentile response time is high. Investigate slow queries and add timeouts."
                .to_string(),
        );
    }

    if recommendations.is_empty() {
        recommendations.push("System is performing optimally.".to_string());
    }

    recommendations
}
