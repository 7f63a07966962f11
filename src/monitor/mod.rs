// Performance monitoring module
// Author: kelexine (https://github.com/kelexine)

pub mod models;
pub mod performance;

pub use models::{
    AverageMetrics, MonitorStats, Percentiles, PerformanceThresholds, Threshold, ThresholdViolation,
};
pub use performance::{nearest_rank, PerformanceMonitor};
