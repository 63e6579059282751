//! Monitoring configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Capacity of the request metric list
    #[serde(default = "default_max_metrics")]
    pub max_metrics: usize,
    /// Capacity of the alert list
    #[serde(default = "default_max_alerts")]
    pub max_alerts: usize,
    /// Capacity of the system snapshot list
    #[serde(default = "default_max_snapshots")]
    pub max_snapshots: usize,
    /// Entries older than this are dropped by the retention sweep
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,
    /// System sampler cadence in seconds
    #[serde(default = "default_sample_interval")]
    pub sample_interval_secs: u64,
    /// Retention sweep cadence in seconds
    #[serde(default = "default_retention_interval")]
    pub retention_interval_secs: u64,
    /// Critical alert dispatch cadence in seconds
    #[serde(default = "default_dispatch_interval")]
    pub dispatch_interval_secs: u64,
    /// Denominator for the memory alert; total system memory when unset
    #[serde(default)]
    pub memory_budget_bytes: Option<u64>,
    /// Alert thresholds
    #[serde(default)]
    pub thresholds: AlertThresholds,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            max_metrics: default_max_metrics(),
            max_alerts: default_max_alerts(),
            max_snapshots: default_max_snapshots(),
            retention_hours: default_retention_hours(),
            sample_interval_secs: default_sample_interval(),
            retention_interval_secs: default_retention_interval(),
            dispatch_interval_secs: default_dispatch_interval(),
            memory_budget_bytes: None,
            thresholds: AlertThresholds::default(),
        }
    }
}

impl MonitoringConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_hours * 3600)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs(self.sample_interval_secs)
    }

    pub fn retention_interval(&self) -> Duration {
        Duration::from_secs(self.retention_interval_secs)
    }

    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_secs(self.dispatch_interval_secs)
    }
}

/// Thresholds checked against every completed request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertThresholds {
    /// Response time in milliseconds
    #[serde(default = "default_response_time_threshold")]
    pub response_time_ms: f64,
    /// Process memory as a fraction of the memory budget
    #[serde(default = "default_memory_threshold")]
    pub memory_fraction: f64,
    /// Process CPU as a fraction of all cores
    #[serde(default = "default_cpu_threshold")]
    pub cpu_fraction: f64,
    /// Accumulated database time per request in milliseconds
    #[serde(default = "default_db_query_threshold")]
    pub db_query_ms: f64,
    /// Failed / total requests over the last hour
    #[serde(default = "default_error_rate_threshold")]
    pub error_rate: f64,
    /// Error rate is only judged once this many requests were seen
    #[serde(default = "default_min_requests_for_error_rate")]
    pub min_requests_for_error_rate: u64,
}

fn default_response_time_threshold() -> f64 {
    2000.0
}

fn default_memory_threshold() -> f64 {
    0.9
}

fn default_cpu_threshold() -> f64 {
    0.8
}

fn default_db_query_threshold() -> f64 {
    1000.0
}

fn default_error_rate_threshold() -> f64 {
    0.05
}

fn default_min_requests_for_error_rate() -> u64 {
    20
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            response_time_ms: default_response_time_threshold(),
            memory_fraction: default_memory_threshold(),
            cpu_fraction: default_cpu_threshold(),
            db_query_ms: default_db_query_threshold(),
            error_rate: default_error_rate_threshold(),
            min_requests_for_error_rate: default_min_requests_for_error_rate(),
        }
    }
}
