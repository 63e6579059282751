//! Report configuration

use serde::{Deserialize, Serialize};

/// Performance report configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReportingConfig {
    /// Send a report on this cadence (seconds); disabled when unset
    #[serde(default)]
    pub schedule_secs: Option<u64>,
    /// Webhook receiving critical alerts and reports
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Recommendation thresholds
    #[serde(default)]
    pub thresholds: RecommendationThresholds,
}

/// Thresholds that trigger report recommendations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationThresholds {
    /// Mean response time in milliseconds
    #[serde(default = "default_avg_response_ms")]
    pub avg_response_ms: f64,
    /// Failed / total requests
    #[serde(default = "default_error_rate")]
    pub error_rate: f64,
    /// Mean sampled memory fraction
    #[serde(default = "default_memory_fraction")]
    pub memory_fraction: f64,
    /// Mean response time of the slowest endpoint in milliseconds
    #[serde(default = "default_slow_endpoint_ms")]
    pub slow_endpoint_ms: f64,
}

fn default_avg_response_ms() -> f64 {
    1000.0
}

fn default_error_rate() -> f64 {
    0.05
}

fn default_memory_fraction() -> f64 {
    0.8
}

fn default_slow_endpoint_ms() -> f64 {
    2000.0
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            avg_response_ms: default_avg_response_ms(),
            error_rate: default_error_rate(),
            memory_fraction: default_memory_fraction(),
            slow_endpoint_ms: default_slow_endpoint_ms(),
        }
    }
}
