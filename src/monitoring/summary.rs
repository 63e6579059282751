//! Windowed summaries over the metric and snapshot logs

use super::types::{RequestMetric, SummaryPeriod, SystemSnapshot};
use crate::utils::ratio;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of endpoints in the slowest ranking
pub const SLOWEST_ENDPOINTS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTotals {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Milliseconds
    pub average_response_time: f64,
    pub error_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointStats {
    /// `METHOD path`
    pub endpoint: String,
    pub average_response_time: f64,
    pub max_response_time: f64,
    pub calls: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemAverages {
    pub samples: usize,
    pub average_cpu: f64,
    pub peak_cpu: f64,
    pub average_memory: f64,
    pub peak_memory: f64,
}

/// Projection of one trailing window; recomputed on every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryWindow {
    pub period: SummaryPeriod,
    pub generated_at: DateTime<Utc>,
    pub requests: RequestTotals,
    pub slowest_endpoints: Vec<EndpointStats>,
    pub system: SystemAverages,
}

/// Builds [`SummaryWindow`]s. Reads only; never mutates the logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryAggregator;

impl SummaryAggregator {
    /// `metrics` and `snapshots` may hold entries outside the window; they are filtered here
    pub fn summarize(
        period: SummaryPeriod,
        metrics: &[RequestMetric],
        snapshots: &[SystemSnapshot],
        now: DateTime<Utc>,
    ) -> SummaryWindow {
        let cutoff = period.cutoff(now);
        let window: Vec<&RequestMetric> = metrics.iter().filter(|m| m.finished_at >= cutoff).collect();
        let samples: Vec<&SystemSnapshot> =
            snapshots.iter().filter(|s| s.timestamp >= cutoff).collect();

        SummaryWindow {
            period,
            generated_at: now,
            requests: Self::totals(&window),
            slowest_endpoints: Self::slowest(&window),
            system: Self::system(&samples),
        }
    }

    fn totals(window: &[&RequestMetric]) -> RequestTotals {
        let total = window.len();
        let successful = window.iter().filter(|m| m.is_success()).count();
        let failed = total - successful;
        let time: f64 = window.iter().map(|m| m.response_time_ms).sum();

        RequestTotals {
            total,
            successful,
            failed,
            average_response_time: ratio(time, total as f64),
            error_rate: ratio(failed as f64, total as f64),
        }
    }

    fn slowest(window: &[&RequestMetric]) -> Vec<EndpointStats> {
        let mut grouped: HashMap<String, (f64, f64, usize)> = HashMap::new();
        for metric in window {
            let entry = grouped.entry(metric.route()).or_insert((0.0, 0.0, 0));
            entry.0 += metric.response_time_ms;
            entry.1 = entry.1.max(metric.response_time_ms);
            entry.2 += 1;
        }

        let mut ranked: Vec<EndpointStats> = grouped
            .into_iter()
            .map(|(endpoint, (sum, max, calls))| EndpointStats {
                endpoint,
                average_response_time: ratio(sum, calls as f64),
                max_response_time: max,
                calls,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.average_response_time
                .total_cmp(&a.average_response_time)
                .then_with(|| a.endpoint.cmp(&b.endpoint))
        });
        ranked.truncate(SLOWEST_ENDPOINTS);
        ranked
    }

    fn system(samples: &[&SystemSnapshot]) -> SystemAverages {
        let count = samples.len() as f64;
        let cpu: Vec<f64> = samples.iter().map(|s| s.host.cpu_fraction).collect();
        let memory: Vec<f64> = samples.iter().map(|s| s.memory_fraction).collect();

        SystemAverages {
            samples: samples.len(),
            average_cpu: ratio(cpu.iter().sum(), count),
            peak_cpu: cpu.iter().copied().fold(0.0, f64::max),
            average_memory: ratio(memory.iter().sum(), count),
            peak_memory: memory.iter().copied().fold(0.0, f64::max),
        }
    }
}
