//! Time-based eviction of in-memory logs

use super::alerts::AlertEvaluator;
use super::metrics::MetricsRecorder;
use super::sampler::SystemSampler;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Entries removed by one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetentionReport {
    pub metrics: usize,
    pub alerts: usize,
    pub snapshots: usize,
    /// Requests that started but never finished
    pub pending: usize,
}

impl RetentionReport {
    pub fn total(&self) -> usize {
        self.metrics + self.alerts + self.snapshots + self.pending
    }
}

/// Drops everything older than the retention horizon
#[derive(Debug, Clone, Copy)]
pub struct RetentionManager {
    horizon: Duration,
}

impl RetentionManager {
    pub fn new(horizon: Duration) -> Self {
        Self { horizon }
    }

    pub fn horizon(&self) -> Duration {
        self.horizon
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - chrono::Duration::from_std(self.horizon).unwrap_or_else(|_| chrono::Duration::zero())
    }

    pub fn sweep(
        &self,
        recorder: &MetricsRecorder,
        evaluator: &AlertEvaluator,
        sampler: &SystemSampler,
        now: DateTime<Utc>,
    ) -> RetentionReport {
        let cutoff = self.cutoff(now);
        let report = RetentionReport {
            metrics: recorder.metrics().retain_since(cutoff),
            alerts: evaluator.alerts().retain_since(cutoff),
            snapshots: sampler.snapshots().retain_since(cutoff),
            pending: recorder.purge_pending_before(cutoff),
        };
        if report.total() > 0 {
            debug!(?report, "Retention sweep removed expired entries");
        }
        report
    }
}
