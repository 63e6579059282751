//! Alert evaluation against configured thresholds

use super::dispatcher::AlertDispatcher;
use crate::config::AlertThresholds;
use crate::monitoring::bounded::BoundedLog;
use crate::monitoring::types::{Alert, AlertSeverity, AlertType, RequestMetric};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, warn};

/// `critical` past twice the threshold, `otherwise` above it
fn escalate(value: f64, threshold: f64, otherwise: AlertSeverity) -> AlertSeverity {
    if value > threshold * 2.0 {
        AlertSeverity::Critical
    } else {
        otherwise
    }
}

/// Checks completed requests and system-wide rates against thresholds
#[derive(Debug)]
pub struct AlertEvaluator {
    thresholds: AlertThresholds,
    alerts: BoundedLog<Alert>,
    dispatcher: Arc<AlertDispatcher>,
}

impl AlertEvaluator {
    pub fn new(thresholds: AlertThresholds, capacity: usize, dispatcher: Arc<AlertDispatcher>) -> Self {
        Self {
            thresholds,
            alerts: BoundedLog::new(capacity),
            dispatcher,
        }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    /// Raise every alert `metric` warrants
    pub fn evaluate(&self, metric: &RequestMetric) -> Vec<Alert> {
        let t = &self.thresholds;
        let route = metric.route();
        let mut raised = Vec::new();

        if metric.response_time_ms > t.response_time_ms {
            raised.push(Alert::new(
                AlertType::HighResponseTime,
                escalate(metric.response_time_ms, t.response_time_ms, AlertSeverity::High),
                format!(
                    "{} took {:.0}ms (threshold {:.0}ms)",
                    route, metric.response_time_ms, t.response_time_ms
                ),
                metric.response_time_ms,
                t.response_time_ms,
                Some(route.clone()),
            ));
        }

        let memory = metric.resources.memory_fraction;
        if memory > t.memory_fraction {
            let severity = if memory > 0.95 {
                AlertSeverity::Critical
            } else {
                AlertSeverity::High
            };
            raised.push(Alert::new(
                AlertType::HighMemory,
                severity,
                format!(
                    "Memory at {:.1}% of budget (threshold {:.1}%)",
                    memory * 100.0,
                    t.memory_fraction * 100.0
                ),
                memory,
                t.memory_fraction,
                Some(route.clone()),
            ));
        }

        let cpu = metric.resources.cpu_fraction;
        if cpu > t.cpu_fraction {
            raised.push(Alert::new(
                AlertType::HighCpu,
                escalate(cpu, t.cpu_fraction, AlertSeverity::High),
                format!(
                    "CPU at {:.1}% (threshold {:.1}%)",
                    cpu * 100.0,
                    t.cpu_fraction * 100.0
                ),
                cpu,
                t.cpu_fraction,
                Some(route.clone()),
            ));
        }

        if metric.db_query_time_ms > t.db_query_ms {
            raised.push(Alert::new(
                AlertType::SlowDbQuery,
                escalate(metric.db_query_time_ms, t.db_query_ms, AlertSeverity::Medium),
                format!(
                    "{} spent {:.0}ms in {} queries (threshold {:.0}ms)",
                    route, metric.db_query_time_ms, metric.db_query_count, t.db_query_ms
                ),
                metric.db_query_time_ms,
                t.db_query_ms,
                Some(route),
            ));
        }

        for alert in &raised {
            self.record(alert.clone());
        }
        raised
    }

    /// Error-rate check over a window; skipped below the minimum request count
    pub fn evaluate_error_rate(&self, total: usize, failed: usize) -> Option<Alert> {
        let t = &self.thresholds;
        if (total as u64) < t.min_requests_for_error_rate || total == 0 {
            return None;
        }

        let rate = failed as f64 / total as f64;
        if rate <= t.error_rate {
            return None;
        }

        let alert = Alert::new(
            AlertType::HighErrorRate,
            escalate(rate, t.error_rate, AlertSeverity::High),
            format!(
                "{} of {} requests failed ({:.1}%, threshold {:.1}%)",
                failed,
                total,
                rate * 100.0,
                t.error_rate * 100.0
            ),
            rate,
            t.error_rate,
            None,
        );
        self.record(alert.clone());
        Some(alert)
    }

    /// Append an alert; critical ones are surfaced immediately
    pub fn record(&self, alert: Alert) {
        match alert.severity {
            AlertSeverity::Critical => {
                error!(
                    alert_type = %alert.alert_type,
                    value = alert.value,
                    threshold = alert.threshold,
                    "CRITICAL ALERT: {}",
                    alert.message
                );
                self.dispatcher.enqueue(alert.clone());
            }
            AlertSeverity::High => warn!(alert_type = %alert.alert_type, "{}", alert.message),
            _ => {}
        }
        self.alerts.push(alert);
    }

    pub fn alerts(&self) -> &BoundedLog<Alert> {
        &self.alerts
    }

    /// Newest first, optionally only one severity
    pub fn recent(&self, severity: Option<AlertSeverity>, limit: usize) -> Vec<Alert> {
        self.alerts
            .find(limit, |alert| severity.is_none_or(|s| alert.severity == s))
    }

    pub fn counts_by_severity(&self, since: DateTime<Utc>) -> BTreeMap<AlertSeverity, usize> {
        let mut counts: BTreeMap<AlertSeverity, usize> =
            AlertSeverity::ALL.iter().map(|s| (*s, 0)).collect();
        for alert in self.alerts.since(since) {
            *counts.entry(alert.severity).or_default() += 1;
        }
        counts
    }

    pub fn counts_by_type(&self, since: DateTime<Utc>) -> BTreeMap<AlertType, usize> {
        let mut counts = BTreeMap::new();
        for alert in self.alerts.since(since) {
            *counts.entry(alert.alert_type).or_default() += 1;
        }
        counts
    }
}
