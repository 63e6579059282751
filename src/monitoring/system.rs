//! Core MonitoringSystem implementation

use super::alerts::{AlertDispatcher, AlertEvaluator, NotificationChannel};
use super::dependencies::DependencyStats;
use super::metrics::{MetricsRecorder, ResourceProbe};
use super::report::{PerformanceReport, ReportFormat, ReportGenerator};
use super::retention::{RetentionManager, RetentionReport};
use super::sampler::SystemSampler;
use super::summary::{SummaryAggregator, SummaryWindow};
use super::types::{Alert, AlertSeverity, RequestMetric, SummaryPeriod, SystemSnapshot};
use crate::config::{MonitoringConfig, ReportingConfig};
use crate::utils::error::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Owns the instrumentation components and answers administrative queries
#[derive(Clone)]
pub struct MonitoringSystem {
    config: Arc<MonitoringConfig>,
    recorder: Arc<MetricsRecorder>,
    evaluator: Arc<AlertEvaluator>,
    sampler: Arc<SystemSampler>,
    dispatcher: Arc<AlertDispatcher>,
    retention: RetentionManager,
    reports: ReportGenerator,
    start_time: Instant,
}

impl std::fmt::Debug for MonitoringSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitoringSystem")
            .field("recorder", &self.recorder)
            .field("sampler", &self.sampler)
            .field("channels", &self.dispatcher.channel_names())
            .finish()
    }
}

impl MonitoringSystem {
    pub fn new(
        config: &MonitoringConfig,
        reporting: &ReportingConfig,
        probe: Arc<dyn ResourceProbe>,
    ) -> Self {
        let config = Arc::new(config.clone());
        let recorder = Arc::new(MetricsRecorder::new(
            config.max_metrics,
            probe.clone(),
            config.memory_budget_bytes,
        ));
        let dispatcher = Arc::new(AlertDispatcher::new(config.max_alerts));
        let evaluator = Arc::new(AlertEvaluator::new(
            config.thresholds.clone(),
            config.max_alerts,
            dispatcher.clone(),
        ));
        let sampler = Arc::new(SystemSampler::new(
            probe,
            config.max_snapshots,
            recorder.memory_budget(),
        ));

        info!(
            max_metrics = config.max_metrics,
            max_alerts = config.max_alerts,
            max_snapshots = config.max_snapshots,
            memory_budget = %crate::utils::format_bytes(recorder.memory_budget()),
            "Monitoring system initialized"
        );

        Self {
            retention: RetentionManager::new(config.retention()),
            reports: ReportGenerator::new(reporting.thresholds.clone()),
            config,
            recorder,
            evaluator,
            sampler,
            dispatcher,
            start_time: Instant::now(),
        }
    }

    pub fn add_channel(&self, channel: Arc<dyn NotificationChannel>) {
        self.dispatcher.add_channel(channel);
    }

    pub fn add_dependency(&self, dependency: Arc<dyn DependencyStats>) {
        self.sampler.add_dependency(dependency);
    }

    pub fn config(&self) -> &MonitoringConfig {
        &self.config
    }

    /// `false` when `correlation_id` is already in flight
    pub fn request_start(&self, correlation_id: &str) -> bool {
        self.recorder.request_start(correlation_id)
    }

    pub fn record_db_query(&self, correlation_id: &str, duration_ms: f64) {
        self.recorder.record_db_query(correlation_id, duration_ms);
    }

    /// Finish a request and evaluate alerts for it
    pub fn request_end(
        &self,
        correlation_id: &str,
        endpoint: &str,
        method: &str,
        status_code: u16,
        user_id: Option<&str>,
    ) -> (RequestMetric, Vec<Alert>) {
        let metric = self
            .recorder
            .request_end(correlation_id, endpoint, method, status_code, user_id);
        let alerts = self.evaluator.evaluate(&metric);
        (metric, alerts)
    }

    /// Record a request timed elsewhere and evaluate alerts for it
    pub fn record_completed(
        &self,
        endpoint: &str,
        method: &str,
        status_code: u16,
        response_time: Duration,
        user_id: Option<&str>,
    ) -> (RequestMetric, Vec<Alert>) {
        let id = uuid::Uuid::new_v4().to_string();
        let metric = self.recorder.record_completed(
            &id,
            endpoint,
            method,
            status_code,
            response_time,
            user_id,
        );
        let alerts = self.evaluator.evaluate(&metric);
        (metric, alerts)
    }

    /// Newest first
    pub fn recent_metrics(&self, limit: usize) -> Vec<RequestMetric> {
        self.recorder.metrics().recent(limit)
    }

    /// Newest first
    pub fn alerts(&self, severity: Option<AlertSeverity>, limit: usize) -> Vec<Alert> {
        self.evaluator.recent(severity, limit)
    }

    /// Newest first
    pub fn system_snapshots(&self, limit: usize) -> Vec<SystemSnapshot> {
        self.sampler.snapshots().recent(limit)
    }

    pub fn summary(&self, period: SummaryPeriod) -> SummaryWindow {
        let now = Utc::now();
        let cutoff = period.cutoff(now);
        SummaryAggregator::summarize(
            period,
            &self.recorder.metrics().since(cutoff),
            &self.sampler.snapshots().since(cutoff),
            now,
        )
    }

    pub fn report(&self, period: SummaryPeriod) -> PerformanceReport {
        let summary = self.summary(period);
        let cutoff = period.cutoff(summary.generated_at);
        self.reports.generate(
            summary,
            self.evaluator.counts_by_severity(cutoff),
            self.evaluator.counts_by_type(cutoff),
        )
    }

    pub fn render_report(&self, period: SummaryPeriod, format: ReportFormat) -> Result<String> {
        self.reports.render(&self.report(period), format)
    }

    /// Build a report and deliver it to every notification channel
    pub async fn send_report(&self, period: SummaryPeriod) -> Result<PerformanceReport> {
        let report = self.report(period);
        self.reports.deliver(&report, &self.dispatcher).await?;
        Ok(report)
    }

    /// Sampler tick: capture a snapshot, then check the last hour's error rate
    pub async fn sample_system(&self) -> SystemSnapshot {
        let snapshot = self.sampler.sample().await;
        self.check_error_rate();
        snapshot
    }

    pub fn check_error_rate(&self) -> Option<Alert> {
        let requests = self.summary(SummaryPeriod::OneHour).requests;
        self.evaluator
            .evaluate_error_rate(requests.total, requests.failed)
    }

    /// Retention tick
    pub fn sweep(&self) -> RetentionReport {
        self.retention
            .sweep(&self.recorder, &self.evaluator, &self.sampler, Utc::now())
    }

    /// Dispatcher tick
    pub async fn dispatch_pending(&self) -> usize {
        if self.dispatcher.pending_len() == 0 {
            return 0;
        }
        let delivered = self.dispatcher.process_pending().await;
        debug!(delivered, "Dispatched critical alerts");
        delivered
    }

    pub fn pending_requests(&self) -> usize {
        self.recorder.pending_count()
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
