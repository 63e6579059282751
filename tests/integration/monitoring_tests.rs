//! Monitoring integration tests
//!
//! Request instrumentation through alerts, summaries, reports and
//! background tasks.

#[cfg(test)]
mod tests {
    use crate::assert_approx_eq;
    use crate::common::{MetricFactory, fixed_probe, memory_context, memory_context_with};
    use chrono::Utc;
    use std::time::Duration;
    use stockyard::Config;
    use stockyard::monitoring::{
        AlertSeverity, AlertType, BackgroundJobs, BackgroundTasks, ReportFormat,
        SummaryAggregator, SummaryPeriod,
    };

    // ==================== Request lifecycle ====================

    #[tokio::test]
    async fn test_request_lifecycle_with_db_time() {
        let ctx = memory_context().await;
        let monitoring = &ctx.monitoring;

        monitoring.request_start("req-1");
        monitoring.record_db_query("req-1", 700.0);
        monitoring.record_db_query("req-1", 600.0);
        assert_eq!(monitoring.pending_requests(), 1);

        let (metric, alerts) =
            monitoring.request_end("req-1", "/vehicles", "POST", 201, Some("user-7"));
        assert_eq!(monitoring.pending_requests(), 0);
        assert_eq!(metric.db_query_count, 2);
        assert_approx_eq!(metric.db_query_time_ms, 1300.0);
        assert_eq!(metric.user_id.as_deref(), Some("user-7"));

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::SlowDbQuery);
        assert_eq!(alerts[0].severity, AlertSeverity::Medium);
    }

    #[tokio::test]
    async fn test_end_without_start_records_near_zero_duration() {
        let ctx = memory_context().await;
        let (metric, _) = ctx
            .monitoring
            .request_end("never-started", "/parts", "GET", 200, None);
        assert!(metric.response_time_ms < 50.0);
        assert_eq!(ctx.monitoring.recent_metrics(10).len(), 1);
    }

    // ==================== Alerts ====================

    #[tokio::test]
    async fn test_memory_pressure_raises_critical_alert_and_dispatches() {
        // 0.97 of the 1 GiB host
        let probe = fixed_probe((0.97 * (1u64 << 30) as f64) as u64, 0.1);
        let ctx = memory_context_with(Config::default(), probe).await;

        let (metric, alerts) = ctx.monitoring.record_completed(
            "/parts",
            "GET",
            200,
            Duration::from_millis(20),
            None,
        );
        assert!(metric.resources.memory_fraction > 0.95);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::HighMemory);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);

        // The log channel accepts critical alerts.
        assert_eq!(ctx.monitoring.dispatch_pending().await, 1);
        assert_eq!(ctx.monitoring.dispatch_pending().await, 0);
    }

    #[tokio::test]
    async fn test_error_rate_alert_needs_minimum_volume() {
        let ctx = memory_context().await;
        let monitoring = &ctx.monitoring;

        for i in 0..19 {
            let status = if i < 3 { 500 } else { 200 };
            monitoring.record_completed("/sellers", "GET", status, Duration::from_millis(10), None);
        }
        assert!(monitoring.check_error_rate().is_none());

        monitoring.record_completed("/sellers", "GET", 200, Duration::from_millis(10), None);
        let alert = monitoring.check_error_rate().unwrap();
        assert_eq!(alert.alert_type, AlertType::HighErrorRate);
        // 3 / 20 = 0.15, more than twice the 0.05 threshold
        assert_eq!(alert.severity, AlertSeverity::Critical);

        let high_only = monitoring.alerts(Some(AlertSeverity::Critical), 10);
        assert_eq!(high_only.len(), 1);
    }

    // ==================== Summaries and reports ====================

    #[test]
    fn test_summary_window_excludes_old_metrics() {
        let metrics = vec![
            MetricFactory::completed("/parts", 200, 100.0, 10),
            MetricFactory::completed("/parts", 500, 300.0, 20),
            MetricFactory::completed("/vehicles", 200, 900.0, 2 * 3600),
        ];

        let hour = SummaryAggregator::summarize(SummaryPeriod::OneHour, &metrics, &[], Utc::now());
        assert_eq!(hour.requests.total, 2);
        assert_eq!(hour.requests.failed, 1);
        assert_approx_eq!(hour.requests.error_rate, 0.5);
        assert_approx_eq!(hour.requests.average_response_time, 200.0);
        assert_eq!(hour.slowest_endpoints.len(), 1);

        let six = SummaryAggregator::summarize(SummaryPeriod::SixHours, &metrics, &[], Utc::now());
        assert_eq!(six.requests.total, 3);
        assert_eq!(six.slowest_endpoints[0].endpoint, "GET /vehicles");
    }

    #[tokio::test]
    async fn test_report_counts_alerts_and_renders() {
        let ctx = memory_context().await;
        ctx.monitoring.record_completed(
            "/search",
            "GET",
            200,
            Duration::from_millis(4500),
            None,
        );

        let report = ctx.monitoring.report(SummaryPeriod::OneHour);
        assert_eq!(report.total_alerts(), 1);
        assert_eq!(report.alerts_by_severity.get(&AlertSeverity::Critical), Some(&1));
        assert_eq!(
            report.alerts_by_type.get(&AlertType::HighResponseTime),
            Some(&1)
        );
        assert!(!report.recommendations.is_empty());

        let html = ctx
            .monitoring
            .render_report(SummaryPeriod::OneHour, ReportFormat::Html)
            .unwrap();
        assert!(html.contains("GET /search"));

        let sent = ctx.monitoring.send_report(SummaryPeriod::OneHour).await.unwrap();
        assert_eq!(sent.period, SummaryPeriod::OneHour);
    }

    // ==================== Background tasks ====================

    #[tokio::test]
    async fn test_background_tasks_sample_and_stop() {
        let ctx = memory_context().await;
        let tasks = BackgroundTasks::start(ctx.monitoring.clone(), ctx.background_jobs());
        assert!(tasks.task_names().contains(&"system_sampler"));
        assert!(tasks.task_names().contains(&"quota_purge"));

        // The sampler fires immediately on start.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let snapshots = ctx.monitoring.system_snapshots(10);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].pools.len(), 2);
        assert!(snapshots[0].pools.iter().all(|p| p.healthy));

        tasks.shutdown().await;
    }

    #[tokio::test]
    async fn test_background_tasks_without_optional_jobs() {
        let ctx = memory_context().await;
        let tasks = BackgroundTasks::start(ctx.monitoring.clone(), BackgroundJobs::default());
        assert_eq!(
            tasks.task_names(),
            vec!["system_sampler", "retention", "alert_dispatcher"]
        );
        tasks.shutdown().await;
    }
}
