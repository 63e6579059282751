//! Error handling integration tests
//!
//! How failures surface over HTTP, and which ones the service absorbs.

#[cfg(test)]
mod tests {
    use crate::common::{fixed_probe, memory_context, memory_context_with};
    use crate::{assert_err, assert_ok};
    use actix_web::http::StatusCode;
    use actix_web::{ResponseError, test, web};
    use serde_json::Value;
    use std::sync::Arc;
    use stockyard::config::{MonitoringConfig, ReportingConfig};
    use stockyard::monitoring::{MonitoringSystem, NotificationChannel, WebhookChannel};
    use stockyard::monitoring::{AlertSeverity, SummaryPeriod};
    use stockyard::server::{AppState, HttpServer};
    use stockyard::services::BackendKind;
    use stockyard::storage::RedisPool;
    use stockyard::{AppContext, Config, ServiceError};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn offline_context() -> AppContext {
        assert_ok!(
            AppContext::with_store(
                Config::default(),
                Arc::new(RedisPool::create_offline()),
                fixed_probe(64 << 20, 0.05),
            )
            .await
        )
    }

    async fn failing_webhook() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        server
    }

    // ==================== Error bodies ====================

    #[actix_web::test]
    async fn test_store_errors_hide_details() {
        let err = ServiceError::store_unavailable("10.0.0.5:6379 refused");
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "STORE_UNAVAILABLE");
        assert!(!body["error"]["message"].as_str().unwrap().contains("10.0.0.5"));
    }

    // ==================== Store outage ====================

    #[actix_web::test]
    async fn test_offline_store_degrades_health_but_keeps_serving() {
        let ctx = offline_context().await;
        assert_eq!(ctx.limiter.backend_kind(), BackendKind::Local);
        let app =
            test::init_service(HttpServer::create_app(web::Data::new(AppState::new(&ctx)))).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["status"], "degraded");
        assert_eq!(body["data"]["store"]["healthy"], false);
        assert_eq!(body["data"]["quota"]["backend"], "local");

        // Quotas keep working on the local backend.
        let req = test::TestRequest::get()
            .uri("/admin/summary?period=1h")
            .insert_header(("x-user-id", "7"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key("x-ratelimit-remaining"));
    }

    #[tokio::test]
    async fn test_offline_store_snapshot_marks_pool_unhealthy() {
        let ctx = offline_context().await;
        let snapshot = ctx.monitoring.sample_system().await;
        let store = snapshot
            .pools
            .iter()
            .find(|pool| pool.name == "kv_store")
            .unwrap();
        assert!(!store.healthy);
        assert!(store.detail.is_some());
    }

    // ==================== Notification failures ====================

    #[tokio::test]
    async fn test_report_survives_one_failing_channel() {
        let webhook = failing_webhook().await;
        let mut config = Config::default();
        config.app.reporting.webhook_url = Some(format!("{}/hook", webhook.uri()));

        let ctx = memory_context_with(config, fixed_probe(64 << 20, 0.05)).await;
        let report = assert_ok!(ctx.monitoring.send_report(SummaryPeriod::OneHour).await);
        assert_eq!(report.period, SummaryPeriod::OneHour);
        assert_eq!(webhook.received_requests().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_report_fails_when_every_channel_fails() {
        let webhook = failing_webhook().await;
        let monitoring = MonitoringSystem::new(
            &MonitoringConfig::default(),
            &ReportingConfig::default(),
            fixed_probe(64 << 20, 0.05),
        );
        let channel = assert_ok!(WebhookChannel::new(
            format!("{}/hook", webhook.uri()),
            AlertSeverity::Critical,
        ));
        assert_eq!(channel.name(), "webhook");
        monitoring.add_channel(Arc::new(channel));

        let err = assert_err!(monitoring.send_report(SummaryPeriod::OneHour).await);
        assert!(matches!(err, ServiceError::Notification(_)));

        let ctx = AppContext {
            monitoring,
            ..memory_context().await
        };
        let app =
            test::init_service(HttpServer::create_app(web::Data::new(AppState::new(&ctx)))).await;
        let req = test::TestRequest::post()
            .uri("/admin/report/send?period=1h")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "NOTIFICATION_FAILED");
    }

    #[tokio::test]
    async fn test_critical_alert_delivery_failure_is_absorbed() {
        let webhook = failing_webhook().await;
        let mut config = Config::default();
        config.app.reporting.webhook_url = Some(format!("{}/hook", webhook.uri()));
        // 0.99 of the 1 GiB host
        let probe = fixed_probe((0.99 * (1u64 << 30) as f64) as u64, 0.05);
        let ctx = memory_context_with(config, probe).await;

        let (_, alerts) = ctx.monitoring.record_completed(
            "/parts",
            "GET",
            200,
            std::time::Duration::from_millis(5),
            None,
        );
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);

        // The log channel delivered; the webhook failed and was logged.
        assert_eq!(ctx.monitoring.dispatch_pending().await, 1);
        assert_eq!(webhook.received_requests().await.unwrap().len(), 1);
    }
}
