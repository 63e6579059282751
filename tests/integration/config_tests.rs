//! Configuration integration tests
//!
//! Files on disk through to a wired application context.

#[cfg(test)]
mod tests {
    use crate::common::{fixed_probe, memory_context_with};
    use crate::{assert_err, assert_ok};
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;
    use stockyard::config::{LogFormat, StoreBackend};
    use stockyard::services::QuotaClass;
    use stockyard::{Config, ServiceError};
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // ==================== Loading ====================

    #[tokio::test]
    async fn test_shipped_example_config_loads_with_defaults() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/stockyard.yaml.example");
        let config = assert_ok!(Config::from_file(&path).await);
        let defaults = Config::default();

        assert_eq!(config.server().port, defaults.server().port);
        assert_eq!(config.storage().redis.backend, StoreBackend::Redis);
        assert_eq!(config.app.rate_limit.auth, defaults.app.rate_limit.auth);
        assert_eq!(config.app.session.default_ttl, 86_400);
        assert_eq!(config.app.reporting.webhook_url, None);
    }

    #[tokio::test]
    async fn test_file_values_reach_the_context() {
        let file = write_config(
            r#"
cache:
  prefix: "yard:"
  default_ttl: 120
session:
  default_ttl: 600
rate_limit:
  general:
    points: 7
    duration_secs: 30
monitoring:
  max_metrics: 2
logging:
  format: json
"#,
        );

        let config = assert_ok!(Config::from_file(file.path()).await);
        assert_eq!(config.app.logging.format, LogFormat::Json);

        let ctx = memory_context_with(config, fixed_probe(1 << 20, 0.0)).await;
        assert_eq!(ctx.cache.namespaced("part:1"), "yard:part:1");
        assert_eq!(ctx.cache.default_ttl(), Duration::from_secs(120));
        assert_eq!(ctx.limiter.policy(QuotaClass::General).points, 7);

        let session = ctx
            .sessions
            .create_session("s", stockyard::services::NewSession::new("1"), None)
            .await
            .unwrap();
        assert_eq!(session.ttl_secs, 600);

        // The metric log keeps only the newest two entries.
        for endpoint in ["/a", "/b", "/c"] {
            ctx.monitoring
                .record_completed(endpoint, "GET", 200, Duration::from_millis(1), None);
        }
        let recent = ctx.monitoring.recent_metrics(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].endpoint, "/c");
    }

    #[tokio::test]
    async fn test_disabled_rate_limit_is_reported() {
        let file = write_config("rate_limit:\n  enabled: false\n");
        let config = assert_ok!(Config::from_file(file.path()).await);
        let ctx = memory_context_with(config, fixed_probe(1 << 20, 0.0)).await;
        assert!(!ctx.limiter.is_enabled());
    }

    // ==================== Rejection ====================

    #[tokio::test]
    async fn test_invalid_values_are_config_errors() {
        let cases = [
            "cache:\n  default_ttl: 0\n",
            "rate_limit:\n  auth:\n    points: 0\n    duration_secs: 60\n",
            "server:\n  port: not-a-port\n",
            "logging:\n  format: xml\n",
        ];

        for case in cases {
            let file = write_config(case);
            let err = assert_err!(Config::from_file(file.path()).await);
            assert!(
                matches!(err, ServiceError::Config(_)),
                "expected a config error for {:?}, got {:?}",
                case,
                err
            );
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let err = assert_err!(Config::from_file("/nonexistent/stockyard.yaml").await);
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
