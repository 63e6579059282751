//! Configuration management for the service
//!
//! This module handles loading, validation, and environment overrides.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{Result, ServiceError};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the service
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Service configuration
    pub app: AppConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ServiceError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml_str(&content)?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate a YAML document. An empty document yields the defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let app: AppConfig = if content.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(content)
                .map_err(|e| ServiceError::Config(format!("Failed to parse config: {}", e)))?
        };

        let config = Self { app };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `STOCKYARD_*` / `REDIS_*` environment variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        let app = &mut self.app;

        if let Ok(host) = std::env::var("STOCKYARD_HOST") {
            app.server.host = host;
        }
        if let Some(port) = parse_env::<u16>("STOCKYARD_PORT")? {
            app.server.port = port;
        }
        if let Ok(token) = std::env::var("STOCKYARD_ADMIN_TOKEN") {
            app.server.admin_token = Some(token);
        }
        if let Ok(host) = std::env::var("REDIS_HOST") {
            app.storage.redis.host = host;
        }
        if let Some(port) = parse_env::<u16>("REDIS_PORT")? {
            app.storage.redis.port = port;
        }
        if let Ok(password) = std::env::var("REDIS_PASSWORD") {
            app.storage.redis.password = Some(password);
        }
        if let Some(db) = parse_env::<i64>("REDIS_DB")? {
            app.storage.redis.db = db;
        }
        if let Ok(url) = std::env::var("STOCKYARD_REPORT_WEBHOOK") {
            app.reporting.webhook_url = Some(url);
        }
        if let Ok(format) = std::env::var("STOCKYARD_LOG_FORMAT") {
            app.logging.format = format.parse().map_err(ServiceError::Config)?;
        }

        Ok(())
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.app.server
    }

    /// Get storage configuration
    pub fn storage(&self) -> &StorageConfig {
        &self.app.storage
    }

    /// Get monitoring configuration
    pub fn monitoring(&self) -> &MonitoringConfig {
        &self.app.monitoring
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.app
            .storage
            .redis
            .validate()
            .map_err(|e| ServiceError::Config(format!("Storage config error: {}", e)))?;
        self.app
            .cache
            .validate()
            .map_err(|e| ServiceError::Config(format!("Cache config error: {}", e)))?;
        self.app
            .session
            .validate()
            .map_err(|e| ServiceError::Config(format!("Session config error: {}", e)))?;
        self.app
            .rate_limit
            .validate()
            .map_err(|e| ServiceError::Config(format!("Rate limit config error: {}", e)))?;
        self.app
            .monitoring
            .validate()
            .map_err(|e| ServiceError::Config(format!("Monitoring config error: {}", e)))?;
        self.app
            .reporting
            .validate()
            .map_err(|e| ServiceError::Config(format!("Reporting config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.app)
            .map_err(|e| ServiceError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ServiceError::Config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_config_from_file() {
        let config_content = r#"
server:
  host: "127.0.0.1"
  port: 9000
storage:
  redis:
    host: "cache.internal"
    db: 2
rate_limit:
  auth:
    points: 3
    duration_secs: 60
    block_duration_secs: 120
monitoring:
  max_metrics: 500
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = Config::from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.server().host, "127.0.0.1");
        assert_eq!(config.server().port, 9000);
        assert_eq!(config.storage().redis.host, "cache.internal");
        assert_eq!(config.storage().redis.db, 2);
        assert_eq!(config.app.rate_limit.auth.points, 3);
        assert_eq!(config.app.rate_limit.general.points, 100);
        assert_eq!(config.monitoring().max_metrics, 500);
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = Config::from_yaml_str("").unwrap();
        assert_eq!(config.server().port, 8080);
        assert_eq!(config.app.cache.default_ttl, 3600);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Config::from_yaml_str("monitoring:\n  max_metrics: 0\n");
        assert!(matches!(result, Err(ServiceError::Config(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = Config::from_file("/nonexistent/stockyard.yaml").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_yaml_roundtrip_keeps_values() {
        let mut config = Config::default();
        config.app.session.default_ttl = 1800;
        let yaml = config.to_yaml().unwrap();
        let parsed = Config::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.app.session.default_ttl, 1800);
    }
}
