//! Configuration validation

use super::models::*;
use url::Url;

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for RedisConfig {
    fn validate(&self) -> Result<(), String> {
        if self.backend == StoreBackend::Redis && self.host.trim().is_empty() {
            return Err("Redis host cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("Redis port must be greater than 0".to_string());
        }
        if self.db < 0 {
            return Err("Redis database index cannot be negative".to_string());
        }
        if self.connect_timeout_ms == 0 {
            return Err("Redis connect timeout must be greater than 0".to_string());
        }
        if self.retry_step_ms > self.retry_max_delay_ms {
            return Err("Redis retry step cannot exceed the retry cap".to_string());
        }
        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.default_ttl == 0 {
            return Err("Cache default TTL must be greater than 0".to_string());
        }
        if self.scan_batch_size == 0 {
            return Err("Cache scan batch size must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for SessionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.prefix.is_empty() {
            return Err("Session prefix cannot be empty".to_string());
        }
        if self.default_ttl == 0 {
            return Err("Session TTL must be greater than 0".to_string());
        }
        if self.cleanup_grace >= self.default_ttl {
            return Err("Session cleanup grace must be shorter than the session TTL".to_string());
        }
        Ok(())
    }
}

impl Validate for QuotaClassConfig {
    fn validate(&self) -> Result<(), String> {
        if self.points == 0 {
            return Err("Quota points must be greater than 0".to_string());
        }
        if self.duration_secs == 0 {
            return Err("Quota duration must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<(), String> {
        self.auth.validate().map_err(|e| format!("auth: {}", e))?;
        self.general.validate().map_err(|e| format!("general: {}", e))?;
        self.api.validate().map_err(|e| format!("api: {}", e))?;
        if self.api_key_header.trim().is_empty() {
            return Err("API key header cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Validate for MonitoringConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_metrics == 0 || self.max_alerts == 0 || self.max_snapshots == 0 {
            return Err("Metric, alert and snapshot capacities must be greater than 0".to_string());
        }
        if self.retention_hours == 0 {
            return Err("Retention horizon must be greater than 0".to_string());
        }
        if self.sample_interval_secs == 0
            || self.retention_interval_secs == 0
            || self.dispatch_interval_secs == 0
        {
            return Err("Background intervals must be greater than 0".to_string());
        }
        if self.memory_budget_bytes == Some(0) {
            return Err("Memory budget must be greater than 0".to_string());
        }
        let t = &self.thresholds;
        if t.response_time_ms <= 0.0 || t.db_query_ms <= 0.0 {
            return Err("Time thresholds must be positive".to_string());
        }
        for (name, value) in [
            ("memory_fraction", t.memory_fraction),
            ("cpu_fraction", t.cpu_fraction),
            ("error_rate", t.error_rate),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(format!("{} must be in (0, 1]", name));
            }
        }
        Ok(())
    }
}

impl Validate for ReportingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.schedule_secs == Some(0) {
            return Err("Report schedule must be greater than 0".to_string());
        }
        if let Some(url) = &self.webhook_url {
            let parsed = Url::parse(url).map_err(|e| format!("Invalid webhook URL: {}", e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(format!(
                    "Webhook URL must use http:// or https:// scheme, got: {}",
                    parsed.scheme()
                ));
            }
        }
        Ok(())
    }
}
