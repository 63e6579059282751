//! Notification channel implementations

use crate::monitoring::report::PerformanceReport;
use crate::monitoring::types::{Alert, AlertSeverity};
use crate::utils::error::{Result, ServiceError};
use std::time::Duration;
use tracing::{error, info, warn};

/// Notification channel trait
#[async_trait::async_trait]
pub trait NotificationChannel: Send + Sync + std::fmt::Debug {
    async fn send_alert(&self, alert: &Alert) -> Result<()>;

    /// Deliver a report; `rendered` is the human-readable form
    async fn send_report(&self, report: &PerformanceReport, rendered: &str) -> Result<()>;

    /// Get channel name
    fn name(&self) -> &str;

    /// Check if channel supports severity level
    fn supports_severity(&self, severity: AlertSeverity) -> bool;
}

/// Writes alerts and reports to the tracing log
#[derive(Debug, Clone)]
pub struct LogChannel {
    min_severity: AlertSeverity,
}

impl LogChannel {
    pub fn new(min_severity: AlertSeverity) -> Self {
        Self { min_severity }
    }
}

impl Default for LogChannel {
    fn default() -> Self {
        Self::new(AlertSeverity::Critical)
    }
}

#[async_trait::async_trait]
impl NotificationChannel for LogChannel {
    async fn send_alert(&self, alert: &Alert) -> Result<()> {
        match alert.severity {
            AlertSeverity::Critical => error!(
                alert_id = %alert.id,
                alert_type = %alert.alert_type,
                "Alert notification: {}",
                alert.message
            ),
            _ => warn!(
                alert_id = %alert.id,
                alert_type = %alert.alert_type,
                "Alert notification: {}",
                alert.message
            ),
        }
        Ok(())
    }

    async fn send_report(&self, report: &PerformanceReport, _rendered: &str) -> Result<()> {
        let requests = &report.summary.requests;
        info!(
            period = %report.period,
            total = requests.total,
            error_rate = requests.error_rate,
            avg_ms = requests.average_response_time,
            recommendations = report.recommendations.len(),
            "Performance report"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }

    fn supports_severity(&self, severity: AlertSeverity) -> bool {
        severity >= self.min_severity
    }
}

/// Slack-compatible incoming webhook
#[derive(Debug, Clone)]
pub struct WebhookChannel {
    webhook_url: String,
    username: String,
    min_severity: AlertSeverity,
    client: reqwest::Client,
}

impl WebhookChannel {
    pub fn new(webhook_url: impl Into<String>, min_severity: AlertSeverity) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            webhook_url: webhook_url.into(),
            username: "Stockyard Monitoring".to_string(),
            min_severity,
            client,
        })
    }

    async fn post(&self, payload: &serde_json::Value) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| ServiceError::notification(format!("Failed to send webhook: {}", e)))?;

        if !response.status().is_success() {
            return Err(ServiceError::notification(format!(
                "Webhook returned status: {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl NotificationChannel for WebhookChannel {
    async fn send_alert(&self, alert: &Alert) -> Result<()> {
        let color = match alert.severity {
            AlertSeverity::Low => "#36a64f",
            AlertSeverity::Medium => "#ffcc00",
            AlertSeverity::High => "#ff9500",
            AlertSeverity::Critical => "#ff0000",
        };

        let payload = serde_json::json!({
            "username": self.username,
            "text": format!("[{}] {}", alert.severity.as_str().to_uppercase(), alert.message),
            "attachments": [{
                "color": color,
                "title": alert.alert_type.as_str(),
                "fields": [
                    { "title": "Value", "value": format!("{:.2}", alert.value), "short": true },
                    { "title": "Threshold", "value": format!("{:.2}", alert.threshold), "short": true },
                    {
                        "title": "Time",
                        "value": alert.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                        "short": true
                    }
                ],
                "ts": alert.timestamp.timestamp()
            }]
        });

        self.post(&payload).await
    }

    async fn send_report(&self, _report: &PerformanceReport, rendered: &str) -> Result<()> {
        let payload = serde_json::json!({
            "username": self.username,
            "text": rendered,
        });
        self.post(&payload).await
    }

    fn name(&self) -> &str {
        "webhook"
    }

    fn supports_severity(&self, severity: AlertSeverity) -> bool {
        severity >= self.min_severity
    }
}
