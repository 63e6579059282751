//! Shared monitoring types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Anything kept in a time-bounded log
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Process resources observed at request completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// Resident set size in bytes
    pub memory_bytes: u64,
    /// Resident set size over the memory budget
    pub memory_fraction: f64,
    /// Process CPU normalised across cores, 0.0 to 1.0
    pub cpu_fraction: f64,
}

/// One completed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMetric {
    /// Correlation id
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub response_time_ms: f64,
    pub endpoint: String,
    pub method: String,
    pub status_code: u16,
    pub user_id: Option<String>,
    pub resources: ResourceUsage,
    pub db_query_time_ms: f64,
    pub db_query_count: u32,
}

impl RequestMetric {
    pub fn is_success(&self) -> bool {
        self.status_code < 400
    }

    /// Grouping key, e.g. `GET /parts`
    pub fn route(&self) -> String {
        format!("{} {}", self.method, self.endpoint)
    }
}

impl Timestamped for RequestMetric {
    fn timestamp(&self) -> DateTime<Utc> {
        self.finished_at
    }
}

/// Host memory in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryTotals {
    pub total: u64,
    pub free: u64,
    pub used: u64,
}

/// Host-wide readings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HostUsage {
    /// `1 - idle / total` across all cores
    pub cpu_fraction: f64,
    /// 1, 5 and 15 minute load averages
    pub load_average: [f64; 3],
    pub memory: MemoryTotals,
}

/// Readings for this process
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessUsage {
    pub memory_bytes: u64,
    pub cpu_fraction: f64,
    pub uptime_secs: u64,
}

/// State of an external dependency such as the key-value store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    pub name: String,
    pub backend: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Periodic system sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub timestamp: DateTime<Utc>,
    pub host: HostUsage,
    pub process: ProcessUsage,
    /// Process memory over the memory budget
    pub memory_fraction: f64,
    pub pools: Vec<PoolStats>,
}

impl Timestamped for SystemSnapshot {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Alert kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    HighResponseTime,
    HighMemory,
    HighCpu,
    SlowDbQuery,
    HighErrorRate,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::HighResponseTime => "high_response_time",
            AlertType::HighMemory => "high_memory",
            AlertType::HighCpu => "high_cpu",
            AlertType::SlowDbQuery => "slow_db_query",
            AlertType::HighErrorRate => "high_error_rate",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity levels, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub const ALL: [AlertSeverity; 4] = [
        AlertSeverity::Low,
        AlertSeverity::Medium,
        AlertSeverity::High,
        AlertSeverity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(AlertSeverity::Low),
            "medium" => Ok(AlertSeverity::Medium),
            "high" => Ok(AlertSeverity::High),
            "critical" => Ok(AlertSeverity::Critical),
            other => Err(format!("unknown severity: {}", other)),
        }
    }
}

/// Threshold breach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    /// Observed value
    pub value: f64,
    pub threshold: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Alert {
    pub fn new(
        alert_type: AlertType,
        severity: AlertSeverity,
        message: impl Into<String>,
        value: f64,
        threshold: f64,
        endpoint: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            alert_type,
            severity,
            message: message.into(),
            value,
            threshold,
            timestamp: Utc::now(),
            endpoint,
        }
    }
}

impl Timestamped for Alert {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Trailing window for summaries and reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SummaryPeriod {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[default]
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
}

impl SummaryPeriod {
    pub fn duration(&self) -> Duration {
        const HOUR: u64 = 3600;
        match self {
            SummaryPeriod::OneHour => Duration::from_secs(HOUR),
            SummaryPeriod::SixHours => Duration::from_secs(6 * HOUR),
            SummaryPeriod::OneDay => Duration::from_secs(24 * HOUR),
            SummaryPeriod::SevenDays => Duration::from_secs(7 * 24 * HOUR),
        }
    }

    /// Earliest timestamp inside the window ending at `now`
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - chrono::Duration::from_std(self.duration()).unwrap_or_else(|_| chrono::Duration::zero())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryPeriod::OneHour => "1h",
            SummaryPeriod::SixHours => "6h",
            SummaryPeriod::OneDay => "24h",
            SummaryPeriod::SevenDays => "7d",
        }
    }
}

impl fmt::Display for SummaryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(SummaryPeriod::OneHour),
            "6h" => Ok(SummaryPeriod::SixHours),
            "24h" => Ok(SummaryPeriod::OneDay),
            "7d" => Ok(SummaryPeriod::SevenDays),
            other => Err(format!("unknown period '{}', expected 1h, 6h, 24h or 7d", other)),
        }
    }
}
