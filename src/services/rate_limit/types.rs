//! Quota types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Independently configured quota policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaClass {
    /// Strict limit for authentication endpoints
    Auth,
    General,
    /// High-volume limit for API-key clients
    Api,
}

impl QuotaClass {
    pub const ALL: [QuotaClass; 3] = [QuotaClass::Auth, QuotaClass::General, QuotaClass::Api];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaClass::Auth => "auth",
            QuotaClass::General => "general",
            QuotaClass::Api => "api",
        }
    }
}

impl fmt::Display for QuotaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which backend holds the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Counters shared by every process through the store
    Distributed,
    /// Per-process counters
    Local,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Distributed => f.write_str("distributed"),
            BackendKind::Local => f.write_str("local"),
        }
    }
}

/// Metadata attached to every quota outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaMeta {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
    /// Only set on rejection
    #[serde(with = "opt_secs", default)]
    pub retry_after: Option<Duration>,
}

impl QuotaMeta {
    /// Retry-After header value, rounded up to whole seconds
    pub fn retry_after_secs(&self) -> Option<u64> {
        self.retry_after
            .map(|d| d.as_secs() + u64::from(d.subsec_nanos() > 0))
    }
}

/// Result of consuming a point
#[derive(Debug, Clone, PartialEq)]
pub enum QuotaDecision {
    Allowed(QuotaMeta),
    Rejected(QuotaMeta),
}

impl QuotaDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, QuotaDecision::Allowed(_))
    }

    pub fn meta(&self) -> &QuotaMeta {
        match self {
            QuotaDecision::Allowed(meta) | QuotaDecision::Rejected(meta) => meta,
        }
    }
}

/// Current state of one client key in one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaStatus {
    pub consumed: u32,
    pub remaining: u32,
    pub reset_at: Option<DateTime<Utc>>,
    pub blocked_until: Option<DateTime<Utc>>,
}

/// Per-class result of an administrative operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassOutcome<T> {
    pub class: QuotaClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ClassOutcome<T> {
    pub fn from_result(class: QuotaClass, result: crate::utils::error::Result<T>) -> Self {
        match result {
            Ok(value) => Self {
                class,
                value: Some(value),
                error: None,
            },
            Err(e) => Self {
                class,
                value: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Serialize an optional duration as whole seconds
mod opt_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs_f64().ceil()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let secs: Option<f64> = Option::deserialize(d)?;
        Ok(secs.map(|s| Duration::from_secs_f64(s.max(0.0))))
    }
}
