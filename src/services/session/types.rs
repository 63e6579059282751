//! Session types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stored session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub role: Option<String>,
    /// Arbitrary caller fields
    #[serde(default)]
    pub data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    /// Window re-armed on every read, in seconds
    pub ttl_secs: u64,
}

/// Input for creating a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSession {
    pub user_id: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl NewSession {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Partial update merged into an existing session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionUpdate {
    #[serde(default)]
    pub role: Option<String>,
    /// Fields to insert or overwrite; a JSON `null` removes the field
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Session {
    pub(super) fn apply(&mut self, update: SessionUpdate) {
        if let Some(role) = update.role {
            self.role = Some(role);
        }
        for (key, value) in update.data {
            if value.is_null() {
                self.data.remove(&key);
            } else {
                self.data.insert(key, value);
            }
        }
    }
}
