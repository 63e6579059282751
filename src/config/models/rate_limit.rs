//! Quota configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Policy for a single quota class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaClassConfig {
    /// Points available per window
    pub points: u32,
    /// Window length in seconds
    pub duration_secs: u64,
    /// Block the client this long once the window is exhausted
    #[serde(default)]
    pub block_duration_secs: Option<u64>,
}

impl QuotaClassConfig {
    pub fn new(points: u32, duration_secs: u64, block_duration_secs: Option<u64>) -> Self {
        Self {
            points,
            duration_secs,
            block_duration_secs,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    pub fn block_duration(&self) -> Option<Duration> {
        self.block_duration_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn default_auth_class() -> QuotaClassConfig {
    QuotaClassConfig::new(5, 900, Some(900))
}

fn default_general_class() -> QuotaClassConfig {
    QuotaClassConfig::new(100, 900, None)
}

fn default_api_class() -> QuotaClassConfig {
    QuotaClassConfig::new(1000, 3600, None)
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Strict class for authentication endpoints
    #[serde(default = "default_auth_class")]
    pub auth: QuotaClassConfig,
    /// Default class
    #[serde(default = "default_general_class")]
    pub general: QuotaClassConfig,
    /// High-volume class for API-key clients
    #[serde(default = "default_api_class")]
    pub api: QuotaClassConfig,
    /// Path prefixes routed to the auth class
    #[serde(default = "default_auth_paths")]
    pub auth_paths: Vec<String>,
    /// Header carrying the client API key
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    /// Header carrying the authenticated user id
    #[serde(default = "default_user_id_header")]
    pub user_id_header: String,
    /// Prefix for counter keys in the shared store
    #[serde(default = "default_quota_key_prefix")]
    pub key_prefix: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auth: default_auth_class(),
            general: default_general_class(),
            api: default_api_class(),
            auth_paths: default_auth_paths(),
            api_key_header: default_api_key_header(),
            user_id_header: default_user_id_header(),
            key_prefix: default_quota_key_prefix(),
        }
    }
}
