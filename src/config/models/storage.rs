//! Key-value store configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Redis configuration
    #[serde(default)]
    pub redis: RedisConfig,
}

/// Which store implementation backs the cache and session layers
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Shared Redis instance
    #[default]
    Redis,
    /// Process-local map, for single-node development
    Memory,
}

/// Redis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Store implementation
    #[serde(default)]
    pub backend: StoreBackend,
    /// Redis host
    #[serde(default = "default_redis_host")]
    pub host: String,
    /// Redis port
    #[serde(default = "default_redis_port")]
    pub port: u16,
    /// Password (AUTH)
    #[serde(default)]
    pub password: Option<String>,
    /// Logical database index
    #[serde(default)]
    pub db: i64,
    /// Connect timeout in milliseconds
    #[serde(default = "default_connection_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Retries for connection setup and reconnectable command failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff step per attempt in milliseconds
    #[serde(default = "default_retry_step_ms")]
    pub retry_step_ms: u64,
    /// Backoff cap in milliseconds
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            host: default_redis_host(),
            port: default_redis_port(),
            password: None,
            db: 0,
            connect_timeout_ms: default_connection_timeout_ms(),
            max_retries: default_max_retries(),
            retry_step_ms: default_retry_step_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl RedisConfig {
    /// Connection URL assembled from host, port, credential and db index
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) if !password.is_empty() => format!(
                "redis://:{}@{}:{}/{}",
                urlencode(password),
                self.host,
                self.port,
                self.db
            ),
            _ => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn urlencode(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
