//! Configuration data models
//!
//! This module defines all configuration structures used throughout the service.

pub mod app;
pub mod cache;
pub mod logging;
pub mod monitoring;
pub mod rate_limit;
pub mod reporting;
pub mod server;
pub mod session;
pub mod storage;

// Re-export all configuration types
pub use app::*;
pub use cache::*;
pub use logging::*;
pub use monitoring::*;
pub use rate_limit::*;
pub use reporting::*;
pub use server::*;
pub use session::*;
pub use storage::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default admin server port
pub fn default_port() -> u16 {
    8080
}

pub fn default_true() -> bool {
    true
}

pub fn default_redis_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_redis_port() -> u16 {
    6379
}

pub fn default_connection_timeout_ms() -> u64 {
    5000
}

pub fn default_max_retries() -> u32 {
    3
}

pub fn default_retry_step_ms() -> u64 {
    50
}

pub fn default_retry_max_delay_ms() -> u64 {
    2000
}

pub fn default_cache_prefix() -> String {
    "stockyard:".to_string()
}

pub fn default_cache_ttl() -> u64 {
    3600 // 1 hour
}

pub fn default_scan_batch_size() -> usize {
    100
}

pub fn default_session_prefix() -> String {
    "session:".to_string()
}

pub fn default_session_ttl() -> u64 {
    86400 // 24 hours
}

pub fn default_session_cleanup_grace() -> u64 {
    5
}

pub fn default_quota_key_prefix() -> String {
    "rl".to_string()
}

pub fn default_api_key_header() -> String {
    "x-api-key".to_string()
}

pub fn default_user_id_header() -> String {
    "x-user-id".to_string()
}

pub fn default_auth_paths() -> Vec<String> {
    vec!["/api/auth".to_string(), "/auth".to_string()]
}

pub fn default_max_metrics() -> usize {
    10_000
}

pub fn default_max_alerts() -> usize {
    1_000
}

/// 24 hours of samples at the default one-minute cadence
pub fn default_max_snapshots() -> usize {
    1_440
}

pub fn default_retention_hours() -> u64 {
    24
}

pub fn default_sample_interval() -> u64 {
    60
}

pub fn default_retention_interval() -> u64 {
    300 // 5 minutes
}

pub fn default_dispatch_interval() -> u64 {
    5
}

pub fn default_log_level() -> String {
    "info".to_string()
}
