//! Root service configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Root configuration document
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Admin HTTP server
    #[serde(default)]
    pub server: ServerConfig,
    /// Key-value store
    #[serde(default)]
    pub storage: StorageConfig,
    /// Generic cache layer
    #[serde(default)]
    pub cache: CacheConfig,
    /// Distributed sessions
    #[serde(default)]
    pub session: SessionConfig,
    /// Quota classes
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Request instrumentation and sampling
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    /// Performance reports
    #[serde(default)]
    pub reporting: ReportingConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}
