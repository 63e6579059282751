//! Session directory configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key prefix for session records
    #[serde(default = "default_session_prefix")]
    pub prefix: String,
    /// Sliding TTL in seconds
    #[serde(default = "default_session_ttl")]
    pub default_ttl: u64,
    /// Sessions with at most this many seconds left are removed by the cleanup sweep
    #[serde(default = "default_session_cleanup_grace")]
    pub cleanup_grace: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prefix: default_session_prefix(),
            default_ttl: default_session_ttl(),
            cleanup_grace: default_session_cleanup_grace(),
        }
    }
}
