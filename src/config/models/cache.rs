//! Cache configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Namespace prepended to every cache key
    #[serde(default = "default_cache_prefix")]
    pub prefix: String,
    /// TTL in seconds applied when a caller gives none
    #[serde(default = "default_cache_ttl")]
    pub default_ttl: u64,
    /// Keys requested per SCAN page during pattern deletes
    #[serde(default = "default_scan_batch_size")]
    pub scan_batch_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prefix: default_cache_prefix(),
            default_ttl: default_cache_ttl(),
            scan_batch_size: default_scan_batch_size(),
        }
    }
}
