//! External dependency statistics for system snapshots

use super::types::PoolStats;
use crate::services::QuotaLimiter;
use crate::storage::KeyValueStore;
use async_trait::async_trait;
use std::sync::Arc;

/// Reports the state of one external dependency
#[async_trait]
pub trait DependencyStats: Send + Sync {
    async fn pool_stats(&self) -> PoolStats;
}

/// Key-value store connectivity
#[derive(Debug, Clone)]
pub struct StoreDependency {
    store: Arc<dyn KeyValueStore>,
}

impl StoreDependency {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DependencyStats for StoreDependency {
    async fn pool_stats(&self) -> PoolStats {
        let probe = self.store.ping().await;
        PoolStats {
            name: "kv_store".to_string(),
            backend: self.store.backend_name().to_string(),
            healthy: probe.is_ok(),
            detail: probe.err().map(|e| e.to_string()),
        }
    }
}

/// Which backend the quota limiter settled on
#[derive(Debug, Clone)]
pub struct QuotaDependency {
    limiter: QuotaLimiter,
}

impl QuotaDependency {
    pub fn new(limiter: QuotaLimiter) -> Self {
        Self { limiter }
    }
}

#[async_trait]
impl DependencyStats for QuotaDependency {
    async fn pool_stats(&self) -> PoolStats {
        PoolStats {
            name: "quota_limiter".to_string(),
            backend: self.limiter.backend_kind().to_string(),
            healthy: true,
            detail: (!self.limiter.is_enabled()).then(|| "disabled".to_string()),
        }
    }
}
