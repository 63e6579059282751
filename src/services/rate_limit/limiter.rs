//! Quota limiter

use super::backend::{QuotaBackend, QuotaPolicy};
use super::identity::ClientIdentity;
use super::memory_backend::MemoryQuotaBackend;
use super::redis_backend::RedisQuotaBackend;
use super::types::{BackendKind, ClassOutcome, QuotaClass, QuotaDecision, QuotaStatus};
use crate::config::RateLimitConfig;
use crate::storage::KeyValueStore;
use crate::utils::error::Result;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Backend-agnostic limiter over the three quota classes
#[derive(Clone)]
pub struct QuotaLimiter {
    backend: Arc<dyn QuotaBackend>,
    auth: QuotaPolicy,
    general: QuotaPolicy,
    api: QuotaPolicy,
    auth_paths: Vec<String>,
    enabled: bool,
}

impl std::fmt::Debug for QuotaLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaLimiter")
            .field("backend", &self.backend.kind())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl QuotaLimiter {
    /// Probe the store once and pick the backend.
    ///
    /// A failed probe selects the local backend: limiting keeps working but
    /// limits become per process until restart.
    pub async fn from_config(config: &RateLimitConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let backend: Arc<dyn QuotaBackend> = match store.ping().await {
            Ok(()) => {
                info!(store = store.backend_name(), "Quota limiter using distributed backend");
                Arc::new(RedisQuotaBackend::new(store, config.key_prefix.clone()))
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Key-value store unreachable; quota limiter degraded to local per-process backend"
                );
                Arc::new(MemoryQuotaBackend::new())
            }
        };
        Self::with_backend(config, backend)
    }

    pub fn with_backend(config: &RateLimitConfig, backend: Arc<dyn QuotaBackend>) -> Self {
        Self {
            backend,
            auth: QuotaPolicy::from_config(QuotaClass::Auth, &config.auth),
            general: QuotaPolicy::from_config(QuotaClass::General, &config.general),
            api: QuotaPolicy::from_config(QuotaClass::Api, &config.api),
            auth_paths: config.auth_paths.clone(),
            enabled: config.enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn policy(&self, class: QuotaClass) -> &QuotaPolicy {
        match class {
            QuotaClass::Auth => &self.auth,
            QuotaClass::General => &self.general,
            QuotaClass::Api => &self.api,
        }
    }

    /// Auth path prefix first, then API-key clients, then everything else
    pub fn classify(&self, path: &str, identity: &ClientIdentity) -> QuotaClass {
        if self.auth_paths.iter().any(|prefix| path.starts_with(prefix.as_str())) {
            QuotaClass::Auth
        } else if identity.has_api_key() {
            QuotaClass::Api
        } else {
            QuotaClass::General
        }
    }

    /// Charge one point to `key` in `class`
    pub async fn consume(&self, class: QuotaClass, key: &str) -> Result<QuotaDecision> {
        let decision = self.backend.consume(key, self.policy(class), 1).await?;
        if !decision.is_allowed() {
            debug!(key, %class, retry_after = ?decision.meta().retry_after, "Quota rejected");
        }
        Ok(decision)
    }

    /// Status in every class; one class failing does not hide the others
    pub async fn status(&self, key: &str) -> Vec<ClassOutcome<Option<QuotaStatus>>> {
        let lookups = QuotaClass::ALL.iter().map(|class| async move {
            let result = self.backend.status(key, self.policy(*class)).await;
            ClassOutcome::from_result(*class, result)
        });
        join_all(lookups).await
    }

    /// Reset every class; one class failing does not stop the others
    pub async fn reset(&self, key: &str) -> Vec<ClassOutcome<()>> {
        let resets = QuotaClass::ALL.iter().map(|class| async move {
            let result = self.backend.reset(key, self.policy(*class)).await;
            if let Err(e) = &result {
                warn!(key, %class, error = %e, "Quota reset failed");
            }
            ClassOutcome::from_result(*class, result)
        });
        let outcomes = join_all(resets).await;
        info!(key, "Quota reset requested");
        outcomes
    }

    /// Drop expired local windows
    pub async fn purge_expired(&self) -> usize {
        self.backend.purge_expired().await
    }
}
