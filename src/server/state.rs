//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::context::AppContext;
use crate::monitoring::MonitoringSystem;
use crate::services::{KeyValueCache, QuotaLimiter, SessionDirectory};
use crate::storage::KeyValueStore;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// Every field is cheap to clone; actix clones the surrounding `web::Data`
/// once per worker.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration (shared read-only)
    pub config: Arc<Config>,
    /// Key-value store behind the cache, sessions and quota counters
    pub store: Arc<dyn KeyValueStore>,
    pub cache: KeyValueCache,
    pub sessions: SessionDirectory,
    pub limiter: QuotaLimiter,
    pub monitoring: MonitoringSystem,
}

impl AppState {
    pub fn new(context: &AppContext) -> Self {
        Self {
            config: context.config.clone(),
            store: context.store.clone(),
            cache: context.cache.clone(),
            sessions: context.sessions.clone(),
            limiter: context.limiter.clone(),
            monitoring: context.monitoring.clone(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bearer token guarding `/admin`, if any
    pub fn admin_token(&self) -> Option<&str> {
        self.config
            .server()
            .admin_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}
