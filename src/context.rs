//! Application context
//!
//! Wires the store, the store-backed services and the monitoring system from
//! one [`Config`]. The binary builds exactly one of these; tests build their
//! own over an in-memory store.

use crate::config::Config;
use crate::monitoring::{
    AlertSeverity, BackgroundJobs, LogChannel, MonitoringSystem, QuotaDependency, ResourceProbe,
    StoreDependency, WebhookChannel, default_probe,
};
use crate::services::{KeyValueCache, QuotaLimiter, SessionDirectory};
use crate::storage::{KeyValueStore, connect_store};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Everything a request path or background job needs
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub store: Arc<dyn KeyValueStore>,
    pub cache: KeyValueCache,
    pub sessions: SessionDirectory,
    pub limiter: QuotaLimiter,
    pub monitoring: MonitoringSystem,
}

impl AppContext {
    /// Connect to the configured store and build every service over it
    pub async fn build(config: Config) -> Result<Self> {
        let store = connect_store(&config.storage().redis).await;
        Self::with_store(config, store, default_probe()).await
    }

    /// Build over an already connected store
    pub async fn with_store(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        probe: Arc<dyn ResourceProbe>,
    ) -> Result<Self> {
        let app = &config.app;

        let cache = KeyValueCache::new(store.clone(), &app.cache);
        let sessions = SessionDirectory::new(store.clone(), &app.session, &app.cache);
        let limiter = QuotaLimiter::from_config(&app.rate_limit, store.clone()).await;

        let monitoring = MonitoringSystem::new(&app.monitoring, &app.reporting, probe);
        monitoring.add_channel(Arc::new(LogChannel::default()));
        if let Some(url) = &app.reporting.webhook_url {
            monitoring.add_channel(Arc::new(WebhookChannel::new(
                url.clone(),
                AlertSeverity::Critical,
            )?));
        }
        monitoring.add_dependency(Arc::new(StoreDependency::new(store.clone())));
        monitoring.add_dependency(Arc::new(QuotaDependency::new(limiter.clone())));

        info!(
            store = store.backend_name(),
            quota_backend = %limiter.backend_kind(),
            "Application context ready"
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            cache,
            sessions,
            limiter,
            monitoring,
        })
    }

    /// Optional background jobs derived from configuration
    pub fn background_jobs(&self) -> BackgroundJobs {
        let app = &self.config.app;
        BackgroundJobs {
            limiter: Some(self.limiter.clone()),
            sessions: Some(self.sessions.clone()),
            report_schedule: app.reporting.schedule_secs.map(Duration::from_secs),
            session_cleanup_interval: Some(app.monitoring.retention_interval()),
        }
    }
}
