//! Redis connection management
//!
//! This module provides Redis connectivity, offline mode, and health checks.

use super::retry::RetryPolicy;
use crate::config::RedisConfig;
use crate::utils::error::{Result, ServiceError};
use redis::aio::ConnectionManager;
use redis::{Client, RedisResult};
use std::future::Future;
use tracing::{debug, info, warn};

/// Redis client (supports offline mode when Redis is unreachable at startup)
#[derive(Clone)]
pub struct RedisPool {
    /// Connection manager (None in offline mode)
    pub(crate) connection: Option<ConnectionManager>,
    /// Backoff used for setup and reconnectable command failures
    pub(crate) retry: RetryPolicy,
    /// Sanitized URL for logs
    pub(crate) display_url: String,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("url", &self.display_url)
            .field("offline", &self.is_offline())
            .finish()
    }
}

impl RedisPool {
    /// Connect, retrying transient failures with capped backoff
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let url = config.url();
        let display_url = Self::sanitize_url(&url);
        let retry = RetryPolicy::from_config(config);
        info!("Connecting to Redis at {}", display_url);

        let client = Client::open(url.as_str()).map_err(ServiceError::Redis)?;

        let mut attempt = 0u32;
        let connection = loop {
            let outcome =
                tokio::time::timeout(config.connect_timeout(), ConnectionManager::new(client.clone()))
                    .await;
            match outcome {
                Ok(Ok(connection)) => break connection,
                Ok(Err(e)) if attempt < retry.max_retries && retry.should_reconnect(&e) => {
                    attempt += 1;
                    let delay = retry.delay_for(attempt);
                    warn!(attempt, ?delay, error = %e, "Redis connect failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Ok(Err(e)) => return Err(ServiceError::Redis(e)),
                Err(_) if attempt < retry.max_retries => {
                    attempt += 1;
                    let delay = retry.delay_for(attempt);
                    warn!(attempt, ?delay, "Redis connect timed out, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(_) => {
                    return Err(ServiceError::store_unavailable(format!(
                        "connect to {} timed out after {:?}",
                        display_url,
                        config.connect_timeout()
                    )));
                }
            }
        };

        info!("Redis connection established");
        Ok(Self {
            connection: Some(connection),
            retry,
            display_url,
        })
    }

    /// Connect, or fall back to offline mode when Redis cannot be reached
    pub async fn connect_or_offline(config: &RedisConfig) -> Self {
        match Self::connect(config).await {
            Ok(pool) => pool,
            Err(e) => {
                warn!(
                    error = %e,
                    "Redis unavailable at startup; cache and session calls will degrade to misses"
                );
                let mut pool = Self::create_offline();
                pool.display_url = Self::sanitize_url(&config.url());
                pool.retry = RetryPolicy::from_config(config);
                pool
            }
        }
    }

    /// Create an offline pool: every operation reports the store as unavailable
    pub fn create_offline() -> Self {
        Self {
            connection: None,
            retry: RetryPolicy::default(),
            display_url: String::new(),
        }
    }

    /// Check if this pool has no connection
    pub fn is_offline(&self) -> bool {
        self.connection.is_none()
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        debug!("Performing Redis health check");
        let pong: String = self
            .execute("ping", |mut c| async move { redis::cmd("PING").query_async(&mut c).await })
            .await?;
        debug!("Redis health check passed: {}", pong);
        Ok(())
    }

    /// Run a command, retrying reconnectable failures
    pub(crate) async fn execute<T, F, Fut>(&self, op: &'static str, mut command: F) -> Result<T>
    where
        F: FnMut(ConnectionManager) -> Fut,
        Fut: Future<Output = RedisResult<T>>,
    {
        let Some(connection) = &self.connection else {
            return Err(ServiceError::store_unavailable("Redis pool is offline"));
        };

        let mut attempt = 0u32;
        loop {
            match command(connection.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.retry.max_retries && self.retry.should_reconnect(&e) => {
                    attempt += 1;
                    let delay = self.retry.delay_for(attempt);
                    warn!(op, attempt, ?delay, error = %e, "Redis command failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(ServiceError::Redis(e)),
            }
        }
    }

    /// Sanitize Redis URL for logging (hide password)
    pub(crate) fn sanitize_url(url: &str) -> String {
        if let Ok(parsed) = url::Url::parse(url) {
            let mut sanitized = parsed.clone();
            if sanitized.password().is_some() {
                let _ = sanitized.set_password(Some("***"));
            }
            sanitized.to_string()
        } else {
            "invalid_url".to_string()
        }
    }
}
