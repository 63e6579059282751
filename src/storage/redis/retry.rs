//! Reconnect backoff for the Redis client

use crate::config::RedisConfig;
use redis::{ErrorKind, RedisError};
use std::time::Duration;

/// Linear backoff capped at `max_delay`: `min(attempt * step, max_delay)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub step: Duration,
    pub max_delay: Duration,
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn from_config(config: &RedisConfig) -> Self {
        Self {
            step: Duration::from_millis(config.retry_step_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
            max_retries: config.max_retries,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt).min(self.max_delay)
    }

    /// Only transient transport failures and replica failover are retried.
    /// Everything else (wrong type, syntax, auth) fails immediately.
    pub fn should_reconnect(&self, error: &RedisError) -> bool {
        error.is_io_error()
            || error.is_connection_dropped()
            || error.is_connection_refusal()
            || error.is_timeout()
            || error.kind() == ErrorKind::ReadOnly
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RedisConfig::default())
    }
}
