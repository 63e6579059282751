//! Quota backend abstraction

use super::types::{BackendKind, QuotaClass, QuotaDecision, QuotaStatus};
use crate::config::QuotaClassConfig;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Limits for one quota class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaPolicy {
    pub class: QuotaClass,
    pub points: u32,
    pub window: Duration,
    /// How long a key stays rejected after exhausting the window
    pub block: Option<Duration>,
}

impl QuotaPolicy {
    pub fn from_config(class: QuotaClass, config: &QuotaClassConfig) -> Self {
        Self {
            class,
            points: config.points,
            window: config.window(),
            block: config.block_duration(),
        }
    }
}

/// Where quota counters live
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuotaBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Charge `points` to `key`. Exhaustion is a `Rejected` decision, not an error.
    async fn consume(&self, key: &str, policy: &QuotaPolicy, points: u32) -> Result<QuotaDecision>;

    /// `None` when the key has no live window and no block
    async fn status(&self, key: &str, policy: &QuotaPolicy) -> Result<Option<QuotaStatus>>;

    /// Drop the window and any block for `key`
    async fn reset(&self, key: &str, policy: &QuotaPolicy) -> Result<()>;

    /// Remove expired local state, returning how many entries were dropped
    async fn purge_expired(&self) -> usize;
}
