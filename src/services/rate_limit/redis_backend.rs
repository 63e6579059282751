//! Quota counters kept in the shared store

use super::backend::{QuotaBackend, QuotaPolicy};
use super::types::{BackendKind, QuotaDecision, QuotaMeta, QuotaStatus};
use crate::storage::KeyValueStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Fixed-window counters with store-side atomic increments.
///
/// Layout: `<prefix>:<class>:<key>` holds the counter and expires with the
/// window; `<prefix>:<class>:block:<key>` marks a blocked key.
#[derive(Debug, Clone)]
pub struct RedisQuotaBackend {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
}

fn after(now: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    now + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero())
}

impl RedisQuotaBackend {
    pub fn new(store: Arc<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    fn counter_key(&self, key: &str, policy: &QuotaPolicy) -> String {
        format!("{}:{}:{}", self.prefix, policy.class, key)
    }

    fn block_key(&self, key: &str, policy: &QuotaPolicy) -> String {
        format!("{}:{}:block:{}", self.prefix, policy.class, key)
    }

    /// Remaining block, if any
    async fn block_remaining(&self, key: &str, policy: &QuotaPolicy) -> Result<Option<Duration>> {
        if policy.block.is_none() {
            return Ok(None);
        }
        let ttl = self.store.ttl(&self.block_key(key, policy)).await?;
        Ok((ttl > 0).then(|| Duration::from_secs(ttl as u64)))
    }
}

#[async_trait]
impl QuotaBackend for RedisQuotaBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Distributed
    }

    async fn consume(&self, key: &str, policy: &QuotaPolicy, points: u32) -> Result<QuotaDecision> {
        let now = Utc::now();

        if let Some(blocked) = self.block_remaining(key, policy).await? {
            return Ok(QuotaDecision::Rejected(QuotaMeta {
                limit: policy.points,
                remaining: 0,
                reset_at: after(now, blocked),
                retry_after: Some(blocked),
            }));
        }

        let (consumed, window_left) = self
            .store
            .incr_with_ttl(&self.counter_key(key, policy), i64::from(points), policy.window)
            .await?;

        let limit = i64::from(policy.points);
        if consumed <= limit {
            return Ok(QuotaDecision::Allowed(QuotaMeta {
                limit: policy.points,
                remaining: (limit - consumed) as u32,
                reset_at: after(now, window_left),
                retry_after: None,
            }));
        }

        let retry_after = match policy.block {
            Some(block) => {
                self.store
                    .set(&self.block_key(key, policy), "1", Some(block))
                    .await?;
                // The window restarts once the block is served
                self.store.delete(&[self.counter_key(key, policy)]).await?;
                debug!(key, class = %policy.class, ?block, "Quota exhausted, key blocked");
                block
            }
            None => window_left,
        };

        Ok(QuotaDecision::Rejected(QuotaMeta {
            limit: policy.points,
            remaining: 0,
            reset_at: after(now, retry_after),
            retry_after: Some(retry_after),
        }))
    }

    async fn status(&self, key: &str, policy: &QuotaPolicy) -> Result<Option<QuotaStatus>> {
        let now = Utc::now();
        let counter_key = self.counter_key(key, policy);
        let blocked = self.block_remaining(key, policy).await?;

        let consumed = match self.store.get(&counter_key).await? {
            Some(raw) => raw.parse::<i64>().unwrap_or(0).max(0) as u32,
            None => 0,
        };
        let ttl = self.store.ttl(&counter_key).await?;

        if consumed == 0 && blocked.is_none() {
            return Ok(None);
        }

        Ok(Some(QuotaStatus {
            consumed,
            remaining: policy.points.saturating_sub(consumed),
            reset_at: (ttl > 0).then(|| after(now, Duration::from_secs(ttl as u64))),
            blocked_until: blocked.map(|b| after(now, b)),
        }))
    }

    async fn reset(&self, key: &str, policy: &QuotaPolicy) -> Result<()> {
        self.store
            .delete(&[self.counter_key(key, policy), self.block_key(key, policy)])
            .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> usize {
        // The store expires windows itself
        0
    }
}
