//! Process-local quota windows

use super::backend::{QuotaBackend, QuotaPolicy};
use super::types::{BackendKind, QuotaClass, QuotaDecision, QuotaMeta, QuotaStatus};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct Window {
    consumed: u32,
    ends_at: Instant,
    blocked_until: Option<Instant>,
}

impl Window {
    fn fresh(now: Instant, policy: &QuotaPolicy) -> Self {
        Self {
            consumed: 0,
            ends_at: now + policy.window,
            blocked_until: None,
        }
    }

    fn blocked_for(&self, now: Instant) -> Option<Duration> {
        self.blocked_until
            .filter(|until| *until > now)
            .map(|until| until - now)
    }

    fn is_stale(&self, now: Instant) -> bool {
        self.ends_at <= now && self.blocked_for(now).is_none()
    }
}

/// Fallback backend used when the store is unreachable. Limits are per process.
#[derive(Debug, Default)]
pub struct MemoryQuotaBackend {
    windows: DashMap<(QuotaClass, String), Window>,
}

fn wall_clock(now: Instant, now_utc: DateTime<Utc>, at: Instant) -> DateTime<Utc> {
    now_utc
        + chrono::Duration::from_std(at.saturating_duration_since(now))
            .unwrap_or_else(|_| chrono::Duration::zero())
}

impl MemoryQuotaBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked windows
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[async_trait]
impl QuotaBackend for MemoryQuotaBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn consume(&self, key: &str, policy: &QuotaPolicy, points: u32) -> Result<QuotaDecision> {
        let now = Instant::now();
        let now_utc = Utc::now();

        let mut window = self
            .windows
            .entry((policy.class, key.to_string()))
            .or_insert_with(|| Window::fresh(now, policy));

        if let Some(blocked) = window.blocked_for(now) {
            return Ok(QuotaDecision::Rejected(QuotaMeta {
                limit: policy.points,
                remaining: 0,
                reset_at: wall_clock(now, now_utc, now + blocked),
                retry_after: Some(blocked),
            }));
        }

        // A served block or an elapsed window both start a new window
        if window.ends_at <= now || window.blocked_until.is_some() {
            *window = Window::fresh(now, policy);
        }

        window.consumed = window.consumed.saturating_add(points);
        if window.consumed <= policy.points {
            return Ok(QuotaDecision::Allowed(QuotaMeta {
                limit: policy.points,
                remaining: policy.points - window.consumed,
                reset_at: wall_clock(now, now_utc, window.ends_at),
                retry_after: None,
            }));
        }

        let retry_after = match policy.block {
            Some(block) => {
                window.blocked_until = Some(now + block);
                debug!(key, class = %policy.class, ?block, "Quota exhausted, key blocked");
                block
            }
            None => window.ends_at.saturating_duration_since(now),
        };

        Ok(QuotaDecision::Rejected(QuotaMeta {
            limit: policy.points,
            remaining: 0,
            reset_at: wall_clock(now, now_utc, now + retry_after),
            retry_after: Some(retry_after),
        }))
    }

    async fn status(&self, key: &str, policy: &QuotaPolicy) -> Result<Option<QuotaStatus>> {
        let now = Instant::now();
        let now_utc = Utc::now();

        let Some(window) = self.windows.get(&(policy.class, key.to_string())) else {
            return Ok(None);
        };
        if window.is_stale(now) {
            return Ok(None);
        }

        let live = window.ends_at > now;
        let consumed = if live { window.consumed } else { 0 };
        Ok(Some(QuotaStatus {
            consumed,
            remaining: policy.points.saturating_sub(consumed),
            reset_at: live.then(|| wall_clock(now, now_utc, window.ends_at)),
            blocked_until: window
                .blocked_for(now)
                .map(|blocked| wall_clock(now, now_utc, now + blocked)),
        }))
    }

    async fn reset(&self, key: &str, policy: &QuotaPolicy) -> Result<()> {
        self.windows.remove(&(policy.class, key.to_string()));
        Ok(())
    }

    async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows.retain(|_, window| !window.is_stale(now));
        before.saturating_sub(self.windows.len())
    }
}
