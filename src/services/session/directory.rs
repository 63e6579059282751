//! Session lifecycle over the key-value store

use super::types::{NewSession, Session, SessionUpdate};
use crate::config::{CacheConfig, SessionConfig};
use crate::storage::{KeyValueStore, TTL_PERSISTENT, scan_all};
use crate::utils::error::{Result, ServiceError};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Distributed session directory
#[derive(Debug, Clone)]
pub struct SessionDirectory {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
    default_ttl: Duration,
    cleanup_grace: i64,
    scan_batch: usize,
}

impl SessionDirectory {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &SessionConfig, cache: &CacheConfig) -> Self {
        Self {
            store,
            prefix: config.prefix.clone(),
            default_ttl: Duration::from_secs(config.default_ttl),
            cleanup_grace: config.cleanup_grace as i64,
            scan_batch: cache.scan_batch_size,
        }
    }

    fn key(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }

    fn pattern(&self) -> String {
        format!("{}*", self.prefix)
    }

    /// Write back a session that must still exist. `false` when it was
    /// deleted or revoked since it was read; nothing is written then.
    async fn write_existing(&self, session: &Session) -> Result<bool> {
        let payload = serde_json::to_string(session)?;
        self.store
            .set_existing(&self.key(&session.id), &payload, self.default_ttl)
            .await
    }

    fn decode(&self, key: &str, raw: &str) -> Option<Session> {
        serde_json::from_str(raw)
            .inspect_err(|e| warn!(key, error = %e, "Discarding malformed session payload"))
            .ok()
    }

    /// Store a new session. `None` when the store rejected the write.
    pub async fn create_session(
        &self,
        id: &str,
        new: NewSession,
        ttl: Option<Duration>,
    ) -> Option<Session> {
        let now = Utc::now();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let session = Session {
            id: id.to_string(),
            user_id: new.user_id,
            role: new.role,
            data: new.data,
            created_at: now,
            last_accessed: now,
            ttl_secs: ttl.as_secs(),
        };

        let stored = match serde_json::to_string(&session) {
            Ok(payload) => self.store.set(&self.key(id), &payload, Some(ttl)).await,
            Err(e) => Err(e.into()),
        };

        match stored {
            Ok(()) => {
                debug!(session_id = id, user_id = %session.user_id, "Session created");
                Some(session)
            }
            Err(e) => {
                warn!(session_id = id, error = %e, "Failed to store session");
                None
            }
        }
    }

    /// Fetch a session and slide its expiry to the full default window
    pub async fn get_session(&self, id: &str) -> Option<Session> {
        let key = self.key(id);
        let raw = match self.store.get(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(session_id = id, error = %e, "Session lookup failed");
                return None;
            }
        };

        let mut session = self.decode(&key, &raw)?;

        // Slide only a key that still exists; a concurrent revoke wins
        match self.store.expire(&key, self.default_ttl).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(session_id = id, "Session vanished during read");
                return None;
            }
            Err(e) => {
                warn!(session_id = id, error = %e, "Failed to refresh session expiry");
                return Some(session);
            }
        }

        session.last_accessed = Utc::now();
        session.ttl_secs = self.default_ttl.as_secs();
        match self.write_existing(&session).await {
            Ok(true) => Some(session),
            Ok(false) => {
                debug!(session_id = id, "Session vanished during read");
                None
            }
            Err(e) => {
                warn!(session_id = id, error = %e, "Failed to record session access");
                Some(session)
            }
        }
    }

    /// Merge `update` into an existing session
    pub async fn update_session(&self, id: &str, update: SessionUpdate) -> Result<Session> {
        let key = self.key(id);
        let raw = self
            .store
            .get(&key)
            .await?
            .ok_or_else(|| ServiceError::SessionNotFound(id.to_string()))?;

        let mut session: Session = serde_json::from_str(&raw)?;
        session.apply(update);
        session.last_accessed = Utc::now();
        session.ttl_secs = self.default_ttl.as_secs();
        if !self.write_existing(&session).await? {
            return Err(ServiceError::SessionNotFound(id.to_string()));
        }
        Ok(session)
    }

    pub async fn delete_session(&self, id: &str) -> bool {
        match self.store.delete(&[self.key(id)]).await {
            Ok(removed) => removed > 0,
            Err(e) => {
                warn!(session_id = id, error = %e, "Failed to delete session");
                false
            }
        }
    }

    /// Slide the expiry without reading the payload
    pub async fn touch(&self, id: &str) -> bool {
        self.store
            .expire(&self.key(id), self.default_ttl)
            .await
            .unwrap_or_else(|e| {
                warn!(session_id = id, error = %e, "Failed to touch session");
                false
            })
    }

    async fn session_keys(&self) -> Result<Vec<String>> {
        scan_all(self.store.as_ref(), &self.pattern(), self.scan_batch).await
    }

    async fn load_all(&self) -> Result<Vec<Session>> {
        let keys = self.session_keys().await?;
        let mut sessions = Vec::with_capacity(keys.len());
        for batch in keys.chunks(self.scan_batch.max(1)) {
            let values = self.store.mget(batch).await?;
            for (key, raw) in batch.iter().zip(values) {
                if let Some(session) = raw.and_then(|raw| self.decode(key, &raw)) {
                    sessions.push(session);
                }
            }
        }
        Ok(sessions)
    }

    /// Every live session of `user_id`, oldest first. Walks the full keyspace.
    pub async fn list_sessions_for_user(&self, user_id: &str) -> Vec<Session> {
        match self.load_all().await {
            Ok(sessions) => {
                let mut mine: Vec<Session> = sessions
                    .into_iter()
                    .filter(|s| s.user_id == user_id)
                    .collect();
                mine.sort_by_key(|s| s.created_at);
                mine
            }
            Err(e) => {
                warn!(user_id, error = %e, "Failed to list sessions");
                Vec::new()
            }
        }
    }

    /// Delete every session of `user_id`, returning how many were removed
    pub async fn revoke_all_for_user(&self, user_id: &str) -> u64 {
        let keys: Vec<String> = self
            .list_sessions_for_user(user_id)
            .await
            .iter()
            .map(|s| self.key(&s.id))
            .collect();
        if keys.is_empty() {
            return 0;
        }

        match self.store.delete(&keys).await {
            Ok(removed) => {
                info!(user_id, removed, "Revoked user sessions");
                removed
            }
            Err(e) => {
                warn!(user_id, error = %e, "Failed to revoke sessions");
                0
            }
        }
    }

    /// Number of live sessions
    pub async fn count(&self) -> usize {
        self.session_keys().await.map(|k| k.len()).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to count sessions");
            0
        })
    }

    /// Delete sessions about to expire, and any that somehow lost their expiry
    pub async fn cleanup_expired(&self) -> u64 {
        let keys = match self.session_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Session cleanup scan failed");
                return 0;
            }
        };

        let mut doomed = Vec::new();
        for key in keys {
            match self.store.ttl(&key).await {
                Ok(ttl) if ttl == TTL_PERSISTENT || (0..=self.cleanup_grace).contains(&ttl) => {
                    doomed.push(key)
                }
                Ok(_) => {}
                Err(e) => warn!(key = %key, error = %e, "Session ttl lookup failed"),
            }
        }

        if doomed.is_empty() {
            return 0;
        }
        match self.store.delete(&doomed).await {
            Ok(removed) => {
                debug!(removed, "Cleaned up expiring sessions");
                removed
            }
            Err(e) => {
                warn!(error = %e, "Session cleanup delete failed");
                0
            }
        }
    }
}
