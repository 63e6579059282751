//! Main cache service implementation

use crate::config::CacheConfig;
use crate::storage::{KeyValueStore, TTL_MISSING, scan_all};
use crate::utils::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::keys::CacheKeys;

/// Hit/miss/error counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
    pub hit_rate: f64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
}

/// Namespaced JSON cache
#[derive(Debug, Clone)]
pub struct KeyValueCache {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
    default_ttl: Duration,
    scan_batch: usize,
    counters: Arc<Counters>,
}

impl KeyValueCache {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            prefix: config.prefix.clone(),
            default_ttl: Duration::from_secs(config.default_ttl),
            scan_batch: config.scan_batch_size,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Full store key for a logical key
    pub fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Read and deserialize a value
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let full_key = self.namespaced(key);
        let raw = match self.store.get(&full_key).await {
            Ok(raw) => raw,
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %full_key, error = %e, "Cache read failed");
                return None;
            }
        };

        let Some(raw) = raw else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            Err(e) => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                warn!(key = %full_key, error = %e, "Malformed cached payload, treating as miss");
                None
            }
        }
    }

    /// Serialize and store a value; `None` uses the default TTL
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> bool {
        let full_key = self.namespaced(key);
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %full_key, error = %e, "Failed to serialize cache value");
                return false;
            }
        };

        let ttl = ttl.unwrap_or(self.default_ttl);
        match self.store.set(&full_key, &payload, Some(ttl)).await {
            Ok(()) => {
                debug!(key = %full_key, ttl_secs = ttl.as_secs(), "Cached value");
                true
            }
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %full_key, error = %e, "Cache write failed");
                false
            }
        }
    }

    /// Read-through helper.
    ///
    /// Concurrent callers missing on the same key may each run `fetch`; the
    /// last write wins. Only errors from `fetch` itself are returned.
    pub async fn get_or_set<T, F, Fut>(&self, key: &str, fetch: F, ttl: Option<Duration>) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(cached) = self.get(key).await {
            return Ok(cached);
        }

        let value = fetch().await?;
        self.set(key, &value, ttl).await;
        Ok(value)
    }

    pub async fn delete(&self, key: &str) -> bool {
        let full_key = self.namespaced(key);
        match self.store.delete(&[full_key.clone()]).await {
            Ok(removed) => removed > 0,
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %full_key, error = %e, "Cache delete failed");
                false
            }
        }
    }

    /// Delete every key in the namespace matching `pattern`, returning how many were removed
    pub async fn delete_pattern(&self, pattern: &str) -> u64 {
        let full_pattern = self.namespaced(pattern);
        let keys = match scan_all(self.store.as_ref(), &full_pattern, self.scan_batch).await {
            Ok(keys) => keys,
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                warn!(pattern = %full_pattern, error = %e, "Cache scan failed");
                return 0;
            }
        };

        let mut removed = 0;
        for batch in keys.chunks(self.scan_batch.max(1)) {
            match self.store.delete(batch).await {
                Ok(count) => removed += count,
                Err(e) => {
                    self.counters.errors.fetch_add(1, Ordering::Relaxed);
                    warn!(pattern = %full_pattern, error = %e, "Cache batch delete failed");
                }
            }
        }
        debug!(pattern = %full_pattern, removed, "Deleted cache keys by pattern");
        removed
    }

    /// Drop an entity and every cached list page of its kind
    pub async fn invalidate_entity(&self, namespace: &str, id: impl std::fmt::Display) -> u64 {
        let entity_removed = u64::from(self.delete(&format!("{}:{}", namespace, id)).await);
        entity_removed + self.delete_pattern(&CacheKeys::list_pattern(namespace)).await
    }

    pub async fn exists(&self, key: &str) -> bool {
        let full_key = self.namespaced(key);
        self.store.exists(&full_key).await.unwrap_or_else(|e| {
            warn!(key = %full_key, error = %e, "Cache exists check failed");
            false
        })
    }

    /// Remaining TTL in seconds; negative when absent or on failure
    pub async fn ttl(&self, key: &str) -> i64 {
        let full_key = self.namespaced(key);
        self.store.ttl(&full_key).await.unwrap_or_else(|e| {
            warn!(key = %full_key, error = %e, "Cache ttl lookup failed");
            TTL_MISSING
        })
    }

    /// Atomic add at the store; `None` when the store failed
    pub async fn increment(&self, key: &str, by: i64) -> Option<i64> {
        let full_key = self.namespaced(key);
        match self.store.incr_by(&full_key, by).await {
            Ok(value) => Some(value),
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %full_key, error = %e, "Cache increment failed");
                None
            }
        }
    }

    pub async fn decrement(&self, key: &str, by: i64) -> Option<i64> {
        self.increment(key, -by).await
    }

    /// Store several values in one round trip
    pub async fn set_many<T: Serialize>(&self, entries: &[(String, T)], ttl: Option<Duration>) -> bool {
        let mut pairs = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            match serde_json::to_string(value) {
                Ok(payload) => pairs.push((self.namespaced(key), payload)),
                Err(e) => warn!(key = %key, error = %e, "Skipping unserializable cache value"),
            }
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        match self.store.mset(&pairs, Some(ttl)).await {
            Ok(()) => true,
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                warn!(count = pairs.len(), error = %e, "Cache batch write failed");
                false
            }
        }
    }

    /// Read several values; misses and malformed entries are left out
    pub async fn get_many<T: DeserializeOwned>(&self, keys: &[String]) -> HashMap<String, T> {
        let full_keys: Vec<String> = keys.iter().map(|k| self.namespaced(k)).collect();
        let raw = match self.store.mget(&full_keys).await {
            Ok(raw) => raw,
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                warn!(count = keys.len(), error = %e, "Cache batch read failed");
                return HashMap::new();
            }
        };

        let mut found = HashMap::with_capacity(keys.len());
        for (key, value) in keys.iter().zip(raw) {
            let Some(value) = value else {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                continue;
            };
            match serde_json::from_str(&value) {
                Ok(parsed) => {
                    self.counters.hits.fetch_add(1, Ordering::Relaxed);
                    found.insert(key.clone(), parsed);
                }
                Err(e) => {
                    self.counters.misses.fetch_add(1, Ordering::Relaxed);
                    warn!(key = %key, error = %e, "Skipping malformed cached payload");
                }
            }
        }
        found
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.counters.hits.load(Ordering::Relaxed);
        let misses = self.counters.misses.load(Ordering::Relaxed);
        CacheStats {
            hits,
            misses,
            errors: self.counters.errors.load(Ordering::Relaxed),
            hit_rate: crate::utils::ratio(hits as f64, (hits + misses) as f64),
        }
    }
}
