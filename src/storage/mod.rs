//! Storage layer for the service
//!
//! Every component that talks to the shared key-value store goes through the
//! [`KeyValueStore`] trait, so the Redis client and the in-process map are
//! interchangeable and tests never need a live server.

/// In-process store
pub mod memory;
/// Redis store
pub mod redis;

use crate::config::{RedisConfig, StoreBackend};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub use memory::InMemoryStore;
pub use redis::RedisPool;

/// `ttl` result for a key that does not exist
pub const TTL_MISSING: i64 = -2;
/// `ttl` result for a key without expiry
pub const TTL_PERSISTENT: i64 = -1;

/// Primitive operations offered by the external key-value store
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Short name used in logs and health output
    fn backend_name(&self) -> &'static str;

    /// Round-trip health probe
    async fn ping(&self) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any previous value and TTL
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Replace the value of an existing key (`SET XX`); `false` when the key is absent
    async fn set_existing(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;

    /// Delete keys, returning how many existed
    async fn delete(&self, keys: &[String]) -> Result<u64>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Re-arm the expiry of an existing key; `false` when the key is absent
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// Remaining lifetime in seconds, or [`TTL_MISSING`] / [`TTL_PERSISTENT`]
    async fn ttl(&self, key: &str) -> Result<i64>;

    /// Atomic add; a missing key counts from zero
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64>;

    /// Atomic add that arms `ttl` only when the counter is created.
    ///
    /// Returns the new value and the counter's remaining lifetime.
    async fn incr_with_ttl(&self, key: &str, delta: i64, ttl: Duration) -> Result<(i64, Duration)>;

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>>;

    async fn mset(&self, pairs: &[(String, String)], ttl: Option<Duration>) -> Result<()>;

    /// One page of a cursor-based keyspace walk. A returned cursor of 0 ends the walk.
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>)>;
}

/// Build the store selected by configuration.
///
/// An unreachable Redis does not fail startup: the pool comes up offline and
/// every call reports the outage, which callers turn into misses.
pub async fn connect_store(config: &RedisConfig) -> Arc<dyn KeyValueStore> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-process key-value store");
            Arc::new(InMemoryStore::new())
        }
        StoreBackend::Redis => Arc::new(RedisPool::connect_or_offline(config).await),
    }
}

/// Walk the whole keyspace for `pattern`, `count` keys per page
pub async fn scan_all(
    store: &dyn KeyValueStore,
    pattern: &str,
    count: usize,
) -> Result<Vec<String>> {
    let mut keys = Vec::new();
    let mut cursor = 0u64;
    loop {
        let (next, page) = store.scan(cursor, pattern, count).await?;
        keys.extend(page);
        if next == 0 {
            break;
        }
        cursor = next;
    }
    keys.sort();
    keys.dedup();
    Ok(keys)
}
