//! Basic Redis key operations
//!
//! get, set, set-if-exists, delete, exists, expire and ttl.

use super::pool::RedisPool;
use crate::utils::error::Result;
use redis::AsyncCommands;
use std::time::Duration;

/// Millisecond TTL argument; Redis rejects zero so sub-millisecond values round up
pub(super) fn ttl_millis(ttl: Duration) -> u64 {
    (ttl.as_millis() as u64).max(1)
}

impl RedisPool {
    /// Get a value
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        self.execute("get", |mut c| async move { c.get(key).await })
            .await
    }

    /// Set a value with optional TTL
    pub async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        match ttl {
            Some(ttl) => {
                let millis = ttl_millis(ttl);
                self.execute("set", |mut c| async move { c.pset_ex(key, value, millis).await })
                    .await
            }
            None => {
                self.execute("set", |mut c| async move { c.set(key, value).await })
                    .await
            }
        }
    }

    /// Overwrite a key only if it still exists
    pub async fn set_existing(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let millis = ttl_millis(ttl);
        let reply: Option<String> = self
            .execute("set_xx", |mut c| async move {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("PX")
                    .arg(millis)
                    .arg("XX")
                    .query_async(&mut c)
                    .await
            })
            .await?;
        Ok(reply.is_some())
    }

    /// Delete keys, returning how many existed
    pub async fn delete(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        self.execute("del", |mut c| async move { c.del(keys).await })
            .await
    }

    /// Check if a key exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        self.execute("exists", |mut c| async move { c.exists(key).await })
            .await
    }

    /// Set expiration time for a key
    pub async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let millis = ttl_millis(ttl) as i64;
        self.execute("pexpire", |mut c| async move { c.pexpire(key, millis).await })
            .await
    }

    /// Get TTL for a key in seconds
    pub async fn ttl(&self, key: &str) -> Result<i64> {
        self.execute("ttl", |mut c| async move { c.ttl(key).await })
            .await
    }
}
