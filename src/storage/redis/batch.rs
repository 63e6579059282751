//! Batch Redis operations

use super::cache::ttl_millis;
use super::pool::RedisPool;
use crate::utils::error::Result;
use redis::AsyncCommands;
use std::time::Duration;

impl RedisPool {
    /// Get multiple keys at once
    pub async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        if keys.len() == 1 {
            // MGET with a single key still answers with an array, but the
            // client's conversion is simpler through GET
            let value = self.get(&keys[0]).await?;
            return Ok(vec![value]);
        }
        self.execute("mget", |mut c| async move { c.mget(keys).await })
            .await
    }

    /// Set multiple key-value pairs with optional TTL
    pub async fn mset(&self, pairs: &[(String, String)], ttl: Option<Duration>) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, value) in pairs {
            match ttl {
                Some(ttl) => {
                    pipe.pset_ex(key, value, ttl_millis(ttl)).ignore();
                }
                None => {
                    pipe.set(key, value).ignore();
                }
            }
        }

        self.execute("mset", |mut c| {
            let pipe = pipe.clone();
            async move { pipe.query_async(&mut c).await }
        })
        .await
    }
}
