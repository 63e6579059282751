//! Atomic Redis counters

use super::cache::ttl_millis;
use super::pool::RedisPool;
use crate::utils::error::Result;
use redis::AsyncCommands;
use std::time::Duration;

impl RedisPool {
    /// Increment a counter
    pub async fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
        self.execute("incrby", |mut c| async move { c.incr(key, delta).await })
            .await
    }

    /// Increment a windowed counter.
    ///
    /// `SET NX PX` arms the window only when the key is new, then `INCRBY`
    /// and `PTTL` run in the same transaction so concurrent callers across
    /// processes never reset each other's window.
    pub async fn incr_with_ttl(
        &self,
        key: &str,
        delta: i64,
        ttl: Duration,
    ) -> Result<(i64, Duration)> {
        let millis = ttl_millis(ttl);
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("SET")
            .arg(key)
            .arg(0)
            .arg("PX")
            .arg(millis)
            .arg("NX")
            .ignore()
            .cmd("INCRBY")
            .arg(key)
            .arg(delta)
            .cmd("PTTL")
            .arg(key);

        let (value, remaining_ms): (i64, i64) = self
            .execute("incr_with_ttl", |mut c| {
                let pipe = pipe.clone();
                async move { pipe.query_async(&mut c).await }
            })
            .await?;

        if remaining_ms < 0 {
            // A counter written without expiry by someone else; give it one
            self.expire(key, ttl).await?;
            return Ok((value, ttl));
        }

        Ok((value, Duration::from_millis(remaining_ms as u64)))
    }
}
