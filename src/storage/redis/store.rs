use super::pool::RedisPool;
use crate::storage::KeyValueStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
impl KeyValueStore for RedisPool {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> Result<()> {
        self.health_check().await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        RedisPool::get(self, key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        RedisPool::set(self, key, value, ttl).await
    }

    async fn set_existing(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        RedisPool::set_existing(self, key, value, ttl).await
    }

    async fn delete(&self, keys: &[String]) -> Result<u64> {
        RedisPool::delete(self, keys).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        RedisPool::exists(self, key).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        RedisPool::expire(self, key, ttl).await
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        RedisPool::ttl(self, key).await
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
        RedisPool::incr_by(self, key, delta).await
    }

    async fn incr_with_ttl(&self, key: &str, delta: i64, ttl: Duration) -> Result<(i64, Duration)> {
        RedisPool::incr_with_ttl(self, key, delta, ttl).await
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        RedisPool::mget(self, keys).await
    }

    async fn mset(&self, pairs: &[(String, String)], ttl: Option<Duration>) -> Result<()> {
        RedisPool::mset(self, pairs, ttl).await
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>)> {
        RedisPool::scan(self, cursor, pattern, count).await
    }
}
