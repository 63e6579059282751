//! Cursor-paginated keyspace walk

use super::pool::RedisPool;
use crate::utils::error::Result;

impl RedisPool {
    /// One `SCAN` page
    pub async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>)> {
        self.execute("scan", |mut c| async move {
            redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(count)
                .query_async(&mut c)
                .await
        })
        .await
    }
}
