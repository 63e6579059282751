//! Redis storage implementation
//!
//! ## Module Structure
//!
//! - `pool` - Connection management, offline mode and health checks
//! - `retry` - Capped backoff and the reconnect predicate
//! - `cache` - Basic key operations (get, set, delete, exists, expire, ttl)
//! - `batch` - Batch operations (mget, mset)
//! - `atomic` - Counters
//! - `scan` - Cursor-paginated keyspace walk
//! - `store` - `KeyValueStore` implementation
//! - `tests` - Module tests

mod atomic;
mod batch;
mod cache;
mod pool;
mod retry;
mod scan;
mod store;

pub use pool::RedisPool;
pub use retry::RetryPolicy;
