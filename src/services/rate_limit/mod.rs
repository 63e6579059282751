//! Per-client quota limiting
//!
//! Three independent quota classes (`auth`, `general`, `api`) each allow a
//! number of points per window. The backend is chosen once at startup: store
//! counters when the store answers a health probe, process-local windows
//! otherwise.

mod backend;
mod identity;
mod limiter;
mod memory_backend;
mod redis_backend;
mod types;

pub use backend::{QuotaBackend, QuotaPolicy};
pub use identity::{ClientIdentity, hash_api_key};
pub use limiter::QuotaLimiter;
pub use memory_backend::MemoryQuotaBackend;
pub use redis_backend::RedisQuotaBackend;
pub use types::{BackendKind, ClassOutcome, QuotaClass, QuotaDecision, QuotaMeta, QuotaStatus};
