//! Services module
//!
//! Store-backed services shared by every request path:
//!
//! - **cache**: typed, namespaced key-value cache
//! - **rate_limit**: per-client quota limiter with a distributed and a local backend
//! - **session**: session directory with sliding expiration

pub mod cache;
pub mod rate_limit;
pub mod session;

pub use cache::{CacheKeys, CacheStats, CacheTtl, KeyValueCache};
pub use rate_limit::{
    BackendKind, ClientIdentity, QuotaClass, QuotaDecision, QuotaLimiter, QuotaMeta, QuotaStatus,
};
pub use session::{NewSession, Session, SessionDirectory, SessionUpdate};
