//! Typed cache over the shared key-value store
//!
//! Reads fail open and writes fail silent: a store outage or a malformed
//! payload shows up as a miss, never as an error on the caller's path.

mod keys;
mod service;
#[cfg(test)]
mod tests;

pub use keys::{CacheKeys, CacheTtl};
pub use service::{CacheStats, KeyValueCache};
