//! Cache key naming and TTL presets

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::time::Duration;

/// Logical key builders. The namespace prefix is added by the cache itself.
pub struct CacheKeys;

impl CacheKeys {
    pub fn user(id: impl std::fmt::Display) -> String {
        format!("user:{}", id)
    }

    pub fn vehicle(id: impl std::fmt::Display) -> String {
        format!("vehicle:{}", id)
    }

    pub fn part(id: impl std::fmt::Display) -> String {
        format!("part:{}", id)
    }

    pub fn seller(id: impl std::fmt::Display) -> String {
        format!("seller:{}", id)
    }

    pub fn report(id: impl std::fmt::Display) -> String {
        format!("report:{}", id)
    }

    /// `search:<query>:<base64(json(filters))>`
    pub fn search(query: &str, filters: &serde_json::Value) -> String {
        format!("search:{}:{}", query, STANDARD.encode(filters.to_string()))
    }

    /// One page of a paginated entity listing, e.g. `vehicles:list:3`
    pub fn list_page(namespace: &str, page: u32) -> String {
        format!("{}s:list:{}", namespace, page)
    }

    /// Glob covering every list page of `namespace`
    pub fn list_pattern(namespace: &str) -> String {
        format!("{}s:list:*", namespace)
    }
}

/// Common TTLs
pub struct CacheTtl;

impl CacheTtl {
    pub const SHORT: Duration = Duration::from_secs(60);
    pub const MEDIUM: Duration = Duration::from_secs(300);
    pub const LONG: Duration = Duration::from_secs(3600);
    pub const DAY: Duration = Duration::from_secs(86_400);
}
