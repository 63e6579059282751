//! Process-local key-value store
//!
//! Backs single-node development and the test suite. Expiry is lazy: an
//! expired entry is dropped the next time anything touches it.

mod glob;

use glob::glob_to_regex;

use super::{KeyValueStore, TTL_MISSING, TTL_PERSISTENT};
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use regex::Regex;
use std::time::{Duration, Instant};

/// Compiled scan patterns kept before the cache is reset
const MAX_CACHED_PATTERNS: usize = 256;

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn at(now: Instant, value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|ttl| now + ttl),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    fn remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at.map(|at| at.saturating_duration_since(now))
    }
}

/// DashMap-backed store with Redis-compatible semantics
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, MemoryEntry>,
    patterns: DashMap<String, Regex>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live(&self, key: &str) -> Option<MemoryEntry> {
        let now = Instant::now();
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        self.entries.get(key).map(|entry| entry.clone())
    }

    /// Compiled form of a scan glob, cached per pattern
    fn matcher(&self, pattern: &str) -> Result<Regex> {
        if let Some(regex) = self.patterns.get(pattern) {
            return Ok(regex.clone());
        }
        let regex = glob_to_regex(pattern).map_err(|e| {
            ServiceError::validation(format!("invalid scan pattern {:?}: {}", pattern, e))
        })?;
        if self.patterns.len() >= MAX_CACHED_PATTERNS {
            self.patterns.clear();
        }
        self.patterns.insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }

    fn add(&self, key: &str, delta: i64, ttl: Option<Duration>) -> Result<(i64, Option<Duration>)> {
        let now = Instant::now();
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) if !occupied.get().is_expired(now) => {
                let entry = occupied.get_mut();
                let current: i64 = entry
                    .value
                    .parse()
                    .map_err(|_| ServiceError::validation("value is not an integer"))?;
                let next = current
                    .checked_add(delta)
                    .ok_or_else(|| ServiceError::validation("increment would overflow"))?;
                entry.value = next.to_string();
                if entry.expires_at.is_none() {
                    if let Some(ttl) = ttl {
                        entry.expires_at = Some(now + ttl);
                    }
                }
                Ok((next, entry.remaining(now)))
            }
            Entry::Occupied(mut occupied) => {
                let fresh = MemoryEntry::at(now, delta.to_string(), ttl);
                let remaining = fresh.remaining(now);
                occupied.insert(fresh);
                Ok((delta, remaining))
            }
            Entry::Vacant(vacant) => {
                let fresh = MemoryEntry::at(now, delta.to_string(), ttl);
                let remaining = fresh.remaining(now);
                vacant.insert(fresh);
                Ok((delta, remaining))
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.live(key).map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            MemoryEntry::at(Instant::now(), value.to_string(), ttl),
        );
        Ok(())
    }

    async fn set_existing(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                *entry = MemoryEntry::at(now, value.to_string(), Some(ttl));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, keys: &[String]) -> Result<u64> {
        let now = Instant::now();
        let removed = keys
            .iter()
            .filter_map(|key| self.entries.remove(key))
            .filter(|(_, entry)| !entry.is_expired(now))
            .count();
        Ok(removed as u64)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.live(key).is_some())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.expires_at = Some(now + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let now = Instant::now();
        Ok(match self.live(key) {
            None => TTL_MISSING,
            Some(entry) => match entry.remaining(now) {
                None => TTL_PERSISTENT,
                Some(remaining) => ((remaining.as_millis() + 500) / 1000) as i64,
            },
        })
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
        self.add(key, delta, None).map(|(value, _)| value)
    }

    async fn incr_with_ttl(&self, key: &str, delta: i64, ttl: Duration) -> Result<(i64, Duration)> {
        self.add(key, delta, Some(ttl))
            .map(|(value, remaining)| (value, remaining.unwrap_or(ttl)))
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        Ok(keys
            .iter()
            .map(|key| self.live(key).map(|entry| entry.value))
            .collect())
    }

    async fn mset(&self, pairs: &[(String, String)], ttl: Option<Duration>) -> Result<()> {
        let now = Instant::now();
        for (key, value) in pairs {
            self.entries
                .insert(key.clone(), MemoryEntry::at(now, value.clone(), ttl));
        }
        Ok(())
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>)> {
        let matcher = self.matcher(pattern)?;
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| !entry.is_expired(now) && matcher.is_match(entry.key()))
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();

        let start = (cursor as usize).min(keys.len());
        let end = start.saturating_add(count.max(1)).min(keys.len());
        let page = keys[start..end].to_vec();
        let next = if end >= keys.len() { 0 } else { end as u64 };
        Ok((next, page))
    }
}
