//! Capacity- and time-bounded logs

use super::types::Timestamped;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::VecDeque;

/// Helper trait for bounded VecDeque operations
pub(crate) trait BoundedPush<T> {
    /// Push, evicting from the front past `max_size`. Returns whether anything was evicted.
    fn push_bounded(&mut self, value: T, max_size: usize) -> bool;
}

impl<T> BoundedPush<T> for VecDeque<T> {
    #[inline]
    fn push_bounded(&mut self, value: T, max_size: usize) -> bool {
        let mut evicted = false;
        while self.len() >= max_size.max(1) {
            self.pop_front();
            evicted = true;
        }
        self.push_back(value);
        evicted
    }
}

/// FIFO log with a capacity cap and a time-based sweep.
///
/// Entries are appended in completion order, so the front is always the oldest.
#[derive(Debug)]
pub struct BoundedLog<T> {
    entries: RwLock<VecDeque<T>>,
    capacity: usize,
}

impl<T: Clone + Timestamped> BoundedLog<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Append, dropping the oldest entry when full
    pub fn push(&self, value: T) -> bool {
        self.entries.write().push_bounded(value, self.capacity)
    }

    /// Newest first, at most `limit`
    pub fn recent(&self, limit: usize) -> Vec<T> {
        self.entries.read().iter().rev().take(limit).cloned().collect()
    }

    /// Entries at or after `cutoff`, oldest first
    pub fn since(&self, cutoff: DateTime<Utc>) -> Vec<T> {
        self.entries
            .read()
            .iter()
            .filter(|entry| entry.timestamp() >= cutoff)
            .cloned()
            .collect()
    }

    /// Entries matching `predicate`, newest first, at most `limit`
    pub fn find(&self, limit: usize, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.entries
            .read()
            .iter()
            .rev()
            .filter(|entry| predicate(entry))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Drop everything older than `cutoff`, returning how many entries went
    pub fn retain_since(&self, cutoff: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|entry| entry.timestamp() >= cutoff);
        before - entries.len()
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.entries.read().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
