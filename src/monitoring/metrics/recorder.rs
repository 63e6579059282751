//! Request metrics recorder

use super::probe::ResourceProbe;
use crate::monitoring::bounded::BoundedLog;
use crate::monitoring::types::{RequestMetric, ResourceUsage};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Bookkeeping for a request that has not finished yet
#[derive(Debug, Clone)]
struct PendingRequest {
    /// `None` when db time was reported before `request_start`
    started: Option<(Instant, DateTime<Utc>)>,
    db_time_ms: f64,
    db_count: u32,
    touched: DateTime<Utc>,
}

impl PendingRequest {
    fn empty() -> Self {
        Self {
            started: None,
            db_time_ms: 0.0,
            db_count: 0,
            touched: Utc::now(),
        }
    }
}

/// Records request start/end events into a bounded metric log
pub struct MetricsRecorder {
    pending: Mutex<HashMap<String, PendingRequest>>,
    metrics: BoundedLog<RequestMetric>,
    probe: Arc<dyn ResourceProbe>,
    /// Denominator for the memory fraction
    memory_budget: u64,
}

impl std::fmt::Debug for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRecorder")
            .field("pending", &self.pending.lock().len())
            .field("metrics", &self.metrics.len())
            .field("capacity", &self.metrics.capacity())
            .finish()
    }
}

impl MetricsRecorder {
    /// `memory_budget` of `None` measures against total host memory
    pub fn new(capacity: usize, probe: Arc<dyn ResourceProbe>, memory_budget: Option<u64>) -> Self {
        let memory_budget = memory_budget.unwrap_or_else(|| probe.host().memory.total);
        Self {
            pending: Mutex::new(HashMap::new()),
            metrics: BoundedLog::new(capacity),
            probe,
            memory_budget,
        }
    }

    /// Mark a request as started. Returns `false`, leaving the running
    /// request untouched, when `correlation_id` is already in flight.
    pub fn request_start(&self, correlation_id: &str) -> bool {
        let now = (Instant::now(), Utc::now());
        let mut pending = self.pending.lock();
        let entry = pending
            .entry(correlation_id.to_string())
            .or_insert_with(PendingRequest::empty);
        if entry.started.is_some() {
            return false;
        }
        entry.started = Some(now);
        entry.touched = now.1;
        true
    }

    /// Accumulate database time for an in-flight request
    pub fn record_db_query(&self, correlation_id: &str, duration_ms: f64) {
        let mut pending = self.pending.lock();
        let entry = pending
            .entry(correlation_id.to_string())
            .or_insert_with(PendingRequest::empty);
        entry.db_time_ms += duration_ms.max(0.0);
        entry.db_count += 1;
        entry.touched = Utc::now();
    }

    /// Finish a request and append its metric.
    ///
    /// Without a matching `request_start` the elapsed time is measured from
    /// now, so the metric records a near-zero response time.
    pub fn request_end(
        &self,
        correlation_id: &str,
        endpoint: &str,
        method: &str,
        status_code: u16,
        user_id: Option<&str>,
    ) -> RequestMetric {
        let pending = self.pending.lock().remove(correlation_id);
        let (db_time_ms, db_count, started) = match pending {
            Some(p) => (p.db_time_ms, p.db_count, p.started),
            None => (0.0, 0, None),
        };

        if started.is_none() {
            debug!(correlation_id, "request_end without request_start");
        }
        let (started_instant, started_at) = started.unwrap_or_else(|| (Instant::now(), Utc::now()));

        self.finish(
            correlation_id,
            started_instant.elapsed(),
            started_at,
            endpoint,
            method,
            status_code,
            user_id,
            db_time_ms,
            db_count,
        )
    }

    /// Append a request whose duration was measured elsewhere
    pub fn record_completed(
        &self,
        correlation_id: &str,
        endpoint: &str,
        method: &str,
        status_code: u16,
        response_time: Duration,
        user_id: Option<&str>,
    ) -> RequestMetric {
        let started_at = Utc::now()
            - chrono::Duration::from_std(response_time).unwrap_or_else(|_| chrono::Duration::zero());
        self.finish(
            correlation_id,
            response_time,
            started_at,
            endpoint,
            method,
            status_code,
            user_id,
            0.0,
            0,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        correlation_id: &str,
        elapsed: Duration,
        started_at: DateTime<Utc>,
        endpoint: &str,
        method: &str,
        status_code: u16,
        user_id: Option<&str>,
        db_query_time_ms: f64,
        db_query_count: u32,
    ) -> RequestMetric {
        let metric = RequestMetric {
            id: correlation_id.to_string(),
            started_at,
            finished_at: Utc::now(),
            response_time_ms: elapsed.as_secs_f64() * 1000.0,
            endpoint: endpoint.to_string(),
            method: method.to_ascii_uppercase(),
            status_code,
            user_id: user_id.map(str::to_string),
            resources: self.resource_usage(),
            db_query_time_ms,
            db_query_count,
        };

        if self.metrics.push(metric.clone()) {
            debug!(capacity = self.metrics.capacity(), "Metric log full, dropped oldest entry");
        }
        metric
    }

    /// Current process usage against the memory budget
    pub fn resource_usage(&self) -> ResourceUsage {
        let process = self.probe.process();
        ResourceUsage {
            memory_bytes: process.memory_bytes,
            memory_fraction: crate::utils::ratio(process.memory_bytes as f64, self.memory_budget as f64),
            cpu_fraction: process.cpu_fraction,
        }
    }

    pub fn memory_budget(&self) -> u64 {
        self.memory_budget
    }

    pub fn metrics(&self) -> &BoundedLog<RequestMetric> {
        &self.metrics
    }

    /// Requests started but not yet finished
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Forget in-flight entries untouched since `cutoff`
    pub fn purge_pending_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut pending = self.pending.lock();
        let before = pending.len();
        pending.retain(|_, p| p.touched >= cutoff);
        before - pending.len()
    }
}
