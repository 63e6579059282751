//! Test fixtures and data factories
//!
//! Every fixture builds real components over an [`InMemoryStore`]; nothing
//! here is a mock.

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use stockyard::monitoring::StaticProbe;
use stockyard::monitoring::types::{
    HostUsage, MemoryTotals, ProcessUsage, RequestMetric, ResourceUsage,
};
use stockyard::storage::InMemoryStore;
use stockyard::{AppContext, Config};
use uuid::Uuid;

/// One GiB, the host memory reported by fixture probes
pub const TEST_MEMORY_TOTAL: u64 = 1 << 30;

/// Probe reporting a fixed process footprint on a 1 GiB host
pub fn fixed_probe(memory_bytes: u64, cpu_fraction: f64) -> Arc<StaticProbe> {
    Arc::new(StaticProbe::new(
        ProcessUsage {
            memory_bytes,
            cpu_fraction,
            uptime_secs: 60,
        },
        HostUsage {
            cpu_fraction,
            load_average: [0.5, 0.4, 0.3],
            memory: MemoryTotals {
                total: TEST_MEMORY_TOTAL,
                free: TEST_MEMORY_TOTAL.saturating_sub(memory_bytes),
                used: memory_bytes,
            },
        },
    ))
}

/// Context with default configuration and a quiet probe
pub async fn memory_context() -> AppContext {
    memory_context_with(Config::default(), fixed_probe(64 << 20, 0.05)).await
}

pub async fn memory_context_with(config: Config, probe: Arc<StaticProbe>) -> AppContext {
    match AppContext::with_store(config, Arc::new(InMemoryStore::new()), probe).await {
        Ok(context) => context,
        Err(e) => panic!("context over the in-memory store: {}", e),
    }
}

/// Factory for request metrics with sensible defaults
pub struct MetricFactory;

impl MetricFactory {
    /// A GET request that took `response_ms` and finished `age_secs` ago
    pub fn completed(
        endpoint: &str,
        status_code: u16,
        response_ms: f64,
        age_secs: i64,
    ) -> RequestMetric {
        let finished_at = Utc::now() - ChronoDuration::seconds(age_secs);
        RequestMetric {
            id: Uuid::new_v4().to_string(),
            started_at: finished_at - ChronoDuration::milliseconds(response_ms as i64),
            finished_at,
            response_time_ms: response_ms,
            endpoint: endpoint.to_string(),
            method: "GET".to_string(),
            status_code,
            user_id: None,
            resources: ResourceUsage::default(),
            db_query_time_ms: 0.0,
            db_query_count: 0,
        }
    }
}
