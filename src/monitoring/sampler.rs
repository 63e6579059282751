//! Periodic system sampling

use super::bounded::BoundedLog;
use super::dependencies::DependencyStats;
use super::metrics::ResourceProbe;
use super::types::SystemSnapshot;
use chrono::Utc;
use futures::future::join_all;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Captures host, process and dependency state into a bounded snapshot log
pub struct SystemSampler {
    probe: Arc<dyn ResourceProbe>,
    dependencies: RwLock<Vec<Arc<dyn DependencyStats>>>,
    snapshots: BoundedLog<SystemSnapshot>,
    memory_budget: u64,
}

impl std::fmt::Debug for SystemSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemSampler")
            .field("snapshots", &self.snapshots.len())
            .field("dependencies", &self.dependencies.read().len())
            .finish()
    }
}

impl SystemSampler {
    pub fn new(probe: Arc<dyn ResourceProbe>, capacity: usize, memory_budget: u64) -> Self {
        Self {
            probe,
            dependencies: RwLock::new(Vec::new()),
            snapshots: BoundedLog::new(capacity),
            memory_budget,
        }
    }

    pub fn add_dependency(&self, dependency: Arc<dyn DependencyStats>) {
        self.dependencies.write().push(dependency);
    }

    /// Take one snapshot and append it
    pub async fn sample(&self) -> SystemSnapshot {
        let dependencies = self.dependencies.read().clone();
        let pools = join_all(dependencies.iter().map(|d| d.pool_stats())).await;

        let host = self.probe.host();
        let process = self.probe.process();
        let snapshot = SystemSnapshot {
            timestamp: Utc::now(),
            host,
            process,
            memory_fraction: crate::utils::ratio(process.memory_bytes as f64, self.memory_budget as f64),
            pools,
        };

        debug!(
            cpu = snapshot.host.cpu_fraction,
            memory = snapshot.memory_fraction,
            "Captured system snapshot"
        );
        self.snapshots.push(snapshot.clone());
        snapshot
    }

    pub fn snapshots(&self) -> &BoundedLog<SystemSnapshot> {
        &self.snapshots
    }
}
