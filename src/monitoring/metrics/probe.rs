//! Resource probes
//!
//! Real readings come from sysinfo when the `metrics` feature is enabled.

use crate::monitoring::types::{HostUsage, MemoryTotals, ProcessUsage};
use std::sync::Arc;

/// Source of process and host readings
pub trait ResourceProbe: Send + Sync {
    fn process(&self) -> ProcessUsage;

    fn host(&self) -> HostUsage;
}

/// Fixed readings, for tests and builds without the `metrics` feature
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticProbe {
    pub process: ProcessUsage,
    pub host: HostUsage,
}

impl StaticProbe {
    pub fn new(process: ProcessUsage, host: HostUsage) -> Self {
        Self { process, host }
    }
}

impl ResourceProbe for StaticProbe {
    fn process(&self) -> ProcessUsage {
        self.process
    }

    fn host(&self) -> HostUsage {
        self.host
    }
}

#[cfg(feature = "metrics")]
pub use sysinfo_probe::SysinfoProbe;

#[cfg(feature = "metrics")]
mod sysinfo_probe {
    use super::*;
    use parking_lot::Mutex;
    use std::time::{Duration, Instant};
    use sysinfo::{Pid, ProcessesToUpdate, System};

    /// Process readings are cached briefly so per-request sampling stays cheap
    const PROCESS_REFRESH: Duration = Duration::from_millis(500);

    /// sysinfo-backed probe
    pub struct SysinfoProbe {
        system: Mutex<System>,
        pid: Option<Pid>,
        cached: Mutex<Option<(Instant, ProcessUsage)>>,
    }

    impl std::fmt::Debug for SysinfoProbe {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("SysinfoProbe").field("pid", &self.pid).finish()
        }
    }

    impl SysinfoProbe {
        pub fn new() -> Self {
            let mut system = System::new();
            system.refresh_cpu_usage();
            system.refresh_memory();
            Self {
                system: Mutex::new(system),
                pid: sysinfo::get_current_pid().ok(),
                cached: Mutex::new(None),
            }
        }
    }

    impl Default for SysinfoProbe {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ResourceProbe for SysinfoProbe {
        fn process(&self) -> ProcessUsage {
            if let Some((at, usage)) = *self.cached.lock() {
                if at.elapsed() < PROCESS_REFRESH {
                    return usage;
                }
            }

            let Some(pid) = self.pid else {
                return ProcessUsage::default();
            };

            let usage = {
                let mut system = self.system.lock();
                system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
                let cores = system.cpus().len().max(1) as f64;
                system
                    .process(pid)
                    .map(|process| ProcessUsage {
                        memory_bytes: process.memory(),
                        cpu_fraction: (f64::from(process.cpu_usage()) / 100.0 / cores).clamp(0.0, 1.0),
                        uptime_secs: process.run_time(),
                    })
                    .unwrap_or_default()
            };

            *self.cached.lock() = Some((Instant::now(), usage));
            usage
        }

        fn host(&self) -> HostUsage {
            let mut system = self.system.lock();
            system.refresh_cpu_usage();
            system.refresh_memory();
            let load = System::load_average();
            HostUsage {
                cpu_fraction: (f64::from(system.global_cpu_usage()) / 100.0).clamp(0.0, 1.0),
                load_average: [load.one, load.five, load.fifteen],
                memory: MemoryTotals {
                    total: system.total_memory(),
                    free: system.free_memory(),
                    used: system.used_memory(),
                },
            }
        }
    }
}

/// The probe used by the running service
pub fn default_probe() -> Arc<dyn ResourceProbe> {
    #[cfg(feature = "metrics")]
    {
        Arc::new(SysinfoProbe::new())
    }
    #[cfg(not(feature = "metrics"))]
    {
        Arc::new(StaticProbe::default())
    }
}
