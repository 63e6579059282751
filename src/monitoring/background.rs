//! Background task lifecycle
//!
//! Every periodic job runs on its own tokio task and stops when the shared
//! watch channel flips to `true`.

use super::system::MonitoringSystem;
use crate::services::{QuotaLimiter, SessionDirectory};
use futures::future::join_all;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// How long `shutdown` waits for tasks to finish their current tick
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Optional jobs besides the always-on monitoring loops
#[derive(Debug, Clone, Default)]
pub struct BackgroundJobs {
    pub limiter: Option<QuotaLimiter>,
    pub sessions: Option<SessionDirectory>,
    /// Interval between scheduled report deliveries
    pub report_schedule: Option<Duration>,
    pub session_cleanup_interval: Option<Duration>,
}

/// Handles of running background tasks
#[derive(Debug)]
pub struct BackgroundTasks {
    shutdown: watch::Sender<bool>,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl BackgroundTasks {
    /// Spawn the sampler, retention, dispatcher and optional jobs
    pub fn start(monitoring: MonitoringSystem, jobs: BackgroundJobs) -> Self {
        let (shutdown, _) = watch::channel(false);
        let mut tasks = Self {
            shutdown,
            handles: Vec::new(),
        };
        let config = monitoring.config().clone();

        let sampler = monitoring.clone();
        tasks.spawn_periodic("system_sampler", config.sample_interval(), true, move || {
            let monitoring = sampler.clone();
            async move {
                monitoring.sample_system().await;
            }
        });

        let retention = monitoring.clone();
        tasks.spawn_periodic("retention", config.retention_interval(), false, move || {
            let monitoring = retention.clone();
            async move {
                monitoring.sweep();
            }
        });

        let dispatcher = monitoring.clone();
        tasks.spawn_periodic("alert_dispatcher", config.dispatch_interval(), false, move || {
            let monitoring = dispatcher.clone();
            async move {
                monitoring.dispatch_pending().await;
            }
        });

        if let Some(period) = jobs.report_schedule {
            let reporter = monitoring.clone();
            tasks.spawn_periodic("scheduled_report", period, false, move || {
                let monitoring = reporter.clone();
                async move {
                    if let Err(e) = monitoring.send_report(Default::default()).await {
                        warn!("Scheduled report failed: {}", e);
                    }
                }
            });
        }

        if let Some(limiter) = jobs.limiter {
            tasks.spawn_periodic("quota_purge", config.retention_interval(), false, move || {
                let limiter = limiter.clone();
                async move {
                    let purged = limiter.purge_expired().await;
                    if purged > 0 {
                        debug!(purged, "Purged expired local quota windows");
                    }
                }
            });
        }

        if let (Some(sessions), Some(period)) = (jobs.sessions, jobs.session_cleanup_interval) {
            tasks.spawn_periodic("session_cleanup", period, false, move || {
                let sessions = sessions.clone();
                async move {
                    sessions.cleanup_expired().await;
                }
            });
        }

        info!(tasks = tasks.handles.len(), "Background tasks started");
        tasks
    }

    fn spawn_periodic<F, Fut>(&mut self, name: &'static str, period: Duration, immediate: bool, job: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut stop = self.shutdown.subscribe();
        let start = if immediate {
            Instant::now()
        } else {
            Instant::now() + period
        };

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => job().await,
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!(task = name, "Background task stopped");
        });
        self.handles.push((name, handle));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        self.handles.iter().map(|(name, _)| *name).collect()
    }

    /// Signal every task and wait for them to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let names: Vec<&'static str> = self.handles.iter().map(|(name, _)| *name).collect();
        let joined = join_all(self.handles.into_iter().map(|(_, handle)| handle));

        match tokio::time::timeout(SHUTDOWN_GRACE, joined).await {
            Ok(results) => {
                for (name, result) in names.iter().zip(results) {
                    if let Err(e) = result {
                        warn!(task = name, error = %e, "Background task ended abnormally");
                    }
                }
                info!("Background tasks stopped");
            }
            Err(_) => warn!("Background tasks did not stop within {:?}", SHUTDOWN_GRACE),
        }
    }
}
