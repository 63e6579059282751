//! Monitoring and observability system
//!
//! Request instrumentation, threshold alerting, system sampling, retention,
//! windowed summaries and reports. Everything here is in-process; the only
//! outside calls are notification channels and dependency probes.

// Public submodules
pub mod alerts;
pub mod background;
pub mod bounded;
pub mod dependencies;
pub mod metrics;
pub mod report;
pub mod retention;
pub mod sampler;
pub mod summary;
pub mod types;

mod system;

pub use alerts::{AlertDispatcher, AlertEvaluator, LogChannel, NotificationChannel, WebhookChannel};
pub use background::{BackgroundJobs, BackgroundTasks};
pub use dependencies::{DependencyStats, QuotaDependency, StoreDependency};
pub use metrics::{MetricsRecorder, ResourceProbe, StaticProbe, default_probe};
pub use report::{PerformanceReport, ReportFormat, ReportGenerator};
pub use retention::{RetentionManager, RetentionReport};
pub use sampler::SystemSampler;
pub use summary::{SummaryAggregator, SummaryWindow};
pub use system::MonitoringSystem;
pub use types::{
    Alert, AlertSeverity, AlertType, RequestMetric, SummaryPeriod, SystemSnapshot,
};
