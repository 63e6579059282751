//! # Stockyard
//!
//! Observability and resource-protection core for the Stockyard vehicle and
//! parts marketplace.
//!
//! ## Features
//!
//! - **Request instrumentation**: per-request timing, resource readings and
//!   database time, kept in bounded in-memory logs
//! - **Alerting**: threshold alerts with severities, delivered to log and
//!   webhook channels
//! - **Summaries and reports**: windowed aggregates with recommendations,
//!   rendered as JSON, Markdown or HTML
//! - **Distributed cache**: typed, namespaced, fail-open cache over Redis
//! - **Quotas**: three quota classes with a distributed backend and a local
//!   fallback
//! - **Sessions**: store-backed sessions with sliding expiration
//!
//! ## Embedding
//!
//! ```rust,no_run
//! use stockyard::{AppContext, Config};
//! use stockyard::monitoring::BackgroundTasks;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/stockyard.yaml").await?;
//!     let context = AppContext::build(config).await?;
//!     let tasks = BackgroundTasks::start(context.monitoring.clone(), context.background_jobs());
//!
//!     let _ = context.cache.set("greeting", &"hello", None).await;
//!     context.monitoring.record_completed(
//!         "/parts",
//!         "GET",
//!         200,
//!         std::time::Duration::from_millis(42),
//!         None,
//!     );
//!
//!     tasks.shutdown().await;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod context;
pub mod monitoring;
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use context::AppContext;
pub use utils::error::{Result, ServiceError};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata stamped by the build script
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Unix seconds
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: env!("STOCKYARD_BUILD_TIME"),
            git_hash: env!("STOCKYARD_GIT_HASH"),
            rust_version: env!("STOCKYARD_RUST_VERSION"),
        }
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
