//! Health check endpoint

use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::services::BackendKind;
use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::Serialize;
use std::borrow::Cow;
use tracing::{debug, warn};

/// Configure health check routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: Cow<'static, str>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: Cow<'static, str>,
    pub uptime_seconds: u64,
    pub store: StoreHealth,
    pub quota: QuotaHealth,
}

#[derive(Debug, Serialize)]
pub struct StoreHealth {
    pub backend: &'static str,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuotaHealth {
    pub enabled: bool,
    pub backend: BackendKind,
}

/// Liveness plus dependency status.
///
/// Always answers 200 while the process is up; a failed store probe only
/// turns the status to `degraded`.
pub async fn health_check(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    debug!("Health check requested");

    let probe = state.store.ping().await;
    if let Err(e) = &probe {
        warn!(error = %e, "Store health probe failed");
    }

    let store = StoreHealth {
        backend: state.store.backend_name(),
        healthy: probe.is_ok(),
        error: probe.err().map(|e| e.to_string()),
    };

    let status = HealthStatus {
        status: if store.healthy {
            Cow::Borrowed("healthy")
        } else {
            Cow::Borrowed("degraded")
        },
        timestamp: chrono::Utc::now(),
        version: Cow::Borrowed(env!("CARGO_PKG_VERSION")),
        uptime_seconds: state.monitoring.uptime().as_secs(),
        store,
        quota: QuotaHealth {
            enabled: state.limiter.is_enabled(),
            backend: state.limiter.backend_kind(),
        },
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(status)))
}
