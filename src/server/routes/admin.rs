//! Operator endpoints
//!
//! Read-only views over the monitoring system plus quota status and reset.
//! When `server.admin_token` is set every route here requires
//! `Authorization: Bearer <token>`.

use crate::monitoring::{AlertSeverity, ReportFormat, SummaryPeriod};
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::ServiceError;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::str::FromStr;
use tracing::{debug, info, warn};

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 1000;

/// Configure admin routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/metrics", web::get().to(recent_metrics))
            .route("/alerts", web::get().to(alerts))
            .route("/system", web::get().to(system_snapshots))
            .route("/summary", web::get().to(summary))
            .route("/report", web::get().to(report))
            .route("/report/send", web::post().to(send_report))
            .route("/rate-limit/{key}", web::get().to(rate_limit_status))
            .route("/rate-limit/{key}", web::delete().to(rate_limit_reset)),
    );
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AlertQuery {
    pub severity: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub period: Option<String>,
    pub format: Option<String>,
}

/// `limit` defaults to 100 and is capped at 1000
fn bounded_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
}

fn parse_param<T: FromStr<Err = String> + Default>(raw: Option<&str>) -> Result<T, ServiceError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value.parse().map_err(ServiceError::Validation),
        None => Ok(T::default()),
    }
}

/// Compare tokens in time independent of where they differ. Both sides are
/// hashed first so their lengths do not leak either.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    presented
        .iter()
        .zip(expected.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

fn authorize(req: &HttpRequest, state: &AppState) -> Result<(), ServiceError> {
    let Some(expected) = state.admin_token() else {
        return Ok(());
    };

    let presented = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    match presented {
        Some(token) if tokens_match(token, expected) => Ok(()),
        Some(_) => {
            warn!(path = req.path(), "Rejected admin request with invalid token");
            Err(ServiceError::Unauthorized("invalid admin token".to_string()))
        }
        None => Err(ServiceError::Unauthorized(
            "missing bearer admin token".to_string(),
        )),
    }
}

async fn recent_metrics(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<LimitQuery>,
) -> ActixResult<HttpResponse> {
    authorize(&req, &state)?;
    let limit = bounded_limit(query.limit);
    let metrics = state.monitoring.recent_metrics(limit);
    debug!(limit, returned = metrics.len(), "Recent metrics requested");

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_meta(
        metrics,
        json!({ "limit": limit, "pending": state.monitoring.pending_requests() }),
    )))
}

async fn alerts(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<AlertQuery>,
) -> ActixResult<HttpResponse> {
    authorize(&req, &state)?;
    let severity = query
        .severity
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(AlertSeverity::from_str)
        .transpose()
        .map_err(ServiceError::Validation)?;
    let limit = bounded_limit(query.limit);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        state.monitoring.alerts(severity, limit),
    )))
}

async fn system_snapshots(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<LimitQuery>,
) -> ActixResult<HttpResponse> {
    authorize(&req, &state)?;
    let limit = bounded_limit(query.limit);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        state.monitoring.system_snapshots(limit),
    )))
}

async fn summary(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ReportQuery>,
) -> ActixResult<HttpResponse> {
    authorize(&req, &state)?;
    let period: SummaryPeriod = parse_param(query.period.as_deref())?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(state.monitoring.summary(period))))
}

async fn report(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ReportQuery>,
) -> ActixResult<HttpResponse> {
    authorize(&req, &state)?;
    let period: SummaryPeriod = parse_param(query.period.as_deref())?;
    let format: ReportFormat = parse_param(query.format.as_deref())?;

    match format {
        ReportFormat::Json => Ok(HttpResponse::Ok().json(ApiResponse::success(
            state.monitoring.report(period),
        ))),
        rendered => {
            let body = state.monitoring.render_report(period, rendered)?;
            Ok(HttpResponse::Ok()
                .content_type(rendered.content_type())
                .body(body))
        }
    }
}

async fn send_report(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ReportQuery>,
) -> ActixResult<HttpResponse> {
    authorize(&req, &state)?;
    let period: SummaryPeriod = parse_param(query.period.as_deref())?;
    let report = state.monitoring.send_report(period).await?;
    info!(report_id = %report.id, %period, "Report sent on operator request");

    Ok(HttpResponse::Ok().json(ApiResponse::success(report)))
}

async fn rate_limit_status(
    req: HttpRequest,
    state: web::Data<AppState>,
    key: web::Path<String>,
) -> ActixResult<HttpResponse> {
    authorize(&req, &state)?;
    let key = key.into_inner();
    let outcomes = state.limiter.status(&key).await;
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_meta(
        outcomes,
        json!({
            "key": key,
            "backend": state.limiter.backend_kind(),
            "failed": failed,
        }),
    )))
}

async fn rate_limit_reset(
    req: HttpRequest,
    state: web::Data<AppState>,
    key: web::Path<String>,
) -> ActixResult<HttpResponse> {
    authorize(&req, &state)?;
    let key = key.into_inner();
    let outcomes = state.limiter.reset(&key).await;
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_meta(
        outcomes,
        json!({ "key": key, "failed": failed }),
    )))
}
