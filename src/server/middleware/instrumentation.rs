//! Request instrumentation middleware
//!
//! Every request gets a correlation id, either the caller's `x-request-id`
//! or a fresh uuid, and is timed through the monitoring system. A caller id
//! that is already in flight is replaced so concurrent requests never share
//! timing state; the response echoes the id the request was recorded under.

use crate::monitoring::MonitoringSystem;
use crate::server::state::AppState;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{HttpMessage, web};
use futures::future::{Ready, ready};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied correlation id that is accepted as is
const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation id of the current request, stored in request extensions so
/// handlers can attribute database time to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Instrumentation middleware for Actix-web
pub struct InstrumentationMiddleware;

impl<S, B> Transform<S, ServiceRequest> for InstrumentationMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = InstrumentationMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(InstrumentationMiddlewareService { service }))
    }
}

/// Service implementation for instrumentation middleware
pub struct InstrumentationMiddlewareService<S> {
    service: S,
}

/// Caller's id when it is a sane header value, otherwise a new uuid
fn correlation_id(req: &ServiceRequest) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Start timing under `requested`, or under a fresh uuid when that id is taken
pub(super) fn begin_request(monitoring: &MonitoringSystem, requested: String) -> String {
    if monitoring.request_start(&requested) {
        return requested;
    }
    let fresh = Uuid::new_v4().to_string();
    debug!(requested = %requested, assigned = %fresh, "Correlation id already in flight");
    monitoring.request_start(&fresh);
    fresh
}

impl<S, B> Service<ServiceRequest> for InstrumentationMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let app_state = req.app_data::<web::Data<AppState>>().cloned();
        let requested = correlation_id(&req);
        let method = req.method().to_string();
        let path = req.path().to_string();
        let user_id = app_state.as_ref().and_then(|state| {
            req.headers()
                .get(state.config.app.rate_limit.user_id_header.as_str())
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        });

        let request_id = match &app_state {
            Some(state) => begin_request(&state.monitoring, requested),
            None => requested,
        };
        req.extensions_mut()
            .insert(CorrelationId(request_id.clone()));
        debug!(request_id = %request_id, %method, %path, "Processing request");

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            // Route patterns keep per-id paths from splitting endpoint stats.
            let (status, endpoint) = match &result {
                Ok(res) => (
                    res.status().as_u16(),
                    res.request().match_pattern().unwrap_or_else(|| path.clone()),
                ),
                Err(e) => (e.as_response_error().status_code().as_u16(), path.clone()),
            };

            if let Some(state) = &app_state {
                state.monitoring.request_end(
                    &request_id,
                    &endpoint,
                    &method,
                    status,
                    user_id.as_deref(),
                );
            }

            let mut res = result?;
            match HeaderValue::from_str(&request_id) {
                Ok(value) => {
                    res.headers_mut()
                        .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
                }
                Err(e) => warn!(error = %e, "Correlation id is not a valid header value"),
            }
            Ok(res)
        })
    }
}
