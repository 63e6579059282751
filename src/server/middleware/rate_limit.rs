//! Rate limiting middleware
//!
//! Resolves the client identity, picks the quota class and charges one point
//! before the request reaches a handler. Store failures fail open.

use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::services::{ClientIdentity, QuotaDecision, QuotaMeta};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::error::InternalError;
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use actix_web::{HttpResponse, web};
use futures::future::{Ready, ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use tracing::{debug, warn};

pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// Paths never charged against a quota
const EXEMPT_PATHS: &[&str] = &["/health"];

/// Rate limit middleware for Actix-web
pub struct RateLimitMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RateLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

/// Service implementation for rate limit middleware
pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
}

/// Identity from the configured API key and user id headers, then the peer address
pub fn client_identity(req: &ServiceRequest, state: &AppState) -> ClientIdentity {
    let config = &state.config.app.rate_limit;
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
    };
    let api_key = header(&config.api_key_header);
    let user_id = header(&config.user_id_header);
    let address = req.connection_info().peer_addr().map(str::to_string);

    ClientIdentity::resolve(api_key.as_deref(), user_id.as_deref(), address.as_deref())
}

/// `X-RateLimit-*` headers for any outcome
pub fn apply_quota_headers(headers: &mut HeaderMap, meta: &QuotaMeta) {
    headers.insert(
        HeaderName::from_static(LIMIT_HEADER),
        HeaderValue::from(meta.limit),
    );
    headers.insert(
        HeaderName::from_static(REMAINING_HEADER),
        HeaderValue::from(meta.remaining),
    );
    headers.insert(
        HeaderName::from_static(RESET_HEADER),
        HeaderValue::from(meta.reset_at.timestamp()),
    );
}

fn rejection_response(meta: &QuotaMeta) -> HttpResponse {
    let retry_after = meta.retry_after_secs().unwrap_or(0);
    let mut response = HttpResponse::TooManyRequests().json(ApiResponse::error(format!(
        "Too many requests, retry in {} seconds",
        retry_after
    )));
    let headers = response.headers_mut();
    apply_quota_headers(headers, meta);
    headers.insert(RETRY_AFTER, HeaderValue::from(retry_after));
    response
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let app_state = req
            .app_data::<web::Data<AppState>>()
            .cloned()
            .filter(|state| state.limiter.is_enabled());

        let Some(state) = app_state.filter(|_| !EXEMPT_PATHS.contains(&req.path())) else {
            return Box::pin(service.call(req));
        };

        let identity = client_identity(&req, &state);
        let class = state.limiter.classify(req.path(), &identity);
        let key = identity.key();

        Box::pin(async move {
            let meta = match state.limiter.consume(class, &key).await {
                Ok(QuotaDecision::Allowed(meta)) => Some(meta),
                Ok(QuotaDecision::Rejected(meta)) => {
                    debug!(client = %identity, %class, "Request rejected by quota");
                    return Err(
                        InternalError::from_response("rate limited", rejection_response(&meta))
                            .into(),
                    );
                }
                Err(e) => {
                    warn!(client = %identity, %class, error = %e, "Quota check failed; allowing request");
                    None
                }
            };

            let mut res = service.call(req).await?;
            if let Some(meta) = meta {
                apply_quota_headers(res.headers_mut(), &meta);
            }
            Ok(res)
        })
    }
}
