//! HTTP middleware implementations
//!
//! - **instrumentation**: correlation ids and request timing
//! - **rate_limit**: per-client quotas with `X-RateLimit-*` headers

mod instrumentation;
mod rate_limit;


pub use instrumentation::{
    CorrelationId, InstrumentationMiddleware, InstrumentationMiddlewareService, REQUEST_ID_HEADER,
};
pub use rate_limit::{
    LIMIT_HEADER, REMAINING_HEADER, RESET_HEADER, RateLimitMiddleware, RateLimitMiddlewareService,
    apply_quota_headers, client_identity,
};
