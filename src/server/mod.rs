//! Administrative HTTP server
//!
//! Health, monitoring queries and quota administration over actix-web, with
//! instrumentation and rate limiting applied to every route.

pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;


pub use server::HttpServer;
pub use state::AppState;
