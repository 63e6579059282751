//! HTTP server core implementation

use crate::config::ServerConfig;
use crate::context::AppContext;
use crate::server::middleware::{InstrumentationMiddleware, RateLimitMiddleware};
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{Result, ServiceError};
use actix_web::dev::Server;
use actix_web::{
    App, HttpServer as ActixHttpServer,
    middleware::{DefaultHeaders, Logger},
    web,
};
use tracing::info;

/// Admin HTTP server
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    pub fn new(context: &AppContext) -> Self {
        Self {
            config: context.config.server().clone(),
            state: AppState::new(context),
        }
    }

    /// Create the Actix-web application
    ///
    /// Instrumentation wraps rate limiting so rejected requests are still
    /// recorded with their 429.
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .wrap(RateLimitMiddleware)
            .wrap(InstrumentationMiddleware)
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("Server", "Stockyard")))
            .configure(routes::health::configure_routes)
            .configure(routes::admin::configure_routes)
    }

    /// Bind the listener and return the running server.
    ///
    /// Signal handling is left to the caller, which owns the shutdown order.
    pub fn bind(self) -> Result<Server> {
        let bind_addr = self.config.address();
        info!("Starting HTTP server on {}", bind_addr);

        let state = web::Data::new(self.state);
        let mut server =
            ActixHttpServer::new(move || Self::create_app(state.clone())).disable_signals();
        if let Some(workers) = self.config.workers {
            server = server.workers(workers);
        }

        let server = server
            .bind(&bind_addr)
            .map_err(|e| Self::format_bind_error(e, &bind_addr))?
            .run();

        info!("HTTP server listening on {}", bind_addr);
        Ok(server)
    }

    /// Bind and serve until the server is stopped
    pub async fn start(self) -> Result<()> {
        self.bind()?.await?;
        info!("HTTP server stopped");
        Ok(())
    }

    fn format_bind_error(error: std::io::Error, bind_addr: &str) -> ServiceError {
        match error.kind() {
            std::io::ErrorKind::AddrInUse => ServiceError::config(format!(
                "Address {} is already in use; pick another port with --port",
                bind_addr
            )),
            std::io::ErrorKind::PermissionDenied => ServiceError::config(format!(
                "Permission denied binding {}; ports below 1024 need elevated privileges",
                bind_addr
            )),
            _ => ServiceError::Io(error),
        }
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
