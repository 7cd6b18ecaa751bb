//! HTTP server core implementation

use crate::config::{Config, CorsConfig, ServerConfig};
use crate::core::router::{FailoverExecutor, ReqwestTransport, UpstreamTransport};
use crate::server::middleware::AuthMiddleware;
use crate::server::routes;
use crate::server::state::AppState;
use crate::services::EventBus;
use crate::storage::{StorageLayer, seed_catalog};
use crate::utils::error::{GatewayError, Result};
use actix_cors::Cors;
use actix_web::{App, HttpServer as ActixHttpServer, middleware::DefaultHeaders, web};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

/// HTTP server
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server
    ///
    /// Connects storage, seeds an empty catalog from the configured
    /// providers and wires the failover router to a `reqwest` transport.
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        let storage = StorageLayer::new(config.storage()).await?;
        let seeded = seed_catalog(
            storage.catalog.as_ref(),
            config.providers(),
            &config.router().rotation,
        )
        .await?;
        if seeded > 0 {
            info!("Seeded {} providers from configuration", seeded);
        }

        let transport = ReqwestTransport::new()
            .map_err(|e| GatewayError::server(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_transport(
            config.clone(),
            storage,
            Arc::new(transport),
        ))
    }

    /// Assemble the server from already-built collaborators
    pub fn with_transport(
        config: Config,
        storage: StorageLayer,
        transport: Arc<dyn UpstreamTransport>,
    ) -> Self {
        let events = Arc::new(EventBus::new());
        let executor = FailoverExecutor::new(&storage, events.clone(), transport, config.router());
        let server_config = config.server().clone();
        let state = AppState::new(config, storage, executor, events);

        Self {
            config: server_config,
            state,
        }
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        info!("Starting HTTP server on {}", bind_addr);

        if self.state.config.server().cors.enabled
            && self.state.config.server().cors.allows_all_origins()
        {
            warn!("CORS allows any origin");
        }

        let state = web::Data::new(self.state);
        let mut server = ActixHttpServer::new(move || {
            App::new()
                .wrap(build_cors(&state.config.server().cors))
                .wrap(TracingLogger::default())
                .wrap(DefaultHeaders::new().add(("Server", "keyrelay")))
                .configure(|cfg| configure_app(cfg, state.clone()))
        });
        if let Some(workers) = self.config.workers {
            server = server.workers(workers);
        }

        let server = server
            .bind(&bind_addr)
            .map_err(|e| GatewayError::server(format!("Failed to bind {}: {}", bind_addr, e)))?
            .run();

        info!("HTTP server listening on {}", bind_addr);

        server
            .await
            .map_err(|e| GatewayError::server(format!("Server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
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

/// Register state, body limits and every route
///
/// Shared by the running server and `actix_web::test` apps.
pub fn configure_app(cfg: &mut web::ServiceConfig, state: web::Data<AppState>) {
    let max_body_size = state.config.server().max_body_size;
    cfg.app_data(state)
        .app_data(
            web::JsonConfig::default()
                .limit(max_body_size)
                .error_handler(|err, _req| GatewayError::bad_request(err.to_string()).into()),
        )
        .configure(routes::health::configure_routes)
        .service(
            web::scope("/v1")
                .wrap(AuthMiddleware)
                .configure(routes::configure_api_routes),
        );
}

fn build_cors(config: &CorsConfig) -> Cors {
    if !config.enabled {
        return Cors::default();
    }

    let mut cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(config.max_age as usize);

    if config.allows_all_origins() {
        cors = cors.allow_any_origin();
    } else {
        for origin in &config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }
    cors
}
