//! Server builder and run_server function

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::{GatewayError, Result};
use std::path::Path;
use tracing::{info, warn};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/gateway.yaml";

/// Server builder for easier configuration
#[derive(Default)]
pub struct ServerBuilder {
    config: Option<Config>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self { config: None }
    }

    /// Set configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the HTTP server
    pub async fn build(self) -> Result<HttpServer> {
        let config = self
            .config
            .ok_or_else(|| GatewayError::Config("Configuration is required".to_string()))?;

        HttpServer::new(&config).await
    }
}

/// Load the configuration file, or the defaults when it does not exist
pub async fn load_config(path: &Path) -> Result<Config> {
    let config = if tokio::fs::try_exists(path).await.unwrap_or(false) {
        Config::from_file(path).await?
    } else {
        warn!(
            "Configuration file {} not found, using default configuration",
            path.display()
        );
        Config::default()
    };
    config.with_env_overrides()
}

/// Run the server with the configuration at `config_path`
pub async fn run_server(config_path: &Path) -> Result<()> {
    info!("Starting keyrelay gateway");

    let config = load_config(config_path).await?;
    if config.providers().is_empty() {
        warn!("No providers configured; requests will fail until the catalog is populated");
    }

    let server = ServerBuilder::new().with_config(config.clone()).build().await?;
    info!("Server starting at: http://{}", config.server().address());
    info!("API Endpoints:");
    info!("   GET  /health - Health check");
    info!("   GET  /v1/models - Model list");
    info!("   POST /v1/chat/completions - Chat completions");
    info!("   POST /v1/credentials/{{id}}/test - Credential probe");

    server.start().await
}
