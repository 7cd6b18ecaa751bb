//! # keyrelay
//!
//! An OpenAI-compatible completion gateway that spreads traffic over many
//! vendor API keys.
//!
//! ## Features
//!
//! - **OpenAI Compatible**: one `/v1/chat/completions` contract for every vendor
//! - **Multi-Vendor**: Google Gemini, Anthropic and any OpenAI-compatible API
//! - **Credential Failover**: candidates are tried in priority order until one succeeds
//! - **Priority Demotion**: failing keys sink, rate-limited and revoked keys sink faster
//! - **Usage Logging**: every upstream attempt is recorded
//!
//! ## Gateway Mode
//!
//! ```rust,no_run
//! use keyrelay::{Config, Gateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/gateway.yaml").await?;
//!     let gateway = Gateway::new(config).await?;
//!     gateway.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{GatewayError, Result};

pub use core::models::{Credential, Provider, RotationSettings, RotationStrategy, VendorKind};
pub use core::router::{FailoverExecutor, ProbeReport, RoutingError};
pub use core::types::{ChatCompletionResponse, ChatMessage, ChatRequest, MessageRole};

use tracing::{debug, info};

/// A running gateway: configuration plus its HTTP server
pub struct Gateway {
    config: Config,
    server: server::HttpServer,
}

impl Gateway {
    /// Create a new gateway instance
    pub async fn new(config: Config) -> Result<Self> {
        info!("Creating new gateway instance");

        let server = server::HttpServer::new(&config).await?;

        Ok(Self { config, server })
    }

    /// Run the gateway server
    pub async fn run(self) -> Result<()> {
        info!("Starting keyrelay gateway");
        debug!(
            providers = self.config.providers().len(),
            auth = self.config.auth().enabled,
            "Effective configuration"
        );

        self.server.start().await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
