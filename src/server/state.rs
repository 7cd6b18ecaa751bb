//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::router::FailoverExecutor;
use crate::services::EventBus;
use crate::storage::StorageLayer;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// Cloned into every worker; all fields are cheap `Arc` handles.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Gateway configuration (shared read-only)
    pub config: Arc<Config>,
    /// Catalog, health and usage collaborators
    pub storage: StorageLayer,
    /// Failover router
    pub executor: Arc<FailoverExecutor>,
    /// Change notifications
    pub events: Arc<EventBus>,
}

impl AppState {
    pub fn new(
        config: Config,
        storage: StorageLayer,
        executor: FailoverExecutor,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            executor: Arc::new(executor),
            events,
        }
    }

    /// Get gateway configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
