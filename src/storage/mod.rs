//! Storage layer for the gateway
//!
//! The routing engine talks to persistence only through the collaborator
//! traits defined here:
//!
//! - [`CatalogStore`] reads providers, their models, credentials and rotation
//!   settings (and accepts seed writes at startup)
//! - [`HealthStore`] applies counter and priority changes, each as a single
//!   atomic write
//! - [`UsageLogSink`] appends usage log entries
//!
//! [`database::SeaOrmDatabase`] implements them over SQL, [`memory::MemoryStore`]
//! in process.

/// Database storage module
pub mod database;
/// In-memory storage module
pub mod memory;
/// Startup seeding
pub mod seed;

pub use database::SeaOrmDatabase;
pub use memory::MemoryStore;
pub use seed::seed_catalog;

use crate::config::StorageConfig;
use crate::core::models::{
    CatalogSnapshot, Credential, Provider, RotationSettings, UsageLogEntry,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Priority decrease applied by one failure
///
/// `priority - step`, clamped at `floor`. A priority already below the floor
/// is left untouched so a decay never raises a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityDecay {
    pub step: i64,
    pub floor: i64,
}

impl PriorityDecay {
    pub fn new(step: i64, floor: i64) -> Self {
        Self {
            step: step.max(0),
            floor,
        }
    }

    pub fn apply(&self, priority: i64) -> i64 {
        let lowered = priority.saturating_sub(self.step);
        if lowered > self.floor {
            lowered
        } else if priority > self.floor {
            self.floor
        } else {
            priority
        }
    }
}

/// Read access to the provider catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All providers (with declared models) and all credentials
    async fn snapshot(&self) -> Result<CatalogSnapshot>;

    async fn rotation_settings(&self) -> Result<RotationSettings>;

    async fn find_provider(&self, id: &str) -> Result<Option<Provider>>;

    async fn find_credential(&self, id: &str) -> Result<Option<Credential>>;

    /// Whether the catalog holds no provider at all
    async fn is_empty(&self) -> Result<bool>;

    /// Insert a provider with its declared models
    async fn insert_provider(&self, provider: &Provider) -> Result<()>;

    async fn insert_credential(&self, credential: &Credential) -> Result<()>;

    async fn save_rotation_settings(&self, settings: &RotationSettings) -> Result<()>;

    /// Write rotation settings, providers and credentials as one unit
    ///
    /// Either every row is stored or none is.
    async fn insert_catalog(
        &self,
        rotation: &RotationSettings,
        entries: &[(Provider, Vec<Credential>)],
    ) -> Result<()>;
}

/// Health writes performed after each attempt
///
/// Every method is a single atomic write against the current stored values;
/// implementations never read a row, compute in memory and write it back.
/// Methods return the row as it reads after the write, `None` when it does
/// not exist.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// `total_requests += 1`, clear `last_error`, stamp `last_used_at`
    async fn record_success(
        &self,
        credential_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Credential>>;

    /// `failed_requests += 1`, set `last_error`, stamp `last_used_at` and
    /// apply `decay` to the priority when given
    async fn record_failure(
        &self,
        credential_id: &str,
        message: &str,
        decay: Option<PriorityDecay>,
        at: DateTime<Utc>,
    ) -> Result<Option<Credential>>;

    /// Apply `decay` to the provider priority if none of its active
    /// credentials is above `threshold`
    async fn decay_provider_if_exhausted(
        &self,
        provider_id: &str,
        threshold: i64,
        decay: PriorityDecay,
    ) -> Result<Option<Provider>>;

    /// Overwrite a credential priority
    async fn set_credential_priority(
        &self,
        credential_id: &str,
        priority: i64,
    ) -> Result<Option<Credential>>;
}

/// Append-only usage log
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsageLogSink: Send + Sync {
    async fn append(&self, entry: &UsageLogEntry) -> Result<()>;
}

/// Storage handles shared by the router and the server
#[derive(Clone)]
pub struct StorageLayer {
    pub catalog: Arc<dyn CatalogStore>,
    pub health: Arc<dyn HealthStore>,
    pub usage: Arc<dyn UsageLogSink>,
}

impl StorageLayer {
    /// Connect to the configured backend
    ///
    /// The database is used when enabled; otherwise an in-memory store backs
    /// every collaborator.
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        if config.database.enabled {
            let database = Arc::new(SeaOrmDatabase::new(&config.database).await?);
            database.migrate().await?;
            Ok(Self::from_shared(database))
        } else {
            info!("Database disabled, using in-memory store");
            Ok(Self::from_shared(Arc::new(MemoryStore::new())))
        }
    }

    /// One backend serving all three collaborators
    pub fn from_shared<S>(store: Arc<S>) -> Self
    where
        S: CatalogStore + HealthStore + UsageLogSink + 'static,
    {
        Self {
            catalog: store.clone(),
            health: store.clone(),
            usage: store,
        }
    }
}

impl std::fmt::Debug for StorageLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageLayer").finish_non_exhaustive()
    }
}
