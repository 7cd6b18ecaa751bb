//! In-memory storage backend
//!
//! Used when the database is disabled and throughout the test suite. Each
//! health write holds the entry lock of the row it changes for the whole
//! update, so concurrent writers never lose an increment.

use super::{CatalogStore, HealthStore, PriorityDecay, UsageLogSink};
use crate::core::models::{
    CatalogSnapshot, Credential, Provider, RotationSettings, UsageLogEntry,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};

#[derive(Debug, Default)]
pub struct MemoryStore {
    providers: DashMap<String, Provider>,
    credentials: DashMap<String, Credential>,
    rotation: RwLock<RotationSettings>,
    usage_logs: Mutex<Vec<UsageLogEntry>>,
    // serializes the provider cascade check-and-update
    cascade: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every usage log entry, oldest first
    pub fn usage_logs(&self) -> Vec<UsageLogEntry> {
        self.usage_logs.lock().clone()
    }

    pub fn credential(&self, id: &str) -> Option<Credential> {
        self.credentials.get(id).map(|c| c.clone())
    }

    pub fn provider(&self, id: &str) -> Option<Provider> {
        self.providers.get(id).map(|p| p.clone())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn snapshot(&self) -> Result<CatalogSnapshot> {
        let mut providers: Vec<Provider> =
            self.providers.iter().map(|p| p.value().clone()).collect();
        let mut credentials: Vec<Credential> =
            self.credentials.iter().map(|c| c.value().clone()).collect();

        // DashMap iteration order is arbitrary
        providers.sort_by(|a, b| a.id.cmp(&b.id));
        credentials.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(CatalogSnapshot {
            providers,
            credentials,
        })
    }

    async fn rotation_settings(&self) -> Result<RotationSettings> {
        Ok(*self.rotation.read())
    }

    async fn find_provider(&self, id: &str) -> Result<Option<Provider>> {
        Ok(self.provider(id))
    }

    async fn find_credential(&self, id: &str) -> Result<Option<Credential>> {
        Ok(self.credential(id))
    }

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.providers.is_empty())
    }

    async fn insert_provider(&self, provider: &Provider) -> Result<()> {
        self.providers.insert(provider.id.clone(), provider.clone());
        Ok(())
    }

    async fn insert_credential(&self, credential: &Credential) -> Result<()> {
        self.credentials
            .insert(credential.id.clone(), credential.clone());
        Ok(())
    }

    async fn save_rotation_settings(&self, settings: &RotationSettings) -> Result<()> {
        *self.rotation.write() = *settings;
        Ok(())
    }

    async fn insert_catalog(
        &self,
        rotation: &RotationSettings,
        entries: &[(Provider, Vec<Credential>)],
    ) -> Result<()> {
        *self.rotation.write() = *rotation;
        for (provider, credentials) in entries {
            self.providers.insert(provider.id.clone(), provider.clone());
            for credential in credentials {
                self.credentials
                    .insert(credential.id.clone(), credential.clone());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl HealthStore for MemoryStore {
    async fn record_success(
        &self,
        credential_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Credential>> {
        Ok(self.credentials.get_mut(credential_id).map(|mut entry| {
            let credential = entry.value_mut();
            credential.total_requests += 1;
            credential.last_error = None;
            credential.last_used_at = Some(at);
            credential.updated_at = at;
            credential.clone()
        }))
    }

    async fn record_failure(
        &self,
        credential_id: &str,
        message: &str,
        decay: Option<PriorityDecay>,
        at: DateTime<Utc>,
    ) -> Result<Option<Credential>> {
        Ok(self.credentials.get_mut(credential_id).map(|mut entry| {
            let credential = entry.value_mut();
            credential.failed_requests += 1;
            credential.last_error = Some(message.to_string());
            credential.last_used_at = Some(at);
            credential.updated_at = at;
            if let Some(decay) = decay {
                credential.priority = decay.apply(credential.priority);
            }
            credential.clone()
        }))
    }

    async fn decay_provider_if_exhausted(
        &self,
        provider_id: &str,
        threshold: i64,
        decay: PriorityDecay,
    ) -> Result<Option<Provider>> {
        let _guard = self.cascade.lock();

        let has_healthy = self
            .credentials
            .iter()
            .any(|c| c.provider_id == provider_id && c.active && c.priority > threshold);
        if has_healthy {
            return Ok(None);
        }

        Ok(self.providers.get_mut(provider_id).map(|mut entry| {
            let provider = entry.value_mut();
            provider.priority = decay.apply(provider.priority);
            provider.clone()
        }))
    }

    async fn set_credential_priority(
        &self,
        credential_id: &str,
        priority: i64,
    ) -> Result<Option<Credential>> {
        Ok(self.credentials.get_mut(credential_id).map(|mut entry| {
            let credential = entry.value_mut();
            credential.priority = priority;
            credential.updated_at = Utc::now();
            credential.clone()
        }))
    }
}

#[async_trait]
impl UsageLogSink for MemoryStore {
    async fn append(&self, entry: &UsageLogEntry) -> Result<()> {
        self.usage_logs.lock().push(entry.clone());
        Ok(())
    }
}
