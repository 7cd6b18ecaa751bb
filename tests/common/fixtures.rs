//! Catalog fixtures

use chrono::Utc;
use keyrelay::core::models::{Credential, Provider, RotationSettings, VendorKind};
use keyrelay::storage::CatalogStore;

pub fn provider(id: &str, kind: VendorKind, base_url: &str, priority: i64, models: &[&str]) -> Provider {
    Provider {
        id: id.to_string(),
        name: id.to_string(),
        base_url: base_url.to_string(),
        vendor_kind: kind,
        active: true,
        priority,
        models: models.iter().map(|m| m.to_string()).collect(),
    }
}

pub fn credential(id: &str, provider_id: &str, api_key: &str, priority: i64) -> Credential {
    let now = Utc::now();
    Credential {
        id: id.to_string(),
        provider_id: provider_id.to_string(),
        name: Some(format!("{}-name", id)),
        api_key: api_key.to_string(),
        model: None,
        active: true,
        priority,
        total_requests: 0,
        failed_requests: 0,
        last_error: None,
        last_used_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Accumulates providers and credentials, then writes them to a store
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    providers: Vec<Provider>,
    credentials: Vec<Credential>,
    rotation: Option<RotationSettings>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(mut self, provider: Provider) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn credential(mut self, credential: Credential) -> Self {
        self.credentials.push(credential);
        self
    }

    pub fn rotation(mut self, rotation: RotationSettings) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub async fn write_to(self, store: &dyn CatalogStore) {
        if let Some(rotation) = &self.rotation {
            store.save_rotation_settings(rotation).await.unwrap();
        }
        for provider in &self.providers {
            store.insert_provider(provider).await.unwrap();
        }
        for credential in &self.credentials {
            store.insert_credential(credential).await.unwrap();
        }
    }
}
