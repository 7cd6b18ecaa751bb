//! Provider seed configuration
//!
//! Providers listed here are written to the store at startup when it holds
//! no provider yet.

use crate::core::models::{Credential, Provider, VendorKind};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Seed provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Stable identifier; generated when omitted
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub vendor_kind: VendorKind,
    #[serde(default)]
    pub priority: i64,
    #[serde(default = "super::default_true")]
    pub active: bool,
    /// Supported models
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub credentials: Vec<CredentialConfig>,
}

/// Seed credential
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Literal key
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable holding the key
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub priority: i64,
    #[serde(default = "super::default_true")]
    pub active: bool,
}

impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("api_key", &self.api_key.as_deref().map(crate::utils::mask_secret))
            .field("api_key_env", &self.api_key_env)
            .field("model", &self.model)
            .field("priority", &self.priority)
            .field("active", &self.active)
            .finish()
    }
}

impl CredentialConfig {
    /// The literal key, or the value of `api_key_env`
    pub fn resolve_key(&self) -> Result<String, String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }
        match &self.api_key_env {
            Some(var) => std::env::var(var)
                .map_err(|_| format!("Environment variable {} is not set", var)),
            None => Err("Credential needs api_key or api_key_env".to_string()),
        }
    }
}

impl ProviderConfig {
    /// Build the domain provider and its credentials
    pub fn to_domain(&self) -> Result<(Provider, Vec<Credential>), String> {
        let provider_id = self
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let provider = Provider {
            id: provider_id.clone(),
            name: self.name.clone(),
            base_url: self.base_url.clone(),
            vendor_kind: self.vendor_kind,
            active: self.active,
            priority: self.priority,
            models: self.models.clone(),
        };

        let now = Utc::now();
        let credentials = self
            .credentials
            .iter()
            .map(|c| {
                Ok(Credential {
                    id: c.id.clone().unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                    provider_id: provider_id.clone(),
                    name: c.name.clone(),
                    api_key: c.resolve_key()?,
                    model: c.model.clone(),
                    active: c.active,
                    priority: c.priority,
                    total_requests: 0,
                    failed_requests: 0,
                    last_error: None,
                    last_used_at: None,
                    created_at: now,
                    updated_at: now,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;

        Ok((provider, credentials))
    }
}
