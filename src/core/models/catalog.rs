//! Provider and credential models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vendor wire format spoken by a provider
///
/// Set explicitly when the provider is created; the adapter used for a
/// request is chosen from this tag alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorKind {
    /// Google Generative Language (Gemini) API
    Google,
    /// Anthropic Messages API
    Anthropic,
    /// Any OpenAI-compatible chat completions API
    #[default]
    OpenaiCompatible,
}

impl VendorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorKind::Google => "google",
            VendorKind::Anthropic => "anthropic",
            VendorKind::OpenaiCompatible => "openai_compatible",
        }
    }
}

impl fmt::Display for VendorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VendorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" | "gemini" => Ok(VendorKind::Google),
            "anthropic" => Ok(VendorKind::Anthropic),
            "openai_compatible" | "openai" => Ok(VendorKind::OpenaiCompatible),
            other => Err(format!("Unknown vendor kind: {}", other)),
        }
    }
}

/// An upstream vendor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub vendor_kind: VendorKind,
    pub active: bool,
    /// Higher is tried first
    pub priority: i64,
    /// Model identifiers this provider declares support for
    #[serde(default)]
    pub models: Vec<String>,
}

impl Provider {
    pub fn supports_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }
}

/// One API key belonging to a provider
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    pub provider_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub api_key: String,
    /// Restricts the credential to a single model identifier when set
    #[serde(default)]
    pub model: Option<String>,
    pub active: bool,
    pub priority: i64,
    #[serde(default)]
    pub total_requests: i64,
    #[serde(default)]
    pub failed_requests: i64,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// Whether this credential may serve `model` (`None` = unspecified model)
    pub fn serves_model(&self, model: Option<&str>) -> bool {
        match (&self.model, model) {
            (None, _) | (_, None) => true,
            (Some(restriction), Some(model)) => restriction == model,
        }
    }

    /// Name used in diagnostics: the display name, or the id
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("provider_id", &self.provider_id)
            .field("name", &self.name)
            .field("api_key", &crate::utils::mask_secret(&self.api_key))
            .field("model", &self.model)
            .field("active", &self.active)
            .field("priority", &self.priority)
            .field("total_requests", &self.total_requests)
            .field("failed_requests", &self.failed_requests)
            .field("last_error", &self.last_error)
            .finish()
    }
}

/// Point-in-time view of the provider catalog used for one routing decision
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub providers: Vec<Provider>,
    pub credentials: Vec<Credential>,
}

/// A (provider, credential) pair eligible to serve one request
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub provider: Provider,
    pub credential: Credential,
}
