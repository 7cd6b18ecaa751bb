//! Authentication configuration

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable holding comma-separated caller keys
pub const API_KEYS_ENV: &str = "KEYRELAY_API_KEYS";

/// Caller authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Require a bearer key on `/v1` routes
    #[serde(default)]
    pub enabled: bool,
    /// Accepted caller keys
    #[serde(default)]
    pub api_keys: Vec<String>,
}

impl AuthConfig {
    /// Replace the configured keys with `KEYRELAY_API_KEYS` when it is set
    pub fn apply_env(&mut self) {
        if let Ok(raw) = std::env::var(API_KEYS_ENV) {
            self.apply_key_list(&raw);
        }
    }

    pub(crate) fn apply_key_list(&mut self, raw: &str) {
        let keys: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        if !keys.is_empty() {
            self.api_keys = keys;
            self.enabled = true;
        }
    }

    pub fn accepts(&self, key: &str) -> bool {
        self.api_keys.iter().any(|k| k == key)
    }
}

/// Warn about insecure configurations
pub fn warn_insecure_config(auth: &AuthConfig) {
    if !auth.enabled {
        warn!("Caller authentication is disabled; every request to /v1 is accepted");
    }
}
