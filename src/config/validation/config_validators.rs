//! Configuration validators

use super::trait_def::Validate;
use crate::config::models::*;
use std::collections::HashSet;
use tracing::debug;

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating gateway configuration");

        self.server.validate()?;
        self.router.validate()?;
        self.storage.validate()?;
        self.auth.validate()?;

        let mut provider_ids = HashSet::new();
        for provider in &self.providers {
            if let Some(id) = &provider.id {
                if !provider_ids.insert(id) {
                    return Err(format!("Duplicate provider id: {}", id));
                }
            }
            provider.validate()?;
        }

        debug!("Gateway configuration validation completed");
        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err("Worker count must be greater than 0".to_string());
            }
            if workers > 1000 {
                return Err("Worker count seems too high (>1000)".to_string());
            }
        }

        if self.max_body_size == 0 {
            return Err("Max body size must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for RouterConfig {
    fn validate(&self) -> Result<(), String> {
        if self.request_timeout_secs == 0 {
            return Err("Router request timeout must be greater than 0".to_string());
        }

        if self.request_timeout_secs > 600 {
            return Err("Router request timeout should not exceed 10 minutes".to_string());
        }

        if matches!(&self.default_model, Some(model) if model.trim().is_empty()) {
            return Err("Default model cannot be blank".to_string());
        }

        self.health.validate()
    }
}

impl Validate for HealthConfig {
    fn validate(&self) -> Result<(), String> {
        if self.step < 1 {
            return Err("Health step must be at least 1".to_string());
        }

        if self.severe_step < self.step {
            return Err("Severe health step cannot be smaller than the regular step".to_string());
        }

        Ok(())
    }
}

impl Validate for StorageConfig {
    fn validate(&self) -> Result<(), String> {
        let db = &self.database;
        if !db.enabled {
            return Ok(());
        }

        if db.url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }

        if !(db.url.starts_with("sqlite:")
            || db.url.starts_with("postgres://")
            || db.url.starts_with("postgresql://"))
        {
            return Err(format!("Unsupported database URL: {}", db.url));
        }

        if db.max_connections == 0 {
            return Err("Database max connections must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for AuthConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.api_keys.is_empty() {
            return Err("Authentication is enabled but no API keys are configured".to_string());
        }

        if self.api_keys.iter().any(|k| k.trim().is_empty()) {
            return Err("API keys cannot be blank".to_string());
        }

        Ok(())
    }
}

impl Validate for ProviderConfig {
    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Provider name cannot be empty".to_string());
        }

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| format!("Provider {} has an invalid base URL: {}", self.name, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "Provider {} base URL must use http or https",
                self.name
            ));
        }

        for credential in &self.credentials {
            if credential.api_key.is_none() && credential.api_key_env.is_none() {
                return Err(format!(
                    "Credential of provider {} needs api_key or api_key_env",
                    self.name
                ));
            }
        }

        Ok(())
    }
}
