//! Router configuration

use super::*;
use crate::core::models::RotationSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Per-attempt upstream timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Model used upstream when the caller sends none
    #[serde(default)]
    pub default_model: Option<String>,
    /// Rotation settings written to an empty store at startup
    #[serde(default)]
    pub rotation: RotationSettings,
    /// Demotion rules
    #[serde(default)]
    pub health: HealthConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout(),
            default_model: None,
            rotation: RotationSettings::default(),
            health: HealthConfig::default(),
        }
    }
}

impl RouterConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Credential health configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Lowest priority a failure can demote to
    #[serde(default)]
    pub floor: i64,
    /// Demotion for ordinary upstream failures
    #[serde(default = "default_health_step")]
    pub step: i64,
    /// Demotion for quota-exceeded and invalid-credential failures
    #[serde(default = "default_severe_health_step")]
    pub severe_step: i64,
    /// Priority restored by a successful credential probe; unset keeps the
    /// current priority
    #[serde(default)]
    pub restore_priority_on_probe: Option<i64>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            floor: 0,
            step: default_health_step(),
            severe_step: default_severe_health_step(),
            restore_priority_on_probe: None,
        }
    }
}
