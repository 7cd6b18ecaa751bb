//! Rotation settings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How credentials of different providers are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationStrategy {
    /// Exhaust one provider's credentials before moving to the next
    #[default]
    PerProvider,
    /// Interleave all credentials by credential priority
    Global,
}

impl RotationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RotationStrategy::PerProvider => "per_provider",
            RotationStrategy::Global => "global",
        }
    }
}

impl fmt::Display for RotationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RotationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "per_provider" => Ok(RotationStrategy::PerProvider),
            "global" => Ok(RotationStrategy::Global),
            other => Err(format!("Unknown rotation strategy: {}", other)),
        }
    }
}

/// Singleton rotation policy read once per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationSettings {
    #[serde(default)]
    pub strategy: RotationStrategy,
    /// Whether routing may cross from one provider to the next
    #[serde(default = "default_fallback_enabled")]
    pub fallback_enabled: bool,
}

fn default_fallback_enabled() -> bool {
    true
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::PerProvider,
            fallback_enabled: true,
        }
    }
}
