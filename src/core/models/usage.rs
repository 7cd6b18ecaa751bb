//! Usage log records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of one upstream attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    Success,
    Error,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::Success => "success",
            AttemptStatus::Error => "error",
        }
    }
}

/// Immutable record of one attempt against one credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageLogEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub provider_id: Option<String>,
    pub credential_id: Option<String>,
    pub model_name: String,
    pub request_path: String,
    pub status: AttemptStatus,
    pub status_code: Option<u16>,
    pub error_message: Option<String>,
    pub latency_ms: u64,
    pub tokens_used: Option<u32>,
}

impl UsageLogEntry {
    /// Start a new entry stamped with a fresh id and the current time
    pub fn new(
        provider_id: impl Into<String>,
        credential_id: impl Into<String>,
        model_name: impl Into<String>,
        request_path: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            provider_id: Some(provider_id.into()),
            credential_id: Some(credential_id.into()),
            model_name: model_name.into(),
            request_path: request_path.into(),
            status: AttemptStatus::Success,
            status_code: None,
            error_message: None,
            latency_ms: 0,
            tokens_used: None,
        }
    }

    pub fn succeeded(mut self, status_code: u16, latency_ms: u64, tokens_used: u32) -> Self {
        self.status = AttemptStatus::Success;
        self.status_code = Some(status_code);
        self.latency_ms = latency_ms;
        self.tokens_used = Some(tokens_used);
        self
    }

    pub fn failed(mut self, status_code: u16, latency_ms: u64, message: impl Into<String>) -> Self {
        self.status = AttemptStatus::Error;
        self.status_code = Some(status_code);
        self.latency_ms = latency_ms;
        self.error_message = Some(message.into());
        self
    }
}
