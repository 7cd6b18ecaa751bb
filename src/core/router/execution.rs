//! Failover execution
//!
//! [`FailoverExecutor`] drives one chat request through its candidate list:
//!
//! ```text
//! SelectingCandidates -> Attempting(0) -> Succeeded
//!                                      -> Attempting(1) -> ... -> Exhausted
//! ```
//!
//! Attempts are strictly sequential. The usage log entry and the health
//! write of an attempt complete before the next attempt starts.

use super::error::{AttemptError, ExhaustedError, RoutingError};
use super::health::{HealthPolicy, HealthTracker};
use super::selection::CandidateSelector;
use super::transport::UpstreamTransport;
use crate::config::RouterConfig;
use crate::core::models::{Candidate, Credential, Provider, UsageLogEntry};
use crate::core::providers::{FailureSeverity, ParsedCompletion, UpstreamError, adapter_for};
use crate::core::types::{ChatCompletionResponse, ChatMessage, ChatRequest};
use crate::services::{EventSink, GatewayEvent};
use crate::storage::{CatalogStore, StorageLayer, UsageLogSink};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Path recorded on usage log entries for chat completions
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Path recorded on usage log entries written by the credential probe
pub const CREDENTIAL_PROBE_PATH: &str = "/v1/credentials/test";

/// Message sent by the credential probe when none is given
pub const DEFAULT_PROBE_MESSAGE: &str = "Hello, are you working?";

/// Executor settings taken from the router configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorSettings {
    pub request_timeout: Duration,
    pub default_model: Option<String>,
}

impl From<&RouterConfig> for ExecutorSettings {
    fn from(config: &RouterConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            default_model: config
                .default_model
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
        }
    }
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self::from(&RouterConfig::default())
    }
}

enum ExecutionState {
    SelectingCandidates,
    Attempting(usize),
    Succeeded(Box<ChatCompletionResponse>),
    Exhausted,
}

/// Credential state as classified by a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    Active,
    QuotaExceeded,
    Invalid,
    Error,
}

impl From<FailureSeverity> for ProbeStatus {
    fn from(severity: FailureSeverity) -> Self {
        match severity {
            FailureSeverity::QuotaExceeded => ProbeStatus::QuotaExceeded,
            FailureSeverity::InvalidCredential => ProbeStatus::Invalid,
            FailureSeverity::UpstreamError => ProbeStatus::Error,
        }
    }
}

/// Result of a credential probe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub success: bool,
    pub status: ProbeStatus,
    pub latency_ms: u64,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs chat requests over the ordered candidate list
#[derive(Clone)]
pub struct FailoverExecutor {
    catalog: Arc<dyn CatalogStore>,
    health: HealthTracker,
    usage: Arc<dyn UsageLogSink>,
    events: Arc<dyn EventSink>,
    transport: Arc<dyn UpstreamTransport>,
    settings: ExecutorSettings,
}

impl FailoverExecutor {
    pub fn new(
        storage: &StorageLayer,
        events: Arc<dyn EventSink>,
        transport: Arc<dyn UpstreamTransport>,
        config: &RouterConfig,
    ) -> Self {
        let health = HealthTracker::new(
            storage.health.clone(),
            events.clone(),
            HealthPolicy::from(&config.health),
        );
        Self {
            catalog: storage.catalog.clone(),
            health,
            usage: storage.usage.clone(),
            events,
            transport,
            settings: ExecutorSettings::from(config),
        }
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    pub fn health(&self) -> &HealthTracker {
        &self.health
    }

    /// Serve a chat request, failing over across candidates
    pub async fn execute(
        &self,
        request: &ChatRequest,
    ) -> Result<ChatCompletionResponse, RoutingError> {
        let requested = request.requested_model();
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut failures: Vec<AttemptError> = Vec::new();
        let mut state = ExecutionState::SelectingCandidates;

        loop {
            state = match state {
                ExecutionState::SelectingCandidates => {
                    candidates = self.select_candidates(requested).await?;
                    if candidates.is_empty() {
                        info!(model = requested.unwrap_or("*"), "No route available");
                        return Err(RoutingError::NoRouteAvailable(
                            requested.unwrap_or("*").to_string(),
                        ));
                    }
                    debug!(count = candidates.len(), "Selected candidates");
                    ExecutionState::Attempting(0)
                }
                ExecutionState::Attempting(index) => match candidates.get(index) {
                    None => ExecutionState::Exhausted,
                    Some(candidate) => match self.attempt(request, candidate).await {
                        Ok(response) => ExecutionState::Succeeded(Box::new(response)),
                        Err(failure) => {
                            failures.push(failure);
                            ExecutionState::Attempting(index + 1)
                        }
                    },
                },
                ExecutionState::Succeeded(response) => return Ok(*response),
                ExecutionState::Exhausted => {
                    let report = ExhaustedError::from_attempts(std::mem::take(&mut failures));
                    warn!(
                        attempts = report.details.len(),
                        rate_limited = report.is_rate_limited(),
                        "All candidates failed"
                    );
                    return Err(RoutingError::Exhausted(report));
                }
            };
        }
    }

    /// Send one test message through exactly one credential
    ///
    /// Failures are counted but never demote the credential.
    pub async fn probe(
        &self,
        credential_id: &str,
        model: Option<&str>,
        message: Option<&str>,
    ) -> Result<ProbeReport, RoutingError> {
        let credential = self
            .catalog
            .find_credential(credential_id)
            .await?
            .ok_or_else(|| RoutingError::NotFound(format!("credential {}", credential_id)))?;
        let provider = self
            .catalog
            .find_provider(&credential.provider_id)
            .await?
            .ok_or_else(|| {
                RoutingError::NotFound(format!("provider {}", credential.provider_id))
            })?;

        let text = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_PROBE_MESSAGE);
        let request = ChatRequest::new(model.unwrap_or_default(), vec![ChatMessage::user(text)]);
        let model = self.resolve_model(&request, &provider, &credential);

        let (outcome, latency_ms) = self
            .call_upstream(&request, &provider, &credential, &model)
            .await;
        let entry = UsageLogEntry::new(&provider.id, &credential.id, &model, CREDENTIAL_PROBE_PATH);

        match outcome {
            Ok((status, parsed)) => {
                info!(
                    provider = %provider.id,
                    credential = %credential.id,
                    status,
                    latency_ms,
                    "Credential probe succeeded"
                );
                self.log_usage(entry.succeeded(status, latency_ms, parsed.tokens_used))
                    .await;
                self.health.record_probe_success(&credential).await;
                Ok(ProbeReport {
                    success: true,
                    status: ProbeStatus::Active,
                    latency_ms,
                    model,
                    content: Some(parsed.text),
                    error: None,
                })
            }
            Err(error) => {
                let message = error.message();
                warn!(
                    provider = %provider.id,
                    credential = %credential.id,
                    status = error.status(),
                    latency_ms,
                    "Credential probe failed: {}", message
                );
                self.log_usage(entry.failed(error.status(), latency_ms, &message))
                    .await;
                self.health.record_probe_failure(&credential, &error).await;
                Ok(ProbeReport {
                    success: false,
                    status: ProbeStatus::from(error.severity()),
                    latency_ms,
                    model,
                    content: None,
                    error: Some(message),
                })
            }
        }
    }

    async fn select_candidates(
        &self,
        model: Option<&str>,
    ) -> Result<Vec<Candidate>, RoutingError> {
        let snapshot = self.catalog.snapshot().await?;
        let settings = self.catalog.rotation_settings().await?;
        Ok(CandidateSelector::select(&snapshot, model, &settings))
    }

    async fn attempt(
        &self,
        request: &ChatRequest,
        candidate: &Candidate,
    ) -> Result<ChatCompletionResponse, AttemptError> {
        let provider = &candidate.provider;
        let credential = &candidate.credential;
        let model = self.resolve_model(request, provider, credential);

        let (outcome, latency_ms) = self
            .call_upstream(request, provider, credential, &model)
            .await;
        let entry = UsageLogEntry::new(&provider.id, &credential.id, &model, CHAT_COMPLETIONS_PATH);

        match outcome {
            Ok((status, parsed)) => {
                info!(
                    provider = %provider.id,
                    credential = %credential.id,
                    status,
                    latency_ms,
                    "Upstream attempt succeeded"
                );
                self.log_usage(entry.succeeded(status, latency_ms, parsed.tokens_used))
                    .await;
                self.health.record_success(candidate).await;

                let response_model = request.requested_model().unwrap_or(&model);
                Ok(parsed.into_response(response_model))
            }
            Err(error) => {
                let status = error.status();
                let message = error.message();
                warn!(
                    provider = %provider.id,
                    credential = %credential.id,
                    status,
                    latency_ms,
                    "Upstream attempt failed: {}", message
                );
                self.log_usage(entry.failed(status, latency_ms, &message))
                    .await;
                self.health.record_failure(candidate, &error).await;

                Err(AttemptError {
                    provider: provider.name.clone(),
                    key: credential.label().to_string(),
                    status,
                    message,
                })
            }
        }
    }

    /// Model sent upstream: the requested one, else the credential's
    /// restriction, else the configured default, else the provider's first
    /// declared model
    fn resolve_model(&self, request: &ChatRequest, provider: &Provider, credential: &Credential) -> String {
        request
            .requested_model()
            .or(credential.model.as_deref())
            .or(self.settings.default_model.as_deref())
            .or(provider.models.first().map(String::as_str))
            .unwrap_or_default()
            .to_string()
    }

    async fn call_upstream(
        &self,
        request: &ChatRequest,
        provider: &Provider,
        credential: &Credential,
        model: &str,
    ) -> (Result<(u16, ParsedCompletion), UpstreamError>, u64) {
        let adapter = adapter_for(provider.vendor_kind);
        let upstream = adapter.build_request(request, provider, credential, model);

        let started = Instant::now();
        let result = self
            .transport
            .send(&upstream, self.settings.request_timeout)
            .await;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let outcome = result.and_then(|response| {
            adapter
                .parse_response(&response.body)
                .map(|parsed| (response.status, parsed))
        });
        (outcome, latency_ms)
    }

    async fn log_usage(&self, entry: UsageLogEntry) {
        if let Err(e) = self.usage.append(&entry).await {
            warn!(credential = ?entry.credential_id, "Failed to write usage log: {}", e);
            return;
        }
        self.events.publish(GatewayEvent::usage_logged(&entry));
    }
}

impl std::fmt::Debug for FailoverExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailoverExecutor")
            .field("health", &self.health)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
