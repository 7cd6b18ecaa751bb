//! Credential health tracking
//!
//! Applies the outcome of every attempt to the stored credential: counters,
//! last error and, on failure, a priority demotion sized by the failure's
//! severity. Priorities only ever go down here, except through the explicit
//! [`HealthTracker::restore_credential`] recovery used by the credential probe.

use crate::config::HealthConfig;
use crate::core::models::{Candidate, Credential};
use crate::core::providers::{FailureSeverity, UpstreamError};
use crate::services::{EventSink, GatewayEvent};
use crate::storage::{HealthStore, PriorityDecay};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// Provider demotion when none of its credentials is above the floor
const PROVIDER_DECAY: PriorityDecay = PriorityDecay { step: 1, floor: 0 };

/// Demotion and recovery rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    pub floor: i64,
    pub step: i64,
    pub severe_step: i64,
    pub restore_priority_on_probe: Option<i64>,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self::from(&HealthConfig::default())
    }
}

impl From<&HealthConfig> for HealthPolicy {
    fn from(config: &HealthConfig) -> Self {
        Self {
            floor: config.floor,
            step: config.step,
            severe_step: config.severe_step,
            restore_priority_on_probe: config.restore_priority_on_probe,
        }
    }
}

impl HealthPolicy {
    pub fn decay_for(&self, severity: FailureSeverity) -> PriorityDecay {
        let step = match severity {
            FailureSeverity::UpstreamError => self.step,
            FailureSeverity::QuotaExceeded | FailureSeverity::InvalidCredential => {
                self.severe_step
            }
        };
        PriorityDecay::new(step, self.floor)
    }
}

/// Writes attempt outcomes through a [`HealthStore`]
///
/// Store failures are logged and swallowed: a request never fails because
/// its bookkeeping could not be written.
#[derive(Clone)]
pub struct HealthTracker {
    store: Arc<dyn HealthStore>,
    events: Arc<dyn EventSink>,
    policy: HealthPolicy,
}

impl HealthTracker {
    pub fn new(store: Arc<dyn HealthStore>, events: Arc<dyn EventSink>, policy: HealthPolicy) -> Self {
        Self {
            store,
            events,
            policy,
        }
    }

    pub fn policy(&self) -> &HealthPolicy {
        &self.policy
    }

    pub async fn record_success(&self, candidate: &Candidate) {
        match self
            .store
            .record_success(&candidate.credential.id, Utc::now())
            .await
        {
            Ok(Some(updated)) => self.publish_credential(&updated),
            Ok(None) => debug!("Credential {} vanished before success write", candidate.credential.id),
            Err(e) => warn!(
                credential = %candidate.credential.id,
                "Failed to record success: {}", e
            ),
        }
    }

    /// Count the failure, demote the credential and cascade to its provider
    pub async fn record_failure(&self, candidate: &Candidate, error: &UpstreamError) {
        let decay = self.policy.decay_for(error.severity());
        let message = error.message();

        match self
            .store
            .record_failure(&candidate.credential.id, &message, Some(decay), Utc::now())
            .await
        {
            Ok(Some(updated)) => {
                debug!(
                    credential = %updated.id,
                    priority = updated.priority,
                    "Credential demoted"
                );
                self.publish_credential(&updated);
            }
            Ok(None) => {
                debug!("Credential {} vanished before failure write", candidate.credential.id);
                return;
            }
            Err(e) => {
                warn!(
                    credential = %candidate.credential.id,
                    "Failed to record failure: {}", e
                );
                return;
            }
        }

        match self
            .store
            .decay_provider_if_exhausted(&candidate.provider.id, self.policy.floor, PROVIDER_DECAY)
            .await
        {
            Ok(Some(provider)) => {
                debug!(
                    provider = %provider.id,
                    priority = provider.priority,
                    "Provider demoted, no healthy credential left"
                );
                self.events.publish(GatewayEvent::provider_updated(&provider));
            }
            Ok(None) => {}
            Err(e) => warn!(
                provider = %candidate.provider.id,
                "Failed to update provider priority: {}", e
            ),
        }
    }

    /// Probe failure: counted and remembered, never demoted
    pub async fn record_probe_failure(&self, credential: &Credential, error: &UpstreamError) {
        match self
            .store
            .record_failure(&credential.id, &error.message(), None, Utc::now())
            .await
        {
            Ok(Some(updated)) => self.publish_credential(&updated),
            Ok(None) => {}
            Err(e) => warn!(credential = %credential.id, "Failed to record probe failure: {}", e),
        }
    }

    /// Probe success: clears the error and restores priority when configured
    pub async fn record_probe_success(&self, credential: &Credential) {
        let credential_id = credential.id.as_str();
        match self.store.record_success(credential_id, Utc::now()).await {
            Ok(Some(updated)) => self.publish_credential(&updated),
            Ok(None) => return,
            Err(e) => {
                warn!(credential = %credential_id, "Failed to record probe success: {}", e);
                return;
            }
        }

        if let Some(priority) = self.policy.restore_priority_on_probe {
            self.restore_credential(credential_id, priority).await;
        }
    }

    /// Set a credential's priority back to `priority`
    pub async fn restore_credential(&self, credential_id: &str, priority: i64) -> Option<Credential> {
        match self.store.set_credential_priority(credential_id, priority).await {
            Ok(Some(updated)) => {
                debug!(credential = %credential_id, priority, "Credential priority restored");
                self.publish_credential(&updated);
                Some(updated)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(credential = %credential_id, "Failed to restore priority: {}", e);
                None
            }
        }
    }

    fn publish_credential(&self, credential: &Credential) {
        self.events
            .publish(GatewayEvent::credential_updated(credential));
    }
}

impl std::fmt::Debug for HealthTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthTracker")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
