//! Change notifications
//!
//! Every health write and usage log append is announced on an [`EventSink`]
//! so dashboards can refresh without polling. Publishing is fire-and-forget.

use crate::core::models::{Credential, Provider, UsageLogEntry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

/// Default broadcast buffer
const DEFAULT_CAPACITY: usize = 1000;

/// A change made by the gateway
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    CredentialUpdated {
        credential_id: String,
        provider_id: String,
        priority: i64,
        total_requests: i64,
        failed_requests: i64,
        last_error: Option<String>,
        timestamp: DateTime<Utc>,
    },
    ProviderUpdated {
        provider_id: String,
        priority: i64,
        timestamp: DateTime<Utc>,
    },
    UsageLogged {
        entry: UsageLogEntry,
    },
}

impl GatewayEvent {
    /// Snapshot of a credential without its secret
    pub fn credential_updated(credential: &Credential) -> Self {
        GatewayEvent::CredentialUpdated {
            credential_id: credential.id.clone(),
            provider_id: credential.provider_id.clone(),
            priority: credential.priority,
            total_requests: credential.total_requests,
            failed_requests: credential.failed_requests,
            last_error: credential.last_error.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn provider_updated(provider: &Provider) -> Self {
        GatewayEvent::ProviderUpdated {
            provider_id: provider.id.clone(),
            priority: provider.priority,
            timestamp: Utc::now(),
        }
    }

    pub fn usage_logged(entry: &UsageLogEntry) -> Self {
        GatewayEvent::UsageLogged {
            entry: entry.clone(),
        }
    }
}

/// Receiver of change notifications
pub trait EventSink: Send + Sync {
    fn publish(&self, event: GatewayEvent);
}

/// Broadcast-backed event sink
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<GatewayEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to gateway events
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventBus {
    fn publish(&self, event: GatewayEvent) {
        // no subscribers is not an error
        let _ = self.sender.send(event);
    }
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn publish(&self, _event: GatewayEvent) {}
}
