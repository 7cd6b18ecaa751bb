//! Router tests module
//!
//! Shared fixtures plus a scripted upstream transport that replays canned
//! outcomes and records every request it was handed.

mod selection_tests;

use crate::core::models::{Credential, Provider, VendorKind};
use crate::core::providers::{UpstreamError, UpstreamRequest};
use crate::core::router::transport::{UpstreamResponse, UpstreamTransport};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::time::Duration;

pub(crate) fn provider(id: &str, priority: i64, models: &[&str]) -> Provider {
    Provider {
        id: id.to_string(),
        name: format!("{}-name", id),
        base_url: format!("https://{}.example.test/v1", id),
        vendor_kind: VendorKind::OpenaiCompatible,
        active: true,
        priority,
        models: models.iter().map(|m| m.to_string()).collect(),
    }
}

pub(crate) fn credential(id: &str, provider_id: &str, priority: i64) -> Credential {
    let now = Utc::now();
    Credential {
        id: id.to_string(),
        provider_id: provider_id.to_string(),
        name: None,
        api_key: format!("secret-{}", id),
        model: None,
        active: true,
        priority,
        total_requests: 0,
        failed_requests: 0,
        last_error: None,
        last_used_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// OpenAI-shaped success body
pub(crate) fn completion_body(text: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5 }
    })
}

/// Replays queued outcomes in order; an empty queue answers with a success
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<UpstreamResponse, UpstreamError>>>,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn ok(self, text: &str) -> Self {
        self.respond(200, completion_body(text))
    }

    pub(crate) fn respond(self, status: u16, body: Value) -> Self {
        self.outcomes
            .lock()
            .push_back(Ok(UpstreamResponse { status, body }));
        self
    }

    pub(crate) fn fail(self, error: UpstreamError) -> Self {
        self.outcomes.lock().push_back(Err(error));
        self
    }

    pub(crate) fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().clone()
    }

    /// Authorization headers of every request, in call order
    pub(crate) fn keys(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter_map(|r| r.header("authorization").map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl UpstreamTransport for ScriptedTransport {
    async fn send(
        &self,
        request: &UpstreamRequest,
        _timeout: Duration,
    ) -> Result<UpstreamResponse, UpstreamError> {
        self.requests.lock().push(request.clone());
        self.outcomes.lock().pop_front().unwrap_or_else(|| {
            Ok(UpstreamResponse {
                status: 200,
                body: completion_body("default"),
            })
        })
    }
}
