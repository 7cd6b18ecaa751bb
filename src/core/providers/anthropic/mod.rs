//! Anthropic Messages API adapter

use super::{ParsedCompletion, UpstreamError, UpstreamRequest, VendorAdapter, as_u32, base_url};
use crate::core::models::{Credential, Provider, VendorKind};
use crate::core::types::{ChatRequest, MessageRole};
use serde_json::{Value, json};

/// Value sent in the `anthropic-version` header
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// `max_tokens` is mandatory for this API
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicAdapter;

impl VendorAdapter for AnthropicAdapter {
    fn kind(&self) -> VendorKind {
        VendorKind::Anthropic
    }

    fn build_request(
        &self,
        request: &ChatRequest,
        provider: &Provider,
        credential: &Credential,
        model: &str,
    ) -> UpstreamRequest {
        let (system, conversation): (Vec<_>, Vec<_>) = request
            .messages
            .iter()
            .partition(|m| m.role == MessageRole::System);

        let messages: Vec<Value> = conversation
            .iter()
            .map(|m| json!({ "role": m.role, "content": m.content }))
            .collect();

        let mut body = json!({
            "model": model,
            "messages": messages,
            "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        });

        if !system.is_empty() {
            let prompt = system
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            body["system"] = json!(prompt);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }

        UpstreamRequest {
            url: format!("{}/messages", base_url(provider)),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("x-api-key".to_string(), credential.api_key.clone()),
                ("anthropic-version".to_string(), ANTHROPIC_VERSION.to_string()),
            ],
            body,
        }
    }

    fn parse_response(&self, body: &Value) -> Result<ParsedCompletion, UpstreamError> {
        let blocks = body
            .get("content")
            .and_then(Value::as_array)
            .ok_or_else(|| UpstreamError::InvalidResponse("missing content blocks".into()))?;

        let text: String = blocks
            .iter()
            .filter(|block| block.get("type").and_then(Value::as_str).unwrap_or("text") == "text")
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .collect();

        let usage = body.get("usage");
        let input = as_u32(usage.and_then(|u| u.get("input_tokens")));
        let output = as_u32(usage.and_then(|u| u.get("output_tokens")));

        let finish_reason = body
            .get("stop_reason")
            .and_then(Value::as_str)
            .map(|reason| match reason {
                "end_turn" | "stop_sequence" => "stop".to_string(),
                "max_tokens" => "length".to_string(),
                other => other.to_string(),
            });

        Ok(ParsedCompletion {
            id: body.get("id").and_then(Value::as_str).map(str::to_string),
            text,
            tokens_used: input.unwrap_or(0).saturating_add(output.unwrap_or(0)),
            prompt_tokens: input,
            completion_tokens: output,
            finish_reason,
        })
    }
}
