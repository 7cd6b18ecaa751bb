//! OpenAI-compatible adapter
//!
//! Used for OpenAI itself and for every vendor exposing the same
//! `/chat/completions` contract (Groq, OpenRouter, DeepSeek, local servers).

use super::{ParsedCompletion, UpstreamError, UpstreamRequest, VendorAdapter, as_u32, base_url};
use crate::core::models::{Credential, Provider, VendorKind};
use crate::core::types::ChatRequest;
use serde_json::{Value, json};

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiCompatibleAdapter;

impl OpenAiCompatibleAdapter {
    pub fn endpoint(provider: &Provider) -> String {
        let base = base_url(provider);
        if base.ends_with(CHAT_COMPLETIONS_PATH) {
            base.to_string()
        } else {
            format!("{}{}", base, CHAT_COMPLETIONS_PATH)
        }
    }
}

impl VendorAdapter for OpenAiCompatibleAdapter {
    fn kind(&self) -> VendorKind {
        VendorKind::OpenaiCompatible
    }

    fn build_request(
        &self,
        request: &ChatRequest,
        provider: &Provider,
        credential: &Credential,
        model: &str,
    ) -> UpstreamRequest {
        let mut body = json!({
            "model": model,
            "messages": request.messages,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }

        UpstreamRequest {
            url: Self::endpoint(provider),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", credential.api_key),
                ),
            ],
            body,
        }
    }

    fn parse_response(&self, body: &Value) -> Result<ParsedCompletion, UpstreamError> {
        let choice = body
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .ok_or_else(|| UpstreamError::InvalidResponse("no choices in response".into()))?;

        let usage = body.get("usage");

        Ok(ParsedCompletion {
            id: body.get("id").and_then(Value::as_str).map(str::to_string),
            text: choice
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            tokens_used: as_u32(usage.and_then(|u| u.get("total_tokens"))).unwrap_or(0),
            prompt_tokens: as_u32(usage.and_then(|u| u.get("prompt_tokens"))),
            completion_tokens: as_u32(usage.and_then(|u| u.get("completion_tokens"))),
            finish_reason: choice
                .get("finish_reason")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}
