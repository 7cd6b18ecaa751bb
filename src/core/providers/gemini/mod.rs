//! Google Gemini adapter
//!
//! Speaks the Generative Language `generateContent` API. The key travels in
//! the query string; there is no auth header.

use super::{ParsedCompletion, UpstreamError, UpstreamRequest, VendorAdapter, as_u32, base_url};
use crate::core::models::{Credential, Provider, VendorKind};
use crate::core::types::{ChatRequest, MessageRole};
use serde_json::{Map, Value, json};
use url::Url;

#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiAdapter;

impl GeminiAdapter {
    /// `{base}/models/{model}:generateContent?key={secret}` with the model
    /// and the key percent-encoded
    pub fn endpoint(provider: &Provider, model: &str, api_key: &str) -> String {
        let base = base_url(provider);
        let Ok(mut url) = Url::parse(base) else {
            // unparseable base: the transport rejects it before sending
            return format!("{}/models/{}:generateContent", base, model);
        };
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("models")
                .push(&format!("{}:generateContent", model));
        }
        url.query_pairs_mut().append_pair("key", api_key);
        url.into()
    }

    fn map_finish_reason(reason: &str) -> String {
        match reason {
            "STOP" => "stop".to_string(),
            "MAX_TOKENS" => "length".to_string(),
            "SAFETY" | "RECITATION" => "content_filter".to_string(),
            other => other.to_lowercase(),
        }
    }
}

impl VendorAdapter for GeminiAdapter {
    fn kind(&self) -> VendorKind {
        VendorKind::Google
    }

    fn build_request(
        &self,
        request: &ChatRequest,
        provider: &Provider,
        credential: &Credential,
        model: &str,
    ) -> UpstreamRequest {
        let contents: Vec<Value> = request
            .messages
            .iter()
            .map(|message| {
                let role = match message.role {
                    MessageRole::Assistant => "model",
                    MessageRole::User | MessageRole::System => "user",
                };
                json!({
                    "role": role,
                    "parts": [{ "text": message.content }]
                })
            })
            .collect();

        let mut body = json!({ "contents": contents });

        let mut generation_config = Map::new();
        if let Some(temperature) = request.temperature {
            generation_config.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(max_tokens) = request.max_tokens {
            generation_config.insert("maxOutputTokens".to_string(), json!(max_tokens));
        }
        if !generation_config.is_empty() {
            body["generationConfig"] = Value::Object(generation_config);
        }

        UpstreamRequest {
            url: Self::endpoint(provider, model, &credential.api_key),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body,
        }
    }

    fn parse_response(&self, body: &Value) -> Result<ParsedCompletion, UpstreamError> {
        let candidate = body
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|candidates| candidates.first())
            .ok_or_else(|| UpstreamError::InvalidResponse("no candidates in response".into()))?;

        let text = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
                    .collect::<String>()
            })
            .unwrap_or_default();

        let usage = body.get("usageMetadata");

        Ok(ParsedCompletion {
            id: body
                .get("responseId")
                .and_then(Value::as_str)
                .map(str::to_string),
            text,
            tokens_used: as_u32(usage.and_then(|u| u.get("totalTokenCount"))).unwrap_or(0),
            prompt_tokens: as_u32(usage.and_then(|u| u.get("promptTokenCount"))),
            completion_tokens: as_u32(usage.and_then(|u| u.get("candidatesTokenCount"))),
            finish_reason: candidate
                .get("finishReason")
                .and_then(Value::as_str)
                .map(Self::map_finish_reason),
        })
    }
}
