//! Mocked vendor upstreams built on `wiremock`

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const OPENAI_PATH: &str = "/v1/chat/completions";
pub const ANTHROPIC_PATH: &str = "/v1/messages";

pub fn gemini_path(model: &str) -> String {
    format!("/v1beta/models/{}:generateContent", model)
}

pub fn openai_body(text: &str) -> Value {
    json!({
        "id": "chatcmpl-upstream",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 7, "completion_tokens": 4, "total_tokens": 11 }
    })
}

pub fn gemini_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 5, "candidatesTokenCount": 3, "totalTokenCount": 8 }
    })
}

pub fn anthropic_body(text: &str) -> Value {
    json!({
        "id": "msg_upstream",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 6, "output_tokens": 2 }
    })
}

/// Vendor-style error body
pub fn error_body(status: u16, message: &str) -> Value {
    json!({ "error": { "code": status, "message": message } })
}

/// OpenAI-compatible endpoint answering `status` with `body` for bearer `key`
pub async fn mount_openai(server: &MockServer, key: &str, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .and(header("authorization", format!("Bearer {}", key).as_str()))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Gemini endpoint answering `status` with `body` for query key `key`
pub async fn mount_gemini(server: &MockServer, model: &str, key: &str, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path(gemini_path(model)))
        .and(query_param("key", key))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Anthropic endpoint answering `status` with `body` for `x-api-key: key`
pub async fn mount_anthropic(server: &MockServer, key: &str, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path(ANTHROPIC_PATH))
        .and(header("x-api-key", key))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}
