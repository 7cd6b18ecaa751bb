//! Vendor adapters
//!
//! Each supported vendor gets a unit struct implementing [`VendorAdapter`],
//! which translates the canonical chat request into the vendor's wire format
//! and the vendor's response body back into a [`ParsedCompletion`].
//!
//! The set of vendors is closed: [`adapter_for`] dispatches on the provider's
//! explicit [`VendorKind`].

pub mod anthropic;
pub mod error;
pub mod gemini;
pub mod openai;

pub use anthropic::AnthropicAdapter;
pub use error::{FailureSeverity, UpstreamError};
pub use gemini::GeminiAdapter;
pub use openai::OpenAiCompatibleAdapter;

use crate::core::models::{Credential, Provider, VendorKind};
use crate::core::types::{
    ChatCompletionResponse, ChatRequest, Choice, MessageRole, ResponseMessage, Usage,
};
use crate::utils::generate_request_id;
use serde_json::Value;

/// Fully-built upstream HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl UpstreamRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Vendor-neutral content of a successful upstream response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCompletion {
    pub id: Option<String>,
    pub text: String,
    pub tokens_used: u32,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub finish_reason: Option<String>,
}

impl ParsedCompletion {
    /// Wrap into the canonical `chat.completion` object
    pub fn into_response(self, model: &str) -> ChatCompletionResponse {
        ChatCompletionResponse {
            id: self
                .id
                .unwrap_or_else(|| format!("chatcmpl-{}", generate_request_id())),
            object: "chat.completion".to_string(),
            created: chrono::Utc::now().timestamp(),
            model: model.to_string(),
            choices: vec![Choice {
                index: 0,
                message: ResponseMessage {
                    role: MessageRole::Assistant,
                    content: self.text,
                },
                finish_reason: self.finish_reason.unwrap_or_else(|| "stop".to_string()),
            }],
            usage: Usage {
                prompt_tokens: self.prompt_tokens,
                completion_tokens: self.completion_tokens,
                total_tokens: self.tokens_used,
            },
        }
    }
}

/// Translation between the canonical chat shape and one vendor's API
pub trait VendorAdapter: Send + Sync {
    /// Vendor this adapter speaks
    fn kind(&self) -> VendorKind;

    /// Build the upstream request for `model` using `credential`
    fn build_request(
        &self,
        request: &ChatRequest,
        provider: &Provider,
        credential: &Credential,
        model: &str,
    ) -> UpstreamRequest;

    /// Extract the completion from a successful response body
    fn parse_response(&self, body: &Value) -> Result<ParsedCompletion, UpstreamError>;
}

/// Adapter for a vendor kind
pub fn adapter_for(kind: VendorKind) -> &'static dyn VendorAdapter {
    match kind {
        VendorKind::Google => &GeminiAdapter,
        VendorKind::Anthropic => &AnthropicAdapter,
        VendorKind::OpenaiCompatible => &OpenAiCompatibleAdapter,
    }
}

/// Trim trailing slashes from a provider base URL
pub(crate) fn base_url(provider: &Provider) -> &str {
    provider.base_url.trim_end_matches('/')
}

pub(crate) fn as_u32(value: Option<&Value>) -> Option<u32> {
    value
        .and_then(Value::as_u64)
        .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
}
