//! Upstream attempt errors
//!
//! One variant per way a single upstream call can fail. Vendor-level meaning
//! (rate limited, bad key) is derived from the HTTP status and body through
//! [`UpstreamError::severity`] rather than encoded as separate variants.

use serde_json::Value;

/// Maximum characters of an upstream body kept in error messages
const MAX_BODY_CHARS: usize = 500;

/// Failure of a single upstream attempt
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request timed out after {0}s")]
    Timeout(u64),

    #[error("upstream returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}

/// How hard a failure should push a credential down the order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureSeverity {
    /// Transient or unclassified upstream failure
    UpstreamError,
    /// Rate limit or exhausted quota
    QuotaExceeded,
    /// The vendor rejected the key itself
    InvalidCredential,
}

impl UpstreamError {
    /// Build an `Http` error, keeping only a bounded prefix of the body
    pub fn http(status: u16, body: impl AsRef<str>) -> Self {
        UpstreamError::Http {
            status,
            body: crate::utils::truncate_string(body.as_ref().trim(), MAX_BODY_CHARS),
        }
    }

    /// HTTP status reported for this attempt
    ///
    /// Attempts that never produced a status report 504 for timeouts, 500 for
    /// network failures and 502 when a 2xx body could not be understood.
    pub fn status(&self) -> u16 {
        match self {
            UpstreamError::Timeout(_) => 504,
            UpstreamError::Http { status, .. } => *status,
            UpstreamError::Network(_) => 500,
            UpstreamError::InvalidResponse(_) => 502,
        }
    }

    /// Normalized, human-readable failure message
    ///
    /// For HTTP failures this is the vendor's own error message when the body
    /// is JSON carrying one.
    pub fn message(&self) -> String {
        match self {
            UpstreamError::Http { status, body } => match extract_vendor_message(body) {
                Some(message) => message,
                None if body.is_empty() => format!("HTTP {}", status),
                None => body.clone(),
            },
            other => other.to_string(),
        }
    }

    pub fn severity(&self) -> FailureSeverity {
        let status = match self {
            UpstreamError::Http { status, .. } => Some(*status),
            _ => None,
        };

        match status {
            Some(429) => FailureSeverity::QuotaExceeded,
            Some(401) | Some(403) => FailureSeverity::InvalidCredential,
            _ => {
                let message = self.message().to_lowercase();
                if message.contains("quota") || message.contains("rate limit") {
                    FailureSeverity::QuotaExceeded
                } else {
                    FailureSeverity::UpstreamError
                }
            }
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == 429
    }
}

fn extract_vendor_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    // {"error": {"message": ...}} (OpenAI, Anthropic, Google)
    if let Some(message) = value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
    {
        return Some(message.to_string());
    }

    value
        .get("error")
        .and_then(Value::as_str)
        .or_else(|| value.get("message").and_then(Value::as_str))
        .map(str::to_string)
}
