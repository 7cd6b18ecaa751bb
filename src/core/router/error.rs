//! Router error types
//!
//! Request-level routing failures and the aggregated report returned when
//! every candidate failed.

use crate::utils::error::GatewayError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

/// Message used when every attempt was rate limited
pub const ALL_RATE_LIMITED: &str = "all credentials are rate limited";

/// Message used for any other exhausted candidate list
pub const ALL_FAILED: &str = "all providers failed to process the request";

/// One failed attempt as reported to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptError {
    /// Provider name
    pub provider: String,
    /// Credential display name (or id)
    pub key: String,
    pub status: u16,
    pub message: String,
}

/// Every candidate was tried and none succeeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExhaustedError {
    pub error: String,
    pub last_error: Option<String>,
    pub details: Vec<AttemptError>,
}

impl ExhaustedError {
    pub fn from_attempts(details: Vec<AttemptError>) -> Self {
        let all_rate_limited = !details.is_empty() && details.iter().all(|d| d.status == 429);
        Self {
            error: if all_rate_limited {
                ALL_RATE_LIMITED.to_string()
            } else {
                ALL_FAILED.to_string()
            },
            last_error: details.last().map(|d| d.message.clone()),
            details,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.error == ALL_RATE_LIMITED
    }
}

/// Router error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum RoutingError {
    /// No active provider/credential can serve the model
    #[error("no active provider available for model: {0}")]
    NoRouteAvailable(String),

    /// Every candidate failed
    #[error("{}", .0.error)]
    Exhausted(ExhaustedError),

    /// Unknown credential or provider
    #[error("{0} not found")]
    NotFound(String),

    /// The catalog could not be read
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<GatewayError> for RoutingError {
    fn from(err: GatewayError) -> Self {
        RoutingError::Storage(err.to_string())
    }
}

#[derive(Serialize)]
struct SimpleErrorBody<'a> {
    error: &'a str,
}

impl ResponseError for RoutingError {
    fn status_code(&self) -> StatusCode {
        match self {
            RoutingError::NoRouteAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RoutingError::Exhausted(_) => StatusCode::BAD_GATEWAY,
            RoutingError::NotFound(_) => StatusCode::NOT_FOUND,
            RoutingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            RoutingError::Exhausted(report) => response.json(report),
            // storage internals are not exposed to callers
            RoutingError::Storage(_) => response.json(SimpleErrorBody {
                error: "routing state could not be loaded",
            }),
            other => response.json(SimpleErrorBody {
                error: &other.to_string(),
            }),
        }
    }
}
