//! Upstream HTTP transport

use crate::core::providers::{UpstreamError, UpstreamRequest};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Successful (2xx) upstream response
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

/// Sends one upstream request
///
/// Non-2xx statuses are returned as [`UpstreamError::Http`]; a 2xx body that
/// is not JSON is [`UpstreamError::InvalidResponse`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn send(
        &self,
        request: &UpstreamRequest,
        timeout: Duration,
    ) -> Result<UpstreamResponse, UpstreamError>;
}

/// `reqwest`-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UpstreamTransport for ReqwestTransport {
    async fn send(
        &self,
        request: &UpstreamRequest,
        timeout: Duration,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let mut builder = self.client.post(&request.url).timeout(timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                UpstreamError::Timeout(timeout.as_secs())
            } else {
                // without_url keeps query-string keys out of messages
                UpstreamError::Network(e.without_url().to_string())
            }
        };

        let response = builder.json(&request.body).send().await.map_err(map_err)?;
        let status = response.status();
        let text = response.text().await.map_err(map_err)?;

        debug!(status = status.as_u16(), bytes = text.len(), "Upstream responded");

        if !status.is_success() {
            return Err(UpstreamError::http(status.as_u16(), text));
        }

        let body = serde_json::from_str(&text)
            .map_err(|e| UpstreamError::InvalidResponse(format!("body is not JSON: {}", e)))?;

        Ok(UpstreamResponse {
            status: status.as_u16(),
            body,
        })
    }
}
