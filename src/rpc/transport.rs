//! HTTP transport for the tracker's JSON-RPC endpoint.
//!
//! One POST per call, HTTP basic auth, a fixed per-call timeout, and
//! nothing else: no batching, no retries, no caching. Every failure is
//! surfaced to the caller immediately.

use crate::error::{Result, TracError};
use crate::rpc::types::{RpcRequest, RpcResponse};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default per-call network timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One-shot JSON-RPC transport.
///
/// Endpoint and credentials are immutable for the lifetime of the
/// transport; the only cancellation mechanism is the per-call timeout.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    endpoint: String,
    username: String,
    password: String,
}

impl Transport {
    /// Creates a transport with the default timeout.
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::with_timeout(endpoint, username, password, DEFAULT_TIMEOUT)
    }

    /// Creates a transport with a custom per-call timeout.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
        })
    }

    /// Returns the configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one RPC call and returns the raw `result` value, untouched.
    ///
    /// Status 401 maps to [`TracError::Auth`], any other non-200 status to
    /// [`TracError::Status`], a non-JSON body to [`TracError::Protocol`],
    /// and a body with an `error` member to [`TracError::Rpc`].
    #[instrument(skip(self, params), fields(endpoint = %self.endpoint))]
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        if method.is_empty() {
            return Err(TracError::invalid_input("method name must not be empty"));
        }

        let request = RpcRequest::new(method, params);
        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(TracError::Auth);
        }
        if status != StatusCode::OK {
            return Err(TracError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: RpcResponse = serde_json::from_str(&body)
            .map_err(|e| TracError::protocol(format!("response body is not valid JSON: {}", e)))?;

        debug!(method, "rpc call completed");
        parsed.into_result()
    }
}
