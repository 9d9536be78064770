//! Wire types for the tracker's JSON-RPC dialect.
//!
//! Trac's JSON-RPC endpoint is not JSON-RPC 2.0: requests carry only
//! `method` and `params` (no `jsonrpc` or `id` members), parameters are
//! positional, and responses carry either a `result` or an `error` member.

use crate::error::{Result, TracError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC request (client-side, for building requests).
///
/// Parameter order is semantically significant: the tracker dispatches by
/// position, not by name.
///
/// # Example
///
/// ```
/// use trac_client::rpc::RpcRequest;
/// use serde_json::json;
///
/// let request = RpcRequest::new("ticket.get", vec![json!(42)]);
/// assert_eq!(request.method, "ticket.get");
/// assert_eq!(request.params, vec![json!(42)]);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    /// Method name.
    pub method: String,
    /// Positional parameters, order preserved.
    pub params: Vec<Value>,
}

impl RpcRequest {
    /// Creates a new RPC request.
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response (client-side, for parsing responses).
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    /// Result (present on success).
    pub result: Option<Value>,
    /// Fault (present on failure).
    pub error: Option<RpcFault>,
}

impl RpcResponse {
    /// Extracts the result value, returning an error if the response
    /// carries a fault.
    ///
    /// A success body without a `result` member normalizes to JSON null,
    /// matching what the tracker sends for void operations.
    pub fn into_result(self) -> Result<Value> {
        if let Some(fault) = self.error {
            return Err(TracError::Rpc(fault.message));
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}

/// Remote fault object carried in a response's `error` member.
///
/// The tracker also sends a numeric `code` and an exception `name`
/// alongside the message; only the message is surfaced to callers.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcFault {
    /// Human-readable fault message.
    pub message: String,
    /// Numeric fault code.
    #[serde(default)]
    pub code: Option<i64>,
    /// Remote exception name.
    #[serde(default)]
    pub name: Option<String>,
}
