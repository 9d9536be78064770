//! Error types for Trac client operations.

use thiserror::Error;

/// Result type alias for Trac client operations.
pub type Result<T> = std::result::Result<T, TracError>;

/// Main error type for Trac client operations.
///
/// Every public operation can fail with any of these; the library performs
/// no local recovery, no retry, no suppression.
#[derive(Error, Debug)]
pub enum TracError {
    /// The endpoint rejected the configured credentials (HTTP 401)
    #[error("username or password not valid")]
    Auth,

    /// The endpoint answered with a non-200 HTTP status other than 401
    #[error("rpc call failed (status code: {0})")]
    Status(u16),

    /// Network-level failure: connect, timeout, TLS
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON, or a response did not match the
    /// shape the tracker is documented to send
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Well-formed response carrying a remote `error` object; the message
    /// is surfaced verbatim
    #[error("rpc error: {0}")]
    Rpc(String),

    /// A change log the normalizer cannot thread into comment entries
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid caller input
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl TracError {
    /// Creates a new protocol error.
    pub fn protocol<T: ToString>(msg: T) -> Self {
        Self::Protocol(msg.to_string())
    }

    /// Creates a new rpc error.
    pub fn rpc<T: ToString>(msg: T) -> Self {
        Self::Rpc(msg.to_string())
    }

    /// Creates a new malformed response error.
    pub fn malformed<T: ToString>(msg: T) -> Self {
        Self::MalformedResponse(msg.to_string())
    }

    /// Creates a new invalid input error.
    pub fn invalid_input<T: ToString>(msg: T) -> Self {
        Self::InvalidInput(msg.to_string())
    }
}
