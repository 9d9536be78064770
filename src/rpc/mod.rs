//! JSON-RPC plumbing for the tracker endpoint.
//!
//! ## Modules
//!
//! - `types`: request/response wire types for the tracker's RPC dialect
//! - `tagged`: codec for the `__jsonclass__` tagged-value envelope
//! - `transport`: one-shot HTTP transport with basic authentication

pub mod tagged;
pub mod transport;
pub mod types;

pub use tagged::{TaggedValue, TAG_BINARY, TAG_DATETIME};
pub use transport::{Transport, DEFAULT_TIMEOUT};
pub use types::{RpcFault, RpcRequest, RpcResponse};
