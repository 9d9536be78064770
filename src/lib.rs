//! # trac-client
//!
//! Client library for the Trac issue tracker's JSON-RPC API (the
//! XmlRpcPlugin's JSON endpoint).
//!
//! The library translates high-level ticket operations into JSON-RPC
//! calls over HTTP with basic authentication, and normalizes the
//! tracker's raw response shapes — positional arrays and the
//! `{"__jsonclass__": [tag, value]}` envelope for dates and binary
//! payloads — into plain structured records.
//!
//! ## Layers
//!
//! - [`rpc`]: wire types, the tagged-value codec, and the one-shot HTTP
//!   transport
//! - [`ticket`]: typed ticket/comment/attachment operations and the
//!   change-log normalization
//!
//! ## Example
//!
//! ```no_run
//! use trac_client::{Result, TicketClient};
//!
//! # async fn run() -> Result<()> {
//! let client = TicketClient::new("http://trac.local/login/jsonrpc", "alice", "secret")?;
//!
//! let id = client
//!     .create_ticket("Login page broken", "500 on submit", Default::default())
//!     .await?;
//! client.accept_ticket(id, "taking this").await?;
//!
//! for comment in client.get_comments(id).await? {
//!     println!("{} {}: {}", comment.updated_at, comment.author, comment.text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Every operation issues exactly one network call and holds no mutable
//! state across calls; there is no caching, no retry policy, and no
//! request batching.

pub mod error;
pub mod rpc;
pub mod ticket;

pub use error::{Result, TracError};
pub use rpc::{TaggedValue, Transport};
pub use ticket::{AttachmentRecord, ChangeAction, CommentEntry, TicketClient, TicketRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
