//! Ticket operations and normalized records.
//!
//! ## Modules
//!
//! - `client`: one typed method per RPC operation
//! - `changelog`: change-log to comment-entry normalization
//! - `types`: the normalized record types

pub mod changelog;
pub mod client;
pub mod types;

pub use changelog::comments_from_change_log;
pub use client::{TicketClient, DEFAULT_QUERY_LIMIT, DEFAULT_RESOLUTION};
pub use types::{AttachmentRecord, ChangeAction, CommentEntry, TicketRecord};
