//! Normalized records returned by the ticket client.
//!
//! All of these are transient: constructed from one RPC response, handed
//! to the caller, and never retained by the library.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One ticket, normalized from the tracker's positional `ticket.get`
/// response.
///
/// The raw `changetime`/`time` attributes are consumed into the two
/// timestamp fields and removed from the attribute bag, so there is a
/// single representation of each timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    /// Creation timestamp, opaque text from the `datetime` envelope.
    pub created_at: String,
    /// Last-change timestamp, opaque text from the `datetime` envelope.
    pub changed_at: String,
    /// Remaining ticket attributes; the exact set depends on the modules
    /// installed on the tracker.
    pub attributes: BTreeMap<String, Value>,
}

impl TicketRecord {
    /// Borrows a ticket attribute by name.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

/// One attribute transition recorded in the same change-log transaction
/// as a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeAction {
    /// Transition kind: `change_` plus the attribute name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Value before the transition.
    pub old: Value,
    /// Value after the transition.
    pub new: Value,
}

/// One comment event from the ticket change log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentEntry {
    /// Comment identifier. The change log encodes it in the old-value
    /// slot of the comment row, so it arrives as whatever JSON scalar the
    /// tracker chose.
    pub id: Value,
    /// Comment timestamp, opaque text from the `datetime` envelope.
    pub updated_at: String,
    /// Comment author.
    pub author: String,
    /// Comment text.
    pub text: String,
    /// Attribute transitions that landed in the same transaction.
    pub actions: Vec<ChangeAction>,
}

/// One attachment, normalized from a `ticket.listAttachments` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    /// Attachment file name.
    pub filename: String,
    /// Attachment description.
    pub description: String,
    /// Size in bytes.
    pub size: u64,
    /// Upload timestamp, opaque text from the `datetime` envelope.
    pub updated_at: String,
    /// Uploader name.
    pub author: String,
}
