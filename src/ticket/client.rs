//! High-level ticket operations over the JSON-RPC transport.
//!
//! Each operation maps to exactly one transport call, builds the
//! positional parameter list the tracker expects, and normalizes the raw
//! response. Local file I/O for attachments is the caller's concern: the
//! upload takes bytes and the download returns bytes.

use crate::error::{Result, TracError};
use crate::rpc::{TaggedValue, Transport};
use crate::ticket::changelog::comments_from_change_log;
use crate::ticket::types::{AttachmentRecord, CommentEntry, TicketRecord};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default `max=` term for ticket queries.
pub const DEFAULT_QUERY_LIMIT: u32 = 100;
/// Default resolution passed to [`TicketClient::resolve_ticket`].
pub const DEFAULT_RESOLUTION: &str = "fixed";

/// High-level client for the tracker's ticket API.
///
/// # Example
///
/// ```no_run
/// use trac_client::{TicketClient, Result};
/// use trac_client::ticket::DEFAULT_QUERY_LIMIT;
///
/// # async fn run() -> Result<()> {
/// let client = TicketClient::new("http://trac.local/login/jsonrpc", "alice", "secret")?;
/// let ids = client
///     .query_user_tickets("alice", &["new", "assigned"], DEFAULT_QUERY_LIMIT)
///     .await?;
/// for id in ids {
///     let ticket = client.get_ticket(id).await?;
///     println!("{}: {:?}", ticket.created_at, ticket.attr("summary"));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TicketClient {
    transport: Transport,
}

impl TicketClient {
    /// Creates a client with the default timeout.
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(endpoint, username, password)?,
        })
    }

    /// Creates a client with a custom per-call timeout.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            transport: Transport::with_timeout(endpoint, username, password, timeout)?,
        })
    }

    /// Wraps an existing transport.
    pub fn from_transport(transport: Transport) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Returns ids of tickets owned by `owner`, filtered by status.
    ///
    /// The tracker takes the whole query as one string:
    /// `owner=<u>&max=<limit>&status=<s1>&status=<s2>...`
    #[instrument(skip(self))]
    pub async fn query_user_tickets(
        &self,
        owner: &str,
        statuses: &[&str],
        limit: u32,
    ) -> Result<Vec<i64>> {
        let query = build_owner_query(owner, statuses, limit);
        let result = self
            .transport
            .call("ticket.query", vec![Value::String(query)])
            .await?;
        serde_json::from_value(result)
            .map_err(|e| TracError::protocol(format!("ticket.query result: {}", e)))
    }

    /// Fetches one ticket and normalizes its positional response.
    #[instrument(skip(self))]
    pub async fn get_ticket(&self, ticket_id: i64) -> Result<TicketRecord> {
        let result = self
            .transport
            .call("ticket.get", vec![json!(ticket_id)])
            .await?;
        ticket_from_response(&result)
    }

    /// Creates a ticket and returns its id.
    #[instrument(skip(self, attrs))]
    pub async fn create_ticket(
        &self,
        summary: &str,
        description: &str,
        attrs: Map<String, Value>,
    ) -> Result<i64> {
        let result = self
            .transport
            .call(
                "ticket.create",
                vec![json!(summary), json!(description), Value::Object(attrs)],
            )
            .await?;
        let id = result
            .as_i64()
            .ok_or_else(|| TracError::protocol("ticket.create did not return a ticket id"))?;
        debug!(id, "created ticket");
        Ok(id)
    }

    /// Updates ticket attributes, optionally with a comment.
    #[instrument(skip(self, attrs))]
    pub async fn update_ticket(
        &self,
        ticket_id: i64,
        comment: &str,
        attrs: Map<String, Value>,
    ) -> Result<()> {
        self.transport
            .call(
                "ticket.update",
                vec![json!(ticket_id), json!(comment), Value::Object(attrs)],
            )
            .await?;
        Ok(())
    }

    /// Accepts the ticket.
    #[instrument(skip(self))]
    pub async fn accept_ticket(&self, ticket_id: i64, comment: &str) -> Result<()> {
        self.update_ticket(ticket_id, comment, action_attrs("accept"))
            .await
    }

    /// Reassigns the ticket to another owner.
    #[instrument(skip(self))]
    pub async fn reassign_ticket(
        &self,
        ticket_id: i64,
        owner: &str,
        comment: &str,
    ) -> Result<()> {
        let mut attrs = action_attrs("reassign");
        attrs.insert("action_reassign_reassign_owner".to_string(), json!(owner));
        self.update_ticket(ticket_id, comment, attrs).await
    }

    /// Resolves the ticket; pass [`DEFAULT_RESOLUTION`] for the tracker's
    /// stock "fixed" resolution.
    #[instrument(skip(self))]
    pub async fn resolve_ticket(
        &self,
        ticket_id: i64,
        comment: &str,
        resolution: &str,
    ) -> Result<()> {
        let mut attrs = action_attrs("resolve");
        attrs.insert(
            "action_resolve_resolve_resolution".to_string(),
            json!(resolution),
        );
        self.update_ticket(ticket_id, comment, attrs).await
    }

    /// Reopens the ticket.
    #[instrument(skip(self))]
    pub async fn reopen_ticket(&self, ticket_id: i64, comment: &str) -> Result<()> {
        self.update_ticket(ticket_id, comment, action_attrs("reopen"))
            .await
    }

    /// Deletes the ticket.
    #[instrument(skip(self))]
    pub async fn delete_ticket(&self, ticket_id: i64) -> Result<()> {
        self.transport
            .call("ticket.delete", vec![json!(ticket_id)])
            .await?;
        Ok(())
    }

    /// Adds a comment without touching any attribute.
    #[instrument(skip(self, comment))]
    pub async fn add_comment(&self, ticket_id: i64, comment: &str) -> Result<()> {
        self.transport
            .call("ticket.update", vec![json!(ticket_id), json!(comment)])
            .await?;
        Ok(())
    }

    /// Fetches the ticket's change log and threads it into comment
    /// entries with their grouped attribute transitions.
    #[instrument(skip(self))]
    pub async fn get_comments(&self, ticket_id: i64) -> Result<Vec<CommentEntry>> {
        let result = self
            .transport
            .call("ticket.changeLog", vec![json!(ticket_id)])
            .await?;
        let rows = result
            .as_array()
            .ok_or_else(|| TracError::protocol("ticket.changeLog result is not an array"))?;
        comments_from_change_log(rows)
    }

    /// Lists the ticket's attachments.
    #[instrument(skip(self))]
    pub async fn list_attachments(&self, ticket_id: i64) -> Result<Vec<AttachmentRecord>> {
        let result = self
            .transport
            .call("ticket.listAttachments", vec![json!(ticket_id)])
            .await?;
        let rows = result
            .as_array()
            .ok_or_else(|| TracError::protocol("ticket.listAttachments result is not an array"))?;
        rows.iter().map(attachment_from_row).collect()
    }

    /// Uploads an attachment. Reading the bytes from disk is the caller's
    /// concern.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_attachment(
        &self,
        ticket_id: i64,
        filename: &str,
        description: &str,
        bytes: &[u8],
    ) -> Result<()> {
        let payload = serde_json::to_value(TaggedValue::binary(bytes.to_vec()))
            .map_err(|e| TracError::protocol(format!("encode binary payload: {}", e)))?;
        self.transport
            .call(
                "ticket.putAttachment",
                vec![json!(ticket_id), json!(filename), json!(description), payload],
            )
            .await?;
        Ok(())
    }

    /// Downloads an attachment's raw bytes. Writing them to disk is the
    /// caller's concern.
    #[instrument(skip(self))]
    pub async fn download_attachment(&self, ticket_id: i64, filename: &str) -> Result<Vec<u8>> {
        let result = self
            .transport
            .call(
                "ticket.getAttachment",
                vec![json!(ticket_id), json!(filename)],
            )
            .await?;
        TaggedValue::from_value(&result)?.into_bytes()
    }
}

/// Builds the single query-string parameter for `ticket.query`.
fn build_owner_query(owner: &str, statuses: &[&str], limit: u32) -> String {
    let mut query = format!("owner={}&max={}", owner, limit);
    for status in statuses {
        query.push_str("&status=");
        query.push_str(status);
    }
    query
}

/// Builds the workflow-action attribute map `{"action": <name>}`.
fn action_attrs(action: &str) -> Map<String, Value> {
    let mut attrs = Map::new();
    attrs.insert("action".to_string(), Value::String(action.to_string()));
    attrs
}

/// Normalizes the 4-element `ticket.get` response
/// `[id, createdTagged, changedTagged, attrs]`.
fn ticket_from_response(response: &Value) -> Result<TicketRecord> {
    let parts = response
        .as_array()
        .ok_or_else(|| TracError::protocol("ticket.get result is not an array"))?;
    let [_id, created, changed, attrs] = parts.as_slice() else {
        return Err(TracError::protocol(format!(
            "ticket.get result has {} elements, expected 4",
            parts.len()
        )));
    };

    let created_at = TaggedValue::from_value(created)?
        .datetime_text()?
        .to_string();
    let changed_at = TaggedValue::from_value(changed)?
        .datetime_text()?
        .to_string();

    let attrs = attrs
        .as_object()
        .ok_or_else(|| TracError::protocol("ticket attributes are not an object"))?;
    let mut attributes: BTreeMap<String, Value> =
        attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    // Consumed into the timestamp fields above.
    attributes.remove("changetime");
    attributes.remove("time");

    Ok(TicketRecord {
        created_at,
        changed_at,
        attributes,
    })
}

/// Normalizes one 5-element `ticket.listAttachments` row
/// `[filename, description, size, updatedTagged, author]`.
fn attachment_from_row(row: &Value) -> Result<AttachmentRecord> {
    let parts = row
        .as_array()
        .ok_or_else(|| TracError::protocol("attachment row is not an array"))?;
    let [filename, description, size, updated, author] = parts.as_slice() else {
        return Err(TracError::protocol(format!(
            "attachment row has {} elements, expected 5",
            parts.len()
        )));
    };

    let filename = filename
        .as_str()
        .ok_or_else(|| TracError::protocol("attachment filename is not a string"))?;
    let description = description
        .as_str()
        .ok_or_else(|| TracError::protocol("attachment description is not a string"))?;
    let size = size
        .as_u64()
        .ok_or_else(|| TracError::protocol("attachment size is not an unsigned integer"))?;
    let updated_at = TaggedValue::from_value(updated)?
        .datetime_text()?
        .to_string();
    let author = author
        .as_str()
        .ok_or_else(|| TracError::protocol("attachment author is not a string"))?;

    Ok(AttachmentRecord {
        filename: filename.to_string(),
        description: description.to_string(),
        size,
        updated_at,
        author: author.to_string(),
    })
}
