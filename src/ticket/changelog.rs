//! Change-log normalization.
//!
//! The tracker's `ticket.changeLog` result is a flat, chronologically
//! ordered list of per-field change rows. This module threads those rows
//! into [`CommentEntry`] values: each comment row opens an entry, and the
//! attribute changes from the same transaction are grouped under it.

use crate::error::{Result, TracError};
use crate::rpc::TaggedValue;
use crate::ticket::types::{ChangeAction, CommentEntry};
use serde_json::Value;

/// Field names that are comment/attachment/workflow metadata rather than
/// attribute transitions.
const METADATA_FIELDS: [&str; 3] = ["comment", "attachment", "resolution"];

/// Prefix on bookkeeping rows the tracker emits for its own use
/// (`_comment0` and friends).
const INTERNAL_MARKER: char = '_';

/// One raw change-log row: `[timestamp, author, field, old, new]`.
struct ChangeRow<'a> {
    timestamp: &'a Value,
    author: &'a str,
    field: &'a str,
    old: &'a Value,
    new: &'a Value,
}

impl<'a> ChangeRow<'a> {
    fn parse(row: &'a Value) -> Result<Self> {
        let parts = row
            .as_array()
            .ok_or_else(|| TracError::protocol("change-log row is not an array"))?;
        let [timestamp, author, field, old, new] = parts.as_slice() else {
            return Err(TracError::protocol(format!(
                "change-log row has {} elements, expected 5",
                parts.len()
            )));
        };
        let author = author
            .as_str()
            .ok_or_else(|| TracError::protocol("change-log author is not a string"))?;
        let field = field
            .as_str()
            .ok_or_else(|| TracError::protocol("change-log field name is not a string"))?;
        Ok(Self {
            timestamp,
            author,
            field,
            old,
            new,
        })
    }
}

/// Returns the comment text if the row's new-value slot holds a non-empty
/// string.
fn comment_text(new: &Value) -> Option<&str> {
    new.as_str().filter(|text| !text.is_empty())
}

/// Normalizes `ticket.changeLog` rows into comment entries.
///
/// Rules, in order, for each row:
///
/// 1. a `comment` row with non-empty text opens a new entry and becomes
///    the current one (the comment id travels in the old-value slot);
/// 2. a field starting with `_` is tracker bookkeeping and is skipped;
/// 3. any field outside `{comment, attachment, resolution}` becomes a
///    [`ChangeAction`] on the current entry — a change row with no
///    current entry is a malformed change log;
/// 4. everything else (attachment/resolution metadata, empty comment
///    rows) carries no state transition and is skipped.
pub fn comments_from_change_log(rows: &[Value]) -> Result<Vec<CommentEntry>> {
    let mut comments: Vec<CommentEntry> = Vec::new();

    for row in rows {
        let row = ChangeRow::parse(row)?;

        if row.field == "comment" {
            if let Some(text) = comment_text(row.new) {
                let updated_at = TaggedValue::from_value(row.timestamp)?
                    .datetime_text()?
                    .to_string();
                comments.push(CommentEntry {
                    id: row.old.clone(),
                    updated_at,
                    author: row.author.to_string(),
                    text: text.to_string(),
                    actions: Vec::new(),
                });
            }
        } else if row.field.starts_with(INTERNAL_MARKER) {
            // bookkeeping row, not a user-visible change
        } else if !METADATA_FIELDS.contains(&row.field) {
            let current = comments.last_mut().ok_or_else(|| {
                TracError::malformed(format!(
                    "change row for '{}' precedes any comment row",
                    row.field
                ))
            })?;
            current.actions.push(ChangeAction {
                kind: format!("change_{}", row.field),
                old: row.old.clone(),
                new: row.new.clone(),
            });
        }
    }

    Ok(comments)
}
