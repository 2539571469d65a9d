//! Inline edit session.
//!
//! An explicit `Idle` / `Editing` state machine owned by the dashboard view.
//! Edits go to an [`EditBuffer`], never to the record set, until a commit
//! succeeds.

use log::debug;
use serde_json::Value as JsonValue;

use crate::error::EditError;
use crate::models::{Record, RecordId, ID_COLUMN};

/// Uncommitted edits for exactly one row.
#[derive(Debug, Clone, PartialEq)]
pub struct EditBuffer {
    record_id: RecordId,
    original: Record,
    fields: Record,
}

impl EditBuffer {
    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    /// Full row with pending values applied; this is the update body.
    pub fn fields(&self) -> &Record {
        &self.fields
    }

    /// Row as it was when editing began
    pub fn original(&self) -> &Record {
        &self.original
    }

    /// Columns whose pending value differs from the snapshot.
    pub fn changed_columns(&self) -> Vec<&str> {
        self.fields
            .columns()
            .filter(|column| self.fields.get(column) != self.original.get(column))
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        self.fields != self.original
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditSession {
    #[default]
    Idle,
    Editing(EditBuffer),
}

impl EditSession {
    pub fn new() -> Self {
        Self::Idle
    }

    /// Snapshot `record` into a fresh buffer.
    ///
    /// Any buffer already open is discarded without warning and returned so a
    /// caller that wants to confirm first can inspect it.
    pub fn begin_edit(&mut self, record: &Record) -> Result<Option<EditBuffer>, EditError> {
        let record_id = record.id().ok_or(EditError::MissingId)?;
        let buffer = EditBuffer {
            record_id: record_id.clone(),
            original: record.clone(),
            fields: record.clone(),
        };

        let previous = match std::mem::replace(self, Self::Editing(buffer)) {
            Self::Editing(previous) => Some(previous),
            Self::Idle => None,
        };
        if let Some(previous) = &previous {
            if previous.is_dirty() {
                debug!(
                    "[EDIT] Discarding uncommitted edits to row {}",
                    previous.record_id
                );
            }
        }
        debug!("[EDIT] Editing row {}", record_id);
        Ok(previous)
    }

    /// Buffer a new value for `column`. `id` and unknown columns are rejected.
    pub fn set_field(&mut self, column: &str, value: impl Into<JsonValue>) -> Result<(), EditError> {
        let Self::Editing(buffer) = self else {
            return Err(EditError::NotEditing);
        };
        if column == ID_COLUMN {
            return Err(EditError::ReadOnlyField(column.to_string()));
        }
        if !buffer.fields.contains(column) {
            return Err(EditError::UnknownField(column.to_string()));
        }
        buffer.fields.insert(column, value);
        Ok(())
    }

    /// Back to `Idle`; no network call. Returns the dropped buffer.
    pub fn cancel_edit(&mut self) -> Option<EditBuffer> {
        match std::mem::take(self) {
            Self::Editing(buffer) => {
                debug!("[EDIT] Cancelled edit of row {}", buffer.record_id);
                Some(buffer)
            },
            Self::Idle => None,
        }
    }

    pub fn buffer(&self) -> Option<&EditBuffer> {
        match self {
            Self::Editing(buffer) => Some(buffer),
            Self::Idle => None,
        }
    }

    pub fn editing_id(&self) -> Option<&RecordId> {
        self.buffer().map(EditBuffer::record_id)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }

    /// Pending value for `column` while editing `id`, for rendering the input.
    pub fn pending_value(&self, id: &RecordId, column: &str) -> Option<&JsonValue> {
        self.buffer()
            .filter(|buffer| &buffer.record_id == id)
            .and_then(|buffer| buffer.fields.get(column))
    }
}
