//! Record set loader.
//!
//! Rows arrive schema-less. Display columns come from the first row's keys;
//! later rows may carry fewer or extra keys and render missing ones as
//! [`Cell::Absent`].

use log::{debug, warn};
use std::collections::HashSet;

use crate::client::AdminClient;
use crate::error::Result;
use crate::models::{Cell, Record, RecordId};

/// Shown for a table with no rows
pub const NO_ROWS_MESSAGE: &str = "No rows";

/// Identifies one record-set request so a late response can be matched
/// against the selection that is current when it lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub table: String,
    pub sort_by: Option<String>,
    pub(crate) generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Rows of one table as last returned by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    table: String,
    columns: Vec<String>,
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(table: impl Into<String>, records: Vec<Record>) -> Self {
        let columns = derive_columns(&records);
        Self {
            table: table.into(),
            columns,
            records,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Display columns, in the first row's order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.is_empty().then_some(NO_ROWS_MESSAGE)
    }

    /// Cell at (row, column); out-of-range rows are absent too.
    pub fn cell(&self, row: usize, column: &str) -> Cell<'_> {
        self.records
            .get(row)
            .map_or(Cell::Absent, |record| record.cell(column))
    }

    /// Ids carried by more than one row, e.g. `1` and `"1"`. Such rows share
    /// one backend route and [`find`](Self::find) returns the first.
    pub fn duplicate_ids(&self) -> Vec<RecordId> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for id in self.records.iter().filter_map(Record::id) {
            if !seen.insert(id.clone()) && !duplicates.contains(&id) {
                duplicates.push(id);
            }
        }
        duplicates
    }

    pub fn find(&self, id: &RecordId) -> Option<&Record> {
        self.records
            .iter()
            .find(|record| record.id().as_ref() == Some(id))
    }
}

/// Column set for rendering: the first record's keys.
pub fn derive_columns(records: &[Record]) -> Vec<String> {
    records
        .first()
        .map(|first| first.columns().map(str::to_string).collect())
        .unwrap_or_default()
}

#[derive(Clone)]
pub struct RecordSetLoader {
    client: AdminClient,
}

impl RecordSetLoader {
    pub fn new(client: AdminClient) -> Self {
        Self { client }
    }

    /// `loadRecords(tableName)`, optionally sorted server-side.
    pub async fn load_records(&self, table: &str, sort_by: Option<&str>) -> Result<RecordSet> {
        let records = self.client.fetch_records(table, sort_by).await?;
        let set = RecordSet::new(table, records);

        let missing_ids = set.records().iter().filter(|r| r.id().is_none()).count();
        if missing_ids > 0 {
            warn!(
                "[RECORDS] {} row(s) in '{}' have no usable id; they are read-only",
                missing_ids, table
            );
        }
        let duplicates = set.duplicate_ids();
        if !duplicates.is_empty() {
            warn!(
                "[RECORDS] '{}' has rows sharing an id ({}); edits and deletes target the first",
                table,
                duplicates
                    .iter()
                    .map(RecordId::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        let ragged = set
            .records()
            .iter()
            .filter(|r| r.len() != set.columns().len() || set.columns().iter().any(|c| !r.contains(c)))
            .count();
        if ragged > 0 {
            debug!(
                "[RECORDS] {} row(s) in '{}' differ from the first row's columns",
                ragged, table
            );
        }

        debug!("[RECORDS] Loaded {} row(s) from '{}'", set.len(), table);
        Ok(set)
    }
}
