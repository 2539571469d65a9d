//! Table catalog loader.

use log::{debug, warn};

use crate::client::AdminClient;
use crate::error::Result;
use crate::models::TableDescriptor;

/// Shown when the backend exposes no tables
pub const NO_TABLES_MESSAGE: &str = "No tables available";

/// The list of manageable tables for the current view.
///
/// Nothing is cached beyond the view's lifetime; the list is replaced
/// wholesale on each successful [`refresh`](Self::refresh).
#[derive(Clone)]
pub struct TableCatalog {
    client: AdminClient,
    tables: Option<Vec<TableDescriptor>>,
}

impl TableCatalog {
    pub fn new(client: AdminClient) -> Self {
        Self {
            client,
            tables: None,
        }
    }

    /// `listTables()`: fetch without touching the held list.
    pub async fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        let tables = self.client.list_tables().await?;
        debug!("[CATALOG] Backend reported {} table(s)", tables.len());
        Ok(tables)
    }

    /// Re-fetch and replace the held list. On failure the previous list stays.
    pub async fn refresh(&mut self) -> Result<&[TableDescriptor]> {
        match self.list_tables().await {
            Ok(tables) => Ok(self.tables.insert(tables).as_slice()),
            Err(e) => {
                warn!("[CATALOG] Refresh failed: {}", e);
                Err(e)
            },
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.tables.is_some()
    }

    pub fn tables(&self) -> &[TableDescriptor] {
        self.tables.as_deref().unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables().iter().find(|table| table.name == name)
    }

    /// Placeholder text for a loaded but empty catalog.
    pub fn empty_message(&self) -> Option<&'static str> {
        match &self.tables {
            Some(tables) if tables.is_empty() => Some(NO_TABLES_MESSAGE),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.tables = None;
    }
}
