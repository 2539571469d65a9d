//! Admin dashboard view-model.
//!
//! Owns the selected table, the current record set, the inline edit session,
//! a pending delete confirmation and the error banner. Every operation is
//! driven by an operator event; nothing polls or retries.
//!
//! ```rust,no_run
//! use booking_link::{AdminClient, AdminDashboard, AdminSessionGuard, MemoryCredentialStore, MountOutcome};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AdminClient::builder().base_url("http://127.0.0.1:5000").build()?;
//! let guard = AdminSessionGuard::new(client, Box::new(MemoryCredentialStore::new()), "local");
//! let mut dashboard = AdminDashboard::new(guard);
//!
//! if let MountOutcome::Navigate(path) = dashboard.mount().await {
//!     println!("navigate to {}", path);
//!     return Ok(());
//! }
//! dashboard.open_table("users").await?;
//! # Ok(())
//! # }
//! ```

use log::{debug, info, warn};
use serde_json::Value as JsonValue;

use crate::catalog::TableCatalog;
use crate::edit::EditSession;
use crate::error::{DashboardError, EditError};
use crate::guard::AdminSessionGuard;
use crate::models::{AdminIdentity, RecordId, TableDescriptor, UserStats};
use crate::mutation::{MutationDispatcher, PendingDelete};
use crate::records::{LoadTicket, RecordSet, RecordSetLoader};

/// Dismissible, human-readable error shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub message: String,
}

/// Result of mounting the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountOutcome {
    Ready(AdminIdentity),
    /// The guard refused entry; navigate here and load nothing.
    Navigate(String),
}

/// What happened to a record-set response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// The selection moved on before the response arrived.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selection {
    table: String,
    sort_by: Option<String>,
}

pub struct AdminDashboard {
    guard: AdminSessionGuard,
    catalog: TableCatalog,
    loader: RecordSetLoader,
    dispatcher: MutationDispatcher,
    mounted: bool,
    selection: Option<Selection>,
    generation: u64,
    records: Option<RecordSet>,
    edit: EditSession,
    pending_delete: Option<PendingDelete>,
    stats: Option<UserStats>,
    banner: Option<Banner>,
}

impl AdminDashboard {
    pub fn new(guard: AdminSessionGuard) -> Self {
        let client = guard.client().clone();
        Self {
            catalog: TableCatalog::new(client.clone()),
            loader: RecordSetLoader::new(client.clone()),
            dispatcher: MutationDispatcher::new(client),
            guard,
            mounted: false,
            selection: None,
            generation: 0,
            records: None,
            edit: EditSession::new(),
            pending_delete: None,
            stats: None,
            banner: None,
        }
    }

    fn reset_view(&mut self) {
        self.mounted = false;
        self.catalog.clear();
        self.selection = None;
        self.generation += 1;
        self.records = None;
        self.edit = EditSession::new();
        self.pending_delete = None;
        self.stats = None;
        self.banner = None;
    }

    fn ensure_mounted(&self) -> Result<(), DashboardError> {
        if self.mounted {
            Ok(())
        } else {
            Err(DashboardError::NotMounted)
        }
    }

    fn selected(&self) -> Result<&Selection, DashboardError> {
        self.ensure_mounted()?;
        self.selection.as_ref().ok_or(DashboardError::NoTableSelected)
    }

    /// Show an API-level failure on the banner and hand it back.
    fn surface(&mut self, err: impl Into<DashboardError>) -> DashboardError {
        let err = err.into();
        warn!("[DASHBOARD] {}", err);
        self.banner = Some(Banner {
            message: err.to_string(),
        });
        err
    }

    /// Run the session guard, then load the catalog and user stats.
    ///
    /// The guard runs once per mount. A catalog failure leaves the dashboard
    /// mounted with a banner; a stats failure is only logged.
    pub async fn mount(&mut self) -> MountOutcome {
        self.reset_view();

        let identity = match self.guard.verify().await {
            Ok(identity) => identity,
            Err(failure) => {
                let destination = failure.destination(self.guard.login_path()).to_string();
                info!("[DASHBOARD] Entry refused ({}); navigating to {}", failure, destination);
                return MountOutcome::Navigate(destination);
            },
        };

        self.mounted = true;
        if let Err(e) = self.catalog.refresh().await.map(|_| ()) {
            self.surface(e);
        }
        match self.guard.client().user_stats().await {
            Ok(stats) => self.stats = Some(stats),
            Err(e) => debug!("[DASHBOARD] User stats unavailable: {}", e),
        }
        MountOutcome::Ready(identity)
    }

    /// Log out and drop all view state. Returns the login path to navigate to.
    pub async fn logout(&mut self) -> String {
        if let Err(e) = self.guard.logout().await {
            warn!("[DASHBOARD] Logout call failed: {}", e);
        }
        self.reset_view();
        self.guard.login_path().to_string()
    }

    /// Re-fetch the table list. The previous list stays on failure.
    pub async fn refresh_catalog(&mut self) -> Result<&[TableDescriptor], DashboardError> {
        self.ensure_mounted()?;
        if let Err(e) = self.catalog.refresh().await.map(|_| ()) {
            return Err(self.surface(e));
        }
        Ok(self.catalog.tables())
    }

    fn next_ticket(&mut self) -> Result<LoadTicket, DashboardError> {
        let selection = self.selected()?.clone();
        self.generation += 1;
        Ok(LoadTicket {
            table: selection.table,
            sort_by: selection.sort_by,
            generation: self.generation,
        })
    }

    /// Make `table` the selected table.
    ///
    /// Drops the current record set, any open edit and any pending delete.
    /// The returned ticket is the only one whose response will be applied.
    pub fn select_table(&mut self, table: &str) -> Result<LoadTicket, DashboardError> {
        self.ensure_mounted()?;
        if self.catalog.is_loaded() && self.catalog.get(table).is_none() {
            return Err(DashboardError::UnknownTable(table.to_string()));
        }

        self.edit.cancel_edit();
        self.pending_delete = None;
        self.records = None;
        self.selection = Some(Selection {
            table: table.to_string(),
            sort_by: None,
        });
        debug!("[DASHBOARD] Selected table '{}'", table);
        self.next_ticket()
    }

    /// Change the server-side sort of the selected table.
    pub fn sort_by(&mut self, column: Option<&str>) -> Result<LoadTicket, DashboardError> {
        self.ensure_mounted()?;
        let selection = self
            .selection
            .as_mut()
            .ok_or(DashboardError::NoTableSelected)?;
        selection.sort_by = column.map(str::to_string);
        self.next_ticket()
    }

    /// Ticket for re-fetching the current selection.
    pub fn reload_ticket(&mut self) -> Result<LoadTicket, DashboardError> {
        self.next_ticket()
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
            && self
                .selection
                .as_ref()
                .is_some_and(|selection| selection.table == ticket.table)
    }

    /// Fetch the rows for `ticket` and apply them if still current.
    pub async fn load(&mut self, ticket: LoadTicket) -> Result<LoadOutcome, DashboardError> {
        let result = self
            .loader
            .load_records(&ticket.table, ticket.sort_by.as_deref())
            .await;
        self.finish_load(ticket, result)
    }

    /// Apply a record-set response that was fetched for `ticket`.
    ///
    /// Responses for an abandoned selection are discarded, errors included.
    /// On success the whole set is replaced; on failure it is left as it was.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: crate::Result<RecordSet>,
    ) -> Result<LoadOutcome, DashboardError> {
        if !self.is_current(&ticket) {
            debug!(
                "[DASHBOARD] Discarding stale response for '{}' (generation {} != {})",
                ticket.table, ticket.generation, self.generation
            );
            return Ok(LoadOutcome::Discarded);
        }

        let set = result.map_err(|e| self.surface(e))?;

        if let Some(id) = self.edit.editing_id() {
            if set.find(id).is_none() {
                debug!("[DASHBOARD] Edited row {} is gone; closing editor", id);
                self.edit.cancel_edit();
            }
        }
        if let Some(pending) = &self.pending_delete {
            if set.find(pending.id()).is_none() {
                self.pending_delete = None;
            }
        }
        self.records = Some(set);
        Ok(LoadOutcome::Applied)
    }

    /// Select `table` and load it.
    pub async fn open_table(&mut self, table: &str) -> Result<LoadOutcome, DashboardError> {
        let ticket = self.select_table(table)?;
        self.load(ticket).await
    }

    /// Re-fetch the selected table with its current sort.
    pub async fn reload(&mut self) -> Result<LoadOutcome, DashboardError> {
        let ticket = self.reload_ticket()?;
        self.load(ticket).await
    }

    /// Open the editor on row `id`, discarding any other open edit.
    pub fn begin_edit(&mut self, id: &RecordId) -> Result<(), DashboardError> {
        self.selected()?;
        let record = self
            .records
            .as_ref()
            .and_then(|set| set.find(id))
            .ok_or_else(|| DashboardError::RecordNotFound(id.clone()))?
            .clone();
        self.edit.begin_edit(&record)?;
        Ok(())
    }

    pub fn set_field(&mut self, column: &str, value: impl Into<JsonValue>) -> Result<(), DashboardError> {
        self.edit.set_field(column, value)?;
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.edit.cancel_edit();
    }

    /// Send the open edit as a full-record update, then reload.
    ///
    /// On failure the editor stays open with the buffer intact. The `&mut`
    /// borrow spans the request, so this dashboard never has two mutations
    /// in flight; clones of the dispatcher are guarded by its in-flight set.
    pub async fn commit_edit(&mut self) -> Result<LoadOutcome, DashboardError> {
        let table = self.selected()?.table.clone();
        let buffer = self.edit.buffer().ok_or(EditError::NotEditing)?;
        let id = buffer.record_id().clone();
        let fields = buffer.fields().clone();

        if let Err(e) = self.dispatcher.update(&table, &id, &fields).await {
            return Err(self.surface(e));
        }

        self.edit.cancel_edit();
        self.reload().await
    }

    /// First step of deleting row `id`: hold it for confirmation.
    pub fn request_delete(&mut self, id: &RecordId) -> Result<&PendingDelete, DashboardError> {
        let table = self.selected()?.table.clone();
        if self.records.as_ref().and_then(|set| set.find(id)).is_none() {
            return Err(DashboardError::RecordNotFound(id.clone()));
        }
        let pending = self.dispatcher.request_delete(&table, id);
        Ok(self.pending_delete.insert(pending))
    }

    /// Second step: the operator confirmed deleting row `id`.
    ///
    /// Without a matching pending request nothing is sent. On failure the
    /// record set stays as it was and the request must be made again.
    pub async fn confirm_delete(&mut self, id: &RecordId) -> Result<LoadOutcome, DashboardError> {
        self.selected()?;
        let pending = self
            .pending_delete
            .as_ref()
            .ok_or(DashboardError::NoPendingDelete)?;
        if pending.id() != id {
            return Err(DashboardError::ConfirmationMismatch {
                pending: pending.id().clone(),
                requested: id.clone(),
            });
        }

        let Some(pending) = self.pending_delete.take() else {
            return Err(DashboardError::NoPendingDelete);
        };
        if let Err(e) = self.dispatcher.delete(pending).await {
            return Err(self.surface(e));
        }

        if self.edit.editing_id() == Some(id) {
            self.edit.cancel_edit();
        }
        self.reload().await
    }

    pub fn cancel_delete(&mut self) -> Option<PendingDelete> {
        self.pending_delete.take()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn identity(&self) -> Option<&AdminIdentity> {
        self.guard.identity()
    }

    pub fn catalog(&self) -> &TableCatalog {
        &self.catalog
    }

    pub fn selected_table(&self) -> Option<&str> {
        self.selection.as_ref().map(|selection| selection.table.as_str())
    }

    pub fn sort_column(&self) -> Option<&str> {
        self.selection
            .as_ref()
            .and_then(|selection| selection.sort_by.as_deref())
    }

    pub fn records(&self) -> Option<&RecordSet> {
        self.records.as_ref()
    }

    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    pub fn stats(&self) -> Option<&UserStats> {
        self.stats.as_ref()
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn guard(&self) -> &AdminSessionGuard {
        &self.guard
    }
}
