//! # booking-link
//!
//! Client-side core of the booking admin dashboard: browse backend-defined
//! tables of unknown shape, edit rows in place and persist changes, with
//! the server's state as the only source of truth.
//!
//! Components, leaf first:
//!
//! - [`transport`]: HTTP calls, credential attachment, error taxonomy
//! - [`guard`]: admin session check, login/logout, credential persistence
//! - [`catalog`]: list of manageable tables
//! - [`records`]: schema-less record sets and stale-response tickets
//! - [`edit`]: single-row inline edit state machine
//! - [`mutation`]: updates and confirmed deletes, one in flight per row
//! - [`dashboard`]: the view-model that ties them together
//!
//! ```rust,no_run
//! use booking_link::{AdminConfig, AdminDashboard, AdminSessionGuard, Credential, FileCredentialStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AdminConfig::load(&booking_link::config::default_config_path())?;
//! let client = config.to_client_builder(Credential::none()).build()?;
//! let store = FileCredentialStore::new()?;
//! let guard = AdminSessionGuard::new(client, Box::new(store), config.ui.instance.clone())
//!     .with_login_path(config.ui.login_path.clone());
//! let mut dashboard = AdminDashboard::new(guard);
//! dashboard.mount().await;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod credentials;
pub mod dashboard;
pub mod edit;
pub mod error;
pub mod guard;
pub mod models;
pub mod mutation;
pub mod records;
pub mod routes;
pub mod timeouts;
pub mod transport;

pub use auth::{AuthMode, Credential};
pub use catalog::{TableCatalog, NO_TABLES_MESSAGE};
pub use client::{AdminClient, AdminClientBuilder, LoginOutcome};
pub use config::AdminConfig;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredCredential};
pub use dashboard::{AdminDashboard, Banner, LoadOutcome, MountOutcome};
pub use edit::{EditBuffer, EditSession};
pub use error::{ApiError, AuthFailure, ConfigError, DashboardError, EditError, MutationError, Result};
pub use guard::AdminSessionGuard;
pub use models::{AdminIdentity, Cell, Record, RecordId, TableDescriptor, UserStats};
pub use mutation::{MutationDispatcher, PendingDelete};
pub use records::{LoadTicket, RecordSet, RecordSetLoader, NO_ROWS_MESSAGE};
pub use routes::AdminRoutes;
pub use timeouts::LinkTimeouts;
pub use transport::{ApiPath, ApiRequest, ApiResponse, HttpTransport, ResponseCookie, Transport};
