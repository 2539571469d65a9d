//! Error types for booking-link.
//!
//! Every failure crossing the transport boundary is an [`ApiError`] value; the
//! session guard reports [`AuthFailure`], which callers resolve to a navigation
//! target instead of an in-page error.

use std::path::PathBuf;
use thiserror::Error;

use crate::models::RecordId;

/// Result type for transport-level operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Normalized failure of a backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// HTTP 400
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// HTTP 401
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// HTTP 403
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// HTTP 404
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// HTTP 5xx
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Any other non-2xx status
    #[error("Unexpected response status {status}: {message}")]
    UnknownStatus { status: u16, message: String },

    /// The request was sent (or attempted) but no response came back.
    #[error("No response from server: {0}")]
    NetworkUnreachable(String),

    /// Non-JSON content type, or a body that does not match the expected shape.
    #[error("Invalid response format: {0}")]
    InvalidResponseFormat(String),
}

impl ApiError {
    /// Map a non-2xx status and the server's message onto the taxonomy.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => Self::BadRequest { message },
            401 => Self::Unauthorized { message },
            403 => Self::Forbidden { message },
            404 => Self::NotFound { message },
            500..=599 => Self::ServerError { status, message },
            _ => Self::UnknownStatus { status, message },
        }
    }

    /// HTTP status that produced this error, if it came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::ServerError { status, .. } | Self::UnknownStatus { status, .. } => Some(*status),
            Self::NetworkUnreachable(_) | Self::InvalidResponseFormat(_) => None,
        }
    }

    /// True for 401/403, i.e. a missing or expired session.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::Forbidden { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::InvalidResponseFormat(err.to_string())
        } else if err.is_timeout() {
            ApiError::NetworkUnreachable(format!("request timed out: {}", err))
        } else {
            ApiError::NetworkUnreachable(err.to_string())
        }
    }
}

/// Outcome of a failed admin session check.
///
/// The guard's failures are handled by navigation: see [`AuthFailure::destination`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// Missing, invalid or non-admin credential.
    #[error("Administrator session required")]
    Unauthenticated,

    /// The backend routed this operator elsewhere (e.g. a plain user dashboard).
    #[error("Redirected to {0}")]
    Redirect(String),

    /// The check itself could not complete (network or server failure).
    #[error("Session check failed: {0}")]
    Transport(ApiError),
}

impl AuthFailure {
    /// Where the caller must navigate. Only `Redirect` overrides the login page.
    pub fn destination<'a>(&'a self, login_path: &'a str) -> &'a str {
        match self {
            Self::Redirect(destination) => destination,
            Self::Unauthenticated | Self::Transport(_) => login_path,
        }
    }
}

/// Invalid operation against the inline edit session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("No row is being edited")]
    NotEditing,

    #[error("Row has no id column and cannot be edited")]
    MissingId,

    #[error("Column '{0}' is read-only")]
    ReadOnlyField(String),

    #[error("Column '{0}' does not exist on this row")]
    UnknownField(String),
}

/// Failure of an update or delete dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("A change to row {id} in '{table}' is already in progress")]
    InFlight { table: String, id: RecordId },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors reported by the admin dashboard view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("Dashboard is not mounted; verify the admin session first")]
    NotMounted,

    #[error("No table selected")]
    NoTableSelected,

    #[error("Table '{0}' is not in the catalog")]
    UnknownTable(String),

    #[error("Row {0} is not in the current record set")]
    RecordNotFound(RecordId),

    #[error("No delete is awaiting confirmation")]
    NoPendingDelete,

    #[error("Confirmation is for row {pending}, not row {requested}")]
    ConfirmationMismatch { pending: RecordId, requested: RecordId },

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Configuration, client-building and credential file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
