//! Wire and view models for the admin backend.

mod admin_identity;
mod check_auth_response;
mod error_body;
mod login_request;
mod login_response;
mod record;
mod record_id;
mod table_descriptor;
mod user_stats;

pub use admin_identity::{AdminIdentity, ADMIN_ROLE};
pub use check_auth_response::CheckAuthResponse;
pub use error_body::ErrorBody;
pub use login_request::LoginRequest;
pub use login_response::LoginResponse;
pub use record::{Cell, Record, ID_COLUMN};
pub use record_id::RecordId;
pub use table_descriptor::TableDescriptor;
pub use user_stats::UserStats;
