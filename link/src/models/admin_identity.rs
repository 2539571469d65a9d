use serde::{Deserialize, Serialize};

/// Role string the backend assigns to administrators
pub const ADMIN_ROLE: &str = "admin";

/// The verified operator. Obtained once per dashboard mount, read-only after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub name: String,
    pub email: String,
    pub role: String,
}
