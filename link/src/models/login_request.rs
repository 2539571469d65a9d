use serde::{Deserialize, Serialize};

/// Admin login request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Admin email address
    pub email: String,
    /// Password for authentication
    pub password: String,
}

impl LoginRequest {
    /// Presence check only; the backend owns every other rule.
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}
