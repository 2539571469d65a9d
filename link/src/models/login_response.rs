use serde::{Deserialize, Serialize};

/// Response from `POST /admin/login`.
///
/// Cookie deployments carry the session in `Set-Cookie` and leave `token` empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub admin_id: Option<i64>,

    /// Bearer token, when the backend issues one
    #[serde(default, alias = "access_token")]
    pub token: Option<String>,
}
