use serde::{Deserialize, Serialize};

use super::{AdminIdentity, ADMIN_ROLE};

/// Response from `GET /admin/check-auth`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckAuthResponse {
    #[serde(default, alias = "full_name")]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub role: Option<String>,

    /// Alternate destination for operators who are not admins
    #[serde(default)]
    pub redirect: Option<String>,
}

impl CheckAuthResponse {
    /// Non-empty redirect target, if the backend sent one.
    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect
            .as_deref()
            .map(str::trim)
            .filter(|target| !target.is_empty())
    }

    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|role| role.trim().eq_ignore_ascii_case(ADMIN_ROLE))
    }

    /// Identity for an admin response; `None` for any other role.
    pub fn into_identity(self) -> Option<AdminIdentity> {
        if !self.is_admin() {
            return None;
        }
        Some(AdminIdentity {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            role: self.role.unwrap_or_default(),
        })
    }
}
