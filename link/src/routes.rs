//! Backend route table.
//!
//! Exact paths are a deployment contract with the backend, so every route is
//! overridable from the `[routes]` section of the config file.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::RecordId;
use crate::transport::ApiPath;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminRoutes {
    /// `GET` → `{ name, email, role, redirect? }`
    pub check_auth: String,

    /// `GET` list, `GET /{table}` rows, `PUT|DELETE /{table}/{id}`
    pub tables: String,

    pub login: String,

    pub logout: String,

    pub user_stats: String,
}

impl Default for AdminRoutes {
    fn default() -> Self {
        Self {
            check_auth: "/admin/check-auth".to_string(),
            tables: "/admin/tables".to_string(),
            login: "/admin/login".to_string(),
            logout: "/admin/logout".to_string(),
            user_stats: "/api/user-stats".to_string(),
        }
    }
}

impl AdminRoutes {
    pub fn check_auth_path(&self) -> ApiPath {
        ApiPath::parse(&self.check_auth)
    }

    pub fn tables_path(&self) -> ApiPath {
        ApiPath::parse(&self.tables)
    }

    /// Fails for a table name that would not survive as a path segment.
    pub fn table_path(&self, table: &str) -> Result<ApiPath> {
        self.tables_path().join(table)
    }

    pub fn record_path(&self, table: &str, id: &RecordId) -> Result<ApiPath> {
        self.table_path(table)?.join(id.as_str())
    }

    pub fn login_path(&self) -> ApiPath {
        ApiPath::parse(&self.login)
    }

    pub fn logout_path(&self) -> ApiPath {
        ApiPath::parse(&self.logout)
    }

    pub fn user_stats_path(&self) -> ApiPath {
        ApiPath::parse(&self.user_stats)
    }
}
