use serde::{Deserialize, Serialize};

/// One backend table the operator may browse.
///
/// Identity is `name`. Wire form: `{"name": "users", "fields": 4}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,

    /// Number of columns the backend reports for the table
    #[serde(rename = "fields", alias = "field_count", default)]
    pub field_count: u32,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>, field_count: u32) -> Self {
        Self {
            name: name.into(),
            field_count,
        }
    }
}
