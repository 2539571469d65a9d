use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Stable row key taken from a record's `id` column.
///
/// Numeric and string ids both normalize to their textual form, which is
/// also the path segment used for updates and deletes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Read an id from a JSON scalar. Null, empty strings and non-scalars are not ids.
    pub fn from_value(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(s) if !s.trim().is_empty() => Some(Self(s.clone())),
            JsonValue::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value() {
        assert_eq!(RecordId::from_value(&json!(1)), Some(RecordId::from(1)));
        assert_eq!(RecordId::from_value(&json!("A-17")), Some(RecordId::from("A-17")));
        assert_eq!(RecordId::from_value(&json!(null)), None);
        assert_eq!(RecordId::from_value(&json!("")), None);
        assert_eq!(RecordId::from_value(&json!([1])), None);
    }
}
