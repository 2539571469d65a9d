use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::RecordId;

/// Column that identifies a row
pub const ID_COLUMN: &str = "id";

/// One row of a backend table: an ordered column → scalar mapping whose shape
/// is only known once the server has answered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, JsonValue>);

/// A rendered cell. `Absent` marks a column this row does not carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Value(&'a JsonValue),
    Absent,
}

impl Cell<'_> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Cell::Absent)
    }

    /// Text for a table cell; absent and null both render empty.
    pub fn display(&self) -> String {
        match self {
            Cell::Absent | Cell::Value(JsonValue::Null) => String::new(),
            Cell::Value(JsonValue::String(s)) => s.clone(),
            Cell::Value(other) => other.to_string(),
        }
    }
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row key, `None` when the backend omitted or nulled `id`.
    pub fn id(&self) -> Option<RecordId> {
        self.0.get(ID_COLUMN).and_then(RecordId::from_value)
    }

    pub fn get(&self, column: &str) -> Option<&JsonValue> {
        self.0.get(column)
    }

    pub fn cell(&self, column: &str) -> Cell<'_> {
        match self.0.get(column) {
            Some(value) => Cell::Value(value),
            None => Cell::Absent,
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// Column names in server order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set a column, keeping its position when it already exists.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<JsonValue>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    pub fn into_value(self) -> JsonValue {
        JsonValue::Object(self.0)
    }
}

impl From<Map<String, JsonValue>> for Record {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
