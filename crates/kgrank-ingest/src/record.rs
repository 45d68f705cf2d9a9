//! Raw graph records as produced by the record readers.

use serde_json::{Map, Value};

use kgrank_core::{Error, Result};

/// Property keys consulted for a node's display name, in priority order.
pub const NAME_PROPERTIES: [&str; 4] = ["name", "pref_name", "identifier", "id"];

/// One record of a graph dump.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Node(NodeRecord),
    Edge(EdgeRecord),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub id: i64,
    pub label: String,
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    pub start: i64,
    pub end: i64,
    pub label: String,
}

impl NodeRecord {
    /// First non-empty name-like property, or an empty string.
    pub fn display_name(&self) -> String {
        NAME_PROPERTIES
            .iter()
            .filter_map(|key| self.properties.get(*key))
            .find_map(property_text)
            .unwrap_or_default()
    }
}

fn property_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse an identifier given either as a JSON integer or a numeric string.
pub(crate) fn parse_id(value: Option<&Value>, field: &str, record: u64) -> Result<i64> {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| malformed(record, format!("missing or non-integer {field}")))
}

pub(crate) fn malformed(record: u64, reason: impl Into<String>) -> Error {
    Error::MalformedRecord {
        record,
        reason: reason.into(),
    }
}
