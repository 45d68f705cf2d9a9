//! Label interning: first-seen label strings get dense codes starting at 1.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Code → label table for node labels or edge labels.
///
/// Codes are assigned in order of first encounter, starting at 1, and are
/// never reused within a table. Code 0 is left free so that a zero entry in
/// the adjacency matrix always means "no edge".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TypeTable {
    labels: Vec<String>,
    codes: HashMap<String, u32>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the code for `label`, assigning the next free one if unseen.
    pub fn intern(&mut self, label: &str) -> u32 {
        if let Some(&code) = self.codes.get(label) {
            return code;
        }
        self.labels.push(label.to_string());
        let code = self.labels.len() as u32;
        self.codes.insert(label.to_string(), code);
        code
    }

    /// Code previously assigned to `label`.
    pub fn code(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    /// Label for `code`, if assigned.
    pub fn label(&self, code: u32) -> Option<&str> {
        let idx = (code as usize).checked_sub(1)?;
        self.labels.get(idx).map(String::as_str)
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `(code, label)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, l)| (i as u32 + 1, l.as_str()))
    }
}

/// Rebuild a table from labels in code order. Every label must be distinct,
/// otherwise the codes after the repeat would shift.
impl TryFrom<Vec<String>> for TypeTable {
    type Error = crate::Error;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        let mut table = Self::new();
        for label in labels {
            if table.codes.contains_key(&label) {
                return Err(crate::Error::CacheFormat(format!(
                    "duplicate type label {label:?}"
                )));
            }
            table.intern(&label);
        }
        Ok(table)
    }
}

impl From<TypeTable> for Vec<String> {
    fn from(table: TypeTable) -> Self {
        table.labels
    }
}
