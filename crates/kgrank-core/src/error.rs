//! Error types for kgrank.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),

    /// `record` is the 1-based ordinal of the record in its source, blank lines excluded.
    #[error("Malformed record #{record}: {reason}")]
    MalformedRecord { record: u64, reason: String },

    #[error("Duplicate node id {id} at record #{record}")]
    DuplicateNode { record: u64, id: i64 },

    #[error("Edge {start} -> {end} references a node that is not in the node table")]
    DanglingEdgeReference { start: i64, end: i64 },

    #[error("Topic set is empty")]
    EmptyTopicSet,

    #[error("Topic index {index} out of range for {node_count} nodes")]
    InvalidTopicIndex { index: usize, node_count: usize },

    #[error("No node named {0:?}")]
    UnresolvedName(String),

    #[error("No node with external id {0}")]
    UnresolvedId(i64),

    #[error("Matrix cache error: {0}")]
    CacheFormat(String),

    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether a tolerant ingestion run may skip the offending record.
    pub fn is_record_error(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. } | Self::DuplicateNode { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
