//! Graph data model shared by ingestion, storage and ranking.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::interner::TypeTable;

/// A node of the ingested graph.
///
/// The node's dense index is its position in [`KnowledgeGraph::nodes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier from the source system.
    pub external_id: i64,
    pub display_name: String,
    /// Code into the node type table.
    pub type_code: u32,
}

/// Edge table keyed by `(source_index, target_index)`, valued by edge type code.
///
/// One entry per ordered pair: a later edge between the same pair overwrites
/// the earlier one (last write wins).
pub type EdgeMap = BTreeMap<(usize, usize), u32>;

/// Finalized output of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeGraph {
    pub nodes: Vec<Node>,
    pub edges: EdgeMap,
    pub node_types: TypeTable,
    pub edge_types: TypeTable,
}

impl KnowledgeGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Node at dense index `idx`.
    pub fn node(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx)
    }

    /// Label of the node type of the node at `idx`.
    pub fn node_type_label(&self, idx: usize) -> Option<&str> {
        self.node(idx).and_then(|n| self.node_types.label(n.type_code))
    }

    /// Edge type label between `source` and `target`, if an edge exists.
    pub fn edge_label(&self, source: usize, target: usize) -> Option<&str> {
        self.edges
            .get(&(source, target))
            .and_then(|&code| self.edge_types.label(code))
    }
}
