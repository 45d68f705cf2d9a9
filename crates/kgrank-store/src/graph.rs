//! Graph statistics, computed over a petgraph view of the ingested graph.

use std::collections::BTreeMap;

use petgraph::algo::connected_components;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use kgrank_core::KnowledgeGraph;

/// Directed petgraph view: node weights are dense indices, edge weights type codes.
pub fn to_digraph(graph: &KnowledgeGraph) -> DiGraph<usize, u32> {
    let mut g = DiGraph::with_capacity(graph.node_count(), graph.edge_count());
    for idx in 0..graph.node_count() {
        g.add_node(idx);
    }
    for (&(s, t), &code) in &graph.edges {
        g.add_edge(NodeIndex::new(s), NodeIndex::new(t), code);
    }
    g
}

/// Per-type counts and structural statistics of an ingested graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub node_type_counts: BTreeMap<String, usize>,
    pub edge_type_counts: BTreeMap<String, usize>,
    /// Nodes with no outgoing edge.
    pub dangling_nodes: usize,
    /// Nodes with no incident edge at all.
    pub isolated_nodes: usize,
    pub weak_components: usize,
}

impl GraphSummary {
    pub fn compute(graph: &KnowledgeGraph) -> Self {
        let mut node_type_counts = BTreeMap::new();
        for node in &graph.nodes {
            let label = graph.node_types.label(node.type_code).unwrap_or("?");
            *node_type_counts.entry(label.to_string()).or_insert(0) += 1;
        }
        let mut edge_type_counts = BTreeMap::new();
        for &code in graph.edges.values() {
            let label = graph.edge_types.label(code).unwrap_or("?");
            *edge_type_counts.entry(label.to_string()).or_insert(0) += 1;
        }

        let g = to_digraph(graph);
        let degree = |n: NodeIndex, dir| g.neighbors_directed(n, dir).next().is_some();
        let dangling_nodes = g
            .node_indices()
            .filter(|&n| !degree(n, Direction::Outgoing))
            .count();
        let isolated_nodes = g
            .node_indices()
            .filter(|&n| !degree(n, Direction::Outgoing) && !degree(n, Direction::Incoming))
            .count();

        Self {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            node_type_counts,
            edge_type_counts,
            dangling_nodes,
            isolated_nodes,
            weak_components: connected_components(&g),
        }
    }
}
