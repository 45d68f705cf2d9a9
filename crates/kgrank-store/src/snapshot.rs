//! JSON snapshot of the node sequence and type tables.
//!
//! Together with the matrix cache this restores a full [`KnowledgeGraph`]
//! without re-reading the source.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::matrix::AdjacencyMatrix;
use kgrank_core::{Error, KnowledgeGraph, Node, Result, TypeTable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub nodes: Vec<Node>,
    pub node_types: TypeTable,
    pub edge_types: TypeTable,
}

impl TableSnapshot {
    pub fn from_graph(graph: &KnowledgeGraph) -> Self {
        Self {
            nodes: graph.nodes.clone(),
            node_types: graph.node_types.clone(),
            edge_types: graph.edge_types.clone(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut out, self)?;
        out.flush()?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        serde_json::from_reader(reader)
            .map_err(|e| Error::CacheFormat(format!("{}: {e}", path.display())))
    }

    /// Rebuild the graph with edges taken from `matrix`.
    pub fn into_graph(self, matrix: &AdjacencyMatrix) -> Result<KnowledgeGraph> {
        if matrix.dim() != self.nodes.len() {
            return Err(Error::CacheFormat(format!(
                "matrix dimension {} does not match {} cached nodes",
                matrix.dim(),
                self.nodes.len()
            )));
        }
        if let Some(node) = self
            .nodes
            .iter()
            .find(|n| self.node_types.label(n.type_code).is_none())
        {
            return Err(Error::CacheFormat(format!(
                "node {} has unknown type code {}",
                node.external_id, node.type_code
            )));
        }
        if let Some((i, j, code)) = matrix
            .iter()
            .find(|&(_, _, code)| self.edge_types.label(code).is_none())
        {
            return Err(Error::CacheFormat(format!(
                "edge {i} -> {j} has unknown type code {code}"
            )));
        }
        Ok(KnowledgeGraph {
            nodes: self.nodes,
            edges: matrix.to_edge_map(),
            node_types: self.node_types,
            edge_types: self.edge_types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::build_matrix;

    fn graph() -> KnowledgeGraph {
        let mut node_types = TypeTable::new();
        let food = node_types.intern("Food");
        let mut edge_types = TypeTable::new();
        let contains = edge_types.intern("CONTAINS_FcC");
        let mut g = KnowledgeGraph {
            nodes: vec![
                Node { external_id: 9, display_name: "oat".into(), type_code: food },
                Node { external_id: 8, display_name: "rye".into(), type_code: food },
            ],
            node_types,
            edge_types,
            ..Default::default()
        };
        g.edges.insert((0, 1), contains);
        g
    }

    #[test]
    fn test_save_load_restores_graph() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        let g = graph();
        let m = build_matrix(&g).unwrap();

        TableSnapshot::from_graph(&g).save(&path).unwrap();
        let restored = TableSnapshot::load(&path).unwrap().into_graph(&m).unwrap();
        assert_eq!(restored, g);
    }

    #[test]
    fn test_dimension_mismatch() {
        let g = graph();
        let m = AdjacencyMatrix::empty(5);
        let err = TableSnapshot::from_graph(&g).into_graph(&m).unwrap_err();
        assert!(matches!(err, Error::CacheFormat(_)));
    }

    #[test]
    fn test_type_codes_must_exist_in_tables() {
        let g = graph();
        let m = build_matrix(&g).unwrap();

        let mut snapshot = TableSnapshot::from_graph(&g);
        snapshot.nodes[1].type_code = 7;
        let err = snapshot.into_graph(&m).unwrap_err();
        assert!(matches!(err, Error::CacheFormat(ref msg) if msg.contains("type code 7")));

        let mut snapshot = TableSnapshot::from_graph(&g);
        snapshot.edge_types = TypeTable::new();
        let err = snapshot.into_graph(&m).unwrap_err();
        assert!(matches!(err, Error::CacheFormat(ref msg) if msg.contains("edge 0 -> 1")));
    }

    #[test]
    fn test_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        std::fs::write(&path, "{\"nodes\": [").unwrap();
        assert!(matches!(TableSnapshot::load(&path), Err(Error::CacheFormat(_))));
    }
}
