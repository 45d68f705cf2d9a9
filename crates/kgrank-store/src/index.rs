//! Lookup from external ids and display names to dense node indices.

use std::collections::HashMap;

use serde::Serialize;

use kgrank_core::{Error, KnowledgeGraph, Result};

/// A key naming a topic node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicKey {
    Name(String),
    Id(i64),
}

/// Outcome of a lenient lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub indices: Vec<usize>,
    pub unresolved: Vec<TopicKey>,
}

/// Exact-match index over a finalized node sequence.
pub struct GraphIndex<'a> {
    graph: &'a KnowledgeGraph,
    by_id: HashMap<i64, usize>,
    by_name: HashMap<&'a str, Vec<usize>>,
}

impl<'a> GraphIndex<'a> {
    pub fn new(graph: &'a KnowledgeGraph) -> Self {
        let mut by_id = HashMap::with_capacity(graph.node_count());
        let mut by_name: HashMap<&'a str, Vec<usize>> = HashMap::new();
        for (idx, node) in graph.nodes.iter().enumerate() {
            by_id.insert(node.external_id, idx);
            by_name.entry(node.display_name.as_str()).or_default().push(idx);
        }
        Self {
            graph,
            by_id,
            by_name,
        }
    }

    pub fn graph(&self) -> &'a KnowledgeGraph {
        self.graph
    }

    pub fn index_of_id(&self, external_id: i64) -> Option<usize> {
        self.by_id.get(&external_id).copied()
    }

    /// Every node whose display name equals `name`, in index order.
    pub fn indices_of_name(&self, name: &str) -> &[usize] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve names to indices. Any unknown name fails the whole batch.
    ///
    /// A name shared by several nodes contributes all of them.
    pub fn indices_from_names<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            match self.indices_of_name(name) {
                [] => return Err(Error::UnresolvedName(name.to_string())),
                found => out.extend_from_slice(found),
            }
        }
        Ok(out)
    }

    /// Resolve external ids to indices. Any unknown id fails the whole batch.
    pub fn indices_from_ids(&self, external_ids: &[i64]) -> Result<Vec<usize>> {
        external_ids
            .iter()
            .map(|&id| self.index_of_id(id).ok_or(Error::UnresolvedId(id)))
            .collect()
    }

    /// Resolve a mixed list of keys, collecting unresolved keys instead of failing.
    pub fn resolve_lenient(&self, keys: &[TopicKey]) -> Resolution {
        let mut res = Resolution::default();
        for key in keys {
            match key {
                TopicKey::Name(name) => match self.indices_of_name(name) {
                    [] => res.unresolved.push(key.clone()),
                    found => res.indices.extend_from_slice(found),
                },
                TopicKey::Id(id) => match self.index_of_id(*id) {
                    Some(idx) => res.indices.push(idx),
                    None => res.unresolved.push(key.clone()),
                },
            }
        }
        if !res.unresolved.is_empty() {
            tracing::warn!("{} topic keys did not resolve", res.unresolved.len());
        }
        res
    }
}
