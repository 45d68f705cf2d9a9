//! Runtime types.

use serde::Serialize;

use kgrank_core::KnowledgeGraph;
use kgrank_ingest::IngestReport;
use kgrank_store::{AdjacencyMatrix, TopicKey};

/// Where a loaded graph came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "origin")]
pub enum LoadOrigin {
    /// Node table and matrix both restored from the cache files.
    Cached,
    /// Source ingested; `matrix_cached` tells whether the matrix came from cache.
    Ingested {
        report: IngestReport,
        #[serde(rename = "matrixCached")]
        matrix_cached: bool,
    },
}

/// A graph ready for ranking.
#[derive(Debug, Clone)]
pub struct LoadedGraph {
    pub graph: KnowledgeGraph,
    pub matrix: AdjacencyMatrix,
    pub origin: LoadOrigin,
}

/// One row of a ranking result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedNode {
    pub index: usize,
    #[serde(rename = "externalId")]
    pub external_id: i64,
    pub name: String,
    #[serde(rename = "nodeType")]
    pub node_type: String,
    pub score: f64,
}

/// Output of a ranking run.
#[derive(Debug, Clone, Serialize)]
pub struct RankOutcome {
    /// Topic node indices the run was biased towards; empty for global PageRank.
    pub topics: Vec<usize>,
    pub unresolved: Vec<TopicKey>,
    pub top: Vec<RankedNode>,
}
