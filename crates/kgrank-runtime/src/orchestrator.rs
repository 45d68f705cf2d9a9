//! Orchestrator — loads a graph through the caches and runs the rankings.

use std::path::Path;

use kgrank_core::{Error, KgRankConfig, Result};
use kgrank_ingest::Ingester;
use kgrank_rank::{pagerank_owned, topic_pagerank_owned, PageRankConfig, TopicRankConfig};
use kgrank_store::{CacheOutcome, GraphIndex, GraphSummary, MatrixCache, TableSnapshot, TopicKey};
use tracing::{info, warn};

use crate::types::*;

/// Top-level orchestrator over one data directory.
pub struct Orchestrator {
    config: KgRankConfig,
}

impl Orchestrator {
    pub fn new(config: KgRankConfig) -> Self {
        info!(
            "Orchestrator initialized: data_dir={}, n_iters={}",
            config.data_paths.root.display(),
            config.rank.n_iters
        );
        Self { config }
    }

    pub fn config(&self) -> &KgRankConfig {
        &self.config
    }

    fn matrix_cache(&self) -> MatrixCache {
        MatrixCache::new(&self.config.data_paths.matrix_cache)
    }

    /// Load the graph and its adjacency matrix.
    ///
    /// With both cache files present the source is not read at all. With only
    /// the matrix cache the source is ingested and the cached matrix must match
    /// the node count. Otherwise everything is built and both caches written.
    pub fn load(&self, source: &Path) -> Result<LoadedGraph> {
        let paths = &self.config.data_paths;
        let cache = self.matrix_cache();

        if cache.exists() && paths.tables_cache.is_file() {
            info!("Restoring graph from {}", paths.root.display());
            let snapshot = TableSnapshot::load(&paths.tables_cache)?;
            let matrix = cache.load_expecting(snapshot.nodes.len())?;
            let graph = snapshot.into_graph(&matrix)?;
            return Ok(LoadedGraph {
                graph,
                matrix,
                origin: LoadOrigin::Cached,
            });
        }

        let ingestion = Ingester::new(&self.config.ingest).ingest_path(source)?;
        let (matrix, outcome) = cache.for_graph(&ingestion.graph)?;
        TableSnapshot::from_graph(&ingestion.graph).save(&paths.tables_cache)?;
        info!(
            "Loaded {} nodes, {} edges (matrix {:?})",
            ingestion.graph.node_count(),
            matrix.nnz(),
            outcome
        );

        Ok(LoadedGraph {
            graph: ingestion.graph,
            matrix,
            origin: LoadOrigin::Ingested {
                report: ingestion.report,
                matrix_cached: outcome == CacheOutcome::Loaded,
            },
        })
    }

    /// Delete both cache files. Returns how many were removed.
    pub fn clear_cache(&self) -> Result<usize> {
        let paths = &self.config.data_paths;
        let mut removed = 0;
        for path in [&paths.matrix_cache, &paths.tables_cache] {
            if path.is_file() {
                std::fs::remove_file(path)?;
                removed += 1;
            }
        }
        if removed > 0 {
            info!("Removed {} cache files from {}", removed, paths.root.display());
        }
        Ok(removed)
    }

    /// Load the source and summarize it.
    pub fn summary(&self, source: &Path) -> Result<(GraphSummary, LoadOrigin)> {
        let loaded = self.load(source)?;
        Ok((GraphSummary::compute(&loaded.graph), loaded.origin))
    }

    /// Rank a loaded graph and return the `top` best nodes.
    ///
    /// No topic keys runs global PageRank. Otherwise keys are resolved
    /// leniently; the run fails only when none of them resolves.
    pub fn rank(
        &self,
        loaded: LoadedGraph,
        topics: &[TopicKey],
        top: usize,
    ) -> Result<RankOutcome> {
        let LoadedGraph { graph, matrix, .. } = loaded;
        let settings = &self.config.rank;

        let (scores, topic_indices, unresolved) = if topics.is_empty() {
            let scores = pagerank_owned(matrix, &PageRankConfig::from(settings))?;
            (scores, Vec::new(), Vec::new())
        } else {
            let resolution = GraphIndex::new(&graph).resolve_lenient(topics);
            if resolution.indices.is_empty() {
                return Err(match resolution.unresolved.into_iter().next() {
                    Some(TopicKey::Name(name)) => Error::UnresolvedName(name),
                    Some(TopicKey::Id(id)) => Error::UnresolvedId(id),
                    None => Error::EmptyTopicSet,
                });
            }
            for key in &resolution.unresolved {
                warn!("Topic {:?} not found in graph", key);
            }
            let mut indices = resolution.indices;
            indices.sort_unstable();
            indices.dedup();
            let scores =
                topic_pagerank_owned(matrix, &indices, &TopicRankConfig::from(settings))?;
            (scores, indices, resolution.unresolved)
        };

        let top = scores
            .top_k(top)
            .into_iter()
            .filter_map(|(index, score)| {
                let node = graph.node(index)?;
                Some(RankedNode {
                    index,
                    external_id: node.external_id,
                    name: node.display_name.clone(),
                    node_type: graph.node_type_label(index).unwrap_or_default().to_string(),
                    score,
                })
            })
            .collect();

        Ok(RankOutcome {
            topics: topic_indices,
            unresolved,
            top,
        })
    }
}
