//! Adjacency matrix cache: an existing cache file short-circuits matrix building.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::matrix::{build_matrix, AdjacencyMatrix};
use crate::mtx;
use kgrank_core::{Error, KnowledgeGraph, Result};

/// Where a matrix came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Read from the cache file.
    Loaded,
    /// Built fresh and written to the cache file.
    Built,
}

/// Matrix Market cache at a fixed path.
#[derive(Debug, Clone)]
pub struct MatrixCache {
    path: PathBuf,
}

impl MatrixCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Return the cached matrix, or run `build` and cache its result.
    ///
    /// `build` is not called when the cache file exists.
    pub fn load_or_build<F>(&self, build: F) -> Result<(AdjacencyMatrix, CacheOutcome)>
    where
        F: FnOnce() -> Result<AdjacencyMatrix>,
    {
        if self.exists() {
            info!("Loading cached matrix from {}", self.path.display());
            return Ok((mtx::load(&self.path)?, CacheOutcome::Loaded));
        }
        let matrix = build()?;
        mtx::persist(&matrix, &self.path)?;
        info!(
            "Cached {}x{} matrix ({} entries) at {}",
            matrix.dim(),
            matrix.dim(),
            matrix.nnz(),
            self.path.display()
        );
        Ok((matrix, CacheOutcome::Built))
    }

    /// Load the cached matrix and require it to be `dim × dim`.
    pub fn load_expecting(&self, dim: usize) -> Result<AdjacencyMatrix> {
        mtx::load_expecting(&self.path, dim).map_err(|e| match e {
            Error::CacheFormat(msg) => {
                Error::CacheFormat(format!("{}: {msg}", self.path.display()))
            }
            other => other,
        })
    }

    /// Matrix for an already ingested graph: the cache if present (checked
    /// against the node count), else built from `graph.edges` and cached.
    pub fn for_graph(&self, graph: &KnowledgeGraph) -> Result<(AdjacencyMatrix, CacheOutcome)> {
        if self.exists() {
            info!("Loading cached matrix from {}", self.path.display());
            return Ok((self.load_expecting(graph.node_count())?, CacheOutcome::Loaded));
        }
        self.load_or_build(|| build_matrix(graph))
    }
}
