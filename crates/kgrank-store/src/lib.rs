//! kgrank store — sparse adjacency matrix, Matrix Market cache, graph index.

pub mod cache;
pub mod graph;
pub mod index;
pub mod matrix;
pub mod mtx;
pub mod snapshot;

pub use cache::{CacheOutcome, MatrixCache};
pub use graph::GraphSummary;
pub use index::{GraphIndex, Resolution, TopicKey};
pub use matrix::{build_matrix, AdjacencyMatrix, SparseMatrix};
pub use snapshot::TableSnapshot;
