//! kgrank rank — power-iteration PageRank and topic-biased PageRank.
//!
//! The adjacency matrix holds edge type codes; ranking reads only whether an
//! entry is nonzero, never its magnitude.

pub mod pagerank;
pub mod transition;
pub mod vector;

pub use pagerank::{
    pagerank, pagerank_owned, topic_pagerank, topic_pagerank_owned, PageRankConfig,
    TopicRankConfig,
};
pub use transition::Transition;
pub use vector::RankVector;
