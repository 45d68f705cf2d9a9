//! Runtime orchestrator — wires caches, ingestion, matrix building and ranking.
//!
//! Provides the high-level verbs (load, summarize, rank) over a single
//! graph dump and the cache files kept in the data directory.

pub mod orchestrator;
pub mod types;

pub use orchestrator::Orchestrator;
pub use types::*;
