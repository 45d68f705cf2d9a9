//! kgrank core — error taxonomy, configuration, type interning, graph model.

pub mod config;
pub mod error;
pub mod interner;
pub mod types;

pub use config::{
    DanglingEdgePolicy, DataPaths, IngestSettings, KgRankConfig, RankSettings, RecordPolicy,
};
pub use error::{Error, Result};
pub use interner::TypeTable;
pub use types::*;
