//! Configuration and data directory management.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Paths to the cache files kept between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Sparse adjacency matrix cache (`data/graph.mtx`).
    pub matrix_cache: PathBuf,
    /// Node and type table snapshot (`data/graph.tables.json`).
    pub tables_cache: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            matrix_cache: root.join("graph.mtx"),
            tables_cache: root.join("graph.tables.json"),
            root,
        })
    }
}

/// What ingestion does with a record it cannot interpret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordPolicy {
    /// Abort ingestion on the first malformed record.
    #[default]
    Strict,
    /// Skip the record and count it.
    Tolerant,
}

/// What ingestion does with an edge whose endpoint is not in the final node table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanglingEdgePolicy {
    /// Drop the edge, log a warning and count it.
    #[default]
    Drop,
    /// Fail ingestion with `DanglingEdgeReference`.
    Fail,
}

/// Ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSettings {
    /// Keep only edges with these labels. `None` keeps every edge.
    pub edge_type_filter: Option<BTreeSet<String>>,
    /// Remove nodes with no incident edge after filtering.
    pub prune_unused_nodes: bool,
    pub record_policy: RecordPolicy,
    pub dangling_policy: DanglingEdgePolicy,
    /// Log progress every this many records (0 disables).
    pub progress_interval: u64,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            edge_type_filter: None,
            prune_unused_nodes: false,
            record_policy: RecordPolicy::Strict,
            dangling_policy: DanglingEdgePolicy::Drop,
            progress_interval: 10_000,
        }
    }
}

/// Ranking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankSettings {
    /// Damping factor of global PageRank.
    pub damping: f64,
    /// Probability of following an edge in topic PageRank.
    pub resid: f64,
    /// Teleportation mass placed on the topic set.
    pub topic_prob: f64,
    /// Fixed number of power iterations.
    pub n_iters: usize,
}

impl Default for RankSettings {
    fn default() -> Self {
        Self {
            damping: 0.85,
            resid: 0.85,
            topic_prob: 0.15,
            n_iters: 50,
        }
    }
}

/// Top-level kgrank configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KgRankConfig {
    pub data_paths: DataPaths,
    pub ingest: IngestSettings,
    pub rank: RankSettings,
}

impl KgRankConfig {
    /// Create configuration from environment and defaults.
    ///
    /// Absent or unparsable variables keep their defaults; parsed values
    /// outside their range are a [`Error::Config`].
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_paths = DataPaths::new(data_dir)?;

        let mut ingest = IngestSettings::default();
        if let Some(prune) = env_parse::<bool>("KGRANK_PRUNE_UNUSED") {
            ingest.prune_unused_nodes = prune;
        }
        if let Some(strict) = env_parse::<bool>("KGRANK_STRICT") {
            ingest.record_policy = if strict {
                RecordPolicy::Strict
            } else {
                RecordPolicy::Tolerant
            };
        }
        if let Ok(list) = std::env::var("KGRANK_EDGE_TYPES") {
            let filter: BTreeSet<String> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if !filter.is_empty() {
                ingest.edge_type_filter = Some(filter);
            }
        }

        let mut rank = RankSettings::default();
        if let Some(n) = env_parse("KGRANK_N_ITERS") {
            rank.n_iters = n;
        }
        // one damping value drives both variants; topic mass takes the rest
        if let Some(d) = env_parse::<f64>("KGRANK_DAMPING") {
            rank.damping = d;
            rank.resid = d;
            rank.topic_prob = 1.0 - d;
        }
        if let Some(p) = env_parse("KGRANK_TOPIC_PROB") {
            rank.topic_prob = p;
        }

        let config = Self {
            data_paths,
            ingest,
            rank,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that rank parameters are probabilities and can be mixed.
    pub fn validate(&self) -> Result<()> {
        let rank = &self.rank;
        for (name, value) in [
            ("damping", rank.damping),
            ("resid", rank.resid),
            ("topic_prob", rank.topic_prob),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!("{name} = {value} is outside [0, 1]")));
            }
        }
        if rank.resid + rank.topic_prob > 1.0 + 1e-12 {
            return Err(Error::Config(format!(
                "resid + topic_prob = {} exceeds 1",
                rank.resid + rank.topic_prob
            )));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_paths_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested");
        let paths = DataPaths::new(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(paths.matrix_cache, root.join("graph.mtx"));
        assert_eq!(paths.tables_cache, root.join("graph.tables.json"));
    }

    #[test]
    fn test_defaults() {
        let ingest = IngestSettings::default();
        assert_eq!(ingest.record_policy, RecordPolicy::Strict);
        assert_eq!(ingest.dangling_policy, DanglingEdgePolicy::Drop);
        assert!(!ingest.prune_unused_nodes);

        let rank = RankSettings::default();
        assert_eq!(rank.n_iters, 50);
        assert!((rank.resid + rank.topic_prob - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = KgRankConfig {
            data_paths: DataPaths::new(dir.path()).unwrap(),
            ingest: IngestSettings::default(),
            rank: RankSettings::default(),
        };
        assert!(config.validate().is_ok());

        config.rank.topic_prob = 0.3;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.rank.topic_prob = 0.1;
        config.rank.damping = 1.5;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_policy_serde_names() {
        let json = serde_json::to_string(&RecordPolicy::Tolerant).unwrap();
        assert_eq!(json, "\"tolerant\"");
        let p: DanglingEdgePolicy = serde_json::from_str("\"fail\"").unwrap();
        assert_eq!(p, DanglingEdgePolicy::Fail);
    }
}
