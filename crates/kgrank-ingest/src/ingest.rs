//! Graph ingestion: records → node table, type tables, dense edge map.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::format::open_records;
use crate::record::{EdgeRecord, NodeRecord, RawRecord};
use kgrank_core::{
    DanglingEdgePolicy, EdgeMap, Error, IngestSettings, KnowledgeGraph, Node, RecordPolicy,
    Result, TypeTable,
};

/// Counters collected during one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub records_read: u64,
    pub nodes: usize,
    pub edges: usize,
    /// Edge records rejected by the edge type filter.
    pub edges_filtered: u64,
    /// Edge records that replaced an earlier edge on the same ordered pair.
    pub edges_overwritten: u64,
    pub malformed_skipped: u64,
    pub nodes_pruned: usize,
    pub dangling_edges_dropped: usize,
}

/// Result of an ingestion run.
#[derive(Debug, Clone)]
pub struct Ingestion {
    pub graph: KnowledgeGraph,
    pub report: IngestReport,
}

/// Builds a [`KnowledgeGraph`] from a record stream.
pub struct Ingester<'a> {
    settings: &'a IngestSettings,
}

impl<'a> Ingester<'a> {
    pub fn new(settings: &'a IngestSettings) -> Self {
        Self { settings }
    }

    /// Open a graph dump by path and ingest it.
    pub fn ingest_path(&self, path: &Path) -> Result<Ingestion> {
        info!("Ingesting {}", path.display());
        self.ingest(open_records(path)?)
    }

    /// Consume `records` in order and build the graph.
    pub fn ingest<I>(&self, records: I) -> Result<Ingestion>
    where
        I: IntoIterator<Item = Result<RawRecord>>,
    {
        let mut state = BuildState::default();

        for (i, item) in records.into_iter().enumerate() {
            let record_no = i as u64 + 1;
            state.report.records_read += 1;

            if let Err(e) = item.and_then(|record| state.apply(record, record_no, self.settings)) {
                if self.settings.record_policy == RecordPolicy::Tolerant && e.is_record_error() {
                    debug!("Skipping record: {}", e);
                    state.report.malformed_skipped += 1;
                    continue;
                }
                return Err(e);
            }

            let interval = self.settings.progress_interval;
            if interval > 0 && record_no % interval == 0 {
                info!(
                    "{} records, nodes: {}, edges: {}",
                    record_no,
                    state.nodes.len(),
                    state.raw_edges.len()
                );
            }
        }

        if state.report.malformed_skipped > 0 {
            warn!("Skipped {} malformed records", state.report.malformed_skipped);
        }

        state.finish(self.settings)
    }
}

#[derive(Default)]
struct BuildState {
    nodes: Vec<Node>,
    /// External id → position in `nodes`.
    positions: HashMap<i64, usize>,
    /// External ids with at least one kept incident edge.
    has_edge: HashSet<i64>,
    /// Edges keyed by external ids until the node sequence is final.
    raw_edges: BTreeMap<(i64, i64), u32>,
    node_types: TypeTable,
    edge_types: TypeTable,
    report: IngestReport,
}

impl BuildState {
    fn apply(
        &mut self,
        record: RawRecord,
        record_no: u64,
        settings: &IngestSettings,
    ) -> Result<()> {
        match record {
            RawRecord::Node(node) => self.add_node(node, record_no),
            RawRecord::Edge(edge) => {
                self.add_edge(edge, settings);
                Ok(())
            }
        }
    }

    fn add_node(&mut self, record: NodeRecord, record_no: u64) -> Result<()> {
        if self.positions.contains_key(&record.id) {
            return Err(Error::DuplicateNode {
                record: record_no,
                id: record.id,
            });
        }
        let display_name = record.display_name();
        let type_code = self.node_types.intern(&record.label);
        self.positions.insert(record.id, self.nodes.len());
        self.nodes.push(Node {
            external_id: record.id,
            display_name,
            type_code,
        });
        Ok(())
    }

    fn add_edge(&mut self, record: EdgeRecord, settings: &IngestSettings) {
        if let Some(filter) = &settings.edge_type_filter {
            if !filter.contains(&record.label) {
                self.report.edges_filtered += 1;
                return;
            }
        }
        let type_code = self.edge_types.intern(&record.label);
        self.has_edge.insert(record.start);
        self.has_edge.insert(record.end);
        if self
            .raw_edges
            .insert((record.start, record.end), type_code)
            .is_some()
        {
            self.report.edges_overwritten += 1;
        }
    }

    fn finish(mut self, settings: &IngestSettings) -> Result<Ingestion> {
        if settings.prune_unused_nodes {
            let before = self.nodes.len();
            let has_edge = &self.has_edge;
            self.nodes.retain(|n| has_edge.contains(&n.external_id));
            self.report.nodes_pruned = before - self.nodes.len();
            self.positions = self
                .nodes
                .iter()
                .enumerate()
                .map(|(idx, n)| (n.external_id, idx))
                .collect();
            info!("Pruned {} nodes without edges", self.report.nodes_pruned);
        }

        let mut edges = EdgeMap::new();
        for ((start, end), type_code) in self.raw_edges {
            match (self.positions.get(&start), self.positions.get(&end)) {
                (Some(&s), Some(&e)) => {
                    edges.insert((s, e), type_code);
                }
                _ => match settings.dangling_policy {
                    DanglingEdgePolicy::Fail => {
                        return Err(Error::DanglingEdgeReference { start, end });
                    }
                    DanglingEdgePolicy::Drop => {
                        debug!("Dropping edge {} -> {}: unknown endpoint", start, end);
                        self.report.dangling_edges_dropped += 1;
                    }
                },
            }
        }
        if self.report.dangling_edges_dropped > 0 {
            warn!(
                "Dropped {} edges referencing unknown nodes",
                self.report.dangling_edges_dropped
            );
        }

        self.report.nodes = self.nodes.len();
        self.report.edges = edges.len();
        info!(
            "Ingestion complete: {} records, {} nodes ({} types), {} edges ({} types)",
            self.report.records_read,
            self.report.nodes,
            self.node_types.len(),
            self.report.edges,
            self.edge_types.len()
        );

        Ok(Ingestion {
            graph: KnowledgeGraph {
                nodes: self.nodes,
                edges,
                node_types: self.node_types,
                edge_types: self.edge_types,
            },
            report: self.report,
        })
    }
}
