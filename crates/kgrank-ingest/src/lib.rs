//! kgrank ingest — source detection, record readers, graph ingestion.

pub mod format;
pub mod ingest;
pub mod jsonl;
pub mod record;
pub mod tabular;

pub use format::{open_records, RecordStream, SourceFormat};
pub use ingest::{IngestReport, Ingester, Ingestion};
pub use record::{EdgeRecord, NodeRecord, RawRecord};
