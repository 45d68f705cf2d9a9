//! Legacy tabular export: one CSV table holding both node and edge rows.
//!
//! Rows with a non-empty `_id` are nodes (`_labels` plus name columns); all
//! other rows are edges (`_start`, `_end`, `_type`).

use std::io::Read;

use serde_json::{Map, Value};

use crate::record::{malformed, EdgeRecord, NodeRecord, RawRecord, NAME_PROPERTIES};
use kgrank_core::{Error, Result};

const REQUIRED_COLUMNS: [&str; 5] = ["_id", "_labels", "_start", "_end", "_type"];

struct Columns {
    id: usize,
    labels: usize,
    start: usize,
    end: usize,
    kind: usize,
    /// Name-like columns present in the header, in priority order.
    names: Vec<(&'static str, usize)>,
}

impl Columns {
    fn from_header(header: &::csv::StringRecord) -> Result<Self> {
        let find = |name: &str| header.iter().position(|h| h == name);
        let mut required = [0usize; 5];
        for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = find(name).ok_or_else(|| {
                Error::UnsupportedFormat(format!("tabular source has no {name} column"))
            })?;
        }
        let names = NAME_PROPERTIES
            .iter()
            .filter_map(|&key| find(key).map(|idx| (key, idx)))
            .collect();
        Ok(Self {
            id: required[0],
            labels: required[1],
            start: required[2],
            end: required[3],
            kind: required[4],
            names,
        })
    }
}

/// Single-pass iterator over the records of a tabular source.
pub struct TabularRecords<R> {
    rows: ::csv::StringRecordsIntoIter<R>,
    columns: Columns,
    row_no: u64,
}

impl<R: Read> TabularRecords<R> {
    /// Read the header row and prepare the iterator.
    pub fn new(reader: R) -> Result<Self> {
        let mut csv = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let header = csv.headers().map_err(csv_error(0))?.clone();
        let columns = Columns::from_header(&header)?;
        Ok(Self {
            rows: csv.into_records(),
            columns,
            row_no: 0,
        })
    }

    fn parse_row(&self, row: &::csv::StringRecord) -> Result<RawRecord> {
        let cols = &self.columns;
        let cell = |idx: usize| row.get(idx).unwrap_or("");
        let int = |idx: usize, field: &str| {
            cell(idx)
                .trim()
                .parse::<i64>()
                .map_err(|_| malformed(self.row_no, format!("missing or non-integer {field}")))
        };

        if !cell(cols.id).is_empty() {
            let id = int(cols.id, "_id")?;
            let label = cell(cols.labels);
            if label.is_empty() {
                return Err(malformed(self.row_no, "node row has no _labels"));
            }
            let properties: Map<String, Value> = cols
                .names
                .iter()
                .filter(|(_, idx)| !cell(*idx).is_empty())
                .map(|(key, idx)| (key.to_string(), Value::String(cell(*idx).to_string())))
                .collect();
            Ok(RawRecord::Node(NodeRecord {
                id,
                label: label.to_string(),
                properties,
            }))
        } else {
            let start = int(cols.start, "_start")?;
            let end = int(cols.end, "_end")?;
            let label = cell(cols.kind);
            if label.is_empty() {
                return Err(malformed(self.row_no, "edge row has no _type"));
            }
            Ok(RawRecord::Edge(EdgeRecord {
                start,
                end,
                label: label.to_string(),
            }))
        }
    }
}

impl<R: Read> Iterator for TabularRecords<R> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        self.row_no += 1;
        Some(row.map_err(csv_error(self.row_no)).and_then(|r| self.parse_row(&r)))
    }
}

fn csv_error(row_no: u64) -> impl Fn(::csv::Error) -> Error {
    move |e| {
        if e.is_io_error() {
            match e.into_kind() {
                ::csv::ErrorKind::Io(io) => Error::Io(io),
                other => malformed(row_no, format!("{other:?}")),
            }
        } else {
            malformed(row_no, e.to_string())
        }
    }
}
