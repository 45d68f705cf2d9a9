//! Line-delimited JSON records, one node or relationship per line.
//!
//! ```text
//! {"type":"node","id":"1","labels":["Gene"],"properties":{"name":"TP53"}}
//! {"type":"relationship","id":"9","label":"EXPRESSES","start":{"id":"1"},"end":{"id":"2"}}
//! ```

use std::io::{BufRead, ErrorKind, Lines};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::record::{malformed, parse_id, EdgeRecord, NodeRecord, RawRecord};
use kgrank_core::{Error, Result};

#[derive(Deserialize)]
struct Line {
    #[serde(rename = "type")]
    kind: String,
    id: Option<Value>,
    #[serde(default)]
    labels: Vec<String>,
    label: Option<String>,
    #[serde(default)]
    properties: Map<String, Value>,
    start: Option<Endpoint>,
    end: Option<Endpoint>,
}

#[derive(Deserialize)]
struct Endpoint {
    id: Value,
}

/// Single-pass iterator over the records of a JSONL source. Blank lines are skipped.
///
/// Records are numbered by their position among non-blank lines, the same
/// ordinal ingestion uses. Reasons of malformed records carry the line number.
pub struct JsonlRecords<R> {
    lines: Lines<R>,
    line_no: u64,
    record_no: u64,
}

impl<R: BufRead> JsonlRecords<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            record_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for JsonlRecords<R> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;
            let parsed = match line {
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => parse_line(&text, self.record_no + 1),
                // The reader has already consumed the undecodable line
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    Err(malformed(self.record_no + 1, e.to_string()))
                }
                Err(e) => return Some(Err(e.into())),
            };
            self.record_no += 1;
            return Some(parsed.map_err(|e| at_line(e, self.line_no)));
        }
    }
}

fn at_line(err: Error, line_no: u64) -> Error {
    match err {
        Error::MalformedRecord { record, reason } => Error::MalformedRecord {
            record,
            reason: format!("line {line_no}: {reason}"),
        },
        other => other,
    }
}

fn parse_line(text: &str, record_no: u64) -> Result<RawRecord> {
    let line: Line =
        serde_json::from_str(text).map_err(|e| malformed(record_no, e.to_string()))?;

    match line.kind.as_str() {
        "node" => {
            let id = parse_id(line.id.as_ref(), "id", record_no)?;
            let label = line
                .labels
                .into_iter()
                .next()
                .ok_or_else(|| malformed(record_no, "node has no labels"))?;
            Ok(RawRecord::Node(NodeRecord {
                id,
                label,
                properties: line.properties,
            }))
        }
        "relationship" | "edge" => {
            let start = parse_id(line.start.as_ref().map(|e| &e.id), "start.id", record_no)?;
            let end = parse_id(line.end.as_ref().map(|e| &e.id), "end.id", record_no)?;
            let label = line
                .label
                .filter(|l| !l.is_empty())
                .ok_or_else(|| malformed(record_no, "relationship has no label"))?;
            Ok(RawRecord::Edge(EdgeRecord { start, end, label }))
        }
        other => Err(malformed(record_no, format!("unknown record type {other:?}"))),
    }
}
