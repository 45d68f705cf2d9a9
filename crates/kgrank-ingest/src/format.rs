//! Source format detection and opening, with transparent gzip decompression.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::jsonl::JsonlRecords;
use crate::record::RawRecord;
use crate::tabular::TabularRecords;
use kgrank_core::{Error, Result};

/// Lazy, single-pass stream of records. Reopen the source to read it again.
pub type RecordStream = Box<dyn Iterator<Item = Result<RawRecord>>>;

/// Supported graph dump formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// One JSON record per line.
    Jsonl,
    /// Legacy tabular export.
    Tabular,
}

impl SourceFormat {
    /// Detect format and compression from the file name.
    ///
    /// Returns `(format, gzip_compressed)`.
    pub fn detect(path: &Path) -> Result<(Self, bool)> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_lowercase();
        let (stem, compressed) = match name.strip_suffix(".gz") {
            Some(stem) => (stem, true),
            None => (name.as_str(), false),
        };
        let format = if stem.ends_with(".jsonl") || stem.ends_with(".json") {
            Self::Jsonl
        } else if stem.ends_with(".csv") {
            Self::Tabular
        } else {
            return Err(Error::UnsupportedFormat(path.display().to_string()));
        };
        Ok((format, compressed))
    }
}

/// Open `path` for buffered reading, gunzipping when `compressed`.
pub fn open_reader(path: &Path, compressed: bool) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    Ok(if compressed {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    })
}

/// Open a graph dump and return its record stream.
pub fn open_records(path: &Path) -> Result<RecordStream> {
    let (format, compressed) = SourceFormat::detect(path)?;
    let reader = open_reader(path, compressed)?;
    tracing::debug!(
        "Opening {} as {:?} (gzip: {})",
        path.display(),
        format,
        compressed
    );
    Ok(match format {
        SourceFormat::Jsonl => Box::new(JsonlRecords::new(reader)),
        SourceFormat::Tabular => Box::new(TabularRecords::new(reader)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    #[test]
    fn test_detect() {
        let cases = [
            ("spoke.jsonl", SourceFormat::Jsonl, false),
            ("spoke_2021.jsonl.gz", SourceFormat::Jsonl, true),
            ("dump.JSON", SourceFormat::Jsonl, false),
            ("dump.json.gz", SourceFormat::Jsonl, true),
            ("spoke.csv", SourceFormat::Tabular, false),
            ("spoke.csv.gz", SourceFormat::Tabular, true),
        ];
        for (name, format, gz) in cases {
            assert_eq!(SourceFormat::detect(Path::new(name)).unwrap(), (format, gz), "{name}");
        }
    }

    #[test]
    fn test_detect_unsupported() {
        for name in ["graph.parquet", "graph.gz", "graph"] {
            let err = SourceFormat::detect(Path::new(name)).unwrap_err();
            assert!(matches!(err, Error::UnsupportedFormat(_)), "{name}");
        }
    }

    #[test]
    fn test_open_gzipped_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.jsonl.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        writeln!(enc, r#"{{"type":"node","id":1,"labels":["Gene"]}}"#).unwrap();
        writeln!(enc, r#"{{"type":"node","id":2,"labels":["Gene"]}}"#).unwrap();
        enc.finish().unwrap();

        let records: Vec<_> = open_records(&path).unwrap().collect();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn test_open_missing_file() {
        let err = open_records(Path::new("/nonexistent/kgrank/graph.jsonl")).err().unwrap();
        assert!(matches!(err, Error::Io(_)));
    }
}
