//! Matrix Market coordinate files for the adjacency matrix cache.
//!
//! ```text
//! %%MatrixMarket matrix coordinate integer general
//! %
//! 4 4 4
//! 1 2 1
//! ```
//!
//! Indices are 1-based. Paths ending in `.gz` are gzip-compressed.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

use crate::matrix::{AdjacencyMatrix, SparseMatrix};
use kgrank_core::{Error, Result};

const BANNER: &str = "%%MatrixMarket matrix coordinate integer general";

/// Upper bound on entries reserved up front from the declared count.
const RESERVE_LIMIT: usize = 1 << 20;

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

/// Write `matrix` to `path`.
///
/// The file is written beside the target and renamed into place, so an
/// interrupted write never leaves a truncated cache behind.
pub fn persist(matrix: &AdjacencyMatrix, path: &Path) -> Result<()> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    let file = File::create(&partial)?;
    if is_gzip(path) {
        let mut enc = GzEncoder::new(BufWriter::new(file), Compression::default());
        write_body(matrix, &mut enc)?;
        enc.finish()?.flush()?;
    } else {
        let mut out = BufWriter::new(file);
        write_body(matrix, &mut out)?;
        out.flush()?;
    }
    std::fs::rename(&partial, path)?;

    debug!(
        "Wrote {}x{} matrix with {} entries to {}",
        matrix.dim(),
        matrix.dim(),
        matrix.nnz(),
        path.display()
    );
    Ok(())
}

fn write_body<W: Write>(matrix: &AdjacencyMatrix, out: &mut W) -> Result<()> {
    writeln!(out, "{BANNER}")?;
    writeln!(out, "%")?;
    writeln!(out, "{} {} {}", matrix.dim(), matrix.dim(), matrix.nnz())?;
    for (i, j, v) in matrix.iter() {
        writeln!(out, "{} {} {}", i + 1, j + 1, v)?;
    }
    Ok(())
}

/// Read a matrix written by [`persist`] or any square integer (or pattern)
/// coordinate Matrix Market file. `symmetric` files are expanded to both
/// triangles; explicit zeros are not edges and are dropped.
pub fn load(path: &Path) -> Result<AdjacencyMatrix> {
    read_matrix(open(path)?, None)
}

/// Like [`load`], but reject the file before allocating anything unless its
/// declared dimension is `dim`.
pub fn load_expecting(path: &Path, dim: usize) -> Result<AdjacencyMatrix> {
    read_matrix(open(path)?, Some(dim))
}

fn open(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    Ok(if is_gzip(path) {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    })
}

fn cache_err(msg: impl Into<String>) -> Error {
    Error::CacheFormat(msg.into())
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Integer,
    Pattern,
}

fn parse_banner(line: &str) -> Result<(Field, bool)> {
    let tokens: Vec<String> = line.split_whitespace().map(str::to_lowercase).collect();
    if tokens.len() != 5
        || tokens[0] != "%%matrixmarket"
        || tokens[1] != "matrix"
        || tokens[2] != "coordinate"
    {
        return Err(cache_err(format!("not a coordinate Matrix Market header: {line:?}")));
    }
    let field = match tokens[3].as_str() {
        "integer" => Field::Integer,
        "pattern" => Field::Pattern,
        other => return Err(cache_err(format!("unsupported field type {other}"))),
    };
    let symmetric = match tokens[4].as_str() {
        "general" => false,
        "symmetric" => true,
        other => return Err(cache_err(format!("unsupported symmetry {other}"))),
    };
    Ok((field, symmetric))
}

fn read_matrix(reader: impl BufRead, expected_dim: Option<usize>) -> Result<AdjacencyMatrix> {
    let mut lines = reader.lines();
    let banner = lines.next().ok_or_else(|| cache_err("empty file"))??;
    let (field, symmetric) = parse_banner(&banner)?;

    let mut size: Option<(usize, usize)> = None;
    let mut entries = Vec::new();
    let mut seen = 0usize;
    for line in lines {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let Some((dim, expected)) = size else {
            let [rows, cols, nnz] = tokens.as_slice() else {
                return Err(cache_err(format!("bad size line: {line:?}")));
            };
            let rows: usize = rows.parse().map_err(|_| cache_err("bad row count"))?;
            let cols: usize = cols.parse().map_err(|_| cache_err("bad column count"))?;
            let nnz: usize = nnz.parse().map_err(|_| cache_err("bad entry count"))?;
            if rows != cols {
                return Err(cache_err(format!("matrix is {rows}x{cols}, not square")));
            }
            if let Some(expected) = expected_dim.filter(|&d| d != rows) {
                return Err(cache_err(format!(
                    "matrix is {rows}x{rows} but the graph has {expected} nodes"
                )));
            }
            size = Some((rows, nnz));
            entries.reserve(nnz.min(RESERVE_LIMIT));
            continue;
        };
        seen += 1;
        if seen > expected {
            return Err(cache_err("more entries than declared"));
        }

        let value = match (field, tokens.len()) {
            (Field::Integer, 3) => tokens[2]
                .parse::<u32>()
                .map_err(|_| cache_err(format!("bad value in {line:?}")))?,
            (Field::Pattern, 2) => 1,
            _ => return Err(cache_err(format!("bad entry line: {line:?}"))),
        };
        let index = |tok: &str| -> Result<usize> {
            match tok.parse::<usize>() {
                Ok(i) if (1..=dim).contains(&i) => Ok(i - 1),
                _ => Err(cache_err(format!("index {tok} out of range 1..={dim}"))),
            }
        };
        let (i, j) = (index(tokens[0])?, index(tokens[1])?);
        if value == 0 {
            continue;
        }
        entries.push(((i, j), value));
        if symmetric && i != j {
            entries.push(((j, i), value));
        }
    }

    let Some((dim, expected)) = size else {
        return Err(cache_err("missing size line"));
    };
    if seen != expected {
        return Err(cache_err(format!("declared {expected} entries, found {seen}")));
    }
    SparseMatrix::from_entries(dim, entries).map_err(|e| cache_err(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AdjacencyMatrix {
        SparseMatrix::from_entries(4, [((0, 1), 1u32), ((1, 2), 2), ((2, 0), 1), ((2, 3), 3)])
            .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["g.mtx", "g.mtx.gz"] {
            let path = dir.path().join(name);
            let m = sample();
            persist(&m, &path).unwrap();
            assert_eq!(load(&path).unwrap(), m, "{name}");
        }
    }

    #[test]
    fn test_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.mtx");
        persist(&sample(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], BANNER);
        assert_eq!(lines[2], "4 4 4");
        assert_eq!(lines[3], "1 2 1");
        assert_eq!(lines[6], "3 4 3");
        assert!(!dir.path().join("g.mtx.partial").exists());
    }

    #[test]
    fn test_empty_matrix_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mtx");
        let m = AdjacencyMatrix::empty(3);
        persist(&m, &path).unwrap();
        let back = load(&path).unwrap();
        assert_eq!(back.dim(), 3);
        assert_eq!(back.nnz(), 0);
    }

    #[test]
    fn test_symmetric_and_pattern_files() {
        let text = "%%MatrixMarket matrix coordinate integer symmetric\n3 3 2\n2 1 4\n3 3 1\n";
        let m = read_matrix(text.as_bytes(), None).unwrap();
        assert_eq!(m.get(1, 0), Some(4));
        assert_eq!(m.get(0, 1), Some(4));
        assert_eq!(m.get(2, 2), Some(1));
        assert_eq!(m.nnz(), 3);

        let text = "%%MatrixMarket matrix coordinate pattern general\n2 2 1\n1 2\n";
        let m = read_matrix(text.as_bytes(), None).unwrap();
        assert_eq!(m.get(0, 1), Some(1));
    }

    #[test]
    fn test_explicit_zero_is_not_an_edge() {
        let text = "%%MatrixMarket matrix coordinate integer general\n2 2 2\n1 2 0\n2 1 5\n";
        let m = read_matrix(text.as_bytes(), None).unwrap();
        assert_eq!(m.nnz(), 1);
        assert_eq!(m.get(0, 1), None);
    }

    #[test]
    fn test_rejects_bad_files() {
        let bad = [
            "",
            "hello\n",
            "%%MatrixMarket matrix array integer general\n2 2\n",
            "%%MatrixMarket matrix coordinate real general\n2 2 0\n",
            "%%MatrixMarket matrix coordinate integer general\n2 3 0\n",
            "%%MatrixMarket matrix coordinate integer general\n2 2 1\n3 1 1\n",
            "%%MatrixMarket matrix coordinate integer general\n2 2 1\n1 1 1\n2 2 1\n",
            "%%MatrixMarket matrix coordinate integer general\n2 2 1\n1 1 -4\n",
            "%%MatrixMarket matrix coordinate integer general\n% only comments\n",
            "%%MatrixMarket matrix coordinate integer general\n2 2 2\n1 1 1\n",
        ];
        for text in bad {
            let err = read_matrix(text.as_bytes(), None).unwrap_err();
            assert!(matches!(err, Error::CacheFormat(_)), "{text:?}: {err}");
        }
    }

    #[test]
    fn test_rejects_absurd_sizes() {
        let huge = [
            // declared entry count far beyond the file
            "%%MatrixMarket matrix coordinate integer symmetric\n2 2 18446744073709551615\n",
            // dimension whose row offsets cannot be sized
            "%%MatrixMarket matrix coordinate integer general\n\
             18446744073709551615 18446744073709551615 0\n",
        ];
        for text in huge {
            let err = read_matrix(text.as_bytes(), None).unwrap_err();
            assert!(matches!(err, Error::CacheFormat(_)), "{text:?}: {err}");
        }
    }

    #[test]
    fn test_expected_dimension_checked_from_header() {
        let text = "%%MatrixMarket matrix coordinate integer general\n\
                    1000000000000 1000000000000 0\n";
        let err = read_matrix(text.as_bytes(), Some(4)).unwrap_err();
        assert!(matches!(err, Error::CacheFormat(_)));

        let text = "%%MatrixMarket matrix coordinate integer general\n4 4 1\n1 2 3\n";
        assert_eq!(read_matrix(text.as_bytes(), Some(4)).unwrap().nnz(), 1);
    }
}
