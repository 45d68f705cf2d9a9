//! Square sparse matrix in compressed sparse row layout.
//!
//! The adjacency matrix stores edge type codes as values: a stored entry at
//! `(i, j)` means "edge i → j of type v". The value is a label, not a weight.

use kgrank_core::{EdgeMap, Error, KnowledgeGraph, Result};

/// Square CSR matrix. Rows are sorted by column and hold no duplicate columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix<T> {
    dim: usize,
    /// `row_offsets[i]..row_offsets[i + 1]` indexes row `i` in `cols` and `values`.
    row_offsets: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<T>,
}

/// Adjacency matrix whose values are edge type codes.
pub type AdjacencyMatrix = SparseMatrix<u32>;

impl<T: Copy> SparseMatrix<T> {
    /// Empty `dim × dim` matrix.
    pub fn empty(dim: usize) -> Self {
        Self {
            dim,
            row_offsets: vec![0; dim + 1],
            cols: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from `((row, col), value)` entries in any order.
    ///
    /// A repeated position keeps the value that came last.
    pub fn from_entries<I>(dim: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = ((usize, usize), T)>,
    {
        let mut entries: Vec<((usize, usize), T)> = entries.into_iter().collect();
        if let Some(&((r, c), _)) = entries.iter().find(|((r, c), _)| *r >= dim || *c >= dim) {
            return Err(Error::DimensionMismatch {
                expected: dim,
                found: r.max(c) + 1,
            });
        }
        // stable sort keeps input order among equal keys
        entries.sort_by_key(|&(pos, _)| pos);

        let mut row_offsets = offsets(dim)?;
        let mut cols = Vec::with_capacity(entries.len());
        let mut values: Vec<T> = Vec::with_capacity(entries.len());
        let mut last: Option<(usize, usize)> = None;
        for ((r, c), v) in entries {
            if last == Some((r, c)) {
                if let Some(slot) = values.last_mut() {
                    *slot = v;
                }
                continue;
            }
            last = Some((r, c));
            row_offsets[r + 1] += 1;
            cols.push(c);
            values.push(v);
        }
        for i in 0..dim {
            row_offsets[i + 1] += row_offsets[i];
        }

        Ok(Self {
            dim,
            row_offsets,
            cols,
            values,
        })
    }

    /// Number of rows (and columns).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Column indices and values of row `i`.
    pub fn row(&self, i: usize) -> (&[usize], &[T]) {
        let range = self.row_offsets[i]..self.row_offsets[i + 1];
        (&self.cols[range.clone()], &self.values[range])
    }

    /// Number of stored entries in row `i`.
    pub fn row_len(&self, i: usize) -> usize {
        self.row_offsets[i + 1] - self.row_offsets[i]
    }

    pub fn get(&self, i: usize, j: usize) -> Option<T> {
        if i >= self.dim {
            return None;
        }
        let (cols, values) = self.row(i);
        cols.binary_search(&j).ok().map(|k| values[k])
    }

    /// All stored entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        (0..self.dim).flat_map(move |i| {
            let (cols, values) = self.row(i);
            cols.iter().zip(values).map(move |(&j, &v)| (i, j, v))
        })
    }

    /// Replace every value with `f(row, value)`, reusing the index buffers.
    pub fn map_values<U>(self, mut f: impl FnMut(usize, T) -> U) -> SparseMatrix<U> {
        let mut values = Vec::with_capacity(self.values.len());
        let mut row = 0;
        for (k, v) in self.values.into_iter().enumerate() {
            while k >= self.row_offsets[row + 1] {
                row += 1;
            }
            values.push(f(row, v));
        }
        SparseMatrix {
            dim: self.dim,
            row_offsets: self.row_offsets,
            cols: self.cols,
            values,
        }
    }

    /// Same structure with values `f(row, value)`, leaving `self` intact.
    pub fn with_values<U>(&self, mut f: impl FnMut(usize, T) -> U) -> SparseMatrix<U> {
        let mut values = Vec::with_capacity(self.nnz());
        for i in 0..self.dim {
            let (_, row_values) = self.row(i);
            values.extend(row_values.iter().map(|&v| f(i, v)));
        }
        SparseMatrix {
            dim: self.dim,
            row_offsets: self.row_offsets.clone(),
            cols: self.cols.clone(),
            values,
        }
    }
}

/// Zeroed row offset table for `dim` rows, failing instead of aborting when
/// `dim` cannot be allocated.
fn offsets(dim: usize) -> Result<Vec<usize>> {
    let too_large = || Error::InvalidParameter(format!("cannot allocate a {dim}x{dim} matrix"));
    let len = dim.checked_add(1).ok_or_else(too_large)?;
    let mut row_offsets = Vec::new();
    row_offsets.try_reserve_exact(len).map_err(|_| too_large())?;
    row_offsets.resize(len, 0);
    Ok(row_offsets)
}

impl AdjacencyMatrix {
    /// Edge table view of the matrix.
    pub fn to_edge_map(&self) -> EdgeMap {
        self.iter().map(|(i, j, v)| ((i, j), v)).collect()
    }
}

/// Build the adjacency matrix of an ingested graph: one entry per edge,
/// valued by the edge type code, dimension equal to the node count.
pub fn build_matrix(graph: &KnowledgeGraph) -> Result<AdjacencyMatrix> {
    SparseMatrix::from_entries(
        graph.node_count(),
        graph.edges.iter().map(|(&pos, &code)| (pos, code)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgrank_core::{Node, TypeTable};

    #[test]
    fn test_from_entries_any_order() {
        let m = SparseMatrix::from_entries(3, [((2, 0), 5u32), ((0, 2), 1), ((0, 1), 3)]).unwrap();
        assert_eq!(m.dim(), 3);
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.row(0), (&[1usize, 2][..], &[3u32, 1][..]));
        assert_eq!(m.row_len(1), 0);
        assert_eq!(m.get(2, 0), Some(5));
        assert_eq!(m.get(1, 1), None);
        assert_eq!(m.get(7, 0), None);
        let all: Vec<_> = m.iter().collect();
        assert_eq!(all, vec![(0, 1, 3), (0, 2, 1), (2, 0, 5)]);
    }

    #[test]
    fn test_repeated_position_last_wins() {
        let m = SparseMatrix::from_entries(2, [((0, 1), 1u32), ((0, 1), 2)]).unwrap();
        assert_eq!(m.nnz(), 1);
        assert_eq!(m.get(0, 1), Some(2));
    }

    #[test]
    fn test_out_of_range_entry() {
        let err = SparseMatrix::from_entries(2, [((0, 2), 1u32)]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 2, found: 3 }));
    }

    #[test]
    fn test_unallocatable_dimension() {
        let none = std::iter::empty::<((usize, usize), u32)>();
        let err = SparseMatrix::from_entries(usize::MAX, none).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn test_map_values_keeps_structure() {
        let m = SparseMatrix::from_entries(2, [((0, 1), 7u32), ((1, 0), 9)]).unwrap();
        let copy = m.with_values(|row, v| (row, v));
        assert_eq!(copy.get(1, 0), Some((1, 9)));
        assert_eq!(m.get(1, 0), Some(9));
        let moved = m.map_values(|row, v| (row, f64::from(v)));
        assert_eq!(moved.get(0, 1), Some((0, 7.0)));
        assert_eq!(moved.get(1, 0), Some((1, 9.0)));
    }

    #[test]
    fn test_build_matrix_holds_type_codes() {
        let mut edge_types = TypeTable::new();
        let a = edge_types.intern("A");
        let b = edge_types.intern("B");
        let node = |id| Node {
            external_id: id,
            display_name: String::new(),
            type_code: 1,
        };
        let mut graph = KnowledgeGraph {
            nodes: vec![node(10), node(11), node(12)],
            edge_types,
            ..Default::default()
        };
        graph.edges.insert((0, 1), a);
        graph.edges.insert((2, 1), b);

        let m = build_matrix(&graph).unwrap();
        assert_eq!(m.dim(), 3);
        assert_eq!(m.get(0, 1), Some(1));
        assert_eq!(m.get(2, 1), Some(2));
        assert_eq!(m.to_edge_map(), graph.edges);
    }
}
