//! Row-normalized transition structure derived from the adjacency matrix.

use ndarray::Array1;

use kgrank_store::{AdjacencyMatrix, SparseMatrix};

/// Transition probabilities: entry `(i, j)` is `1 / out_degree(i)` for every
/// nonzero adjacency entry, so each non-dangling row sums to 1.
///
/// Dangling rows (no nonzero entry) are listed separately; their mass is
/// spread uniformly over all nodes at each step.
#[derive(Debug, Clone)]
pub struct Transition {
    probs: SparseMatrix<f64>,
    dangling: Vec<usize>,
}

impl Transition {
    /// Normalize into a private copy; `matrix` is left untouched.
    pub fn from_matrix(matrix: &AdjacencyMatrix) -> Self {
        let degrees = out_degrees(matrix);
        let probs = matrix.with_values(|row, code| weight(code, degrees[row]));
        Self::with_probs(probs, &degrees)
    }

    /// Normalize by consuming `matrix`, reusing its index buffers.
    pub fn from_owned(matrix: AdjacencyMatrix) -> Self {
        let degrees = out_degrees(&matrix);
        let probs = matrix.map_values(|row, code| weight(code, degrees[row]));
        Self::with_probs(probs, &degrees)
    }

    fn with_probs(probs: SparseMatrix<f64>, degrees: &[usize]) -> Self {
        let dangling = degrees
            .iter()
            .enumerate()
            .filter(|(_, &d)| d == 0)
            .map(|(i, _)| i)
            .collect();
        Self { probs, dangling }
    }

    pub fn dim(&self) -> usize {
        self.probs.dim()
    }

    /// Indices of nodes without outgoing edges.
    pub fn dangling(&self) -> &[usize] {
        &self.dangling
    }

    /// Write `Pᵀ·rank` into `out` and return the mass held by dangling nodes.
    pub(crate) fn propagate(&self, rank: &Array1<f64>, out: &mut Array1<f64>) -> f64 {
        out.fill(0.0);
        for i in 0..self.dim() {
            let r = rank[i];
            if r == 0.0 {
                continue;
            }
            let (cols, probs) = self.probs.row(i);
            for (&j, &p) in cols.iter().zip(probs) {
                out[j] += r * p;
            }
        }
        self.dangling.iter().map(|&i| rank[i]).sum()
    }
}

fn out_degrees(matrix: &AdjacencyMatrix) -> Vec<usize> {
    (0..matrix.dim())
        .map(|i| matrix.row(i).1.iter().filter(|&&code| code != 0).count())
        .collect()
}

fn weight(code: u32, degree: usize) -> f64 {
    if code == 0 {
        0.0
    } else {
        1.0 / degree as f64
    }
}
