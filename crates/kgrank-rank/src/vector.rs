//! Score vector returned by the ranking functions.

use ndarray::Array1;

/// One score per node, indexed like the node sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct RankVector(Array1<f64>);

impl RankVector {
    pub fn new(scores: Array1<f64>) -> Self {
        Self(scores)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<f64> {
        self.0.get(idx).copied()
    }

    pub fn sum(&self) -> f64 {
        self.0.sum()
    }

    pub fn as_array(&self) -> &Array1<f64> {
        &self.0
    }

    pub fn into_inner(self) -> Array1<f64> {
        self.0
    }

    /// The `k` highest-scoring indices, best first; ties go to the lower index.
    pub fn top_k(&self, k: usize) -> Vec<(usize, f64)> {
        let mut scored: Vec<(usize, f64)> = self.0.iter().copied().enumerate().collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        scored
    }
}
