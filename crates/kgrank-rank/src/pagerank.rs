//! Fixed-iteration power method.
//!
//! Every step computes
//!
//! ```text
//! next = follow · (Pᵀ·rank + dangling_mass / n) + teleport
//! ```
//!
//! where `P` is the row-normalized adjacency and `teleport` is fixed per call:
//! `(1 − damping) / n` everywhere for global PageRank, or `topic_prob / |T|` on
//! topic nodes plus `(1 − resid − topic_prob) / n` everywhere for the topic
//! variant. Iteration runs exactly `n_iters` times with no convergence test.
//!
//! The `_owned` variants consume the matrix and normalize it in place; the
//! borrowing variants normalize into a private copy, so one matrix can serve
//! any number of ranking calls.

use std::collections::BTreeSet;

use ndarray::Array1;
use tracing::debug;

use crate::transition::Transition;
use crate::vector::RankVector;
use kgrank_core::{Error, RankSettings, Result};
use kgrank_store::AdjacencyMatrix;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRankConfig {
    pub damping: f64,
    pub n_iters: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            n_iters: 50,
        }
    }
}

impl From<&RankSettings> for PageRankConfig {
    fn from(s: &RankSettings) -> Self {
        Self {
            damping: s.damping,
            n_iters: s.n_iters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopicRankConfig {
    /// Probability of following an edge.
    pub resid: f64,
    /// Teleport mass placed on the topic set.
    pub topic_prob: f64,
    pub n_iters: usize,
}

impl Default for TopicRankConfig {
    fn default() -> Self {
        Self {
            resid: 0.85,
            topic_prob: 0.15,
            n_iters: 50,
        }
    }
}

impl From<&RankSettings> for TopicRankConfig {
    fn from(s: &RankSettings) -> Self {
        Self {
            resid: s.resid,
            topic_prob: s.topic_prob,
            n_iters: s.n_iters,
        }
    }
}

/// Global PageRank over a private copy of `matrix`.
pub fn pagerank(matrix: &AdjacencyMatrix, config: &PageRankConfig) -> Result<RankVector> {
    check_probability("damping", config.damping)?;
    rank_global(Transition::from_matrix(matrix), config)
}

/// Global PageRank, normalizing `matrix` in place.
pub fn pagerank_owned(matrix: AdjacencyMatrix, config: &PageRankConfig) -> Result<RankVector> {
    check_probability("damping", config.damping)?;
    rank_global(Transition::from_owned(matrix), config)
}

/// Topic-biased PageRank over a private copy of `matrix`.
pub fn topic_pagerank(
    matrix: &AdjacencyMatrix,
    topics: &[usize],
    config: &TopicRankConfig,
) -> Result<RankVector> {
    let topics = validate_topics(matrix.dim(), topics, config)?;
    rank_topic(Transition::from_matrix(matrix), &topics, config)
}

/// Topic-biased PageRank, normalizing `matrix` in place.
pub fn topic_pagerank_owned(
    matrix: AdjacencyMatrix,
    topics: &[usize],
    config: &TopicRankConfig,
) -> Result<RankVector> {
    let topics = validate_topics(matrix.dim(), topics, config)?;
    rank_topic(Transition::from_owned(matrix), &topics, config)
}

fn rank_global(transition: Transition, config: &PageRankConfig) -> Result<RankVector> {
    let n = transition.dim();
    let teleport = Array1::from_elem(n, (1.0 - config.damping) / n as f64);
    Ok(power_iterate(&transition, config.damping, &teleport, config.n_iters))
}

fn rank_topic(
    transition: Transition,
    topics: &BTreeSet<usize>,
    config: &TopicRankConfig,
) -> Result<RankVector> {
    let n = transition.dim();
    let uniform = (1.0 - config.resid - config.topic_prob).max(0.0) / n as f64;
    let mut teleport = Array1::from_elem(n, uniform);
    let share = config.topic_prob / topics.len() as f64;
    for &t in topics {
        teleport[t] += share;
    }
    Ok(power_iterate(&transition, config.resid, &teleport, config.n_iters))
}

fn power_iterate(
    transition: &Transition,
    follow: f64,
    teleport: &Array1<f64>,
    n_iters: usize,
) -> RankVector {
    let n = transition.dim();
    if n == 0 {
        return RankVector::new(Array1::zeros(0));
    }
    debug!(
        "Power iteration: {} nodes, {} dangling, {} iterations",
        n,
        transition.dangling().len(),
        n_iters
    );
    let mut rank = Array1::from_elem(n, 1.0 / n as f64);
    let mut next = Array1::zeros(n);
    for _ in 0..n_iters {
        let dangling_mass = transition.propagate(&rank, &mut next);
        let spread = dangling_mass / n as f64;
        next.mapv_inplace(|v| follow * (v + spread));
        next += teleport;
        std::mem::swap(&mut rank, &mut next);
    }
    RankVector::new(rank)
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "{name} must lie in [0, 1], got {value}"
        )))
    }
}

fn validate_topics(
    node_count: usize,
    topics: &[usize],
    config: &TopicRankConfig,
) -> Result<BTreeSet<usize>> {
    check_probability("resid", config.resid)?;
    check_probability("topic_prob", config.topic_prob)?;
    if config.resid + config.topic_prob > 1.0 + 1e-12 {
        return Err(Error::InvalidParameter(format!(
            "resid + topic_prob must not exceed 1, got {}",
            config.resid + config.topic_prob
        )));
    }
    if topics.is_empty() {
        return Err(Error::EmptyTopicSet);
    }
    if let Some(&index) = topics.iter().find(|&&t| t >= node_count) {
        return Err(Error::InvalidTopicIndex { index, node_count });
    }
    Ok(topics.iter().copied().collect())
}
