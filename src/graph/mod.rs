//! Weighted graph with a co-located pheromone field.
//!
//! Both matrices are stored dense and row-major (`row * n + col`). The
//! distance matrix never changes after construction; the pheromone field is
//! mutated only through crate-private operations driven by the colony.
//!
//! `+inf` in the distance matrix means "no edge".

pub mod builder;
mod topology;

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub use builder::{GraphBuilder, GraphParams, KRegularStrategy, Topology};

use crate::error::{AcoError, AcoResult};

/// Pheromone level a freshly built graph starts with.
pub const DEFAULT_INITIAL_PHEROMONE: f64 = 0.1;

/// A node placed in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Index into the matrices.
    pub id: usize,
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Node {
    /// Create a node at `(x, y)`.
    #[must_use]
    pub const fn new(id: usize, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    /// Euclidean distance to another node.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Nodes, symmetric distance matrix and symmetric pheromone field.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
    n: usize,
    distances: Vec<f64>,
    pheromone: Vec<f64>,
    topology: Topology,
}

impl Graph {
    /// Assemble a graph from a flat distance matrix produced by the builder.
    pub(crate) fn from_parts(nodes: Vec<Node>, distances: Vec<f64>, topology: Topology) -> Self {
        let n = nodes.len();
        debug_assert_eq!(distances.len(), n * n);
        Self {
            nodes,
            n,
            distances,
            pheromone: vec![DEFAULT_INITIAL_PHEROMONE; n * n],
            topology,
        }
    }

    /// Build a graph from an explicit distance matrix.
    ///
    /// Node coordinates are unknown for such graphs and are all set to the
    /// origin. Use `f64::INFINITY` for missing edges.
    ///
    /// # Errors
    ///
    /// Returns `AcoError::Config` if the matrix is empty, not square, has a
    /// non-zero diagonal, is asymmetric, or contains negative or NaN entries.
    pub fn from_matrix(matrix: &[Vec<f64>]) -> AcoResult<Self> {
        let n = matrix.len();
        if n == 0 {
            return Err(AcoError::config("distance matrix must have at least one row"));
        }

        if let Some((i, row)) = matrix.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(AcoError::config(format!(
                "distance matrix row {i} has {} columns, expected {n}",
                row.len()
            )));
        }

        let mut distances = Vec::with_capacity(n * n);
        for (i, row) in matrix.iter().enumerate() {
            for (j, &d) in row.iter().enumerate() {
                if d.is_nan() || d < 0.0 {
                    return Err(AcoError::config(format!(
                        "distance d({i},{j}) = {d} must be non-negative"
                    )));
                }
                if i == j && d != 0.0 {
                    return Err(AcoError::config(format!("distance d({i},{i}) must be 0")));
                }
                if d != matrix[j][i] {
                    return Err(AcoError::config(format!(
                        "asymmetric matrix: d({i},{j})={d} != d({j},{i})={}",
                        matrix[j][i]
                    )));
                }
                distances.push(d);
            }
        }

        let nodes = (0..n).map(|id| Node::new(id, 0.0, 0.0)).collect();
        Ok(Self::from_parts(nodes, distances, Topology::Explicit))
    }

    #[inline]
    fn idx(&self, i: usize, j: usize) -> usize {
        i * self.n + j
    }

    /// Number of nodes.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.n
    }

    /// All nodes in id order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Topology the graph was built with.
    #[must_use]
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Distance between `i` and `j` (`+inf` when there is no edge).
    #[must_use]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances[self.idx(i, j)]
    }

    /// Pheromone level on edge `(i, j)`.
    #[must_use]
    pub fn pheromone(&self, i: usize, j: usize) -> f64 {
        self.pheromone[self.idx(i, j)]
    }

    /// Whether `i` and `j` are distinct and joined by a finite edge.
    #[must_use]
    pub fn has_edge(&self, i: usize, j: usize) -> bool {
        i != j && self.distance(i, j).is_finite()
    }

    /// Nodes joined to `i` by a finite edge, ascending.
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.n).filter(move |&j| self.has_edge(i, j))
    }

    /// Number of finite edges incident to `i`.
    #[must_use]
    pub fn degree(&self, i: usize) -> usize {
        self.neighbors(i).count()
    }

    /// Number of undirected finite edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        (0..self.n)
            .map(|i| ((i + 1)..self.n).filter(|&j| self.has_edge(i, j)).count())
            .sum()
    }

    /// Whether every node is reachable from node 0 over finite edges.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        if self.n == 0 {
            return true;
        }
        let mut seen = vec![false; self.n];
        let mut queue = VecDeque::from([0]);
        seen[0] = true;
        let mut reached = 1;

        while let Some(u) = queue.pop_front() {
            for v in self.neighbors(u) {
                if !seen[v] {
                    seen[v] = true;
                    reached += 1;
                    queue.push_back(v);
                }
            }
        }

        reached == self.n
    }

    /// Copy of the distance matrix as rows.
    #[must_use]
    pub fn distances_snapshot(&self) -> Vec<Vec<f64>> {
        self.distances.chunks(self.n).map(<[f64]>::to_vec).collect()
    }

    /// Copy of the pheromone field as rows.
    #[must_use]
    pub fn pheromone_snapshot(&self) -> Vec<Vec<f64>> {
        self.pheromone.chunks(self.n).map(<[f64]>::to_vec).collect()
    }

    /// Sum of distances between consecutive entries of `tour`.
    ///
    /// Pass a closed tour (last entry equal to the first) to get the length of
    /// the full cycle. Sequences shorter than two nodes have length 0.
    #[must_use]
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        tour.windows(2).map(|w| self.distance(w[0], w[1])).sum()
    }

    /// Set every pheromone entry to `value`.
    pub(crate) fn reset_pheromone(&mut self, value: f64) {
        self.pheromone.fill(value);
    }

    /// Multiply every pheromone entry by `1 - rate`.
    pub(crate) fn evaporate(&mut self, rate: f64) {
        let keep = (1.0 - rate).clamp(0.0, 1.0);
        for tau in &mut self.pheromone {
            *tau *= keep;
        }
    }

    /// Add `amount` to both directions of every edge along `tour`.
    ///
    /// Non-finite or non-positive amounts are ignored and accumulation
    /// saturates at `f64::MAX`, so the field never holds NaN, infinity or a
    /// negative value.
    pub(crate) fn deposit(&mut self, tour: &[usize], amount: f64) {
        if !amount.is_finite() || amount <= 0.0 {
            return;
        }
        for w in tour.windows(2) {
            let (a, b) = (w[0], w[1]);
            if a == b {
                continue;
            }
            let ab = self.idx(a, b);
            let ba = self.idx(b, a);
            let tau = (self.pheromone[ab] + amount).min(f64::MAX);
            self.pheromone[ab] = tau;
            self.pheromone[ba] = tau;
        }
    }
}
