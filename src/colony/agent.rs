//! Per-ant traversal state.

use serde::{Deserialize, Serialize};

use crate::graph::Graph;

/// One ant: position, ordered tour, visited set and tour length.
///
/// The visited set mirrors the tour for O(1) membership tests. The only
/// repeated node a tour may contain is the closing return to its start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    index: usize,
    position: usize,
    tour: Vec<usize>,
    visited: Vec<bool>,
    visited_count: usize,
    tour_length: f64,
}

impl Agent {
    /// Create agent `index` on a graph of `node_count` nodes, standing on
    /// `start`.
    #[must_use]
    pub fn new(index: usize, node_count: usize, start: usize) -> Self {
        let mut agent = Self {
            index,
            position: start,
            tour: Vec::with_capacity(node_count + 1),
            visited: vec![false; node_count],
            visited_count: 0,
            tour_length: 0.0,
        };
        agent.reset(start);
        agent
    }

    /// Clear the tour back to `[start]` with zero length.
    pub fn reset(&mut self, start: usize) {
        self.tour.clear();
        self.visited.fill(false);
        self.tour.push(start);
        self.visited[start] = true;
        self.visited_count = 1;
        self.position = start;
        self.tour_length = 0.0;
    }

    /// Append `node` to the tour and move there.
    ///
    /// Returns `false` and leaves the agent unchanged if `node` was already
    /// visited; use [`Agent::close_tour`] to return to the start.
    pub fn move_to(&mut self, node: usize) -> bool {
        if self.visited[node] {
            return false;
        }
        self.tour.push(node);
        self.visited[node] = true;
        self.visited_count += 1;
        self.position = node;
        true
    }

    /// Append the start node once to close the cycle.
    ///
    /// No-op on an already closed tour.
    pub fn close_tour(&mut self) {
        if self.is_closed() {
            return;
        }
        if let Some(&start) = self.tour.first() {
            self.tour.push(start);
            self.position = start;
        }
    }

    /// Recompute the tour length along the closed tour.
    ///
    /// A tour that was closed before visiting every node is infinitely long.
    pub fn evaluate(&mut self, graph: &Graph) -> f64 {
        self.tour_length = if self.has_visited_all() && self.is_closed() {
            graph.tour_length(&self.tour)
        } else {
            f64::INFINITY
        };
        self.tour_length
    }

    /// Index of this agent in its colony.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Node the agent is standing on.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// First node of the tour.
    #[must_use]
    pub fn start_node(&self) -> usize {
        self.tour.first().copied().unwrap_or(self.position)
    }

    /// Tour in visit order.
    #[must_use]
    pub fn tour(&self) -> &[usize] {
        &self.tour
    }

    /// Length computed by the last [`Agent::evaluate`].
    #[must_use]
    pub const fn tour_length(&self) -> f64 {
        self.tour_length
    }

    /// Whether `node` is in the visited set.
    #[must_use]
    pub fn has_visited(&self, node: usize) -> bool {
        self.visited[node]
    }

    /// Number of distinct nodes visited.
    #[must_use]
    pub const fn visited_count(&self) -> usize {
        self.visited_count
    }

    /// Whether every node has been visited.
    #[must_use]
    pub fn has_visited_all(&self) -> bool {
        self.visited_count == self.visited.len()
    }

    /// Whether the tour ends back at its start.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tour.len() > 1 && self.tour.first() == self.tour.last()
    }

    /// Whether the agent has nothing left to do this iteration.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.has_visited_all() || self.is_closed()
    }
}
