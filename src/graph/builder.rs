//! Graph construction from [`GraphParams`].
//!
//! Nodes are scattered uniformly over `[0, range) x [0, range)` with
//! `range = 100 * sqrt(count)`, which keeps typical inter-node distances
//! roughly independent of the node count. The topology then decides which
//! pairs are joined and how they are weighted.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use validator::Validate;

use super::topology::{self, EdgeSet};
use super::{Graph, Node};
use crate::engine::rng::{RandomSource, SimRng};
use crate::error::{AcoError, AcoResult};

/// Lower weight bound for ring-plus-chords graphs when only a maximum is set.
pub const DEFAULT_MIN_WEIGHT: f64 = 10.0;

/// Upper weight bound for ring-plus-chords graphs when only a minimum is set.
pub const DEFAULT_MAX_WEIGHT: f64 = 100.0;

/// Which k-regular construction to use when `edges_per_node` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KRegularStrategy {
    /// Hamiltonian ring, offset chords, greedy repair. Degrees are exactly
    /// `k` wherever the graph allows it.
    #[default]
    RingChords,
    /// Euclidean MST plus each node's `k` nearest neighbours. Always
    /// connected, degrees are only bounded below.
    MstNearest,
}

/// Parameters for building a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct GraphParams {
    /// Number of nodes.
    #[validate(range(min = 1))]
    #[serde(default = "default_count")]
    pub count: usize,

    /// Target degree; selects a k-regular topology when present.
    #[validate(range(min = 2))]
    #[serde(default)]
    pub edges_per_node: Option<usize>,

    /// Lower distance (or weight) bound.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub min_distance: Option<f64>,

    /// Upper distance (or weight) bound.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub max_distance: Option<f64>,

    /// Seed for node placement and random weights.
    #[serde(default)]
    pub seed: Option<u64>,

    /// k-regular construction strategy.
    #[serde(default)]
    pub strategy: KRegularStrategy,
}

const fn default_count() -> usize {
    10
}

impl Default for GraphParams {
    fn default() -> Self {
        Self::new(default_count())
    }
}

impl GraphParams {
    /// Complete graph over `count` nodes.
    #[must_use]
    pub const fn new(count: usize) -> Self {
        Self {
            count,
            edges_per_node: None,
            min_distance: None,
            max_distance: None,
            seed: None,
            strategy: KRegularStrategy::RingChords,
        }
    }

    /// Switch to a k-regular topology.
    #[must_use]
    pub const fn with_edges_per_node(mut self, k: usize) -> Self {
        self.edges_per_node = Some(k);
        self
    }

    /// Set both distance bounds.
    #[must_use]
    pub const fn with_distance_range(mut self, min: f64, max: f64) -> Self {
        self.min_distance = Some(min);
        self.max_distance = Some(max);
        self
    }

    /// Set the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the k-regular strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: KRegularStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Run declarative and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns an error if `count < 1`, `edges_per_node < 2`, a bound is
    /// negative or non-finite, or the bounds are inverted.
    pub fn validate_all(&self) -> AcoResult<()> {
        self.validate()?;

        for (name, bound) in [
            ("min_distance", self.min_distance),
            ("max_distance", self.max_distance),
        ] {
            if let Some(v) = bound {
                if !v.is_finite() {
                    return Err(AcoError::config(format!("{name} must be finite, got {v}")));
                }
            }
        }

        match self.topology() {
            Topology::RingChords {
                weight_range: Some((lo, hi)),
                ..
            } if lo > hi => Err(AcoError::config(format!(
                "weight range [{lo}, {hi}) is inverted"
            ))),
            _ => match (self.min_distance, self.max_distance) {
                (Some(lo), Some(hi)) if lo > hi => Err(AcoError::config(format!(
                    "min_distance {lo} exceeds max_distance {hi}"
                ))),
                _ => Ok(()),
            },
        }
    }

    /// Resolve the tagged topology these parameters select.
    #[must_use]
    pub fn topology(&self) -> Topology {
        match (self.edges_per_node, self.strategy) {
            (None, _) => Topology::Complete {
                min_distance: self.min_distance,
                max_distance: self.max_distance,
            },
            (Some(k), KRegularStrategy::RingChords) => Topology::RingChords {
                k,
                weight_range: (self.min_distance.is_some() || self.max_distance.is_some())
                    .then(|| {
                        (
                            self.min_distance.unwrap_or(DEFAULT_MIN_WEIGHT),
                            self.max_distance.unwrap_or(DEFAULT_MAX_WEIGHT),
                        )
                    }),
            },
            (Some(k), KRegularStrategy::MstNearest) => Topology::MstNearest {
                k,
                min_distance: self.min_distance,
                max_distance: self.max_distance,
            },
        }
    }
}

/// Connectivity topology of a built graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Topology {
    /// Every pair joined by its Euclidean distance; pairs outside the closed
    /// `[min, max]` interval are removed with no reconnection.
    Complete {
        /// Lower bound on kept distances.
        min_distance: Option<f64>,
        /// Upper bound on kept distances.
        max_distance: Option<f64>,
    },
    /// Ring plus chords, approximately `k`-regular.
    RingChords {
        /// Target degree.
        k: usize,
        /// Uniform random weight range; Euclidean weights when absent.
        weight_range: Option<(f64, f64)>,
    },
    /// MST plus `k` nearest neighbours, Euclidean weights.
    MstNearest {
        /// Neighbours added per node beyond the tree.
        k: usize,
        /// Lower bound on eligible distances.
        min_distance: Option<f64>,
        /// Upper bound on eligible distances.
        max_distance: Option<f64>,
    },
    /// Supplied directly as a distance matrix.
    Explicit,
}

impl Topology {
    /// Short display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Complete { .. } => "complete",
            Self::RingChords { .. } => "ring_chords",
            Self::MstNearest { .. } => "mst_nearest",
            Self::Explicit => "explicit",
        }
    }
}

/// Builds graphs from parameters and a random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphBuilder;

impl GraphBuilder {
    /// Build a graph, drawing all randomness from `rng`.
    ///
    /// Node coordinates are drawn first (`x` then `y`, node by node), then any
    /// random edge weights in ascending `(i, j)` order.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `params` fail validation.
    pub fn build<R: RandomSource>(params: &GraphParams, rng: &mut R) -> AcoResult<Graph> {
        params.validate_all()?;

        let nodes = Self::generate_nodes(params.count, rng);
        let topology = params.topology();
        let n = nodes.len();

        let distances = match &topology {
            Topology::Complete {
                min_distance,
                max_distance,
            } => complete_distances(&nodes, *min_distance, *max_distance),
            Topology::RingChords { k, weight_range } => {
                let edges = topology::ring_with_chords(n, *k);
                weighted_distances(&nodes, &edges, *weight_range, rng)
            }
            Topology::MstNearest {
                k,
                min_distance,
                max_distance,
            } => {
                let edges = topology::mst_with_nearest(
                    &nodes,
                    *k,
                    min_distance.unwrap_or(0.0),
                    max_distance.unwrap_or(f64::INFINITY),
                );
                weighted_distances(&nodes, &edges, None, rng)
            }
            Topology::Explicit => {
                return Err(AcoError::config(
                    "explicit topology cannot be built from parameters",
                ))
            }
        };

        let graph = Graph::from_parts(nodes, distances, topology);
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            topology = graph.topology().name(),
            "graph built"
        );
        if !graph.is_connected() {
            warn!(
                topology = graph.topology().name(),
                "graph is disconnected; some tours cannot be completed"
            );
        }
        Ok(graph)
    }

    /// Build with a [`SimRng`] derived from `params.seed` (entropy when unset).
    ///
    /// Uses the graph stream of [`SimRng::split_run_streams`], so the result
    /// matches the graph of a full run with the same seed.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `params` fail validation.
    pub fn build_seeded(params: &GraphParams) -> AcoResult<Graph> {
        let mut master = SimRng::from_seed_or_entropy(params.seed);
        let (mut graph_rng, _) = master.split_run_streams();
        Self::build(params, &mut graph_rng)
    }

    /// Scatter `count` nodes over the scaled square.
    pub fn generate_nodes<R: RandomSource>(count: usize, rng: &mut R) -> Vec<Node> {
        let range = 100.0 * (count as f64).sqrt();
        (0..count)
            .map(|id| {
                let x = rng.next_in_range(0.0, range);
                let y = rng.next_in_range(0.0, range);
                Node::new(id, x, y)
            })
            .collect()
    }
}

fn complete_distances(nodes: &[Node], min: Option<f64>, max: Option<f64>) -> Vec<f64> {
    let n = nodes.len();
    let lo = min.unwrap_or(0.0);
    let hi = max.unwrap_or(f64::INFINITY);
    let mut distances = vec![0.0; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = nodes[i].distance_to(&nodes[j]);
            let d = if d < lo || d > hi { f64::INFINITY } else { d };
            distances[i * n + j] = d;
            distances[j * n + i] = d;
        }
    }
    distances
}

fn weighted_distances<R: RandomSource>(
    nodes: &[Node],
    edges: &EdgeSet,
    weight_range: Option<(f64, f64)>,
    rng: &mut R,
) -> Vec<f64> {
    let n = nodes.len();
    let mut distances = vec![0.0; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = if !edges.contains(i, j) {
                f64::INFINITY
            } else if let Some((lo, hi)) = weight_range {
                rng.next_in_range(lo, hi)
            } else {
                nodes[i].distance_to(&nodes[j])
            };
            distances[i * n + j] = d;
            distances[j * n + i] = d;
        }
    }
    distances
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: ring-plus-chords always contains the seeded
        /// Hamiltonian ring with finite edges.
        #[test]
        fn prop_k_regular_contains_ring(count in 3usize..40, k in 2usize..8, seed in 0u64..1000) {
            let params = GraphParams::new(count).with_edges_per_node(k).with_seed(seed);
            let g = GraphBuilder::build(&params, &mut SimRng::new(seed)).expect("build");
            for i in 0..count {
                prop_assert!(g.distance(i, (i + 1) % count).is_finite());
            }
            prop_assert!(g.is_connected());
        }

        #[test]
        fn prop_distance_matrix_symmetric(count in 1usize..30, seed in 0u64..1000, mst in any::<bool>()) {
            let strategy = if mst { KRegularStrategy::MstNearest } else { KRegularStrategy::RingChords };
            let params = GraphParams::new(count).with_edges_per_node(3).with_strategy(strategy);
            let g = GraphBuilder::build(&params, &mut SimRng::new(seed)).expect("build");
            for i in 0..count {
                for j in 0..count {
                    prop_assert_eq!(g.distance(i, j).to_bits(), g.distance(j, i).to_bits());
                    prop_assert!(g.distance(i, j) >= 0.0);
                }
            }
        }
    }
}
