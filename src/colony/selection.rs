//! Probabilistic transition rule.
//!
//! ```text
//! P(j) ∝ τ(i,j)^α · η(i,j)^β,   η(i,j) = 1 / d(i,j)
//! ```
//!
//! Candidates are the unvisited nodes reachable from the agent's position
//! over a finite, positive-length edge.

use crate::engine::rng::RandomSource;
use crate::graph::Graph;

use super::agent::Agent;

/// Exponents of the roulette-wheel transition rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionRule {
    /// Pheromone exponent (α).
    pub alpha: f64,
    /// Visibility exponent (β).
    pub beta: f64,
}

impl TransitionRule {
    /// Create a rule with the given exponents.
    #[must_use]
    pub const fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// Unnormalized desirability of an edge with pheromone `tau` and length
    /// `distance`. A zero distance has infinite visibility.
    #[must_use]
    pub fn weight(&self, tau: f64, distance: f64) -> f64 {
        let visibility = if distance == 0.0 {
            f64::INFINITY
        } else {
            1.0 / distance
        };
        tau.powf(self.alpha) * visibility.powf(self.beta)
    }

    /// Pick the agent's next node, or `None` when it is stuck.
    ///
    /// A single candidate is taken without consuming a random draw. Otherwise
    /// one draw scaled by the total weight spins the wheel; a degenerate
    /// total falls back to a uniform pick.
    pub fn select<R: RandomSource>(
        &self,
        graph: &Graph,
        agent: &Agent,
        rng: &mut R,
        scratch: &mut Vec<(usize, f64)>,
    ) -> Option<usize> {
        let current = agent.position();
        scratch.clear();
        scratch.extend((0..graph.node_count()).filter_map(|j| {
            let d = graph.distance(current, j);
            (!agent.has_visited(j) && d.is_finite() && d > 0.0)
                .then(|| (j, self.weight(graph.pheromone(current, j), d)))
        }));

        match scratch.len() {
            0 => None,
            1 => Some(scratch[0].0),
            len => {
                let total: f64 = scratch.iter().map(|&(_, w)| w).sum();
                if total.is_nan() || total <= 0.0 {
                    return Some(scratch[rng.next_index(len)].0);
                }
                if total.is_infinite() {
                    let dominant: Vec<usize> = scratch
                        .iter()
                        .filter(|(_, w)| w.is_infinite())
                        .map(|&(j, _)| j)
                        .collect();
                    if !dominant.is_empty() {
                        return Some(dominant[rng.next_index(dominant.len())]);
                    }
                    // finite weights whose sum overflowed: rescale by the largest
                    let max = scratch.iter().map(|&(_, w)| w).fold(0.0, f64::max);
                    for (_, w) in scratch.iter_mut() {
                        *w /= max;
                    }
                    let rescaled: f64 = scratch.iter().map(|&(_, w)| w).sum();
                    return spin(scratch, rescaled, rng);
                }

                spin(scratch, total, rng)
            }
        }
    }
}

/// Roulette wheel over `candidates` with one draw scaled by `total`.
fn spin<R: RandomSource>(candidates: &[(usize, f64)], total: f64, rng: &mut R) -> Option<usize> {
    let target = rng.next_f64() * total;
    let mut cumulative = 0.0;
    for &(j, w) in candidates {
        cumulative += w;
        if target < cumulative {
            return Some(j);
        }
    }
    candidates.last().map(|&(j, _)| j)
}
