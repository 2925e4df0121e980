//! The colony main loop.
//!
//! [`AcoEngine`] is a pull-based iterator: each call to `next()` runs one
//! complete iteration synchronously and yields its [`IterationResult`].
//! There is no suspension inside an iteration.
//!
//! # Iteration protocol
//!
//! 1. Construction: `n - 1` steps, every unfinished agent moves once per step.
//! 2. Closure: every agent returns to its start; lengths are recomputed.
//! 3. Best of iteration vs. best ever (strict improvement replaces).
//! 4. Pheromone: evaporate, per-agent deposit `Q / L`, elitist deposit
//!    `Q · e / L*` on the best-ever tour.
//! 5. Convergence: `improvement_threshold` consecutive non-improving
//!    iterations ends the run. The streak only starts once a complete tour
//!    exists, so a colony that has found nothing runs to the cap.
//! 6. Agents reset to `index mod n` unless the run is over.

use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::agent::Agent;
use super::params::AlgorithmParams;
use super::selection::TransitionRule;
use crate::engine::rng::{RandomSource, SimRng};
use crate::error::{AcoError, AcoResult, Anomaly};
use crate::graph::Graph;

/// Run state of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// No further iterations will be produced.
    Stopped,
    /// Iterations are being produced.
    Running,
}

/// Cloneable stop request shared with a driver.
///
/// Requests are observed between iterations only; the iteration in flight
/// always completes and is emitted.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    /// Request a stop. Idempotent.
    pub fn stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Snapshot emitted once per iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationResult {
    /// 1-based iteration number.
    pub iteration: usize,
    /// Closed tour of the iteration's best agent.
    pub best_tour: Vec<usize>,
    /// Length of `best_tour`.
    pub best_length: f64,
    /// Mean length over agents with a finite tour (`+inf` if none).
    pub average_length: f64,
    /// Best length seen so far, this iteration included.
    pub global_best_length: f64,
    /// Whether this is the final iteration because the run converged.
    pub converged: bool,
    /// Runtime anomalies absorbed during the iteration.
    pub anomalies: Vec<Anomaly>,
}

/// Outcome of draining an engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Number of iterations produced.
    pub iterations: usize,
    /// Best-ever tour length (`+inf` if no complete tour was found).
    pub final_best_length: f64,
    /// Best-ever tour, empty if none.
    pub final_best_tour: Vec<usize>,
    /// Iteration that reported convergence, if any.
    pub convergence_iteration: Option<usize>,
    /// Best-ever length after each iteration.
    pub history: Vec<f64>,
}

/// Ant Colony Optimization engine over a single graph.
///
/// The engine owns the graph for the duration of the run, so the pheromone
/// field has exactly one writer. Read access goes through [`AcoEngine::graph`].
#[derive(Debug)]
pub struct AcoEngine<R: RandomSource = SimRng> {
    graph: Graph,
    params: AlgorithmParams,
    rule: TransitionRule,
    rng: R,
    agents: Vec<Agent>,
    best: Option<Agent>,
    iteration: usize,
    stagnation: usize,
    status: RunStatus,
    stop: StopHandle,
    history: Vec<f64>,
    convergence_iteration: Option<usize>,
    scratch: Vec<(usize, f64)>,
}

impl AcoEngine<SimRng> {
    /// Start with a [`SimRng`] seeded from `seed` (entropy when `None`).
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `params` are invalid.
    pub fn start_seeded(graph: Graph, params: AlgorithmParams, seed: Option<u64>) -> AcoResult<Self> {
        Self::start(graph, params, SimRng::from_seed_or_entropy(seed))
    }
}

impl<R: RandomSource> AcoEngine<R> {
    /// Validate parameters, reset the pheromone field, place the agents and
    /// enter [`RunStatus::Running`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `params` are invalid or the graph is
    /// empty. No iteration is produced in that case.
    pub fn start(mut graph: Graph, params: AlgorithmParams, rng: R) -> AcoResult<Self> {
        params.validate_all()?;
        let n = graph.node_count();
        if n == 0 {
            return Err(AcoError::config("graph has no nodes"));
        }

        graph.reset_pheromone(params.initial_pheromone);
        let agents = (0..params.ant_count)
            .map(|i| Agent::new(i, n, i % n))
            .collect();

        info!(
            nodes = n,
            ants = params.ant_count,
            max_iterations = params.max_iterations,
            topology = graph.topology().name(),
            "colony started"
        );

        Ok(Self {
            rule: TransitionRule::new(params.alpha, params.beta),
            graph,
            params,
            rng,
            agents,
            best: None,
            iteration: 0,
            stagnation: 0,
            status: RunStatus::Running,
            stop: StopHandle::default(),
            history: Vec::new(),
            convergence_iteration: None,
            scratch: Vec::with_capacity(n),
        })
    }

    /// Request a stop before the next iteration. Idempotent.
    pub fn stop(&mut self) {
        self.stop.stop();
        if self.status == RunStatus::Running {
            info!(iteration = self.iteration, "colony stop requested");
        }
        self.status = RunStatus::Stopped;
    }

    /// Handle for requesting a stop from elsewhere.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Current run state.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Whether iterations are still being produced.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }

    /// Graph and pheromone field.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Give the graph back, with its final pheromone field.
    #[must_use]
    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Parameters of this run.
    #[must_use]
    pub const fn params(&self) -> &AlgorithmParams {
        &self.params
    }

    /// Agents in colony order.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Number of completed iterations.
    #[must_use]
    pub const fn iteration(&self) -> usize {
        self.iteration
    }

    /// Best-ever agent, if any complete tour has been found.
    #[must_use]
    pub const fn best(&self) -> Option<&Agent> {
        self.best.as_ref()
    }

    /// Best-ever tour length (`+inf` before the first complete tour).
    #[must_use]
    pub fn best_length(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, Agent::tour_length)
    }

    /// Summary of the iterations produced so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            iterations: self.iteration,
            final_best_length: self.best_length(),
            final_best_tour: self
                .best
                .as_ref()
                .map(|a| a.tour().to_vec())
                .unwrap_or_default(),
            convergence_iteration: self.convergence_iteration,
            history: self.history.clone(),
        }
    }

    /// Drain the remaining iterations.
    pub fn run_to_end(&mut self) -> RunSummary {
        self.by_ref().for_each(drop);
        self.summary()
    }

    fn finish(&mut self, reason: &'static str) {
        self.status = RunStatus::Stopped;
        info!(
            iteration = self.iteration,
            best_length = self.best_length(),
            reason,
            "colony stopped"
        );
    }

    fn construct_tours(&mut self, anomalies: &mut Vec<Anomaly>) {
        let steps = self.graph.node_count().saturating_sub(1);
        for _ in 0..steps {
            for agent in &mut self.agents {
                if agent.is_finished() {
                    continue;
                }
                match self
                    .rule
                    .select(&self.graph, agent, &mut self.rng, &mut self.scratch)
                {
                    Some(next) => {
                        agent.move_to(next);
                    }
                    None => {
                        let anomaly = Anomaly::StuckAgent {
                            agent: agent.index(),
                            node: agent.position(),
                        };
                        warn!(iteration = self.iteration, %anomaly, "closing tour early");
                        anomalies.push(anomaly);
                        agent.close_tour();
                    }
                }
            }
        }

        for agent in &mut self.agents {
            agent.close_tour();
            agent.evaluate(&self.graph);
        }
    }

    /// Index of the shortest finite tour, first agent on ties or when none is finite.
    fn iteration_best(&self) -> (usize, bool) {
        self.agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.tour_length().is_finite())
            .min_by(|(_, a), (_, b)| a.tour_length().total_cmp(&b.tour_length()))
            .map_or((0, false), |(i, _)| (i, true))
    }

    fn update_pheromone(&mut self, anomalies: &mut Vec<Anomaly>) {
        self.graph.evaporate(self.params.evaporation_rate);

        for agent in &self.agents {
            let length = agent.tour_length();
            if length == 0.0 {
                let anomaly = Anomaly::ZeroLengthTour {
                    agent: agent.index(),
                };
                warn!(iteration = self.iteration, %anomaly, "skipping deposit");
                anomalies.push(anomaly);
                continue;
            }
            if length.is_finite() {
                self.graph.deposit(agent.tour(), self.params.q / length);
            }
        }

        if self.params.elitist_count > 0 {
            if let Some(best) = &self.best {
                let length = best.tour_length();
                if length.is_finite() && length > 0.0 {
                    let amount = self.params.q * self.params.elitist_count as f64 / length;
                    self.graph.deposit(best.tour(), amount);
                }
            }
        }
    }

    fn run_iteration(&mut self) -> IterationResult {
        self.iteration += 1;
        let mut anomalies = Vec::new();

        self.construct_tours(&mut anomalies);

        let (best_idx, any_finite) = self.iteration_best();
        if !any_finite {
            warn!(iteration = self.iteration, "every tour is unreachable");
            anomalies.push(Anomaly::DegenerateTours);
        }

        let iteration_best = &self.agents[best_idx];
        let best_length = iteration_best.tour_length();
        let improved = any_finite && best_length < self.best_length();
        if improved {
            self.best = Some(iteration_best.clone());
            self.stagnation = 0;
        } else if self.best.is_some() {
            self.stagnation += 1;
        }
        let best_tour = iteration_best.tour().to_vec();

        let finite: Vec<f64> = self
            .agents
            .iter()
            .map(Agent::tour_length)
            .filter(|l| l.is_finite())
            .collect();
        let average_length = if finite.is_empty() {
            f64::INFINITY
        } else {
            finite.iter().sum::<f64>() / finite.len() as f64
        };

        self.update_pheromone(&mut anomalies);

        let converged = self.stagnation >= self.params.improvement_threshold;

        debug!(
            iteration = self.iteration,
            best_length,
            average_length,
            global_best = self.best_length(),
            stagnation = self.stagnation,
            "iteration complete"
        );

        IterationResult {
            iteration: self.iteration,
            best_tour,
            best_length,
            average_length,
            global_best_length: self.best_length(),
            converged,
            anomalies,
        }
    }

    fn reset_agents(&mut self) {
        let n = self.graph.node_count();
        for agent in &mut self.agents {
            agent.reset(agent.index() % n);
        }
    }
}

impl<R: RandomSource> Iterator for AcoEngine<R> {
    type Item = IterationResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.status == RunStatus::Stopped {
            return None;
        }
        if self.stop.is_stop_requested() {
            self.finish("stop requested");
            return None;
        }

        let result = self.run_iteration();
        self.history.push(result.global_best_length);

        if result.converged {
            self.convergence_iteration = Some(result.iteration);
            self.finish("converged");
        } else if self.iteration >= self.params.max_iterations {
            self.finish("iteration cap reached");
        } else {
            self.reset_agents();
        }

        Some(result)
    }
}

impl<R: RandomSource> FusedIterator for AcoEngine<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphBuilder, GraphParams};

    const INF: f64 = f64::INFINITY;

    fn square() -> Graph {
        let d = 2.0_f64.sqrt();
        Graph::from_matrix(&[
            vec![0.0, 1.0, d, 1.0],
            vec![1.0, 0.0, 1.0, d],
            vec![d, 1.0, 0.0, 1.0],
            vec![1.0, d, 1.0, 0.0],
        ])
        .expect("valid matrix")
    }

    fn seeded_graph(count: usize, seed: u64) -> Graph {
        GraphBuilder::build_seeded(&GraphParams::new(count).with_seed(seed)).expect("build")
    }

    fn assert_valid_closed_tour(tour: &[usize], n: usize) {
        assert_eq!(tour.len(), n + 1);
        assert_eq!(tour.first(), tour.last());
        let mut seen = vec![false; n];
        for &node in &tour[..n] {
            assert!(!seen[node], "node {node} visited twice");
            seen[node] = true;
        }
    }

    #[test]
    fn test_start_rejects_invalid_params() {
        let err = AcoEngine::start_seeded(square(), AlgorithmParams::default().with_ant_count(0), Some(1))
            .unwrap_err();
        assert!(err.is_configuration_error());
        assert!(AcoEngine::start_seeded(square(), AlgorithmParams::default().with_q(0.0), Some(1)).is_err());
        assert!(AcoEngine::start_seeded(
            square(),
            AlgorithmParams::default().with_evaporation_rate(2.0),
            Some(1)
        )
        .is_err());
    }

    #[test]
    fn test_start_places_agents_round_robin() {
        let engine = AcoEngine::start_seeded(square(), AlgorithmParams::default().with_ant_count(6), Some(1))
            .expect("start");
        let starts: Vec<usize> = engine.agents().iter().map(Agent::start_node).collect();
        assert_eq!(starts, vec![0, 1, 2, 3, 0, 1]);
        assert_eq!(engine.status(), RunStatus::Running);
        assert!((engine.graph().pheromone(0, 1) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_square_finds_perimeter() {
        let mut engine = AcoEngine::start_seeded(square(), AlgorithmParams::default(), Some(42))
            .expect("start");
        let summary = engine.run_to_end();
        assert!((summary.final_best_length - 4.0).abs() < 1e-9);
        assert_valid_closed_tour(&summary.final_best_tour, 4);
        assert_eq!(engine.status(), RunStatus::Stopped);
    }

    #[test]
    fn test_emitted_tours_are_valid_and_lengths_recomputable() {
        let graph = seeded_graph(12, 9);
        let check = graph.clone();
        let engine = AcoEngine::start_seeded(graph, AlgorithmParams::default(), Some(9)).expect("start");
        for result in engine {
            assert_valid_closed_tour(&result.best_tour, 12);
            assert!((check.tour_length(&result.best_tour) - result.best_length).abs() < 1e-9);
            assert!(result.best_length <= result.average_length + 1e-9);
            assert!(result.global_best_length <= result.best_length + 1e-9);
        }
    }

    #[test]
    fn test_nothing_after_converged() {
        let params = AlgorithmParams::default()
            .with_improvement_threshold(2)
            .with_max_iterations(500);
        let engine = AcoEngine::start_seeded(square(), params, Some(3)).expect("start");
        let results: Vec<IterationResult> = engine.collect();
        let last = results.last().expect("at least one iteration");
        assert!(last.converged);
        assert_eq!(results.iter().filter(|r| r.converged).count(), 1);
        assert!(results.len() < 500);
    }

    #[test]
    fn test_iteration_cap() {
        let params = AlgorithmParams::default()
            .with_max_iterations(3)
            .with_improvement_threshold(100);
        let mut engine = AcoEngine::start_seeded(seeded_graph(8, 4), params, Some(4)).expect("start");
        let summary = engine.run_to_end();
        assert_eq!(summary.iterations, 3);
        assert_eq!(summary.history.len(), 3);
        assert_eq!(summary.convergence_iteration, None);
        assert!(engine.next().is_none());
    }

    #[test]
    fn test_stop_takes_effect_before_next_iteration() {
        let mut engine = AcoEngine::start_seeded(seeded_graph(8, 2), AlgorithmParams::default(), Some(2))
            .expect("start");
        let first = engine.next().expect("first iteration");
        assert_eq!(first.iteration, 1);
        engine.stop();
        engine.stop();
        assert_eq!(engine.status(), RunStatus::Stopped);
        assert!(engine.next().is_none());
        assert_eq!(engine.iteration(), 1);
    }

    #[test]
    fn test_stop_handle_observed_between_iterations() {
        let mut engine = AcoEngine::start_seeded(seeded_graph(8, 2), AlgorithmParams::default(), Some(2))
            .expect("start");
        let handle = engine.stop_handle();
        assert!(engine.next().is_some());
        handle.stop();
        assert!(engine.is_running());
        assert!(engine.next().is_none());
        assert_eq!(engine.status(), RunStatus::Stopped);
    }

    #[test]
    fn test_stuck_agents_are_absorbed() {
        // star: every tour dead-ends, so all ants get stuck
        let star = Graph::from_matrix(&[
            vec![0.0, 1.0, 1.0, 1.0],
            vec![1.0, 0.0, INF, INF],
            vec![1.0, INF, 0.0, INF],
            vec![1.0, INF, INF, 0.0],
        ])
        .expect("valid matrix");
        let params = AlgorithmParams::default().with_ant_count(4).with_max_iterations(3);
        let mut engine = AcoEngine::start_seeded(star, params, Some(1)).expect("start");

        let result = engine.next().expect("iteration");
        assert!(result.best_length.is_infinite());
        assert!(result.average_length.is_infinite());
        assert!(result.anomalies.contains(&Anomaly::DegenerateTours));
        assert!(result
            .anomalies
            .iter()
            .any(|a| matches!(a, Anomaly::StuckAgent { .. })));
        assert_eq!(result.best_tour.first(), Some(&0));

        for i in 0..4 {
            for j in 0..4 {
                let tau = engine.graph().pheromone(i, j);
                assert!(tau.is_finite() && tau >= 0.0);
            }
        }
        assert_eq!(engine.run_to_end().final_best_tour, Vec::<usize>::new());
    }

    #[test]
    fn test_no_convergence_before_first_complete_tour() {
        let star = Graph::from_matrix(&[
            vec![0.0, 1.0, 1.0, 1.0],
            vec![1.0, 0.0, INF, INF],
            vec![1.0, INF, 0.0, INF],
            vec![1.0, INF, INF, 0.0],
        ])
        .expect("valid matrix");
        let params = AlgorithmParams::default()
            .with_improvement_threshold(2)
            .with_max_iterations(6);
        let mut engine = AcoEngine::start_seeded(star, params, Some(4)).expect("start");
        let summary = engine.run_to_end();
        assert_eq!(summary.iterations, 6);
        assert_eq!(summary.convergence_iteration, None);
        assert!(summary.final_best_length.is_infinite());
    }

    #[test]
    fn test_overflowing_weights_do_not_abort_run() {
        let flat = Graph::from_matrix(&[
            vec![0.0, 1.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0, 1.0],
            vec![1.0, 1.0, 0.0, 1.0],
            vec![1.0, 1.0, 1.0, 0.0],
        ])
        .expect("valid matrix");
        let params = AlgorithmParams::default()
            .with_alpha(2.0)
            .with_beta(0.0)
            .with_initial_pheromone(1e154)
            .with_max_iterations(3);
        assert!(params.validate_all().is_ok());
        let engine = AcoEngine::start_seeded(flat, params, Some(2)).expect("start");
        for result in engine {
            assert_valid_closed_tour(&result.best_tour, 4);
            assert!((result.best_length - 4.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_length_tour_skips_deposit() {
        let single = Graph::from_matrix(&[vec![0.0]]).expect("valid matrix");
        let params = AlgorithmParams::default().with_ant_count(2).with_max_iterations(2);
        let mut engine = AcoEngine::start_seeded(single, params, Some(1)).expect("start");
        let result = engine.next().expect("iteration");
        assert!(result
            .anomalies
            .contains(&Anomaly::ZeroLengthTour { agent: 0 }));
        assert!(result.best_length.abs() < f64::EPSILON);
        assert!(engine.graph().pheromone(0, 0).is_finite());
    }

    #[test]
    fn test_single_ant_average_equals_best() {
        let params = AlgorithmParams::default().with_ant_count(1).with_max_iterations(20);
        let engine = AcoEngine::start_seeded(seeded_graph(9, 5), params, Some(5)).expect("start");
        for result in engine {
            assert_eq!(result.average_length.to_bits(), result.best_length.to_bits());
        }
    }

    #[test]
    fn test_elitist_deposit_reinforces_best_tour() {
        let base = AlgorithmParams::default()
            .with_max_iterations(1)
            .with_evaporation_rate(0.0);
        let mut plain =
            AcoEngine::start_seeded(square(), base.clone().with_elitist_count(0), Some(8)).expect("start");
        let mut elite =
            AcoEngine::start_seeded(square(), base.with_elitist_count(5), Some(8)).expect("start");
        plain.run_to_end();
        elite.run_to_end();

        let tour = elite.best().expect("best").tour().to_vec();
        let (a, b) = (tour[0], tour[1]);
        let extra = elite.graph().pheromone(a, b) - plain.graph().pheromone(a, b);
        let expected = 100.0 * 5.0 / elite.best_length();
        assert!((extra - expected).abs() < 1e-9);
    }

    #[test]
    fn test_pheromone_stays_symmetric_and_non_negative() {
        let params = AlgorithmParams::default().with_max_iterations(15);
        let mut engine = AcoEngine::start_seeded(seeded_graph(10, 6), params, Some(6)).expect("start");
        while engine.next().is_some() {
            let g = engine.graph();
            for i in 0..10 {
                for j in 0..10 {
                    assert_eq!(g.pheromone(i, j).to_bits(), g.pheromone(j, i).to_bits());
                    assert!(g.pheromone(i, j) >= 0.0);
                }
            }
        }
    }
}
