//! Run configuration with YAML schema and validation.
//!
//! A run file has three sections:
//!
//! ```yaml
//! graph:
//!   count: 20
//!   edges_per_node: 4
//! colony:
//!   ant_count: 15
//!   max_iterations: 200
//! run:
//!   seed: 42
//!   tick_ms: 0
//! ```
//!
//! Every section is optional and falls back to its defaults. Unknown keys
//! are rejected.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use validator::Validate;

use crate::colony::{AcoEngine, AlgorithmParams};
use crate::engine::rng::SimRng;
use crate::error::{AcoError, AcoResult};
use crate::graph::{GraphBuilder, GraphParams, KRegularStrategy};

/// Top-level run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Graph construction parameters.
    #[validate(nested)]
    #[serde(default)]
    pub graph: GraphParams,

    /// Colony parameters.
    #[validate(nested)]
    #[serde(default)]
    pub colony: AlgorithmParams,

    /// Driver settings.
    #[validate(nested)]
    #[serde(default)]
    pub run: RunSettings,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            graph: GraphParams::default(),
            colony: AlgorithmParams::default(),
            run: RunSettings::default(),
        }
    }
}

impl RunConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> AcoResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> AcoResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if encoding fails.
    pub fn to_yaml(&self) -> AcoResult<String> {
        serde_yaml::to_string(self).map_err(|e| AcoError::serialization(e.to_string()))
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Declarative plus semantic validation of every section.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn validate_all(&self) -> AcoResult<()> {
        self.validate()?;
        self.graph.validate_all()?;
        self.colony.validate_all()?;
        if let (Some(run_seed), Some(graph_seed)) = (self.run.seed, self.graph.seed) {
            if run_seed != graph_seed {
                return Err(AcoError::config(format!(
                    "run.seed ({run_seed}) conflicts with graph.seed ({graph_seed})"
                )));
            }
        }
        Ok(())
    }

    /// Master seed: `run.seed`, else `graph.seed`.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.run.seed.or(self.graph.seed)
    }

    /// Build the graph and start a colony over it.
    ///
    /// The master seed is split into a graph stream and a colony stream, so
    /// the same seed reproduces both the graph and every tour.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any section is invalid.
    pub fn start(&self) -> AcoResult<AcoEngine<SimRng>> {
        self.validate_all()?;
        let mut master = SimRng::from_seed_or_entropy(self.seed());
        let (mut graph_rng, colony_rng) = master.split_run_streams();
        info!(
            seed = master.master_seed(),
            graph_stream = graph_rng.stream(),
            colony_stream = colony_rng.stream(),
            "run seeded"
        );
        let graph = GraphBuilder::build(&self.graph, &mut graph_rng)?;
        AcoEngine::start(graph, self.colony.clone(), colony_rng)
    }
}

/// Driver settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RunSettings {
    /// Master seed; drawn from OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Delay between iterations in milliseconds (0 = as fast as possible).
    #[validate(range(max = 60_000))]
    #[serde(default)]
    pub tick_ms: u64,
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct RunConfigBuilder {
    seed: Option<u64>,
    nodes: Option<usize>,
    edges_per_node: Option<usize>,
    strategy: Option<KRegularStrategy>,
    distance_range: Option<(Option<f64>, Option<f64>)>,
    colony: Option<AlgorithmParams>,
    tick_ms: Option<u64>,
}

impl RunConfigBuilder {
    /// Set the master seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the node count.
    #[must_use]
    pub const fn nodes(mut self, count: usize) -> Self {
        self.nodes = Some(count);
        self
    }

    /// Request a k-regular topology.
    #[must_use]
    pub const fn edges_per_node(mut self, k: usize) -> Self {
        self.edges_per_node = Some(k);
        self
    }

    /// Choose the k-regular construction.
    #[must_use]
    pub const fn strategy(mut self, strategy: KRegularStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Set the admissible distance range.
    #[must_use]
    pub const fn distance_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.distance_range = Some((min, max));
        self
    }

    /// Set the colony parameters.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn colony(mut self, params: AlgorithmParams) -> Self {
        self.colony = Some(params);
        self
    }

    /// Set the tick delay in milliseconds.
    #[must_use]
    pub const fn tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = Some(tick_ms);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> RunConfig {
        let mut config = RunConfig::default();

        if let Some(count) = self.nodes {
            config.graph.count = count;
        }
        if let Some(k) = self.edges_per_node {
            config.graph.edges_per_node = Some(k);
        }
        if let Some(strategy) = self.strategy {
            config.graph.strategy = strategy;
        }
        if let Some((min, max)) = self.distance_range {
            config.graph.min_distance = min;
            config.graph.max_distance = max;
        }
        if let Some(colony) = self.colony {
            config.colony = colony;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.run.tick_ms = tick_ms;
        }
        config.run.seed = self.seed;

        config
    }
}
