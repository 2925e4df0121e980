//! CLI argument parsing.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::RunConfig;
use crate::error::AcoResult;
use crate::graph::KRegularStrategy;

/// Ant Colony Optimization over generated graphs.
///
/// Flags given on the command line override the matching keys of
/// `--config`.
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(name = "acosim", author, version, about, long_about = None)]
pub struct Args {
    /// YAML run configuration.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of nodes.
    #[arg(short, long)]
    pub nodes: Option<usize>,

    /// Target degree; builds a k-regular graph instead of a complete one.
    #[arg(short = 'k', long)]
    pub edges_per_node: Option<usize>,

    /// k-regular construction.
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Lower distance bound.
    #[arg(long)]
    pub min_distance: Option<f64>,

    /// Upper distance bound.
    #[arg(long)]
    pub max_distance: Option<f64>,

    /// Master seed.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Number of ants.
    #[arg(short, long)]
    pub ants: Option<usize>,

    /// Iteration cap.
    #[arg(short, long)]
    pub iterations: Option<usize>,

    /// Delay between iterations in milliseconds.
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log every iteration.
    #[arg(short, long)]
    pub verbose: bool,
}

/// `--strategy` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Ring plus chords.
    Ring,
    /// Spanning tree plus nearest neighbours.
    Mst,
}

impl From<StrategyArg> for KRegularStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Ring => Self::RingChords,
            StrategyArg::Mst => Self::MstNearest,
        }
    }
}

/// `--format` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per iteration.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl Args {
    /// Resolve the run configuration: file (or defaults) overlaid with flags.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be loaded or the merged
    /// configuration is invalid.
    pub fn to_config(&self) -> AcoResult<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };

        if let Some(count) = self.nodes {
            config.graph.count = count;
        }
        if let Some(k) = self.edges_per_node {
            config.graph.edges_per_node = Some(k);
        }
        if let Some(strategy) = self.strategy {
            config.graph.strategy = strategy.into();
        }
        if self.min_distance.is_some() {
            config.graph.min_distance = self.min_distance;
        }
        if self.max_distance.is_some() {
            config.graph.max_distance = self.max_distance;
        }
        if let Some(seed) = self.seed {
            config.run.seed = Some(seed);
            config.graph.seed = None;
        }
        if let Some(ants) = self.ants {
            config.colony.ant_count = ants;
        }
        if let Some(iterations) = self.iterations {
            config.colony.max_iterations = iterations;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.run.tick_ms = tick_ms;
        }

        config.validate_all()?;
        Ok(config)
    }
}
