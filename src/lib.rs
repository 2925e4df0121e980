//! # acosim
//!
//! Ant Colony Optimization over generated weighted graphs.
//!
//! - Graph construction: complete, ring-plus-chords k-regular and
//!   spanning-tree-plus-nearest-neighbour topologies
//! - Colony engine: probabilistic tour construction, evaporation and
//!   elitist deposit, stagnation-based convergence
//! - Reproducibility: one master seed drives every random decision
//!
//! ## Example
//!
//! ```rust
//! use acosim::prelude::*;
//!
//! let graph = GraphBuilder::build_seeded(&GraphParams::new(8).with_seed(42))?;
//! let mut engine = AcoEngine::start_seeded(graph, AlgorithmParams::default(), Some(42))?;
//! let first = engine.next();
//! assert!(first.is_some());
//! engine.stop();
//! assert_eq!(engine.status(), RunStatus::Stopped);
//! # Ok::<(), acosim::AcoError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_cmp,
    clippy::missing_const_for_fn,
    clippy::needless_range_loop,
)]

pub mod cli;
pub mod colony;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::colony::{
        AcoEngine, Agent, AlgorithmParams, IterationResult, RunStatus, RunSummary, StopHandle,
    };
    pub use crate::config::{RunConfig, RunConfigBuilder};
    pub use crate::engine::rng::{RandomSource, SimRng};
    pub use crate::error::{AcoError, AcoResult, Anomaly};
    pub use crate::graph::{Graph, GraphBuilder, GraphParams, KRegularStrategy, Node, Topology};
}

/// Re-export for public API
pub use error::{AcoError, AcoResult, Anomaly};
