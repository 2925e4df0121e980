//! Ant colony: agents, transition rule and the iteration engine.

pub mod agent;
pub mod engine;
pub mod params;
pub mod selection;

pub use agent::Agent;
pub use engine::{AcoEngine, IterationResult, RunStatus, RunSummary, StopHandle};
pub use params::AlgorithmParams;
pub use selection::TransitionRule;
