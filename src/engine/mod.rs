//! Randomness plumbing shared by graph construction and the colony.
//!
//! Every random decision in a run is drawn from a [`RandomSource`]. The
//! default source is [`SimRng`], a seeded PCG stream that can be partitioned
//! so one master seed reproduces the whole run.

pub mod rng;

pub use rng::{RandomSource, ScriptedSource, SimRng};
