//! Command-line driver.
//!
//! Pulls iterations from the engine at a fixed cadence and prints them.
//! All logic lives here so `main.rs` only parses arguments and installs
//! logging.

mod args;
mod commands;
mod output;

pub use args::{Args, OutputFormat, StrategyArg};
pub use commands::{run_cli, run_colony};
pub use output::{format_iteration, format_summary};
