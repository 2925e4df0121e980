//! CLI command handlers.

use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;

use super::args::{Args, OutputFormat};
use super::output::{format_iteration, format_summary};
use crate::colony::RunSummary;
use crate::config::RunConfig;
use crate::error::AcoResult;

/// Main CLI entry point.
#[must_use]
pub fn run_cli(args: &Args) -> ExitCode {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args
        .to_config()
        .and_then(|config| run_colony(&config, args.format, &mut out))
    {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Drive a colony to completion, writing one line per iteration and the
/// summary to `out`.
///
/// # Errors
///
/// Returns error if the configuration is invalid or writing fails.
pub fn run_colony<W: Write>(
    config: &RunConfig,
    format: OutputFormat,
    out: &mut W,
) -> AcoResult<RunSummary> {
    let mut engine = config.start()?;
    let tick = Duration::from_millis(config.run.tick_ms);

    while let Some(result) = engine.next() {
        writeln!(out, "{}", format_iteration(&result, format)?)?;
        if !tick.is_zero() && engine.is_running() {
            std::thread::sleep(tick);
        }
    }

    let summary = engine.summary();
    writeln!(out, "{}", format_summary(&summary, format)?)?;
    out.flush()?;
    Ok(summary)
}
