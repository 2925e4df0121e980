//! CLI output formatting.

use crate::colony::{IterationResult, RunSummary};
use crate::error::{AcoError, AcoResult};

use super::args::OutputFormat;

/// Render one iteration as a single line.
///
/// # Errors
///
/// Returns a serialization error if JSON encoding fails.
pub fn format_iteration(result: &IterationResult, format: OutputFormat) -> AcoResult<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string(result).map_err(|e| AcoError::serialization(e.to_string()))
        }
        OutputFormat::Text => {
            let mut line = format!(
                "iter {:>5}  best {:>12.3}  avg {:>12.3}  global {:>12.3}",
                result.iteration,
                result.best_length,
                result.average_length,
                result.global_best_length
            );
            if !result.anomalies.is_empty() {
                line.push_str(&format!("  anomalies {}", result.anomalies.len()));
            }
            if result.converged {
                line.push_str("  converged");
            }
            Ok(line)
        }
    }
}

/// Render the final summary.
///
/// # Errors
///
/// Returns a serialization error if JSON encoding fails.
pub fn format_summary(summary: &RunSummary, format: OutputFormat) -> AcoResult<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string(summary).map_err(|e| AcoError::serialization(e.to_string()))
        }
        OutputFormat::Text => {
            let stop = summary
                .convergence_iteration
                .map_or_else(|| "iteration cap".to_string(), |i| format!("converged at {i}"));
            let tour = summary
                .final_best_tour
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ");
            Ok(format!(
                "iterations {}  best {:.3}  ({stop})\ntour {}",
                summary.iterations,
                summary.final_best_length,
                if tour.is_empty() { "none" } else { tour.as_str() }
            ))
        }
    }
}
