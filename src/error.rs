//! Error types for acosim.
//!
//! Configuration problems are fatal and surface as `Err(AcoError)` before a
//! run produces anything. Problems that arise while ants are walking the
//! graph are recorded as [`Anomaly`] values instead: they are logged,
//! attached to the iteration that saw them, and never abort a run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for acosim operations.
pub type AcoResult<T> = Result<T, AcoError>;

/// Unified error type for all acosim operations.
#[derive(Debug, Error)]
pub enum AcoError {
    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Declarative range validation failed.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AcoError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Check if this error stems from invalid parameters (never retried).
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::Validation(_) | Self::YamlParse(_)
        )
    }
}

/// Recoverable runtime anomaly observed during one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// An agent had no reachable unvisited node and closed its tour early.
    StuckAgent {
        /// Index of the agent in the colony.
        agent: usize,
        /// Node the agent was standing on.
        node: usize,
    },
    /// Every agent finished the iteration with an infinite tour length.
    DegenerateTours,
    /// An agent produced a zero-length tour; its deposit was skipped.
    ZeroLengthTour {
        /// Index of the agent in the colony.
        agent: usize,
    },
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StuckAgent { agent, node } => {
                write!(f, "agent {agent} stuck at node {node} with no reachable unvisited node")
            }
            Self::DegenerateTours => write!(f, "every tour in the iteration is unreachable"),
            Self::ZeroLengthTour { agent } => {
                write!(f, "agent {agent} produced a zero-length tour")
            }
        }
    }
}
