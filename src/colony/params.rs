//! Colony parameters.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AcoError, AcoResult};

/// Tuning parameters for one colony run.
///
/// Defaults: 10 ants, 100 iterations, `alpha = 1`, `beta = 5`,
/// `evaporation_rate = 0.5`, `q = 100`, 5 elitist ants, stop after 10
/// iterations without improvement, initial pheromone `0.1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields, default)]
pub struct AlgorithmParams {
    /// Number of ants.
    #[validate(range(min = 1))]
    pub ant_count: usize,

    /// Hard cap on iterations.
    #[validate(range(min = 1))]
    pub max_iterations: usize,

    /// Pheromone exponent (α).
    #[validate(range(min = 0.0))]
    pub alpha: f64,

    /// Visibility exponent (β).
    #[validate(range(min = 0.0))]
    pub beta: f64,

    /// Fraction of pheromone lost per iteration (ρ).
    #[validate(range(min = 0.0, max = 1.0))]
    pub evaporation_rate: f64,

    /// Deposit scale (Q).
    #[validate(range(exclusive_min = 0.0))]
    pub q: f64,

    /// Weight of the extra deposit on the best-ever tour; 0 disables it.
    pub elitist_count: usize,

    /// Consecutive non-improving iterations that count as converged.
    #[validate(range(min = 1))]
    pub improvement_threshold: usize,

    /// Uniform pheromone level at run start.
    #[validate(range(exclusive_min = 0.0))]
    pub initial_pheromone: f64,
}

impl Default for AlgorithmParams {
    fn default() -> Self {
        Self {
            ant_count: 10,
            max_iterations: 100,
            alpha: 1.0,
            beta: 5.0,
            evaporation_rate: 0.5,
            q: 100.0,
            elitist_count: 5,
            improvement_threshold: 10,
            initial_pheromone: 0.1,
        }
    }
}

impl AlgorithmParams {
    /// Set number of ants.
    #[must_use]
    pub const fn with_ant_count(mut self, ant_count: usize) -> Self {
        self.ant_count = ant_count;
        self
    }

    /// Set iteration cap.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set pheromone importance (α).
    #[must_use]
    pub const fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set heuristic importance (β).
    #[must_use]
    pub const fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Set evaporation rate (ρ).
    #[must_use]
    pub const fn with_evaporation_rate(mut self, rate: f64) -> Self {
        self.evaporation_rate = rate;
        self
    }

    /// Set deposit scale (Q).
    #[must_use]
    pub const fn with_q(mut self, q: f64) -> Self {
        self.q = q;
        self
    }

    /// Set elitist weight.
    #[must_use]
    pub const fn with_elitist_count(mut self, elitist_count: usize) -> Self {
        self.elitist_count = elitist_count;
        self
    }

    /// Set convergence threshold.
    #[must_use]
    pub const fn with_improvement_threshold(mut self, threshold: usize) -> Self {
        self.improvement_threshold = threshold;
        self
    }

    /// Set initial pheromone level.
    #[must_use]
    pub const fn with_initial_pheromone(mut self, tau0: f64) -> Self {
        self.initial_pheromone = tau0;
        self
    }

    /// Run declarative and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns an error for zero ants or iterations, negative exponents,
    /// an evaporation rate outside `[0, 1]`, non-positive `q` or initial
    /// pheromone, or any non-finite value.
    pub fn validate_all(&self) -> AcoResult<()> {
        self.validate()?;

        for (name, value) in [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("evaporation_rate", self.evaporation_rate),
            ("q", self.q),
            ("initial_pheromone", self.initial_pheromone),
        ] {
            if !value.is_finite() {
                return Err(AcoError::config(format!("{name} must be finite, got {value}")));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = AlgorithmParams::default();
        assert_eq!(params.ant_count, 10);
        assert_eq!(params.max_iterations, 100);
        assert!((params.beta - 5.0).abs() < 1e-10);
        assert_eq!(params.elitist_count, 5);
        assert!(params.validate_all().is_ok());
    }

    #[test]
    fn test_builder() {
        let params = AlgorithmParams::default()
            .with_ant_count(50)
            .with_alpha(2.0)
            .with_beta(3.0)
            .with_evaporation_rate(0.2)
            .with_q(1.0)
            .with_elitist_count(0)
            .with_improvement_threshold(4)
            .with_initial_pheromone(1.0)
            .with_max_iterations(7);

        assert_eq!(params.ant_count, 50);
        assert!((params.alpha - 2.0).abs() < 1e-10);
        assert!((params.evaporation_rate - 0.2).abs() < 1e-10);
        assert_eq!(params.improvement_threshold, 4);
        assert_eq!(params.max_iterations, 7);
        assert!(params.validate_all().is_ok());
    }

    #[test]
    fn test_zero_ants_rejected() {
        let err = AlgorithmParams::default().with_ant_count(0).validate_all().unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_non_positive_q_rejected() {
        assert!(AlgorithmParams::default().with_q(0.0).validate_all().is_err());
        assert!(AlgorithmParams::default().with_q(-1.0).validate_all().is_err());
    }

    #[test]
    fn test_evaporation_rate_bounds() {
        assert!(AlgorithmParams::default().with_evaporation_rate(0.0).validate_all().is_ok());
        assert!(AlgorithmParams::default().with_evaporation_rate(1.0).validate_all().is_ok());
        assert!(AlgorithmParams::default().with_evaporation_rate(1.5).validate_all().is_err());
        assert!(AlgorithmParams::default().with_evaporation_rate(-0.1).validate_all().is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(AlgorithmParams::default().with_alpha(f64::INFINITY).validate_all().is_err());
        assert!(AlgorithmParams::default().with_beta(f64::NAN).validate_all().is_err());
    }

    #[test]
    fn test_zero_threshold_and_pheromone_rejected() {
        assert!(AlgorithmParams::default().with_improvement_threshold(0).validate_all().is_err());
        assert!(AlgorithmParams::default().with_initial_pheromone(0.0).validate_all().is_err());
        assert!(AlgorithmParams::default().with_max_iterations(0).validate_all().is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let params: AlgorithmParams =
            serde_yaml::from_str("ant_count: 3\nevaporation_rate: 0.9\n").expect("parse");
        assert_eq!(params.ant_count, 3);
        assert!((params.evaporation_rate - 0.9).abs() < 1e-10);
        assert_eq!(params.max_iterations, 100);
    }
}
