//! Rating engine configuration

use crate::error::LadderError;
use crate::types::{PlayerRating, DEFAULT_DEVIATION, DEFAULT_RATING, DEFAULT_VOLATILITY};
use serde::{Deserialize, Serialize};

/// Parameters of the Glicko-2 update engine.
///
/// `tau` must stay fixed for the lifetime of a deployment, otherwise ratings
/// computed before and after a change are not comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// System constant constraining volatility change over time
    pub tau: f64,
    /// Bracket width at which the volatility solver stops
    pub convergence_tolerance: f64,
    /// Upper bound on solver iterations
    pub max_solver_iterations: u32,
    pub default_rating: f64,
    pub default_deviation: f64,
    pub default_volatility: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            tau: 0.5,
            convergence_tolerance: 0.000_001,
            max_solver_iterations: 1000,
            default_rating: DEFAULT_RATING,
            default_deviation: DEFAULT_DEVIATION,
            default_volatility: DEFAULT_VOLATILITY,
        }
    }
}

impl RatingConfig {
    /// Lower tau: volatility reacts slowly to surprising results
    pub fn conservative() -> Self {
        Self {
            tau: 0.3,
            ..Self::default()
        }
    }

    /// Higher tau: volatility reacts quickly to surprising results
    pub fn aggressive() -> Self {
        Self {
            tau: 1.2,
            ..Self::default()
        }
    }

    /// Rating triple given to newly registered players
    pub fn initial_rating(&self) -> PlayerRating {
        PlayerRating::new(
            self.default_rating,
            self.default_deviation,
            self.default_volatility,
        )
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(self.tau.is_finite() && self.tau > 0.0) {
            return Err(LadderError::ConfigurationError {
                message: "Tau must be positive".to_string(),
            }
            .into());
        }

        if !(self.convergence_tolerance.is_finite() && self.convergence_tolerance > 0.0) {
            return Err(LadderError::ConfigurationError {
                message: "Convergence tolerance must be positive".to_string(),
            }
            .into());
        }

        if self.max_solver_iterations == 0 {
            return Err(LadderError::ConfigurationError {
                message: "Solver iteration cap must be greater than 0".to_string(),
            }
            .into());
        }

        if !self.default_rating.is_finite() {
            return Err(LadderError::ConfigurationError {
                message: "Default rating must be finite".to_string(),
            }
            .into());
        }

        if !(self.default_deviation.is_finite() && self.default_deviation > 0.0) {
            return Err(LadderError::ConfigurationError {
                message: "Default deviation must be positive".to_string(),
            }
            .into());
        }

        if !(self.default_volatility.is_finite() && self.default_volatility > 0.0) {
            return Err(LadderError::ConfigurationError {
                message: "Default volatility must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
