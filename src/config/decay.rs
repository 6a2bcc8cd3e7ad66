//! Rating-deviation decay configuration

use crate::error::LadderError;
use crate::types::DEFAULT_DEVIATION;
use serde::{Deserialize, Serialize};

/// Bounds for the inactivity-driven deviation curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// Deviation right after a match
    pub floor: f64,
    /// Deviation once `window_days` have passed without a match
    pub ceiling: f64,
    /// Deviation of a player who has never played
    pub unplayed_deviation: f64,
    /// Days over which the deviation climbs from floor to ceiling
    pub window_days: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            floor: 50.0,
            ceiling: 100.0,
            unplayed_deviation: DEFAULT_DEVIATION,
            window_days: 10.0,
        }
    }
}

impl DecayConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(self.floor.is_finite() && self.floor > 0.0) {
            return Err(LadderError::ConfigurationError {
                message: "Decay floor must be positive".to_string(),
            }
            .into());
        }

        if !self.ceiling.is_finite() || self.ceiling < self.floor {
            return Err(LadderError::ConfigurationError {
                message: "Decay ceiling must not be below the floor".to_string(),
            }
            .into());
        }

        if !(self.unplayed_deviation.is_finite() && self.unplayed_deviation > 0.0) {
            return Err(LadderError::ConfigurationError {
                message: "Unplayed deviation must be positive".to_string(),
            }
            .into());
        }

        if !(self.window_days.is_finite() && self.window_days > 0.0) {
            return Err(LadderError::ConfigurationError {
                message: "Decay window must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
