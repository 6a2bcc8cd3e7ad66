//! Main application configuration
//!
//! This module defines the top-level configuration for the ladder, including
//! environment variable loading, TOML file loading and validation.

use crate::config::{DecayConfig, RatingConfig};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub decay: DecayConfig,
    pub ladder: LadderSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Ladder policy applied around the rating engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderSettings {
    /// Deviation floor applied after each rated match
    pub min_deviation: f64,
    /// Players at or above this deviation are hidden from the leaderboard
    pub leaderboard_max_deviation: f64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "glicko-ladder".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for LadderSettings {
    fn default() -> Self {
        Self {
            min_deviation: 50.0,
            leaderboard_max_deviation: 100.0,
        }
    }
}

/// Parse an environment variable into `target` if it is set
fn override_from_env<T: FromStr>(key: &str, target: &mut T) -> Result<()> {
    if let Ok(value) = env::var(key) {
        *target = value
            .parse()
            .map_err(|_| anyhow!("Invalid {} value: {}", key, value))?;
    }
    Ok(())
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still override it
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse configuration from TOML text without consulting the environment
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Rating engine settings
        override_from_env("GLICKO_TAU", &mut self.rating.tau)?;
        override_from_env(
            "GLICKO_CONVERGENCE_TOLERANCE",
            &mut self.rating.convergence_tolerance,
        )?;
        override_from_env(
            "GLICKO_MAX_SOLVER_ITERATIONS",
            &mut self.rating.max_solver_iterations,
        )?;
        override_from_env("DEFAULT_RATING", &mut self.rating.default_rating)?;
        override_from_env("DEFAULT_DEVIATION", &mut self.rating.default_deviation)?;
        override_from_env("DEFAULT_VOLATILITY", &mut self.rating.default_volatility)?;

        // Decay settings
        override_from_env("DECAY_FLOOR", &mut self.decay.floor)?;
        override_from_env("DECAY_CEILING", &mut self.decay.ceiling)?;
        override_from_env("DECAY_WINDOW_DAYS", &mut self.decay.window_days)?;
        override_from_env("UNPLAYED_DEVIATION", &mut self.decay.unplayed_deviation)?;

        // Ladder settings
        override_from_env("MIN_DEVIATION", &mut self.ladder.min_deviation)?;
        override_from_env(
            "LEADERBOARD_MAX_DEVIATION",
            &mut self.ladder.leaderboard_max_deviation,
        )?;

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    config.rating.validate()?;
    config.decay.validate()?;

    // Validate ladder settings
    if !(config.ladder.min_deviation.is_finite() && config.ladder.min_deviation > 0.0) {
        return Err(anyhow!("Minimum deviation must be positive"));
    }
    if !(config.ladder.leaderboard_max_deviation.is_finite()
        && config.ladder.leaderboard_max_deviation > 0.0)
    {
        return Err(anyhow!("Leaderboard deviation cutoff must be positive"));
    }

    Ok(())
}
