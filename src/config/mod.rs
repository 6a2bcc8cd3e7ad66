//! Configuration management for the ladder
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values for the rating engine, the
//! deviation decay curve and the ladder itself.

pub mod app;
pub mod decay;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, LadderSettings, ServiceSettings};
pub use decay::DecayConfig;
pub use rating::RatingConfig;
