//! Glicko Ladder - Glicko-2 ratings for a competitive ladder
//!
//! This crate provides a pure Glicko-2 rating engine (scale conversion,
//! volatility solving, rating updates and inactivity-driven deviation decay)
//! plus an in-memory ladder that drives it match by match.

pub mod config;
pub mod error;
pub mod ladder;
pub mod metrics;
pub mod rating;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LadderError, Result};
pub use types::*;

// Re-export key components
pub use ladder::{Ladder, LadderState};
pub use rating::{decay_deviation, update_rating, Glicko2RatingCalculator, RatingCalculator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
