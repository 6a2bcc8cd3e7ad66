//! Glicko-2 rating engine
//!
//! This module provides the scale conversion, the volatility solver, the
//! rating update itself and the inactivity-driven deviation decay. Every
//! function here is pure: it takes rating triples by reference and returns
//! new ones.

pub mod calculator;
pub mod decay;
pub mod glicko2;
pub mod scale;
pub mod volatility;

// Re-export commonly used types
pub use calculator::RatingCalculator;
pub use decay::{decay_deviation, deviation_since};
pub use glicko2::{rate_period, update_rating, Glicko2RatingCalculator};
pub use scale::{from_internal_scale, to_internal_scale, GLICKO2_SCALE};
pub use volatility::{solve_volatility, VolatilityObjective, VolatilitySolution};
