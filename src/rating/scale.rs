//! Conversion between the public rating scale and the internal Glicko-2 scale

use crate::types::DEFAULT_RATING;

/// Ratio between the public and internal scales, `400 / ln(10)`
pub const GLICKO2_SCALE: f64 = 400.0 / std::f64::consts::LN_10;

/// Map `(rating, deviation)` to `(mu, phi)`
pub fn to_internal_scale(rating: f64, deviation: f64) -> (f64, f64) {
    (
        (rating - DEFAULT_RATING) / GLICKO2_SCALE,
        deviation / GLICKO2_SCALE,
    )
}

/// Map `(mu, phi)` back to `(rating, deviation)`
pub fn from_internal_scale(mu: f64, phi: f64) -> (f64, f64) {
    (mu * GLICKO2_SCALE + DEFAULT_RATING, phi * GLICKO2_SCALE)
}
