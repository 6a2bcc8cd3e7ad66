//! Rating calculator trait
//!
//! The ladder drives its rating engine through this trait so the engine can
//! be swapped or mocked without touching roster bookkeeping.

use crate::types::{MatchResult, PlayerRating, RatingUpdate};

/// Trait for calculating rating changes after games
#[cfg_attr(test, mockall::automock)]
pub trait RatingCalculator: Send + Sync {
    /// Calculate a player's new rating from one rating period of results
    ///
    /// # Arguments
    /// * `player` - The player's rating before the period
    /// * `results` - One entry per opponent, using opponent snapshots at match time
    ///
    /// # Returns
    /// The old and new rating; an empty `results` slice leaves the rating unchanged
    fn calculate_rating(&self, player: &PlayerRating, results: &[MatchResult]) -> RatingUpdate;

    /// Get the initial rating for new players
    fn get_initial_rating(&self) -> PlayerRating;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;

    /// Update configuration from JSON
    fn update_config(&mut self, config: serde_json::Value) -> crate::error::Result<()>;
}
