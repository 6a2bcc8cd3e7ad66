//! In-memory competitive ladder
//!
//! This module keeps the player roster and match history, rates matches via
//! a [`RatingCalculator`](crate::rating::RatingCalculator), and builds the
//! leaderboard.

pub mod history;
pub mod manager;
pub mod player;

pub use history::MatchRecord;
pub use manager::{Ladder, LadderState};
pub use player::{LeaderboardEntry, PlayerRecord};
