//! Common types used throughout the ladder

use crate::error::LadderError;
use serde::{Deserialize, Serialize};
use skillratings::glicko2::Glicko2Rating;
use skillratings::Outcomes;

/// Unique identifier for players
pub type PlayerId = String;

/// Seed rating on the public scale
pub const DEFAULT_RATING: f64 = 1500.0;

/// Rating deviation of a player who has never played
pub const DEFAULT_DEVIATION: f64 = 350.0;

/// Canonical initial volatility
pub const DEFAULT_VOLATILITY: f64 = 0.06;

/// A player's Glicko-2 rating triple on the public scale.
///
/// Values are never mutated in place by the engine: every update and decay
/// produces a fresh `PlayerRating`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerRating {
    pub rating: f64,
    pub deviation: f64,
    pub volatility: f64,
}

impl Default for PlayerRating {
    fn default() -> Self {
        Self {
            rating: DEFAULT_RATING,
            deviation: DEFAULT_DEVIATION,
            volatility: DEFAULT_VOLATILITY,
        }
    }
}

impl PlayerRating {
    pub fn new(rating: f64, deviation: f64, volatility: f64) -> Self {
        Self {
            rating,
            deviation,
            volatility,
        }
    }

    /// Copy of this rating with a different deviation
    pub fn with_deviation(&self, deviation: f64) -> Self {
        Self { deviation, ..*self }
    }

    /// Check the invariants the engine assumes but does not enforce
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.rating.is_finite() {
            return Err(LadderError::InvalidPlayer {
                reason: format!("rating must be finite, got {}", self.rating),
            }
            .into());
        }
        if !(self.deviation.is_finite() && self.deviation > 0.0) {
            return Err(LadderError::InvalidPlayer {
                reason: format!("deviation must be positive, got {}", self.deviation),
            }
            .into());
        }
        if !(self.volatility.is_finite() && self.volatility > 0.0) {
            return Err(LadderError::InvalidPlayer {
                reason: format!("volatility must be positive, got {}", self.volatility),
            }
            .into());
        }
        Ok(())
    }
}

impl From<Glicko2Rating> for PlayerRating {
    fn from(rating: Glicko2Rating) -> Self {
        Self {
            rating: rating.rating,
            deviation: rating.deviation,
            volatility: rating.volatility,
        }
    }
}

impl From<PlayerRating> for Glicko2Rating {
    fn from(rating: PlayerRating) -> Self {
        Self {
            rating: rating.rating,
            deviation: rating.deviation,
            volatility: rating.volatility,
        }
    }
}

/// Outcome of a single game from one player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// Numeric score used by the engine
    pub fn score(self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Loss => 0.0,
            Outcome::Draw => 0.5,
        }
    }

    /// The same game seen from the opponent's side
    pub fn reversed(self) -> Self {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::Loss => Outcome::Win,
            Outcome::Draw => Outcome::Draw,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win => write!(f, "win"),
            Outcome::Loss => write!(f, "loss"),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

impl From<Outcome> for Outcomes {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => Outcomes::WIN,
            Outcome::Loss => Outcomes::LOSS,
            Outcome::Draw => Outcomes::DRAW,
        }
    }
}

/// One game against one opponent, using the opponent's snapshot at match time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub opponent_rating: f64,
    pub opponent_deviation: f64,
    pub score: f64,
}

impl MatchResult {
    pub fn new(opponent_rating: f64, opponent_deviation: f64, score: f64) -> Self {
        Self {
            opponent_rating,
            opponent_deviation,
            score,
        }
    }

    /// Build a result from an opponent snapshot and an outcome
    pub fn against(opponent: &PlayerRating, outcome: Outcome) -> Self {
        Self::new(opponent.rating, opponent.deviation, outcome.score())
    }

    /// Check the input constraints the engine assumes
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.opponent_rating.is_finite() {
            return Err(LadderError::InvalidMatchResult {
                reason: format!("opponent rating must be finite, got {}", self.opponent_rating),
            }
            .into());
        }
        if !(self.opponent_deviation.is_finite() && self.opponent_deviation > 0.0) {
            return Err(LadderError::InvalidMatchResult {
                reason: format!(
                    "opponent deviation must be positive, got {}",
                    self.opponent_deviation
                ),
            }
            .into());
        }
        if ![0.0, 0.5, 1.0].contains(&self.score) {
            return Err(LadderError::InvalidMatchResult {
                reason: format!("score must be 0, 0.5 or 1, got {}", self.score),
            }
            .into());
        }
        Ok(())
    }
}

/// Rating before and after one update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub old_rating: PlayerRating,
    pub new_rating: PlayerRating,
    /// Iterations the volatility solver needed; zero when nothing was solved
    pub solver_iterations: u32,
}

impl RatingUpdate {
    /// Change in public rating
    pub fn rating_delta(&self) -> f64 {
        self.new_rating.rating - self.old_rating.rating
    }
}
