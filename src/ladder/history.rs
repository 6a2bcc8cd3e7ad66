//! Match history (action log) entries

use crate::types::{Outcome, PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recorded match with both players' ratings before and after
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: Uuid,
    pub player_a_id: PlayerId,
    pub player_a_name: String,
    pub player_b_id: PlayerId,
    pub player_b_name: String,
    /// Outcome for player A
    pub outcome: Outcome,
    pub old_a_rating: f64,
    pub new_a_rating: f64,
    pub old_b_rating: f64,
    pub new_b_rating: f64,
    pub timestamp: DateTime<Utc>,
}

impl MatchRecord {
    /// Rating change for player A
    pub fn a_delta(&self) -> f64 {
        self.new_a_rating - self.old_a_rating
    }

    /// Rating change for player B
    pub fn b_delta(&self) -> f64 {
        self.new_b_rating - self.old_b_rating
    }
}

impl std::fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let a = format!(
            "{} ({:.0}→{:.0})",
            self.player_a_name, self.old_a_rating, self.new_a_rating
        );
        let b = format!(
            "{} ({:.0}→{:.0})",
            self.player_b_name, self.old_b_rating, self.new_b_rating
        );
        let date = self.timestamp.format("%Y-%m-%d");

        match self.outcome {
            Outcome::Win => write!(f, "{}: {} beat {}", date, a, b),
            Outcome::Loss => write!(f, "{}: {} beat {}", date, b, a),
            Outcome::Draw => write!(f, "{}: {} drew with {}", date, a, b),
        }
    }
}
