//! Player records kept by the ladder

use crate::types::{Outcome, PlayerId, PlayerRating};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered player with their current rating and match tally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub rating: PlayerRating,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Time of the most recent rated match, `None` until the first one
    pub last_match: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PlayerRecord {
    /// Create a record for a player who has not played yet
    pub fn new(
        id: PlayerId,
        name: String,
        rating: PlayerRating,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            rating,
            wins: 0,
            losses: 0,
            draws: 0,
            last_match: None,
            created_at,
        }
    }

    /// Record after one more rated match
    pub fn after_match(
        &self,
        rating: PlayerRating,
        outcome: Outcome,
        played_at: DateTime<Utc>,
    ) -> Self {
        let mut next = self.clone();
        next.rating = rating;
        match outcome {
            Outcome::Win => next.wins += 1,
            Outcome::Loss => next.losses += 1,
            Outcome::Draw => next.draws += 1,
        }
        next.last_match = Some(played_at);
        next
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

/// One visible row of the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position
    pub rank: usize,
    pub player_id: PlayerId,
    pub name: String,
    pub rating: f64,
    /// Deviation decayed to the time the leaderboard was built
    pub deviation: f64,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl std::fmt::Display for LeaderboardEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:>3}. {} {:.0} (±{:.1}) {}-{}",
            self.rank, self.name, self.rating, self.deviation, self.wins, self.losses
        )?;
        if self.draws > 0 {
            write!(f, "-{}", self.draws)?;
        }
        Ok(())
    }
}
