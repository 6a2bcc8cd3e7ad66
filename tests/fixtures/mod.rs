//! Shared builders for integration tests

use chrono::{DateTime, Duration, TimeZone, Utc};
use glicko_ladder::config::AppConfig;
use glicko_ladder::types::{Outcome, PlayerId};
use glicko_ladder::Ladder;

/// Fixed reference time so decay-dependent assertions are deterministic
pub fn season_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 18, 0, 0).unwrap()
}

/// Ladder with default configuration and the given players at the default seed
pub fn ladder_with_players(names: &[&str]) -> (Ladder, Vec<PlayerId>) {
    let mut ladder = Ladder::new(&AppConfig::default()).expect("Failed to create ladder");
    let ids = names
        .iter()
        .map(|name| ladder.add_player(name, None).expect("Failed to add player"))
        .collect();
    (ladder, ids)
}

/// Record `games` as (winner index, loser index), one per day from `season_start`
pub fn play_daily(ladder: &mut Ladder, ids: &[PlayerId], games: &[(usize, usize)]) {
    for (day, &(winner, loser)) in games.iter().enumerate() {
        ladder
            .record_match(
                &ids[winner],
                &ids[loser],
                Outcome::Win,
                season_start() + Duration::days(day as i64),
            )
            .expect("Failed to record match");
    }
}
