//! Ladder implementation
//!
//! The ladder owns a roster of players and the match history, and drives the
//! rating engine for every recorded match. It never persists anything itself:
//! callers take [`LadderState`] out, store it however they like, and hand it
//! back through [`Ladder::from_state`].

use crate::config::{AppConfig, DecayConfig, LadderSettings};
use crate::error::{LadderError, Result};
use crate::ladder::history::MatchRecord;
use crate::ladder::player::{LeaderboardEntry, PlayerRecord};
use crate::metrics::MetricsCollector;
use crate::rating::calculator::RatingCalculator;
use crate::rating::decay::{decay_deviation, deviation_since};
use crate::rating::glicko2::Glicko2RatingCalculator;
use crate::types::{MatchResult, Outcome, PlayerId, PlayerRating};
use crate::utils::{current_timestamp, generate_entry_id, generate_player_id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Serializable ladder contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LadderState {
    pub players: BTreeMap<PlayerId, PlayerRecord>,
    pub history: Vec<MatchRecord>,
}

/// The ladder
#[derive(Clone)]
pub struct Ladder {
    state: LadderState,
    /// Rating calculator for rating updates
    rating_calculator: Arc<dyn RatingCalculator>,
    decay_config: DecayConfig,
    settings: LadderSettings,
    /// Metrics collector for recording ladder activity
    metrics_collector: Arc<MetricsCollector>,
}

impl Ladder {
    /// Create an empty ladder using the Glicko-2 engine configured by `config`
    pub fn new(config: &AppConfig) -> Result<Self> {
        let calculator = Glicko2RatingCalculator::new(config.rating.clone())?;
        let metrics_collector = Arc::new(MetricsCollector::new()?);

        Ok(Self::with_calculator(
            Arc::new(calculator),
            config.decay.clone(),
            config.ladder.clone(),
            metrics_collector,
        ))
    }

    /// Create an empty ladder with a custom calculator and metrics collector
    pub fn with_calculator(
        rating_calculator: Arc<dyn RatingCalculator>,
        decay_config: DecayConfig,
        settings: LadderSettings,
        metrics_collector: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            state: LadderState::default(),
            rating_calculator,
            decay_config,
            settings,
            metrics_collector,
        }
    }

    /// Rebuild a ladder around previously saved state
    pub fn from_state(state: LadderState, config: &AppConfig) -> Result<Self> {
        let mut ladder = Self::new(config)?;
        ladder.metrics_collector.set_player_count(state.players.len());
        ladder.state = state;
        Ok(ladder)
    }

    /// Current ladder contents
    pub fn state(&self) -> &LadderState {
        &self.state
    }

    pub fn into_state(self) -> LadderState {
        self.state
    }

    /// Get the metrics collector
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics_collector.clone()
    }

    /// Register a new player and return their id.
    ///
    /// The player starts from the calculator's initial rating, optionally
    /// with a different seed rating.
    pub fn add_player(&mut self, name: &str, seed_rating: Option<f64>) -> Result<PlayerId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LadderError::InvalidPlayer {
                reason: "Player name cannot be empty".to_string(),
            }
            .into());
        }

        if self.find_by_name(name).is_some() {
            return Err(LadderError::DuplicatePlayer {
                name: name.to_string(),
            }
            .into());
        }

        let mut rating = self.rating_calculator.get_initial_rating();
        if let Some(seed) = seed_rating {
            rating.rating = seed;
        }
        rating.validate()?;

        let id = generate_player_id();
        let record = PlayerRecord::new(id.clone(), name.to_string(), rating, current_timestamp());
        self.state.players.insert(id.clone(), record);
        self.metrics_collector
            .set_player_count(self.state.players.len());

        info!(player_id = %id, name, rating = rating.rating, "Player added");
        Ok(id)
    }

    /// Remove a player from the roster; their past matches stay in the history
    pub fn remove_player(&mut self, player_id: &str) -> Result<PlayerRecord> {
        let record =
            self.state
                .players
                .remove(player_id)
                .ok_or_else(|| LadderError::PlayerNotFound {
                    player_id: player_id.to_string(),
                })?;

        self.metrics_collector
            .set_player_count(self.state.players.len());

        info!(player_id, name = %record.name, "Player removed");
        Ok(record)
    }

    pub fn player(&self, player_id: &str) -> Option<&PlayerRecord> {
        self.state.players.get(player_id)
    }

    /// Look a player up by name, ignoring case and surrounding whitespace
    pub fn find_by_name(&self, name: &str) -> Option<&PlayerRecord> {
        let name = name.trim();
        self.state
            .players
            .values()
            .find(|record| record.name.eq_ignore_ascii_case(name))
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.state.players.values()
    }

    /// Match history in the order matches were recorded
    pub fn history(&self) -> &[MatchRecord] {
        &self.state.history
    }

    /// Rate a single game between two players.
    ///
    /// `outcome` is from `player_a`'s point of view. Both players' deviations
    /// are first decayed to `played_at`; each side is then rated against the
    /// other's pre-match snapshot, so the order of the two updates does not
    /// matter.
    pub fn record_match(
        &mut self,
        player_a: &str,
        player_b: &str,
        outcome: Outcome,
        played_at: DateTime<Utc>,
    ) -> Result<MatchRecord> {
        if player_a == player_b {
            return Err(LadderError::SelfMatch {
                player_id: player_a.to_string(),
            }
            .into());
        }

        let a = self.get_record(player_a)?.clone();
        let b = self.get_record(player_b)?.clone();

        let timer = self.metrics_collector.start_timer();

        let snapshot_a = decay_deviation(&a.rating, a.last_match, played_at, &self.decay_config);
        let snapshot_b = decay_deviation(&b.rating, b.last_match, played_at, &self.decay_config);

        let update_a = self.rating_calculator.calculate_rating(
            &snapshot_a,
            &[MatchResult::against(&snapshot_b, outcome)],
        );
        let update_b = self.rating_calculator.calculate_rating(
            &snapshot_b,
            &[MatchResult::against(&snapshot_a, outcome.reversed())],
        );

        let new_a = self.apply_deviation_floor(update_a.new_rating);
        let new_b = self.apply_deviation_floor(update_b.new_rating);

        let record = MatchRecord {
            id: generate_entry_id(),
            player_a_id: a.id.clone(),
            player_a_name: a.name.clone(),
            player_b_id: b.id.clone(),
            player_b_name: b.name.clone(),
            outcome,
            old_a_rating: a.rating.rating,
            new_a_rating: new_a.rating,
            old_b_rating: b.rating.rating,
            new_b_rating: new_b.rating,
            timestamp: played_at,
        };

        self.state
            .players
            .insert(a.id.clone(), a.after_match(new_a, outcome, played_at));
        self.state
            .players
            .insert(b.id.clone(), b.after_match(new_b, outcome.reversed(), played_at));
        self.state.history.push(record.clone());

        self.metrics_collector.record_match(
            outcome,
            timer.stop(),
            &[update_a.solver_iterations, update_b.solver_iterations],
        );

        info!(
            player_a = %a.name,
            player_b = %b.name,
            %outcome,
            a_delta = record.a_delta(),
            b_delta = record.b_delta(),
            "Match recorded"
        );

        Ok(record)
    }

    /// Replace every player's deviation with its decayed value at `now`
    pub fn refresh_deviations(&mut self, now: DateTime<Utc>) {
        for record in self.state.players.values_mut() {
            record.rating =
                decay_deviation(&record.rating, record.last_match, now, &self.decay_config);
        }
        self.metrics_collector.record_deviation_refresh();

        debug!(players = self.state.players.len(), %now, "Deviations refreshed");
    }

    /// Players ranked by rating, hiding anyone whose deviation at `now` is at
    /// or above the leaderboard cutoff
    pub fn leaderboard(&self, now: DateTime<Utc>) -> Vec<LeaderboardEntry> {
        let mut visible: Vec<(&PlayerRecord, f64)> = self
            .state
            .players
            .values()
            .map(|record| {
                let deviation = deviation_since(record.last_match, now, &self.decay_config);
                (record, deviation)
            })
            .filter(|(_, deviation)| *deviation < self.settings.leaderboard_max_deviation)
            .collect();

        visible.sort_by(|(a, _), (b, _)| {
            b.rating
                .rating
                .total_cmp(&a.rating.rating)
                .then_with(|| a.name.cmp(&b.name))
        });

        visible
            .into_iter()
            .enumerate()
            .map(|(i, (record, deviation))| LeaderboardEntry {
                rank: i + 1,
                player_id: record.id.clone(),
                name: record.name.clone(),
                rating: record.rating.rating,
                deviation,
                wins: record.wins,
                losses: record.losses,
                draws: record.draws,
            })
            .collect()
    }

    fn get_record(&self, player_id: &str) -> Result<&PlayerRecord> {
        self.state.players.get(player_id).ok_or_else(|| {
            LadderError::PlayerNotFound {
                player_id: player_id.to_string(),
            }
            .into()
        })
    }

    fn apply_deviation_floor(&self, rating: PlayerRating) -> PlayerRating {
        if rating.deviation < self.settings.min_deviation {
            rating.with_deviation(self.settings.min_deviation)
        } else {
            rating
        }
    }
}

impl std::fmt::Debug for Ladder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ladder")
            .field("players", &self.state.players.len())
            .field("history", &self.state.history.len())
            .field("decay_config", &self.decay_config)
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::calculator::MockRatingCalculator;
    use crate::types::RatingUpdate;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 19, 0, 0).unwrap()
    }

    fn ladder() -> Ladder {
        Ladder::new(&AppConfig::default()).unwrap()
    }

    #[test]
    fn test_add_player() {
        let mut ladder = ladder();
        let id = ladder.add_player("  Ada ", Some(1620.0)).unwrap();

        let record = ladder.player(&id).unwrap();
        assert_eq!(record.name, "Ada");
        assert_eq!(record.rating, PlayerRating::new(1620.0, 350.0, 0.06));
        assert_eq!(record.last_match, None);
        assert_eq!(ladder.metrics().ladder().players.get(), 1);
    }

    #[test]
    fn test_add_player_rejects_bad_input() {
        let mut ladder = ladder();
        ladder.add_player("Ada", None).unwrap();

        assert!(ladder.add_player("   ", None).is_err());
        assert!(ladder.add_player("ada", None).is_err());
        assert!(ladder.add_player("Bob", Some(f64::NAN)).is_err());
        assert_eq!(ladder.players().count(), 1);
    }

    #[test]
    fn test_record_match_updates_both_players() {
        let mut ladder = ladder();
        let ada = ladder.add_player("Ada", None).unwrap();
        let bob = ladder.add_player("Bob", None).unwrap();

        let record = ladder
            .record_match(&ada, &bob, Outcome::Win, start())
            .unwrap();

        assert!(record.new_a_rating > 1500.0);
        assert!(record.new_b_rating < 1500.0);
        assert_eq!(record.a_delta(), -record.b_delta());

        let ada = ladder.player(&ada).unwrap();
        let bob = ladder.player(&bob).unwrap();
        assert_eq!((ada.wins, ada.losses), (1, 0));
        assert_eq!((bob.wins, bob.losses), (0, 1));
        assert_eq!(ada.last_match, Some(start()));
        assert!(ada.rating.deviation < 350.0);
        assert!(ada.rating.deviation >= 50.0);
        assert_eq!(ladder.history().len(), 1);
        assert_eq!(
            ladder
                .metrics()
                .ladder()
                .matches_total
                .with_label_values(&["win"])
                .get(),
            1
        );
    }

    #[test]
    fn test_record_match_errors() {
        let mut ladder = ladder();
        let ada = ladder.add_player("Ada", None).unwrap();

        let err = ladder
            .record_match(&ada, &ada, Outcome::Win, start())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LadderError>(),
            Some(LadderError::SelfMatch { .. })
        ));

        let err = ladder
            .record_match(&ada, "missing", Outcome::Draw, start())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LadderError>(),
            Some(LadderError::PlayerNotFound { .. })
        ));
        assert!(ladder.history().is_empty());
    }

    #[test]
    fn test_deviation_floor_applied_after_match() {
        let mut calculator = MockRatingCalculator::new();
        calculator
            .expect_get_initial_rating()
            .returning(PlayerRating::default);
        calculator
            .expect_calculate_rating()
            .times(2)
            .returning(|player, _| RatingUpdate {
                old_rating: *player,
                new_rating: player.with_deviation(12.0),
                solver_iterations: 3,
            });

        let mut ladder = Ladder::with_calculator(
            Arc::new(calculator),
            DecayConfig::default(),
            LadderSettings::default(),
            Arc::new(MetricsCollector::new().unwrap()),
        );
        let ada = ladder.add_player("Ada", None).unwrap();
        let bob = ladder.add_player("Bob", None).unwrap();

        ladder
            .record_match(&ada, &bob, Outcome::Loss, start())
            .unwrap();

        assert_eq!(ladder.player(&ada).unwrap().rating.deviation, 50.0);
        assert_eq!(ladder.player(&bob).unwrap().rating.deviation, 50.0);
        assert_eq!(
            ladder.metrics().rating().solver_iterations.get_sample_count(),
            2
        );
    }

    #[test]
    fn test_each_side_rated_against_pre_match_snapshot() {
        let mut calculator = MockRatingCalculator::new();
        calculator
            .expect_get_initial_rating()
            .returning(PlayerRating::default);
        calculator
            .expect_calculate_rating()
            .withf(|player, results| {
                // Neither side sees the other's post-match rating
                player.rating == 1500.0
                    && results.len() == 1
                    && results[0].opponent_rating == 1500.0
            })
            .times(2)
            .returning(|player, results| RatingUpdate {
                old_rating: *player,
                new_rating: PlayerRating {
                    rating: player.rating + 100.0 * (results[0].score - 0.5),
                    ..*player
                },
                solver_iterations: 0,
            });

        let mut ladder = Ladder::with_calculator(
            Arc::new(calculator),
            DecayConfig::default(),
            LadderSettings::default(),
            Arc::new(MetricsCollector::new().unwrap()),
        );
        let ada = ladder.add_player("Ada", None).unwrap();
        let bob = ladder.add_player("Bob", None).unwrap();

        let record = ladder
            .record_match(&ada, &bob, Outcome::Win, start())
            .unwrap();
        assert_eq!(record.new_a_rating, 1550.0);
        assert_eq!(record.new_b_rating, 1450.0);
    }

    #[test]
    fn test_leaderboard_hides_uncertain_players() {
        let mut ladder = ladder();
        let ada = ladder.add_player("Ada", None).unwrap();
        let bob = ladder.add_player("Bob", None).unwrap();
        ladder.add_player("Cy", Some(2000.0)).unwrap();

        ladder
            .record_match(&ada, &bob, Outcome::Win, start())
            .unwrap();

        let board = ladder.leaderboard(start() + Duration::days(2));
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].name, "Ada");
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[1].name, "Bob");
        assert_eq!(board[1].rank, 2);
        assert_eq!(board[0].deviation, 60.0);

        // Ten days of inactivity pushes both to the cutoff
        assert!(ladder.leaderboard(start() + Duration::days(10)).is_empty());
    }

    #[test]
    fn test_refresh_deviations() {
        let mut ladder = ladder();
        let ada = ladder.add_player("Ada", None).unwrap();
        let bob = ladder.add_player("Bob", None).unwrap();
        let cy = ladder.add_player("Cy", None).unwrap();

        ladder
            .record_match(&ada, &bob, Outcome::Draw, start())
            .unwrap();
        ladder.refresh_deviations(start() + Duration::days(4));

        assert_eq!(ladder.player(&ada).unwrap().rating.deviation, 70.0);
        assert_eq!(ladder.player(&bob).unwrap().rating.deviation, 70.0);
        assert_eq!(ladder.player(&cy).unwrap().rating.deviation, 350.0);
        assert_eq!(ladder.metrics().ladder().deviation_refreshes_total.get(), 1);
    }

    #[test]
    fn test_remove_player_keeps_history() {
        let mut ladder = ladder();
        let ada = ladder.add_player("Ada", None).unwrap();
        let bob = ladder.add_player("Bob", None).unwrap();
        ladder
            .record_match(&ada, &bob, Outcome::Win, start())
            .unwrap();

        let removed = ladder.remove_player(&bob).unwrap();
        assert_eq!(removed.name, "Bob");
        assert!(ladder.player(&bob).is_none());
        assert_eq!(ladder.history().len(), 1);
        assert!(ladder.remove_player(&bob).is_err());
        assert_eq!(ladder.metrics().ladder().players.get(), 1);
    }

    #[test]
    fn test_state_round_trip() {
        let mut ladder = ladder();
        let ada = ladder.add_player("Ada", None).unwrap();
        let bob = ladder.add_player("Bob", None).unwrap();
        ladder
            .record_match(&ada, &bob, Outcome::Win, start())
            .unwrap();

        let json = serde_json::to_string(ladder.state()).unwrap();
        let state: LadderState = serde_json::from_str(&json).unwrap();
        let restored = Ladder::from_state(state, &AppConfig::default()).unwrap();

        assert_eq!(restored.history(), ladder.history());
        for record in ladder.players() {
            let copy = restored.player(&record.id).unwrap();
            assert_eq!(copy.name, record.name);
            assert_eq!(copy.rating.rating, record.rating.rating);
            assert_eq!(copy.last_match, record.last_match);
        }
        assert_eq!(restored.metrics().ladder().players.get(), 2);
    }
}
