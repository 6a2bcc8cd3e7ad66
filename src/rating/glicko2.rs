//! Glicko-2 rating update engine
//!
//! Given a player's current triple and the results of one rating period,
//! computes the new triple. The arithmetic runs on the internal Glicko-2
//! scale; only the final triple is converted back to the public scale.

use crate::config::RatingConfig;
use crate::rating::calculator::RatingCalculator;
use crate::rating::scale::{from_internal_scale, to_internal_scale};
use crate::rating::volatility::solve_volatility;
use crate::types::{MatchResult, PlayerRating, RatingUpdate};
use std::f64::consts::PI;
use tracing::debug;

/// De-weighting factor for an opponent with internal deviation `phi`
pub fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * phi * phi / (PI * PI)).sqrt()
}

/// Expected score of a player at `mu` against an opponent at `(mu_j, phi_j)`
pub fn expected_score(mu: f64, mu_j: f64, phi_j: f64) -> f64 {
    1.0 / (1.0 + (-g(phi_j) * (mu - mu_j)).exp())
}

/// Compute the new rating triple for one rating period.
///
/// An empty `results` slice carries no information and returns the player
/// unchanged. The returned rating is rounded to the nearest integer; the
/// deviation and volatility are not.
pub fn update_rating(
    player: &PlayerRating,
    results: &[MatchResult],
    config: &RatingConfig,
) -> PlayerRating {
    rate_period(player, results, config).new_rating
}

/// Same as [`update_rating`], also reporting the old triple and solver effort
pub fn rate_period(
    player: &PlayerRating,
    results: &[MatchResult],
    config: &RatingConfig,
) -> RatingUpdate {
    if results.is_empty() {
        return RatingUpdate {
            old_rating: *player,
            new_rating: *player,
            solver_iterations: 0,
        };
    }

    let (mu, phi) = to_internal_scale(player.rating, player.deviation);

    // g and E are computed once per opponent and reused for v, delta and mu'
    let mut variance_sum = 0.0;
    let mut improvement_sum = 0.0;
    for result in results {
        let (mu_j, phi_j) = to_internal_scale(result.opponent_rating, result.opponent_deviation);
        let g_j = g(phi_j);
        let e_j = expected_score(mu, mu_j, phi_j);

        variance_sum += g_j * g_j * e_j * (1.0 - e_j);
        improvement_sum += g_j * (result.score - e_j);
    }

    let v = 1.0 / variance_sum;
    let delta = v * improvement_sum;

    let solution = solve_volatility(phi, player.volatility, delta, v, config);
    let sigma_prime = solution.volatility;

    let phi_star = (phi * phi + sigma_prime * sigma_prime).sqrt();
    let phi_prime = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / v).sqrt();
    let mu_prime = mu + phi_prime * phi_prime * improvement_sum;

    let (rating, deviation) = from_internal_scale(mu_prime, phi_prime);
    let new_rating = PlayerRating::new(rating.round(), deviation, sigma_prime);

    debug!(
        games = results.len(),
        v,
        delta,
        old_rating = player.rating,
        new_rating = new_rating.rating,
        new_deviation = new_rating.deviation,
        new_volatility = new_rating.volatility,
        solver_iterations = solution.iterations,
        "Rated period"
    );

    RatingUpdate {
        old_rating: *player,
        new_rating,
        solver_iterations: solution.iterations,
    }
}

/// Glicko-2 rating calculator implementation
#[derive(Debug, Clone, Default)]
pub struct Glicko2RatingCalculator {
    config: RatingConfig,
}

impl Glicko2RatingCalculator {
    /// Create a new Glicko-2 rating calculator
    pub fn new(config: RatingConfig) -> crate::error::Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    pub fn rating_config(&self) -> &RatingConfig {
        &self.config
    }

    /// Probability that `player` beats `opponent`
    pub fn calculate_expected_score(&self, player: &PlayerRating, opponent: &PlayerRating) -> f64 {
        let (mu, _) = to_internal_scale(player.rating, player.deviation);
        let (mu_j, phi_j) = to_internal_scale(opponent.rating, opponent.deviation);
        expected_score(mu, mu_j, phi_j)
    }
}

impl RatingCalculator for Glicko2RatingCalculator {
    fn calculate_rating(&self, player: &PlayerRating, results: &[MatchResult]) -> RatingUpdate {
        rate_period(player, results, &self.config)
    }

    fn get_initial_rating(&self) -> PlayerRating {
        self.config.initial_rating()
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }

    fn update_config(&mut self, config: serde_json::Value) -> crate::error::Result<()> {
        let new_config: RatingConfig = serde_json::from_value(config).map_err(|e| {
            crate::error::LadderError::ConfigurationError {
                message: format!("Invalid Glicko-2 configuration: {}", e),
            }
        })?;

        new_config.validate()?;
        self.config = new_config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;
    use skillratings::glicko2::{glicko2, Glicko2Config, Glicko2Rating};

    fn rating(rating: f64, deviation: f64) -> PlayerRating {
        PlayerRating::new(rating, deviation, 0.06)
    }

    #[test]
    fn test_g_and_expected_score() {
        assert_eq!(g(0.0), 1.0);
        assert!(g(2.0) < g(0.5));
        assert_eq!(expected_score(0.3, 0.3, 1.0), 0.5);
        assert!(expected_score(1.0, 0.0, 0.5) > 0.5);
    }

    #[test]
    fn test_empty_results_is_identity() {
        let player = PlayerRating::new(1612.4, 87.3, 0.0571);
        let update = rate_period(&player, &[], &RatingConfig::default());

        assert_eq!(update.new_rating, player);
        assert_eq!(update.old_rating, player);
        assert_eq!(update.solver_iterations, 0);
    }

    #[test]
    fn test_glickman_worked_example() {
        let player = rating(1500.0, 200.0);
        let results = [
            MatchResult::new(1400.0, 30.0, 1.0),
            MatchResult::new(1550.0, 100.0, 0.0),
            MatchResult::new(1700.0, 300.0, 0.0),
        ];

        let new = update_rating(&player, &results, &RatingConfig::default());

        assert_eq!(new.rating, 1464.0);
        assert!((new.deviation - 151.52).abs() < 0.01);
        assert!((new.volatility - 0.05999).abs() < 1e-5);
    }

    #[test]
    fn test_equal_players_decisive_game() {
        let a = rating(1500.0, 200.0);
        let b = rating(1500.0, 200.0);
        let config = RatingConfig::default();

        let new_a = update_rating(&a, &[MatchResult::against(&b, Outcome::Win)], &config);
        let new_b = update_rating(&b, &[MatchResult::against(&a, Outcome::Loss)], &config);

        assert!(new_a.rating > 1500.0);
        assert!(new_b.rating < 1500.0);
        assert_eq!(new_a.rating - 1500.0, 1500.0 - new_b.rating);
        assert_eq!(new_a.rating, 1579.0);
        assert!(new_a.deviation < 200.0);
        assert!(new_b.deviation < 200.0);
        assert!((new_a.deviation - new_b.deviation).abs() < 1e-9);
    }

    #[test]
    fn test_draw_between_equals_keeps_rating() {
        let a = rating(1500.0, 150.0);
        let new_a = update_rating(
            &a,
            &[MatchResult::against(&a, Outcome::Draw)],
            &RatingConfig::default(),
        );
        assert_eq!(new_a.rating, 1500.0);
        assert!(new_a.deviation < 150.0);
    }

    #[test]
    fn test_lower_deviation_means_smaller_swing() {
        let opponent = rating(1500.0, 200.0);
        let config = RatingConfig::default();
        let result = [MatchResult::against(&opponent, Outcome::Win)];

        let uncertain = update_rating(&rating(1500.0, 300.0), &result, &config);
        let settled = update_rating(&rating(1500.0, 100.0), &result, &config);

        assert!(uncertain.rating - 1500.0 > settled.rating - 1500.0);
        assert!(settled.rating > 1500.0);
    }

    #[test]
    fn test_upset_raises_volatility() {
        let underdog = rating(1200.0, 60.0);
        let favourite = rating(1900.0, 60.0);
        let new = update_rating(
            &underdog,
            &[MatchResult::against(&favourite, Outcome::Win)],
            &RatingConfig::default(),
        );
        assert!(new.volatility > 0.06);
    }

    #[test]
    fn test_matches_skillratings_glicko2() {
        let config = RatingConfig::default();
        let reference_config = Glicko2Config {
            tau: config.tau,
            convergence_tolerance: config.convergence_tolerance,
        };

        let cases = [
            (rating(1500.0, 200.0), rating(1500.0, 200.0), Outcome::Win),
            (rating(1720.0, 80.0), rating(1430.0, 140.0), Outcome::Loss),
            (rating(1310.0, 350.0), rating(1650.0, 60.0), Outcome::Draw),
        ];

        for (player, opponent, outcome) in cases {
            let ours = update_rating(&player, &[MatchResult::against(&opponent, outcome)], &config);
            let (theirs, _) = glicko2(
                &Glicko2Rating::from(player),
                &Glicko2Rating::from(opponent),
                &outcome.into(),
                &reference_config,
            );

            assert!((ours.rating - theirs.rating).abs() <= 0.51);
            assert!((ours.deviation - theirs.deviation).abs() < 0.01);
            assert!((ours.volatility - theirs.volatility).abs() < 1e-5);
        }
    }

    #[test]
    fn test_calculator_trait() {
        let mut calculator = Glicko2RatingCalculator::new(RatingConfig::default()).unwrap();
        assert_eq!(calculator.get_initial_rating(), PlayerRating::default());

        let player = rating(1500.0, 200.0);
        let update = calculator.calculate_rating(&player, &[MatchResult::new(1500.0, 200.0, 1.0)]);
        assert_eq!(update.old_rating, player);
        assert_eq!(update.rating_delta(), 79.0);
        assert!(update.solver_iterations > 0);

        let config = calculator.config();
        assert_eq!(config["tau"], 0.5);

        calculator
            .update_config(serde_json::json!({ "tau": 0.9, "default_volatility": 0.05 }))
            .unwrap();
        assert_eq!(calculator.rating_config().tau, 0.9);
        assert_eq!(calculator.get_initial_rating().volatility, 0.05);

        assert!(calculator
            .update_config(serde_json::json!({ "tau": -1.0 }))
            .is_err());
        assert_eq!(calculator.rating_config().tau, 0.9);
    }

    #[test]
    fn test_expected_score_between_players() {
        let calculator = Glicko2RatingCalculator::default();
        let strong = rating(1800.0, 80.0);
        let weak = rating(1400.0, 80.0);

        let p = calculator.calculate_expected_score(&strong, &weak);
        let q = calculator.calculate_expected_score(&weak, &strong);
        assert!(p > 0.85);
        assert!((p + q - 1.0).abs() < 1e-12);
    }
}
