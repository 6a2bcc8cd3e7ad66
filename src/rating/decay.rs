//! Rating-deviation decay
//!
//! Uncertainty grows while a player is inactive. Right after a match the
//! deviation sits at the configured floor, climbs linearly to the ceiling
//! over `window_days`, and stays there. A player who has never played gets
//! the unplayed deviation.

use crate::config::DecayConfig;
use crate::types::PlayerRating;
use crate::utils::elapsed_days;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Deviation a player should carry at `now` given their last match time.
///
/// Clock skew that puts `last_match` after `now` counts as zero elapsed days.
pub fn deviation_since(
    last_match: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    config: &DecayConfig,
) -> f64 {
    let Some(last_match) = last_match else {
        return config.unplayed_deviation;
    };

    let days = elapsed_days(last_match, now).max(0.0);
    let slope = (config.ceiling - config.floor) / config.window_days;
    (config.floor + slope * days).min(config.ceiling)
}

/// New rating triple with its deviation replaced by the decayed value.
///
/// Rating and volatility are carried over unchanged.
pub fn decay_deviation(
    player: &PlayerRating,
    last_match: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    config: &DecayConfig,
) -> PlayerRating {
    let deviation = deviation_since(last_match, now, config);

    debug!(
        old_deviation = player.deviation,
        new_deviation = deviation,
        ?last_match,
        "Decayed rating deviation"
    );

    player.with_deviation(deviation)
}
