//! Metrics collection using Prometheus
//!
//! Counters and histograms describing ladder activity and rating engine cost.

use crate::types::Outcome;
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the ladder
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Ladder-related metrics
    ladder_metrics: LadderMetrics,

    /// Rating engine metrics
    rating_metrics: RatingMetrics,
}

/// Ladder-related metrics
#[derive(Clone)]
pub struct LadderMetrics {
    /// Matches recorded, labelled by outcome for the first-named player
    pub matches_total: IntCounterVec,

    /// Players currently on the ladder
    pub players: IntGauge,

    /// Deviation refresh passes over the roster
    pub deviation_refreshes_total: IntCounter,
}

/// Rating engine metrics
#[derive(Clone)]
pub struct RatingMetrics {
    /// Time spent rating one match (both sides)
    pub rating_update_duration: Histogram,

    /// Regula-falsi iterations per volatility solve
    pub solver_iterations: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let ladder_metrics = LadderMetrics::new(&registry)?;
        let rating_metrics = RatingMetrics::new(&registry)?;

        Ok(Self {
            registry,
            ladder_metrics,
            rating_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get ladder metrics
    pub fn ladder(&self) -> &LadderMetrics {
        &self.ladder_metrics
    }

    /// Get rating engine metrics
    pub fn rating(&self) -> &RatingMetrics {
        &self.rating_metrics
    }

    /// Record a rated match
    pub fn record_match(&self, outcome: Outcome, duration: Duration, solver_iterations: &[u32]) {
        let outcome_str = match outcome {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Draw => "draw",
        };

        self.ladder_metrics
            .matches_total
            .with_label_values(&[outcome_str])
            .inc();

        self.rating_metrics
            .rating_update_duration
            .observe(duration.as_secs_f64());

        for &iterations in solver_iterations {
            self.rating_metrics
                .solver_iterations
                .observe(f64::from(iterations));
        }
    }

    /// Update the roster size gauge
    pub fn set_player_count(&self, count: usize) {
        self.ladder_metrics.players.set(count as i64);
    }

    /// Record a deviation refresh pass
    pub fn record_deviation_refresh(&self) {
        self.ladder_metrics.deviation_refreshes_total.inc();
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }

    /// Render all registered metrics in the Prometheus text format
    pub fn gather_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl LadderMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let matches_total = IntCounterVec::new(
            Opts::new("glicko_ladder_matches_total", "Total matches recorded"),
            &["outcome"],
        )?;
        registry.register(Box::new(matches_total.clone()))?;

        let players = IntGauge::new("glicko_ladder_players", "Players on the ladder")?;
        registry.register(Box::new(players.clone()))?;

        let deviation_refreshes_total = IntCounter::new(
            "glicko_ladder_deviation_refreshes_total",
            "Deviation refresh passes over the roster",
        )?;
        registry.register(Box::new(deviation_refreshes_total.clone()))?;

        Ok(Self {
            matches_total,
            players,
            deviation_refreshes_total,
        })
    }
}

impl RatingMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let rating_update_duration = Histogram::with_opts(
            HistogramOpts::new(
                "glicko_ladder_rating_update_duration_seconds",
                "Time spent rating one match",
            )
            .buckets(vec![0.000_001, 0.000_01, 0.000_1, 0.001, 0.01]),
        )?;
        registry.register(Box::new(rating_update_duration.clone()))?;

        let solver_iterations = Histogram::with_opts(
            HistogramOpts::new(
                "glicko_ladder_volatility_solver_iterations",
                "Regula-falsi iterations per volatility solve",
            )
            .buckets(vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0]),
        )?;
        registry.register(Box::new(solver_iterations.clone()))?;

        Ok(Self {
            rating_update_duration,
            solver_iterations,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}
