//! Metrics for the ladder
//!
//! This module provides Prometheus metrics for match recording, roster size
//! and the cost of rating updates.

pub mod collector;

pub use collector::{LadderMetrics, MetricsCollector, MetricsTimer, RatingMetrics};
