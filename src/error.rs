//! Error types for the ladder
//!
//! The rating engine itself is infallible; these errors cover the caller-side
//! validation, roster management and configuration loading around it.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ladder scenarios
#[derive(Debug, thiserror::Error)]
pub enum LadderError {
    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: String },

    #[error("Player already exists: {name}")]
    DuplicatePlayer { name: String },

    #[error("Invalid player: {reason}")]
    InvalidPlayer { reason: String },

    #[error("Player cannot play against themselves: {player_id}")]
    SelfMatch { player_id: String },

    #[error("Invalid match result: {reason}")]
    InvalidMatchResult { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}
