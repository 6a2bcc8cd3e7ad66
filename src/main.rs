//! Command-line entry point for the Glicko ladder
//!
//! Rates single periods, computes decayed deviations and replays recorded
//! match lists through an in-memory ladder.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use glicko_ladder::config::AppConfig;
use glicko_ladder::rating::{deviation_since, Glicko2RatingCalculator, RatingCalculator};
use glicko_ladder::types::{MatchResult, Outcome, PlayerRating};
use glicko_ladder::utils::current_timestamp;
use glicko_ladder::Ladder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Glicko Ladder - Glicko-2 ratings for a competitive ladder
#[derive(Parser)]
#[command(
    name = "glicko-ladder",
    version,
    about = "Glicko-2 rating engine and ladder tools",
    long_about = "Glicko Ladder rates matches with the Glicko-2 algorithm, models growing \
                 uncertainty for inactive players, and replays recorded match lists into a \
                 leaderboard."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rate one period of results and print the new rating as JSON
    Rate {
        #[arg(long)]
        rating: f64,
        #[arg(long)]
        deviation: f64,
        #[arg(long)]
        volatility: Option<f64>,
        /// Opponent result as RATING:DEVIATION:SCORE, repeatable
        #[arg(long = "opponent", value_name = "R:RD:S", value_parser = parse_opponent)]
        opponents: Vec<MatchResult>,
    },
    /// Print the deviation a player carries after inactivity
    Decay {
        /// Time of the last match (RFC 3339); omit for a player who never played
        #[arg(long, value_name = "TIME")]
        last_match: Option<DateTime<Utc>>,
        /// Evaluation time (RFC 3339), defaults to now
        #[arg(long, value_name = "TIME")]
        now: Option<DateTime<Utc>>,
    },
    /// Replay a JSON roster and match list and print the leaderboard
    Replay {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Leaderboard time (RFC 3339), defaults to now
        #[arg(long, value_name = "TIME")]
        now: Option<DateTime<Utc>>,
        /// Print Prometheus metrics after the leaderboard
        #[arg(long)]
        metrics: bool,
    },
}

/// Input for the `replay` command
#[derive(Debug, Deserialize)]
struct ReplayFile {
    players: Vec<ReplayPlayer>,
    #[serde(default)]
    matches: Vec<ReplayMatch>,
}

#[derive(Debug, Deserialize)]
struct ReplayPlayer {
    name: String,
    rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ReplayMatch {
    player_a: String,
    player_b: String,
    outcome: Outcome,
    played_at: DateTime<Utc>,
}

fn parse_opponent(value: &str) -> std::result::Result<MatchResult, String> {
    let parts: Vec<&str> = value.split(':').collect();
    let [rating, deviation, score] = parts.as_slice() else {
        return Err(format!("expected RATING:DEVIATION:SCORE, got '{}'", value));
    };

    let parse = |field: &str, name: &str| {
        field
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid {} '{}'", name, field))
    };

    let result = MatchResult::new(
        parse(*rating, "rating")?,
        parse(*deviation, "deviation")?,
        parse(*score, "score")?,
    );
    result.validate().map_err(|e| e.to_string())?;
    Ok(result)
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment, file and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env()?,
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    glicko_ladder::config::validate_config(&config)?;
    Ok(config)
}

fn run_rate(
    config: &AppConfig,
    rating: f64,
    deviation: f64,
    volatility: Option<f64>,
    opponents: &[MatchResult],
) -> Result<()> {
    let calculator = Glicko2RatingCalculator::new(config.rating.clone())?;
    let player = PlayerRating::new(
        rating,
        deviation,
        volatility.unwrap_or(config.rating.default_volatility),
    );
    player.validate()?;

    let update = calculator.calculate_rating(&player, opponents);
    debug!(solver_iterations = update.solver_iterations, "Rated period");

    println!("{}", serde_json::to_string_pretty(&update.new_rating)?);
    Ok(())
}

fn run_decay(config: &AppConfig, last_match: Option<DateTime<Utc>>, now: DateTime<Utc>) {
    let deviation = deviation_since(last_match, now, &config.decay);
    println!("{:.1}", deviation);
}

fn run_replay(config: &AppConfig, file: &Path, now: DateTime<Utc>, metrics: bool) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read replay file {}", file.display()))?;
    let replay: ReplayFile = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse replay file {}", file.display()))?;

    let mut ladder = Ladder::new(config)?;
    for player in &replay.players {
        ladder.add_player(&player.name, player.rating)?;
    }

    let mut matches = replay.matches;
    matches.sort_by_key(|m| m.played_at);

    for game in &matches {
        let a = lookup_id(&ladder, &game.player_a)?;
        let b = lookup_id(&ladder, &game.player_b)?;
        ladder.record_match(&a, &b, game.outcome, game.played_at)?;
    }

    info!(
        players = replay.players.len(),
        matches = matches.len(),
        "Replay complete"
    );

    println!("Leaderboard ({})", now.format("%Y-%m-%d %H:%M UTC"));
    let board = ladder.leaderboard(now);
    if board.is_empty() {
        println!("  No players with a settled rating");
    }
    for entry in &board {
        println!("{}", entry);
    }

    println!();
    println!("History");
    for record in ladder.history() {
        println!("  {}", record);
    }

    if metrics {
        println!();
        print!("{}", ladder.metrics().gather_text()?);
    }

    Ok(())
}

fn lookup_id(ladder: &Ladder, name: &str) -> Result<String> {
    ladder
        .find_by_name(name)
        .map(|record| record.id.clone())
        .ok_or_else(|| {
            glicko_ladder::LadderError::PlayerNotFound {
                player_id: name.to_string(),
            }
            .into()
        })
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    match &args.command {
        Command::Rate {
            rating,
            deviation,
            volatility,
            opponents,
        } => run_rate(&config, *rating, *deviation, *volatility, opponents),
        Command::Decay { last_match, now } => {
            run_decay(&config, *last_match, now.unwrap_or_else(current_timestamp));
            Ok(())
        }
        Command::Replay { file, now, metrics } => run_replay(
            &config,
            file,
            now.unwrap_or_else(current_timestamp),
            *metrics,
        ),
    }
}
