#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays whack-a-mole sessions headlessly.

mod autoplay;
mod config_file;

use std::{
    path::PathBuf,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use whack_session::GameSession;

use crate::autoplay::Autoplayer;

/// Seed mixed into the autoplayer's generator so it never mirrors the scheduler.
const PLAYER_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Debug, Parser)]
#[command(name = "whack", about = "Whack-a-mole round scheduler and scoring engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Play a headless session with a scripted player and print a summary.
    Play(PlayArgs),
    /// Print the default session configuration as TOML.
    Config,
}

#[derive(Debug, Args)]
struct PlayArgs {
    /// Seed for every random draw; derived from the wall clock when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file overriding the default session configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override for the last playable round.
    #[arg(long)]
    max_rounds: Option<u32>,

    /// Probability that the player leaves a hostile target alone.
    #[arg(long, default_value_t = 0.9)]
    accuracy: f64,

    /// Delay between a target appearing and the player's swing, in milliseconds.
    #[arg(long, default_value_t = 350)]
    reaction_ms: u64,

    /// Simulated frame length, in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Log every notification the session emits.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => run_play(args),
        Commands::Config => {
            print!("{}", config_file::render_default()?);
            Ok(())
        }
    }
}

fn run_play(args: PlayArgs) -> Result<()> {
    init_tracing(args.verbose)?;

    if !(0.0..=1.0).contains(&args.accuracy) {
        bail!("accuracy {} must lie within 0..=1", args.accuracy);
    }
    if args.frame_ms == 0 {
        bail!("frame length must be at least one millisecond");
    }

    let mut config = config_file::load(args.config.as_deref())?;
    if let Some(max_rounds) = args.max_rounds {
        config.max_rounds = max_rounds;
    }

    let seed = match args.seed {
        Some(seed) => seed,
        None => wall_clock_seed()?,
    };
    let mut session = GameSession::new(config, seed).context("invalid session configuration")?;
    info!(seed, "starting headless session");

    let mut player = Autoplayer::new(
        args.accuracy,
        Duration::from_millis(args.reaction_ms),
        seed ^ PLAYER_SEED_SALT,
    );
    let summary = player.play(&mut session, Duration::from_millis(args.frame_ms));
    println!("{summary}");
    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!(error))
}

fn wall_clock_seed() -> Result<u64> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is set before the unix epoch")?;
    Ok(elapsed.as_nanos() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn play_flags_parse() {
        let cli = Cli::try_parse_from([
            "whack",
            "play",
            "--seed",
            "7",
            "--max-rounds",
            "3",
            "--accuracy",
            "0.5",
            "--reaction-ms",
            "200",
            "--frame-ms",
            "10",
            "--verbose",
        ])
        .expect("valid arguments");

        let Commands::Play(args) = cli.command else {
            panic!("expected the play subcommand");
        };
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.max_rounds, Some(3));
        assert_eq!(args.accuracy, 0.5);
        assert_eq!(args.reaction_ms, 200);
        assert_eq!(args.frame_ms, 10);
        assert!(args.verbose);
        assert_eq!(args.config, None);
    }

    #[test]
    fn config_subcommand_takes_no_arguments() {
        assert!(Cli::try_parse_from(["whack", "config", "--seed", "1"]).is_err());
    }
}
