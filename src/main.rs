//! Grid Invaders entry point
//!
//! Headless scheduler: runs a session under the autopilot for a fixed number
//! of ticks, logs what happens, and prints the final frame as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use grid_invaders::settings::Difficulty;
use grid_invaders::sim::GameEvent;
use grid_invaders::{Session, Settings};

/// Default run length (about a minute at 60 frames per second)
const DEFAULT_TICKS: u64 = 3600;

/// Headless Grid Invaders runner
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON settings file
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Difficulty preset (easy, normal, hard)
    #[arg(long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,

    /// Run seed, overriding the settings file
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(
        long,
        default_value_t = DEFAULT_TICKS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    ticks: u64,

    /// Start a new run when the current one ends instead of stopping
    #[arg(long)]
    restart: bool,
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::parse(s).ok_or_else(|| format!("unknown difficulty: {s}"))
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::WaveCleared { wave, speed } => {
            log::info!("Wave {} cleared, speed now {:.2}", wave, speed)
        }
        GameEvent::PlayerHit { lives } => log::info!("Player hit, {} lives left", lives),
        GameEvent::BarricadeDestroyed { index } => log::info!("Barricade {} destroyed", index),
        GameEvent::GameOver { reason } => log::info!("Game over: {:?}", reason),
        other => log::debug!("{:?}", other),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    let mut settings = args
        .settings
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();
    if let Some(difficulty) = args.difficulty {
        settings.apply_difficulty(difficulty);
    }
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }

    log::info!("Grid Invaders (headless) starting...");
    let mut session = Session::new(settings);
    session.set_idle(true);

    for _ in 0..args.ticks {
        if session.is_over() {
            if !args.restart {
                break;
            }
            log::info!("Final score {}", session.state().score);
            session.restart();
        }
        for event in session.step() {
            log_event(event);
        }
    }

    let state = session.state();
    log::info!(
        "Stopped after {} ticks: score {}, wave {}, lives {}",
        state.time_ticks,
        state.score,
        state.wave_index + 1,
        state.lives
    );

    match serde_json::to_string_pretty(&session.snapshot()) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Could not encode snapshot: {}", e);
            ExitCode::FAILURE
        }
    }
}
