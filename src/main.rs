//! txfall headless runner
//!
//! Plays a session against a synthetic pending-transaction feed with a simple
//! dodging pilot, then prints the final board and scoreboard as JSON.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde_json::json;

use txfall::consts::WIDE_SIZE_THRESHOLD;
use txfall::sim::{BlockKind, Snapshot, SpawnHint};
use txfall::{Session, SessionConfig, SimError};

/// Host frame length
const FRAME: Duration = Duration::from_millis(50);
/// Frames to wait on the death screen before pressing retry
const RETRY_DELAY_FRAMES: u32 = 40;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Session config JSON; defaults are used when absent
    #[arg(long)]
    config: Option<PathBuf>,
    /// Simulated seconds to play
    #[arg(long, default_value_t = 120)]
    seconds: u64,
    /// Seed for both the spawn gate and the synthetic feed
    #[arg(long)]
    seed: Option<u64>,
    /// Pending transactions per second
    #[arg(long, default_value_t = 2.0)]
    feed_rate: f64,
    /// Chance per second that a given pending transaction confirms
    #[arg(long, default_value_t = 0.02)]
    confirm_rate: f64,
    /// Share of transactions that spawn push blocks
    #[arg(long, default_value_t = 0.05)]
    push_rate: f64,
    /// Use the boost once the grace period is over
    #[arg(long)]
    boost: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("txfall: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), SimError> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    let seed = config.seed.unwrap_or_else(rand::random);
    config.seed = Some(seed);

    log::info!("txfall (native) starting with seed {}", seed);
    let mut session = Session::start(&config)?;
    let mut feed = Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15);
    let mut pending: Vec<String> = Vec::new();
    let mut dead_frames = 0u32;

    let frames = cli.seconds * 1000 / FRAME.as_millis() as u64;
    let dt = FRAME.as_secs_f64();
    for _ in 0..frames {
        if feed.random_bool((cli.feed_rate * dt).clamp(0.0, 1.0)) {
            let id = format!("0x{:016x}", feed.random::<u64>());
            let hint = SpawnHint {
                size_hint: feed.random_range(21_000..WIDE_SIZE_THRESHOLD * 2),
                push: feed.random_bool(cli.push_rate.clamp(0.0, 1.0)),
                lane: None,
            };
            if session.notify_event(id.clone(), hint) {
                pending.push(id);
            }
        }

        let confirm_chance = (cli.confirm_rate * dt).clamp(0.0, 1.0);
        pending.retain(|id| {
            if feed.random_bool(confirm_chance) {
                session.confirm(id.clone());
                false
            } else {
                true
            }
        });

        if session.is_dead() {
            if session.is_game_over() {
                log::info!("Game over");
                break;
            }
            dead_frames += 1;
            if dead_frames >= RETRY_DELAY_FRAMES {
                dead_frames = 0;
                pending.clear();
                session.retry();
            }
        } else {
            pilot(&mut session);
            if cli.boost && !session.is_boosting() && !session.snapshot().character.invulnerable {
                session.boost();
            }
        }

        session.advance(FRAME);
    }

    let report = json!({
        "scoreboard": session.scoreboard(),
        "snapshot": session.snapshot(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Step away from the lane if a block is falling toward the character's head
fn pilot(session: &mut Session) {
    let snapshot = session.snapshot();
    let character = &snapshot.character;
    if !threatened(&snapshot, character.col) {
        return;
    }

    let cols = snapshot.tops.len();
    let left = character.col.checked_sub(1).filter(|&c| !threatened(&snapshot, c));
    let right = Some(character.col + 1).filter(|&c| c < cols && !threatened(&snapshot, c));
    match (left, right) {
        (Some(_), _) => session.move_left(),
        (None, Some(_)) => session.move_right(),
        (None, None) => session.jump(),
    }
}

fn threatened(snapshot: &Snapshot, col: usize) -> bool {
    let head = snapshot.character.row;
    snapshot.blocks.iter().any(|b| {
        b.covers(col)
            && !b.settled
            && b.row < head
            && head - b.row <= 3
            && (b.kind == BlockKind::Push || b.row < snapshot.tops[col])
    })
}
