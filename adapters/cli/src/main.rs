#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Maze Escape level headlessly.
//!
//! A level is loaded from disk or picked from the built-in set, a move script
//! is replayed through the frame scheduler, and the final board is printed.

mod levels;
mod render;
mod script;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use maze_escape_core::{Consumable, InventoryLedger, PlayMode};
use maze_escape_system_scheduler::{Scheduler, SchedulerConfig};
use maze_escape_world::{query, Config, SeededDice, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{levels::Builtin, script::Step};

/// Play mode selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Everyone must survive; one escape ends the level for all.
    Shared,
    /// First participant to escape wins.
    Race,
}

impl From<ModeArg> for PlayMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Shared => PlayMode::Shared,
            ModeArg::Race => PlayMode::Race,
        }
    }
}

/// Command-line arguments for the Maze Escape adapter.
#[derive(Debug, Parser)]
#[command(name = "maze-escape", about = "Play a Maze Escape level from a move script")]
struct CliArgs {
    /// Level file to load; `.json` is deserialized, anything else uses the ASCII legend.
    #[arg(long, value_name = "PATH", conflicts_with = "builtin")]
    level: Option<PathBuf>,

    /// Built-in level to play when no level file is given.
    #[arg(long, value_enum, default_value_t = Builtin::Corridor)]
    builtin: Builtin,

    /// Number of joined participants (1-4).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=4))]
    players: u8,

    /// How participants share the level goal.
    #[arg(long, value_enum, default_value_t = ModeArg::Shared)]
    mode: ModeArg,

    /// One life, weaker shots, stronger boss.
    #[arg(long)]
    hardcore: bool,

    /// Seed for every random draw of the session.
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,

    /// Move script, e.g. "1R wait:300 1R"; a leading `@` reads it from a file.
    #[arg(long, default_value = "")]
    script: String,

    /// Duration of one simulation frame in milliseconds.
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    frame_ms: u64,

    /// Frames simulated after the script ran out.
    #[arg(long, default_value_t = 10)]
    settle_frames: u32,

    /// Starts with one of every consumable.
    #[arg(long)]
    starter_kit: bool,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Entry point for the Maze Escape command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_level);

    let level = match &args.level {
        Some(path) => levels::load(path, 1)?,
        None => args.builtin.level()?,
    };
    let script = read_script(&args.script)?;
    let steps = script::parse(&script).context("parsing move script")?;

    let config = Config::default()
        .with_participants(args.players)
        .with_play_mode(args.mode.into())
        .with_hardcore(args.hardcore);
    let world = World::new(
        config,
        Box::new(inventory(args.starter_kit)),
        Box::new(SeededDice::new(args.seed)),
    );
    let mut scheduler = Scheduler::new(world, SchedulerConfig::default().with_seed(args.seed));

    println!("{}", query::welcome_banner(scheduler.world()));
    scheduler.load_level(level).context("loading level")?;

    let frame = Duration::from_millis(args.frame_ms);
    for step in steps {
        match step {
            Step::Submit(command) => scheduler.submit(command),
            Step::Wait(duration) => {
                let mut remaining = duration;
                while !remaining.is_zero() {
                    let dt = remaining.min(frame);
                    scheduler.advance(dt);
                    remaining -= dt;
                }
            }
        }
    }
    for _ in 0..args.settle_frames {
        scheduler.advance(frame);
    }

    print!("{}", render::render(&scheduler.snapshot()));
    for terminal in scheduler.terminal_events() {
        println!("result: {terminal:?}");
    }
    info!(events = scheduler.drain_events().len(), "session finished");
    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn read_script(argument: &str) -> Result<String> {
    match argument.strip_prefix('@') {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading script {path}"))
        }
        None => Ok(argument.to_owned()),
    }
}

fn inventory(starter_kit: bool) -> InventoryLedger {
    if !starter_kit {
        return InventoryLedger::new();
    }
    [
        Consumable::RatPoison,
        Consumable::Cheese,
        Consumable::Knife,
        Consumable::Flute,
        Consumable::WaterBucket,
        Consumable::MagicStar,
    ]
    .into_iter()
    .fold(InventoryLedger::new(), |ledger, item| {
        ledger.with_consumable(item, 1)
    })
}
