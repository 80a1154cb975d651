#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded spawning system for boss minions and warden payload targets.

use std::time::Duration;

use maze_escape_core::{
    time_advanced, BossSnapshot, Cadence, CellCoord, Command, Event, HostileKind,
    PayloadKind, PayloadTargetSnapshot, Stage, TileView, PAYLOAD_TARGET_CAPACITY,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    minion_interval: Duration,
    payload_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadences and seed.
    #[must_use]
    pub const fn new(minion_interval: Duration, payload_interval: Duration, rng_seed: u64) -> Self {
        Self {
            minion_interval,
            payload_interval,
            rng_seed,
        }
    }

    /// Replaces the RNG seed.
    #[must_use]
    pub const fn with_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_secs(15), Duration::from_secs(2), 0x4d59_5df4)
    }
}

/// Pure system that emits spawn commands while a boss is standing.
#[derive(Debug)]
pub struct Spawning {
    stage: Stage,
    minions: Cadence,
    payloads: Cadence,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            stage: Stage::Idle,
            minions: Cadence::new(config.minion_interval),
            payloads: Cadence::new(config.payload_interval),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and immutable views to emit spawn commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        boss: Option<BossSnapshot>,
        tiles: &TileView<'_>,
        targets: &[PayloadTargetSnapshot],
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::StageChanged { stage } => {
                    self.stage = *stage;
                    self.minions.reset();
                    self.payloads.reset();
                }
                Event::LevelLoaded { .. } => {
                    self.minions.reset();
                    self.payloads.reset();
                }
                _ => {}
            }
        }

        let dt = time_advanced(events);
        let Some(boss) = boss.filter(|boss| boss.hit_points > 0) else {
            return;
        };
        if dt.is_zero() {
            return;
        }

        match (self.stage, boss.kind) {
            (Stage::Arena, HostileKind::ArenaBoss) => {
                for _ in 0..self.minions.advance(dt) {
                    out.push(Command::SpawnMinions);
                }
            }
            (Stage::Overworld, HostileKind::Warden) => {
                let periods = self.payloads.advance(dt);
                self.place_targets(periods, tiles, targets, out);
            }
            _ => {}
        }
    }

    fn place_targets(
        &mut self,
        periods: u32,
        tiles: &TileView<'_>,
        targets: &[PayloadTargetSnapshot],
        out: &mut Vec<Command>,
    ) {
        let mut occupied: Vec<CellCoord> = targets.iter().map(|target| target.cell).collect();
        let mut free: Vec<CellCoord> = tiles
            .floor_cells()
            .into_iter()
            .filter(|cell| !occupied.contains(cell))
            .collect();

        for _ in 0..periods {
            if occupied.len() >= PAYLOAD_TARGET_CAPACITY {
                break;
            }
            free.shuffle(&mut self.rng);
            let (Some(cell), Some(required)) = (free.pop(), PayloadKind::ALL.choose(&mut self.rng))
            else {
                break;
            };
            occupied.push(cell);
            out.push(Command::SpawnPayloadTarget {
                cell,
                required: *required,
            });
        }
    }
}
