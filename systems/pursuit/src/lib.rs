#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pursuit system that proposes hostile steps on fixed cadences.
//!
//! Ground pursuers close in on the nearest active participant, the giant rat
//! chases the first active participant, the warden wanders, and inside the
//! arena the boss wanders while its minions pursue. The world validates every
//! proposed step; this system never mutates state.

use std::time::Duration;

use maze_escape_core::{
    greedy_direction, pursuit_step, time_advanced, BossPhase, BossSnapshot, BuffSnapshot, Cadence,
    CellCoord, Command, Direction, Event, HostileKind, HostileSnapshot, HostileStep, HostileView,
    ParticipantView, Stage, TileKind, TileView,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Probability that the giant rat moves on one of its ticks.
const GIANT_RAT_STEP_CHANCE: f64 = 0.8;

/// Displacements the warden picks from, diagonals included.
const WARDEN_MOVES: [(i32, i32); 6] = [(0, 1), (0, -1), (1, 0), (-1, 0), (1, 1), (-1, -1)];

/// Configuration parameters required to construct the pursuit system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    overworld_interval: Option<Duration>,
    arena_interval: Duration,
    giant_rat_interval: Duration,
    warden_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration with the boss cadences and the RNG seed.
    ///
    /// Overworld ground pursuers only move as the enemy response of a turn
    /// unless [`Config::with_overworld_interval`] enables a periodic step.
    #[must_use]
    pub const fn new(
        arena_interval: Duration,
        giant_rat_interval: Duration,
        warden_interval: Duration,
        rng_seed: u64,
    ) -> Self {
        Self {
            overworld_interval: None,
            arena_interval,
            giant_rat_interval,
            warden_interval,
            rng_seed,
        }
    }

    /// Enables a periodic pursuit step for overworld ground pursuers.
    #[must_use]
    pub const fn with_overworld_interval(mut self, interval: Duration) -> Self {
        self.overworld_interval = Some(interval);
        self
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
        Self::new(
            Duration::from_millis(800),
            Duration::from_millis(400),
            Duration::from_secs(1),
            0x5eed_f00d,
        )
    }
}

/// Read-only inputs the pursuit system plans against.
#[derive(Clone, Copy, Debug)]
pub struct PursuitViews<'a> {
    /// Participants of the running level.
    pub participants: &'a ParticipantView,
    /// Hostiles of the active world state.
    pub hostiles: &'a HostileView,
    /// Tiles of the active world state.
    pub tiles: TileView<'a>,
    /// Active boss, if any.
    pub boss: Option<BossSnapshot>,
    /// Buff expiries.
    pub buffs: BuffSnapshot,
    /// Simulation clock.
    pub now: Duration,
}

/// Pure system that reacts to elapsed time and emits hostile step batches.
#[derive(Debug)]
pub struct Pursuit {
    stage: Stage,
    overworld: Option<Cadence>,
    arena: Cadence,
    giant_rat: Cadence,
    warden: Cadence,
    rng: ChaCha8Rng,
}

impl Pursuit {
    /// Creates a new pursuit system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            stage: Stage::Idle,
            overworld: config.overworld_interval.map(Cadence::new),
            arena: Cadence::new(config.arena_interval),
            giant_rat: Cadence::new(config.giant_rat_interval),
            warden: Cadence::new(config.warden_interval),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes world events and immutable views to emit movement commands.
    pub fn handle(&mut self, events: &[Event], views: PursuitViews<'_>, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::StageChanged { stage } => {
                    self.stage = *stage;
                    self.reset();
                }
                Event::LevelLoaded { .. } => self.reset(),
                _ => {}
            }
        }

        let dt = time_advanced(events);
        if dt.is_zero() {
            return;
        }

        match self.stage {
            Stage::Overworld => self.plan_overworld(dt, &views, out),
            Stage::Arena => {
                if self.arena.advance(dt) > 0 {
                    let steps = self.plan_arena(&views);
                    push_batch(steps, out);
                }
            }
            Stage::Idle | Stage::Concluded => {}
        }
    }

    fn reset(&mut self) {
        if let Some(cadence) = self.overworld.as_mut() {
            cadence.reset();
        }
        self.arena.reset();
        self.giant_rat.reset();
        self.warden.reset();
    }

    fn plan_overworld(&mut self, dt: Duration, views: &PursuitViews<'_>, out: &mut Vec<Command>) {
        let mut steps = Vec::new();

        if self
            .overworld
            .as_mut()
            .is_some_and(|cadence| cadence.advance(dt) > 0)
        {
            steps.extend(
                views
                    .hostiles
                    .iter()
                    .filter(|hostile| hostile.kind.is_ground_pursuer() && !hostile.held)
                    .filter(|hostile| !stunned(hostile, views))
                    .filter_map(|hostile| {
                        pursuit_step(hostile.cell, views.participants, &views.tiles).map(|to| {
                            HostileStep {
                                hostile: hostile.id,
                                to,
                            }
                        })
                    }),
            );
        }

        let boss_alive = views.boss.is_some_and(|boss| boss.hit_points > 0);
        if self.giant_rat.advance(dt) > 0 && boss_alive {
            steps.extend(self.plan_giant_rat(views));
        }
        if self.warden.advance(dt) > 0 && boss_alive {
            steps.extend(self.plan_warden(views));
        }

        push_batch(steps, out);
    }

    fn plan_giant_rat(&mut self, views: &PursuitViews<'_>) -> Option<HostileStep> {
        let rat = find_kind(views.hostiles, HostileKind::GiantRat)?;
        if stunned(rat, views) || !self.rng.gen_bool(GIANT_RAT_STEP_CHANCE) {
            return None;
        }
        let target = views.participants.active().next()?;
        let to = rat.cell.step(greedy_direction(rat.cell, target.cell)?)?;
        walkable(&views.tiles, to).then_some(HostileStep {
            hostile: rat.id,
            to,
        })
    }

    fn plan_warden(&mut self, views: &PursuitViews<'_>) -> Option<HostileStep> {
        let warden = find_kind(views.hostiles, HostileKind::Warden)?;
        let (dx, dy) = WARDEN_MOVES[self.rng.gen_range(0..WARDEN_MOVES.len())];
        let (columns, rows) = views.tiles.dimensions();
        let to = CellCoord::new(
            clamp_axis(warden.cell.column(), dx, columns),
            clamp_axis(warden.cell.row(), dy, rows),
        );
        (to != warden.cell && walkable(&views.tiles, to)).then_some(HostileStep {
            hostile: warden.id,
            to,
        })
    }

    fn plan_arena(&mut self, views: &PursuitViews<'_>) -> Vec<HostileStep> {
        let dazed = views.boss.is_some_and(|boss| boss.phase == BossPhase::Dazed);
        let mut steps = Vec::new();
        for hostile in views.hostiles.iter() {
            match hostile.kind {
                HostileKind::ArenaBoss if !dazed => {
                    let direction = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
                    let to = hostile
                        .cell
                        .step(direction)
                        .filter(|cell| walkable(&views.tiles, *cell));
                    if let Some(to) = to {
                        steps.push(HostileStep {
                            hostile: hostile.id,
                            to,
                        });
                    }
                }
                HostileKind::Rat if !stunned(hostile, views) => {
                    if let Some(to) = pursuit_step(hostile.cell, views.participants, &views.tiles) {
                        steps.push(HostileStep {
                            hostile: hostile.id,
                            to,
                        });
                    }
                }
                _ => {}
            }
        }
        steps
    }
}

fn push_batch(steps: Vec<HostileStep>, out: &mut Vec<Command>) {
    if !steps.is_empty() {
        out.push(Command::StepHostiles { steps });
    }
}

fn find_kind(hostiles: &HostileView, kind: HostileKind) -> Option<&HostileSnapshot> {
    hostiles.iter().find(|hostile| hostile.kind == kind)
}

fn stunned(hostile: &HostileSnapshot, views: &PursuitViews<'_>) -> bool {
    hostile
        .kind
        .stun_buff()
        .is_some_and(|buff| views.buffs.is_active(buff, views.now))
}

fn walkable(tiles: &TileView<'_>, cell: CellCoord) -> bool {
    tiles.kind(cell).is_some_and(TileKind::is_occupiable)
}

fn clamp_axis(value: u32, delta: i32, length: u32) -> u32 {
    let upper = length.saturating_sub(1);
    value.saturating_add_signed(delta).min(upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warden_moves_are_clamped_to_the_grid() {
        assert_eq!(clamp_axis(0, -1, 5), 0);
        assert_eq!(clamp_axis(4, 1, 5), 4);
        assert_eq!(clamp_axis(2, 1, 5), 3);
    }
}
