#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame scheduler that drives every tick process against a single world.
//!
//! One call to [`Scheduler::advance`] is one logical frame. The world clock
//! moves first, then the tick processes run in a fixed order:
//!
//! 1. boss phase cycling
//! 2. spawning (minions and payload targets)
//! 3. pursuit
//! 4. homing hazards
//! 5. ballistics
//!
//! Each process sees every event published since it last ran, including the
//! events caused by the processes ahead of it in the same frame, and its
//! commands are applied before the next process reads the world.
//!
//! Every published event is also kept in a journal until the embedder calls
//! [`Scheduler::drain_events`]. The journal is not bounded: an embedder that
//! never drains it keeps every event of the session in memory.

use std::time::Duration;

use maze_escape_core::{
    Command, Event, LevelDescription, LevelError, TerminalEvent, WorldSnapshot,
};
use maze_escape_system_ballistics::{Ballistics, Config as BallisticsConfig};
use maze_escape_system_boss_phase::{BossPhaseCycle, Config as BossPhaseConfig};
use maze_escape_system_homing::{Config as HomingConfig, Homing};
use maze_escape_system_pursuit::{Config as PursuitConfig, Pursuit, PursuitViews};
use maze_escape_system_spawning::{Config as SpawningConfig, Spawning};
use maze_escape_world::{self as world, query, World};
use tracing::{debug, info, trace};

/// Cadences and seeds of every tick process.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchedulerConfig {
    /// Alert and dazed durations of the arena boss.
    pub boss_phase: BossPhaseConfig,
    /// Minion and payload-target spawn cadences.
    pub spawning: SpawningConfig,
    /// Hostile movement cadences.
    pub pursuit: PursuitConfig,
    /// Homing-hazard emission and advancement cadences.
    pub homing: HomingConfig,
    /// Projectile advancement cadence.
    pub ballistics: BallisticsConfig,
}

impl SchedulerConfig {
    /// Derives the seeds of the randomized tick processes from `seed`.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.pursuit = self.pursuit.with_seed(seed);
        self.spawning = self.spawning.with_seed(seed.rotate_left(32));
        self
    }
}

/// Events not yet seen by each tick process.
#[derive(Debug, Default)]
struct Mailboxes {
    boss_phase: Vec<Event>,
    spawning: Vec<Event>,
    pursuit: Vec<Event>,
    homing: Vec<Event>,
    ballistics: Vec<Event>,
}

impl Mailboxes {
    fn post(&mut self, events: &[Event]) {
        for mailbox in [
            &mut self.boss_phase,
            &mut self.spawning,
            &mut self.pursuit,
            &mut self.homing,
            &mut self.ballistics,
        ] {
            mailbox.extend_from_slice(events);
        }
    }
}

/// Owns the world and the tick processes and pumps commands between them.
#[derive(Debug)]
pub struct Scheduler {
    world: World,
    boss_phase: BossPhaseCycle,
    spawning: Spawning,
    pursuit: Pursuit,
    homing: Homing,
    ballistics: Ballistics,
    mailboxes: Mailboxes,
    journal: Vec<Event>,
    terminal: Vec<TerminalEvent>,
}

impl Scheduler {
    /// Wraps `world` with tick processes built from `config`.
    #[must_use]
    pub fn new(world: World, config: SchedulerConfig) -> Self {
        Self {
            world,
            boss_phase: BossPhaseCycle::new(config.boss_phase),
            spawning: Spawning::new(config.spawning),
            pursuit: Pursuit::new(config.pursuit),
            homing: Homing::new(config.homing),
            ballistics: Ballistics::new(config.ballistics),
            mailboxes: Mailboxes::default(),
            journal: Vec::new(),
            terminal: Vec::new(),
        }
    }

    /// Loads `level`, superseding the running one.
    pub fn load_level(&mut self, level: LevelDescription) -> Result<(), LevelError> {
        let number = level.number;
        let mut events = Vec::new();
        world::load_level(&mut self.world, level, &mut events)?;
        info!(level = number, "scheduler loaded level");
        self.terminal.clear();
        self.publish(events);
        Ok(())
    }

    /// Applies a participant or adapter command immediately.
    pub fn submit(&mut self, command: Command) {
        debug!(?command, "command submitted");
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.publish(events);
    }

    /// Runs one logical frame covering `dt` of simulation time.
    pub fn advance(&mut self, dt: Duration) {
        self.submit_quiet(Command::Tick { dt });

        let mut commands = Vec::new();

        let inbox = std::mem::take(&mut self.mailboxes.boss_phase);
        self.boss_phase
            .handle(&inbox, query::boss(&self.world), &mut commands);
        self.dispatch(&mut commands);

        let inbox = std::mem::take(&mut self.mailboxes.spawning);
        let targets = query::payload_targets(&self.world);
        self.spawning.handle(
            &inbox,
            query::boss(&self.world),
            &query::tile_view(&self.world),
            &targets,
            &mut commands,
        );
        self.dispatch(&mut commands);

        let inbox = std::mem::take(&mut self.mailboxes.pursuit);
        let participants = query::participant_view(&self.world);
        let hostiles = query::hostile_view(&self.world);
        self.pursuit.handle(
            &inbox,
            PursuitViews {
                participants: &participants,
                hostiles: &hostiles,
                tiles: query::tile_view(&self.world),
                boss: query::boss(&self.world),
                buffs: query::buffs(&self.world),
                now: query::now(&self.world),
            },
            &mut commands,
        );
        self.dispatch(&mut commands);

        let inbox = std::mem::take(&mut self.mailboxes.homing);
        let participants = query::participant_view(&self.world);
        let hazards = query::hazards(&self.world);
        self.homing.handle(
            &inbox,
            &participants,
            &hazards,
            query::boss(&self.world),
            &mut commands,
        );
        self.dispatch(&mut commands);

        let inbox = std::mem::take(&mut self.mailboxes.ballistics);
        let projectiles = query::projectiles(&self.world);
        let hostiles = query::hostile_view(&self.world);
        let targets = query::payload_targets(&self.world);
        self.ballistics.handle(
            &inbox,
            &projectiles,
            &hostiles,
            &targets,
            &query::tile_view(&self.world),
            &mut commands,
        );
        self.dispatch(&mut commands);
    }

    /// Read access to the simulated world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Captures the presentation snapshot of the current frame.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        query::snapshot(&self.world)
    }

    /// Removes and returns every event published since the last drain.
    ///
    /// Call this once per frame (or at least periodically) to keep the
    /// journal from growing for the whole session.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.journal)
    }

    /// Terminal notifications raised since the current level was loaded.
    #[must_use]
    pub fn terminal_events(&self) -> &[TerminalEvent] {
        &self.terminal
    }

    fn submit_quiet(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.publish(events);
    }

    fn dispatch(&mut self, commands: &mut Vec<Command>) {
        if commands.is_empty() {
            return;
        }
        trace!(commands = commands.len(), "applying tick process batch");
        let mut events = Vec::new();
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, &mut events);
        }
        self.publish(events);
    }

    fn publish(&mut self, events: Vec<Event>) {
        if events.is_empty() {
            return;
        }
        for terminal in events.iter().filter_map(Event::terminal) {
            info!(?terminal, "terminal event");
            self.terminal.push(terminal);
        }
        self.mailboxes.post(&events);
        self.journal.extend(events);
    }
}
