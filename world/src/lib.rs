#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Escape.
//!
//! The world owns the grid, every entity, the buff timers and the turn lock.
//! Adapters and systems never touch that state directly: they submit
//! [`Command`] values to [`apply`] and observe the resulting [`Event`] stream.

use std::{fmt, time::Duration};

use maze_escape_core::{
    BossPhase, CellCoord, Command, Direction, EncounterOutcome, Event, ExitRequirement, Feedback,
    HostileKind, HostileStep, Inventory, LevelDescription, LevelError, Lives, ParticipantId,
    ParticipantSnapshot, PlayMode, Severity, Stage, TerminalEvent, TileKind, ARENA_ENTRY,
    CODE_LENGTH, WELCOME_BANNER,
};
use tracing::{debug, info, trace};

mod boss;
mod buffs;
mod config;
mod damage;
mod dice;
mod grid;
mod items;
mod projectiles;
mod puzzle;
mod registry;
mod schedule;
mod turn;

pub use config::Config;
pub use dice::{container_malfunctions, hazard_is_lethal, Dice, SeededDice};

use boss::{BossState, Encounter};
use buffs::BuffTracker;
use grid::Grid;
use puzzle::PuzzleState;
use registry::{Hostile, IdAllocator, Registry};
use schedule::{Action, Generations, Schedule};

/// Grid, entities and boss health that an arena encounter swaps out as one unit.
#[derive(Clone, Debug)]
pub(crate) struct WorldState {
    pub(crate) grid: Grid,
    pub(crate) registry: Registry,
    pub(crate) boss: Option<BossState>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Participant {
    pub(crate) id: ParticipantId,
    pub(crate) cell: CellCoord,
    pub(crate) lives: Lives,
    pub(crate) eliminated: bool,
    pub(crate) escaped: bool,
    pub(crate) crouching: bool,
    pub(crate) facing: Direction,
}

impl Participant {
    pub(crate) const fn is_active(&self) -> bool {
        !self.eliminated && !self.escaped
    }

    pub(crate) const fn snapshot(&self) -> ParticipantSnapshot {
        ParticipantSnapshot {
            id: self.id,
            cell: self.cell,
            lives: self.lives,
            eliminated: self.eliminated,
            escaped: self.escaped,
            crouching: self.crouching,
            facing: self.facing,
        }
    }
}

#[derive(Clone, Debug)]
struct LevelContext {
    number: u32,
    start: CellCoord,
    armed: bool,
    exit_requirements: Vec<ExitRequirement>,
    secret_code: String,
    security_code: String,
}

impl LevelContext {
    fn placeholder() -> Self {
        Self {
            number: 0,
            start: CellCoord::new(0, 0),
            armed: false,
            exit_requirements: Vec::new(),
            secret_code: String::new(),
            security_code: String::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct TerminalLatch {
    escaped: bool,
    failed: bool,
    boss_defeated: bool,
}

/// Represents the authoritative Maze Escape world state.
pub struct World {
    banner: &'static str,
    config: Config,
    inventory: Box<dyn Inventory + Send>,
    dice: Box<dyn Dice + Send>,
    stage: Stage,
    now: Duration,
    level_generation: u32,
    encounter_generation: u32,
    level: LevelContext,
    state: WorldState,
    participants: Vec<Participant>,
    buffs: BuffTracker,
    turn_lock: Option<ParticipantId>,
    puzzle: PuzzleState,
    encounter: Option<Encounter>,
    schedule: Schedule,
    ids: IdAllocator,
    feedback: Option<(Feedback, Duration)>,
    ammunition: u32,
    eliminated_thieves: u32,
    terminal: TerminalLatch,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("stage", &self.stage)
            .field("now", &self.now)
            .field("level", &self.level.number)
            .field("level_generation", &self.level_generation)
            .field("encounter_generation", &self.encounter_generation)
            .field("participants", &self.participants)
            .field("turn_lock", &self.turn_lock)
            .finish_non_exhaustive()
    }
}

impl World {
    /// Creates an idle world wired to its inventory and chance collaborators.
    #[must_use]
    pub fn new(
        config: Config,
        inventory: Box<dyn Inventory + Send>,
        dice: Box<dyn Dice + Send>,
    ) -> Self {
        Self {
            banner: WELCOME_BANNER,
            config,
            inventory,
            dice,
            stage: Stage::Idle,
            now: Duration::ZERO,
            level_generation: 0,
            encounter_generation: 0,
            level: LevelContext::placeholder(),
            state: WorldState {
                grid: Grid::arena(0),
                registry: Registry::default(),
                boss: None,
            },
            participants: Vec::new(),
            buffs: BuffTracker::default(),
            turn_lock: None,
            puzzle: PuzzleState::default(),
            encounter: None,
            schedule: Schedule::default(),
            ids: IdAllocator::default(),
            feedback: None,
            ammunition: 0,
            eliminated_thieves: 0,
            terminal: TerminalLatch::default(),
        }
    }

    const fn is_running(&self) -> bool {
        matches!(self.stage, Stage::Overworld | Stage::Arena)
    }

    const fn generations(&self) -> Generations {
        Generations {
            level: self.level_generation,
            encounter: self.encounter_generation,
        }
    }

    pub(crate) fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|participant| participant.id == id)
    }

    pub(crate) fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants
            .iter_mut()
            .find(|participant| participant.id == id)
    }

    pub(crate) fn any_active(&self) -> bool {
        self.participants.iter().any(Participant::is_active)
    }

    /// Cell damaged participants return to: the level start or the arena entry.
    pub(crate) fn respawn_point(&self) -> CellCoord {
        if self.stage == Stage::Arena {
            ARENA_ENTRY
        } else {
            self.level.start
        }
    }

    pub(crate) fn boss_is_dazed(&self) -> bool {
        self.stage == Stage::Arena
            && self
                .state
                .boss
                .is_some_and(|boss| boss.phase == BossPhase::Dazed)
    }

    /// Publishes a transient feedback message and keeps it for the snapshot.
    pub(crate) fn notify(
        &mut self,
        text: impl Into<String>,
        severity: Severity,
        out_events: &mut Vec<Event>,
    ) {
        let feedback = Feedback::new(text, severity);
        let expires_at = self.now.saturating_add(self.config.feedback_lifetime());
        self.feedback = Some((feedback.clone(), expires_at));
        out_events.push(Event::Feedback(feedback));
    }

    pub(crate) fn change_tile(&mut self, cell: CellCoord, kind: TileKind, out_events: &mut Vec<Event>) {
        if let Some(from) = self.state.grid.set(cell, kind) {
            if from != kind {
                out_events.push(Event::TileChanged {
                    cell,
                    from,
                    to: kind,
                });
            }
        }
    }

    pub(crate) fn schedule_after(&mut self, delay: Duration, action: Action) {
        let due = self.now.saturating_add(delay);
        let generations = self.generations();
        self.schedule.push(due, generations, action);
    }

    /// Runs `action` immediately when `delay` is zero, otherwise defers it.
    pub(crate) fn continue_after(
        &mut self,
        delay: Duration,
        action: Action,
        out_events: &mut Vec<Event>,
    ) {
        if delay.is_zero() {
            self.run_action(action, out_events);
        } else {
            self.schedule_after(delay, action);
        }
    }

    /// Emits a terminal notification at most once per level instance.
    pub(crate) fn emit_terminal(&mut self, terminal: TerminalEvent, out_events: &mut Vec<Event>) {
        let latch = match terminal {
            TerminalEvent::LevelEscaped { .. } => &mut self.terminal.escaped,
            TerminalEvent::LevelFailed => &mut self.terminal.failed,
            TerminalEvent::BossDefeated { .. } => &mut self.terminal.boss_defeated,
        };
        if *latch {
            return;
        }
        *latch = true;
        info!(level = self.level.number, ?terminal, "terminal event");
        out_events.push(match terminal {
            TerminalEvent::LevelEscaped { winner } => Event::LevelEscaped { winner },
            TerminalEvent::LevelFailed => Event::LevelFailed,
            TerminalEvent::BossDefeated { reward } => Event::BossDefeated { reward },
        });
    }

    /// Tears the running level down; nothing but a new load is accepted afterwards.
    pub(crate) fn conclude(&mut self, out_events: &mut Vec<Event>) {
        if !self.is_running() {
            return;
        }
        if self.encounter.take().is_some() {
            out_events.push(Event::EncounterResolved {
                outcome: EncounterOutcome::Abort,
            });
        }
        self.schedule.clear();
        self.turn_lock = None;
        self.stage = Stage::Concluded;
        info!(level = self.level.number, "level concluded");
        out_events.push(Event::StageChanged {
            stage: Stage::Concluded,
        });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.now = self.now.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });
        self.buffs.expire(self.now, out_events);
        if self
            .feedback
            .as_ref()
            .is_some_and(|(_, expires_at)| *expires_at <= self.now)
        {
            self.feedback = None;
        }

        while self.is_running() {
            let Some((action, fresh)) = self.schedule.pop_due(self.now, self.generations()) else {
                break;
            };
            if fresh {
                self.run_action(action, out_events);
            } else {
                debug!(?action, "dropping scheduled action from a superseded generation");
            }
        }
    }

    fn run_action(&mut self, action: Action, out_events: &mut Vec<Event>) {
        match action {
            Action::HazardRoll(participant) => turn::resolve_hazard_roll(self, participant, out_events),
            Action::EnemyResponse(participant) => {
                turn::resolve_enemy_response(self, participant, out_events)
            }
            Action::Respawn(participant) => damage::respawn(self, participant, out_events),
            Action::Despawn(hostile) => boss::despawn_minion(self, hostile, out_events),
            Action::ConcludeEncounter => boss::conclude_encounter(self, out_events),
        }
    }

    fn set_crouch(&mut self, id: ParticipantId, crouching: bool, out_events: &mut Vec<Event>) {
        if !self.participant(id).is_some_and(|participant| participant.is_active()) {
            debug!(%id, "crouch ignored for inactive participant");
            self.notify(format!("{id} cannot crouch right now"), Severity::Warning, out_events);
            return;
        }
        let Some(participant) = self.participant_mut(id) else {
            return;
        };
        if participant.crouching == crouching {
            return;
        }
        participant.crouching = crouching;
        let text = if crouching {
            format!("{id} crouches")
        } else {
            format!("{id} stands up")
        };
        self.notify(text, Severity::Info, out_events);
    }

    /// Applies a batch of hostile movement intents, then checks for contact.
    pub(crate) fn step_hostiles(&mut self, steps: Vec<HostileStep>, out_events: &mut Vec<Event>) {
        trace!(steps = steps.len(), "hostile batch");
        let dazed = self.boss_is_dazed();
        for step in steps {
            let Some(hostile) = self.state.registry.hostile(step.hostile).copied() else {
                continue;
            };
            if !self.hostile_may_step(&hostile, step.to, dazed) {
                continue;
            }
            if let Some(entry) = self.state.registry.hostile_mut(step.hostile) {
                entry.cell = step.to;
            }
            out_events.push(Event::HostileMoved {
                hostile: step.hostile,
                from: hostile.cell,
                to: step.to,
            });
        }
        damage::contact_check(self, out_events);
    }

    fn hostile_may_step(&self, hostile: &Hostile, to: CellCoord, dazed: bool) -> bool {
        if hostile.held || hostile.cell == to || hostile.kind == HostileKind::Animatronic {
            return false;
        }
        if hostile.kind == HostileKind::ArenaBoss && dazed {
            return false;
        }
        if hostile
            .kind
            .stun_buff()
            .is_some_and(|buff| self.buffs.is_active(buff, self.now))
        {
            return false;
        }
        let adjacent = hostile.cell.column().abs_diff(to.column()) <= 1
            && hostile.cell.row().abs_diff(to.row()) <= 1;
        adjacent
            && self
                .state
                .grid
                .kind(to)
                .is_some_and(TileKind::is_occupiable)
    }
}

/// Validates `level` and starts it, superseding any previous level.
pub fn load_level(
    world: &mut World,
    level: LevelDescription,
    out_events: &mut Vec<Event>,
) -> Result<(), LevelError> {
    level.validate()?;
    let start = level.start().ok_or(LevelError::MissingStart)?;

    world.level_generation = world.level_generation.wrapping_add(1);
    world.schedule.clear();
    world.encounter = None;
    world.turn_lock = None;
    world.puzzle = PuzzleState::default();
    world.buffs = BuffTracker::default();
    world.feedback = None;
    world.eliminated_thieves = 0;
    world.terminal = TerminalLatch::default();

    let secret_code = match level.secret_code.clone() {
        Some(code) => code,
        None => generate_code(world.dice.as_mut()),
    };
    let security_code = generate_code(world.dice.as_mut());

    let mut registry = Registry::default();
    for spec in &level.hostiles {
        let hostile = Hostile {
            id: world.ids.hostile(),
            kind: spec.kind,
            cell: spec.cell,
            held: spec.held,
        };
        out_events.push(Event::HostileSpawned {
            hostile: hostile.id,
            kind: hostile.kind,
            cell: hostile.cell,
        });
        registry.hostiles.push(hostile);
    }
    let boss = level
        .hostiles
        .iter()
        .find(|spec| matches!(spec.kind, HostileKind::GiantRat | HostileKind::Warden))
        .map(|spec| BossState::new(spec.kind, world.config.boss_hit_points()));

    world.state = WorldState {
        grid: Grid::from_level(&level),
        registry,
        boss,
    };
    world.ammunition = if level.rules.armed {
        world.config.armed_ammunition()
    } else {
        0
    };
    world.participants = (1..=world.config.participants())
        .map(|id| Participant {
            id: ParticipantId::new(id),
            cell: start,
            lives: world.config.starting_lives(),
            eliminated: false,
            escaped: false,
            crouching: false,
            facing: Direction::South,
        })
        .collect();
    world.level = LevelContext {
        number: level.number,
        start,
        armed: level.rules.armed,
        exit_requirements: level.exit_requirements(),
        secret_code,
        security_code,
    };
    world.stage = Stage::Overworld;

    info!(
        level = level.number,
        generation = world.level_generation,
        columns = level.columns,
        rows = level.rows,
        hostiles = level.hostiles.len(),
        "level loaded"
    );
    out_events.push(Event::LevelLoaded {
        number: level.number,
        generation: world.level_generation,
    });
    out_events.push(Event::StageChanged {
        stage: Stage::Overworld,
    });
    if world.config.play_mode() == PlayMode::Race {
        world.notify("Race mode: first to the exit wins", Severity::Info, out_events);
    }
    Ok(())
}

fn generate_code(dice: &mut (dyn Dice + Send)) -> String {
    let code = 1000 + dice.below(9000);
    format!("{code:0width$}", width = CODE_LENGTH)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if !world.is_running() {
        debug!(stage = ?world.stage, ?command, "ignoring command outside a running level");
        return;
    }

    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::AttemptMove {
            participant,
            direction,
        } => turn::attempt_move(world, participant, direction, out_events),
        Command::SetCrouch {
            participant,
            crouching,
        } => world.set_crouch(participant, crouching, out_events),
        Command::HoldContainer { participant } => {
            puzzle::hold_container(world, participant, out_events)
        }
        Command::EnterDigit { digit } => puzzle::enter_digit(world, digit, out_events),
        Command::ClearCode => puzzle::clear_code(world),
        Command::SubmitCode => puzzle::submit_code(world, out_events),
        Command::CancelCodeEntry => puzzle::cancel_code_entry(world, out_events),
        Command::UseConsumable { participant, item } => {
            items::use_consumable(world, participant, item, out_events)
        }
        Command::Fire {
            participant,
            payload,
        } => projectiles::fire(world, participant, payload, out_events),
        Command::StepHostiles { steps } => world.step_hostiles(steps, out_events),
        Command::AdvanceProjectiles { steps } => projectiles::advance(world, steps, out_events),
        Command::EmitHomingHazard { target } => boss::emit_hazard(world, target, out_events),
        Command::AdvanceHomingHazards { steps } => {
            boss::advance_hazards(world, steps, out_events)
        }
        Command::SpawnMinions => boss::spawn_minions(world, out_events),
        Command::SpawnPayloadTarget { cell, required } => {
            boss::spawn_payload_target(world, cell, required, out_events)
        }
        Command::CycleBossPhase => boss::cycle_phase(world, out_events),
        Command::EndLevel => world.conclude(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use maze_escape_core::{
        BossSnapshot, BuffSnapshot, CodeEntrySnapshot, HazardSnapshot, HostileView, Inventory,
        ParticipantView, PayloadTargetSnapshot, ProjectileSnapshot, Stage, TileView,
        WorldSnapshot,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Stage the world is currently running.
    #[must_use]
    pub fn stage(world: &World) -> Stage {
        world.stage
    }

    /// Simulation clock.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Generation of the running level.
    #[must_use]
    pub fn level_generation(world: &World) -> u32 {
        world.level_generation
    }

    /// Reports whether a participant move is still resolving.
    #[must_use]
    pub fn turn_in_progress(world: &World) -> bool {
        world.turn_lock.is_some()
    }

    /// Number of deferred actions waiting for the clock.
    #[must_use]
    pub fn pending_actions(world: &World) -> usize {
        world.schedule.len()
    }

    /// Captures a read-only view of every participant.
    #[must_use]
    pub fn participant_view(world: &World) -> ParticipantView {
        ParticipantView::from_snapshots(
            world
                .participants
                .iter()
                .map(super::Participant::snapshot)
                .collect(),
        )
    }

    /// Captures a read-only view of the hostiles in the active world state.
    #[must_use]
    pub fn hostile_view(world: &World) -> HostileView {
        HostileView::from_snapshots(world.state.registry.hostile_snapshots())
    }

    /// Exposes a read-only view of the active tile lattice.
    #[must_use]
    pub fn tile_view(world: &World) -> TileView<'_> {
        world.state.grid.view()
    }

    /// Projectiles currently in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .state
            .registry
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                cell: projectile.cell,
                direction: projectile.direction,
                owner: projectile.owner,
                payload: projectile.payload,
            })
            .collect()
    }

    /// Homing hazards currently seeking participants.
    #[must_use]
    pub fn hazards(world: &World) -> Vec<HazardSnapshot> {
        world
            .state
            .registry
            .hazards
            .iter()
            .map(|hazard| HazardSnapshot {
                id: hazard.id,
                cell: hazard.cell,
                target: hazard.target,
            })
            .collect()
    }

    /// Required-payload targets waiting to be shot.
    #[must_use]
    pub fn payload_targets(world: &World) -> Vec<PayloadTargetSnapshot> {
        world
            .state
            .registry
            .payload_targets
            .iter()
            .map(|target| PayloadTargetSnapshot {
                id: target.id,
                cell: target.cell,
                required: target.required,
            })
            .collect()
    }

    /// Active boss, if the level or arena has one.
    #[must_use]
    pub fn boss(world: &World) -> Option<BossSnapshot> {
        world.state.boss.map(|boss| boss.snapshot())
    }

    /// Buff expiry timestamps.
    #[must_use]
    pub fn buffs(world: &World) -> BuffSnapshot {
        world.buffs.snapshot()
    }

    /// Pending code challenge, if any.
    #[must_use]
    pub fn code_entry(world: &World) -> Option<CodeEntrySnapshot> {
        world.puzzle.code_entry_snapshot()
    }

    /// Remaining ammunition.
    #[must_use]
    pub fn ammunition(world: &World) -> u32 {
        world.ammunition
    }

    /// Thieves shot down on the running level.
    #[must_use]
    pub fn eliminated_count(world: &World) -> u32 {
        world.eliminated_thieves
    }

    /// Read access to the inventory collaborator.
    #[must_use]
    pub fn inventory(world: &World) -> &dyn Inventory {
        world.inventory.as_ref()
    }

    /// Captures the complete presentation snapshot.
    #[must_use]
    pub fn snapshot(world: &World) -> WorldSnapshot {
        let (columns, rows) = world.state.grid.dimensions();
        WorldSnapshot {
            stage: world.stage,
            now: world.now,
            columns,
            rows,
            tiles: world.state.grid.tiles().to_vec(),
            participants: participant_view(world).into_vec(),
            hostiles: hostile_view(world).into_vec(),
            projectiles: projectiles(world),
            hazards: hazards(world),
            payload_targets: payload_targets(world),
            boss: boss(world),
            buffs: buffs(world),
            code_entry: code_entry(world),
            container_progress: world.puzzle.container_progress(),
            ammunition: world.ammunition,
            feedback: world.feedback.as_ref().map(|(feedback, _)| feedback.clone()),
        }
    }
}
