#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Escape engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

mod inventory;
mod level;

pub use inventory::{Inventory, InventoryLedger};
pub use level::{
    ExitRequirement, HostileSpec, LevelDescription, LevelError, LevelRules, TileSpec,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Maze Escape.";

/// Number of digits accepted by a code challenge.
pub const CODE_LENGTH: usize = 4;

/// Side length of the square boss arena measured in cells.
pub const ARENA_SIZE: u32 = 10;

/// Cell every participant occupies when an arena encounter begins.
pub const ARENA_ENTRY: CellCoord = CellCoord::new(0, 0);

/// Cell the arena boss occupies when an encounter begins.
pub const ARENA_BOSS_CELL: CellCoord = CellCoord::new(5, 5);

/// Maximum number of required-payload targets alive at the same time.
pub const PAYLOAD_TARGET_CAPACITY: usize = 6;

/// Describes how participants share the level goal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayMode {
    /// Cooperative play: the first escape ends the level for everyone.
    #[default]
    Shared,
    /// Competitive play: escapes are flagged per participant and the level continues.
    Race,
}

/// Describes which world the simulation is currently running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stage {
    /// No level has been loaded yet.
    #[default]
    Idle,
    /// The regular level grid is active.
    Overworld,
    /// A boss encounter replaced the level grid with the arena.
    Arena,
    /// The level ended; every command other than a new load is ignored.
    Concluded,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a participant step one cell in the given direction.
    AttemptMove {
        /// Participant issuing the move.
        participant: ParticipantId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Toggles the crouching stance of a participant.
    SetCrouch {
        /// Participant changing stance.
        participant: ParticipantId,
        /// Whether the participant should be crouching afterwards.
        crouching: bool,
    },
    /// Registers one discrete attempt at opening an adjacent container.
    HoldContainer {
        /// Participant working on the container.
        participant: ParticipantId,
    },
    /// Appends a digit to the pending code challenge.
    EnterDigit {
        /// Digit in the range `0..=9`.
        digit: u8,
    },
    /// Clears the digits typed into the pending code challenge.
    ClearCode,
    /// Submits the pending code challenge for verification.
    SubmitCode,
    /// Closes the pending code challenge without submitting it.
    CancelCodeEntry,
    /// Spends a consumable from the inventory collaborator.
    UseConsumable {
        /// Participant using the item.
        participant: ParticipantId,
        /// Item being spent.
        item: Consumable,
    },
    /// Fires a projectile along the participant's facing.
    Fire {
        /// Participant pulling the trigger.
        participant: ParticipantId,
        /// Ammunition kind loaded for the shot.
        payload: PayloadKind,
    },
    /// Applies one batch of hostile movement intents atomically.
    StepHostiles {
        /// Movement intents, one per hostile at most.
        steps: Vec<HostileStep>,
    },
    /// Applies one batch of projectile advancement intents atomically.
    AdvanceProjectiles {
        /// Advancement intents, one per projectile.
        steps: Vec<ProjectileStep>,
    },
    /// Emits a homing hazard from the arena boss toward a participant.
    EmitHomingHazard {
        /// Participant the hazard seeks.
        target: ParticipantId,
    },
    /// Applies one batch of homing-hazard advancement intents atomically.
    AdvanceHomingHazards {
        /// Advancement intents, one per hazard.
        steps: Vec<HazardStep>,
    },
    /// Summons short-lived ground pursuers around the arena boss.
    SpawnMinions,
    /// Places a required-payload target on a floor cell.
    SpawnPayloadTarget {
        /// Cell that receives the target.
        cell: CellCoord,
        /// Payload kind that destroys the target.
        required: PayloadKind,
    },
    /// Toggles the arena boss between its alert and dazed phases.
    CycleBossPhase,
    /// Tears the level down because an external deadline elapsed.
    EndLevel,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a level description was accepted and play started.
    LevelLoaded {
        /// Level number carried by the description.
        number: u32,
        /// Generation assigned to the freshly loaded level.
        generation: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the world switched stage.
    StageChanged {
        /// Stage that became active.
        stage: Stage,
    },
    /// Reports that a participant acquired the turn lock.
    TurnStarted {
        /// Participant whose move is resolving.
        participant: ParticipantId,
    },
    /// Reports that the turn lock was released.
    TurnCompleted {
        /// Participant whose move finished resolving.
        participant: ParticipantId,
    },
    /// Reports that a participant move was rejected.
    MoveRejected {
        /// Participant whose move was rejected.
        participant: ParticipantId,
        /// Specific reason the move failed.
        reason: RejectReason,
    },
    /// Confirms that a participant relocated.
    ParticipantMoved {
        /// Participant that moved.
        participant: ParticipantId,
        /// Cell occupied before the move.
        from: CellCoord,
        /// Cell occupied after the move.
        to: CellCoord,
    },
    /// Reports that a participant lost lives.
    ParticipantDamaged {
        /// Participant that was hurt.
        participant: ParticipantId,
        /// Amount of damage applied.
        damage: Damage,
        /// What caused the damage.
        cause: DamageCause,
        /// Lives left after the damage was applied.
        remaining: Lives,
    },
    /// Reports that a participant ran out of lives.
    ParticipantFell {
        /// Participant that fell.
        participant: ParticipantId,
    },
    /// Reports that a fallen participant re-entered play.
    ParticipantRespawned {
        /// Participant that respawned.
        participant: ParticipantId,
        /// Cell the participant respawned on.
        cell: CellCoord,
    },
    /// Reports that a participant reached an exit.
    ParticipantEscaped {
        /// Participant that escaped.
        participant: ParticipantId,
    },
    /// Confirms an in-place tile mutation.
    TileChanged {
        /// Cell whose tile changed.
        cell: CellCoord,
        /// Kind before the mutation.
        from: TileKind,
        /// Kind after the mutation.
        to: TileKind,
    },
    /// Reports that an informational tile revealed a secret value.
    SecretRevealed {
        /// Clue tile that revealed the value.
        clue: TileKind,
        /// Revealed code.
        code: String,
    },
    /// Reports that a code challenge opened.
    CodeEntryOpened {
        /// Gate cell guarded by the challenge.
        gate: CellCoord,
        /// Kind of gate guarded by the challenge.
        kind: GateKind,
    },
    /// Reports that a submitted code did not match.
    CodeRejected {
        /// Gate cell guarded by the challenge.
        gate: CellCoord,
    },
    /// Reports that the code challenge closed.
    CodeEntryClosed {
        /// Gate cell guarded by the challenge.
        gate: CellCoord,
    },
    /// Reports progress made on a timed-hold container.
    ContainerProgressed {
        /// Container cell.
        cell: CellCoord,
        /// Progress after the attempt, from 0 to 100.
        progress: u8,
    },
    /// Reports that the inventory collaborator received an item.
    ItemGranted {
        /// Item handed to the inventory.
        grant: Grant,
    },
    /// Reports that the inventory collaborator spent an item.
    ItemConsumed {
        /// Item removed from the inventory.
        item: Consumable,
    },
    /// Confirms that a hostile entity entered play.
    HostileSpawned {
        /// Identifier assigned to the hostile.
        hostile: HostileId,
        /// Kind of hostile created.
        kind: HostileKind,
        /// Cell the hostile occupies.
        cell: CellCoord,
    },
    /// Confirms that a hostile moved between two cells.
    HostileMoved {
        /// Hostile that moved.
        hostile: HostileId,
        /// Cell occupied before the move.
        from: CellCoord,
        /// Cell occupied after the move.
        to: CellCoord,
    },
    /// Confirms that a hostile left play.
    HostileRemoved {
        /// Hostile that was removed.
        hostile: HostileId,
        /// Kind of the removed hostile.
        kind: HostileKind,
    },
    /// Confirms that a projectile was fired.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Participant that fired it.
        owner: ParticipantId,
        /// Ammunition kind of the projectile.
        payload: PayloadKind,
    },
    /// Confirms that a projectile left play.
    ProjectileConsumed {
        /// Projectile that was consumed.
        projectile: ProjectileId,
    },
    /// Confirms that a homing hazard was emitted.
    HomingHazardEmitted {
        /// Identifier assigned to the hazard.
        hazard: HazardId,
        /// Participant the hazard seeks.
        target: ParticipantId,
    },
    /// Confirms that a homing hazard left play.
    HomingHazardDissipated {
        /// Hazard that was removed.
        hazard: HazardId,
    },
    /// Confirms that a required-payload target was placed.
    PayloadTargetSpawned {
        /// Identifier assigned to the target.
        target: PayloadTargetId,
        /// Cell the target occupies.
        cell: CellCoord,
        /// Payload required to destroy it.
        required: PayloadKind,
    },
    /// Confirms that a required-payload target was destroyed.
    PayloadTargetDestroyed {
        /// Target that was destroyed.
        target: PayloadTargetId,
    },
    /// Reports damage dealt to a boss.
    BossDamaged {
        /// Kind of boss that was hit.
        kind: HostileKind,
        /// Hit points removed after modifiers.
        amount: u32,
        /// Hit points left after the hit.
        hit_points: u32,
    },
    /// Reports that the arena boss changed phase.
    BossPhaseChanged {
        /// Phase that became active.
        phase: BossPhase,
    },
    /// Reports that a timed buff started or was refreshed.
    BuffApplied {
        /// Buff category.
        buff: BuffKind,
        /// Simulation time at which the buff expires.
        expires_at: Duration,
    },
    /// Reports that a timed buff expired.
    BuffExpired {
        /// Buff category.
        buff: BuffKind,
    },
    /// Reports that a boss encounter started.
    EncounterStarted,
    /// Reports that a boss encounter finished.
    EncounterResolved {
        /// How the encounter ended.
        outcome: EncounterOutcome,
    },
    /// Transient message for the presentation collaborator.
    Feedback(Feedback),
    /// Terminal: a participant escaped the level.
    LevelEscaped {
        /// Escaping participant in race mode, `None` in shared mode.
        winner: Option<ParticipantId>,
    },
    /// Terminal: every participant fell in shared mode.
    LevelFailed,
    /// Terminal: the arena boss was defeated.
    BossDefeated {
        /// Reward granted for the victory.
        reward: Consumable,
    },
}

impl Event {
    /// Extracts the terminal notification carried by the event, if any.
    #[must_use]
    pub fn terminal(&self) -> Option<TerminalEvent> {
        match self {
            Self::LevelEscaped { winner } => Some(TerminalEvent::LevelEscaped { winner: *winner }),
            Self::LevelFailed => Some(TerminalEvent::LevelFailed),
            Self::BossDefeated { reward } => Some(TerminalEvent::BossDefeated { reward: *reward }),
            _ => None,
        }
    }
}

/// Notifications addressed to the progression collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerminalEvent {
    /// A participant escaped the level.
    LevelEscaped {
        /// Escaping participant in race mode, `None` in shared mode.
        winner: Option<ParticipantId>,
    },
    /// Every participant fell.
    LevelFailed,
    /// The arena boss was defeated.
    BossDefeated {
        /// Reward granted for the victory.
        reward: Consumable,
    },
}

/// Movement intent for a single hostile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostileStep {
    /// Hostile that should move.
    pub hostile: HostileId,
    /// Destination cell.
    pub to: CellCoord,
}

/// Advancement intent for a single projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectileStep {
    /// Projectile being advanced.
    pub projectile: ProjectileId,
    /// What the projectile runs into on its next cell.
    pub outcome: ProjectileOutcome,
}

/// Geometric outcome of advancing a projectile by one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileOutcome {
    /// The next cell is free; the projectile travels into it.
    Travel(CellCoord),
    /// The next cell is a wall or lies outside the grid.
    Obstacle,
    /// The next cell holds a required-payload target.
    StrikeTarget {
        /// Target that was struck.
        target: PayloadTargetId,
        /// Cell of the target.
        cell: CellCoord,
    },
    /// The next cell holds a hostile.
    StrikeHostile {
        /// Hostile that was struck.
        hostile: HostileId,
        /// Cell of the hostile.
        cell: CellCoord,
    },
}

/// Advancement intent for a single homing hazard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HazardStep {
    /// Hazard being advanced.
    pub hazard: HazardId,
    /// What happens to the hazard this tick.
    pub outcome: HazardOutcome,
}

/// Outcome of advancing a homing hazard by one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HazardOutcome {
    /// The hazard keeps pursuing from the provided cell.
    Advance(CellCoord),
    /// The hazard reached a participant's cell.
    Strike {
        /// Participant occupying the reached cell.
        participant: ParticipantId,
    },
    /// The hazard lost its target or left the arena.
    Dissipate,
}

/// Unique identifier assigned to a participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(u8);

impl ParticipantId {
    /// Creates a new participant identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Unique identifier assigned to a hostile entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostileId(u32);

impl HostileId {
    /// Creates a new hostile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a homing hazard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HazardId(u32);

impl HazardId {
    /// Creates a new hazard identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a required-payload target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PayloadTargetId(u32);

impl PayloadTargetId {
    /// Creates a new target identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Returns the neighbouring cell in `direction`, or `None` below zero.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        self.offset(direction.delta())
    }

    /// Returns the cell displaced by `(dx, dy)`, or `None` below zero.
    #[must_use]
    pub fn offset(self, (dx, dy): (i32, i32)) -> Option<CellCoord> {
        let column = self.column.checked_add_signed(dx)?;
        let row = self.row.checked_add_signed(dy)?;
        Some(CellCoord::new(column, row))
    }

    /// Reports whether the cell lies inside a `columns` by `rows` grid.
    #[must_use]
    pub const fn within(&self, columns: u32, rows: u32) -> bool {
        self.column < columns && self.row < rows
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Cardinal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All four directions in a stable order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Column and row displacement produced by one step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Picks the greedy single-axis direction that closes the gap from `from` to `to`.
///
/// The horizontal axis wins only when it is strictly longer than the vertical
/// one. Returns `None` when both cells coincide.
#[must_use]
pub fn greedy_direction(from: CellCoord, to: CellCoord) -> Option<Direction> {
    let dx = i64::from(to.column()) - i64::from(from.column());
    let dy = i64::from(to.row()) - i64::from(from.row());

    if dx.abs() > dy.abs() {
        if dx > 0 {
            Some(Direction::East)
        } else {
            Some(Direction::West)
        }
    } else if dy > 0 {
        Some(Direction::South)
    } else if dy < 0 {
        Some(Direction::North)
    } else {
        None
    }
}

/// Selects the active participant closest to `from` by Manhattan distance.
///
/// Ties keep the participant that appears first in the view.
#[must_use]
pub fn nearest_active(from: CellCoord, participants: &ParticipantView) -> Option<&ParticipantSnapshot> {
    participants.active().fold(None, |best, candidate| match best {
        Some(existing)
            if from.manhattan_distance(candidate.cell)
                >= from.manhattan_distance(existing.cell) =>
        {
            Some(existing)
        }
        _ => Some(candidate),
    })
}

/// Greedy pursuit destination for a ground pursuer standing on `from`.
///
/// The pursuer targets the nearest active participant and only ever steps
/// onto plain floor; any other destination keeps it in place.
#[must_use]
pub fn pursuit_step(
    from: CellCoord,
    participants: &ParticipantView,
    tiles: &TileView<'_>,
) -> Option<CellCoord> {
    let target = nearest_active(from, participants)?;
    let next = from.step(greedy_direction(from, target.cell)?)?;
    (tiles.kind(next) == Some(TileKind::Floor)).then_some(next)
}

/// Closed set of tile kinds a level may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TileKind {
    /// Impassable tile.
    Wall,
    /// Plain walkable tile.
    Floor,
    /// Level entry point.
    Start,
    /// Level exit.
    Exit,
    /// Liquid that may drown whoever enters it.
    HazardLiquid,
    /// Obstacle that a held tool can break.
    BreakableObstacle,
    /// Timed-hold container holding a tool.
    Container,
    /// Clue revealing the locked-gate code.
    ClueA,
    /// Clue revealing the hidden-gate code.
    ClueB,
    /// Gate opened by the level's security code.
    LockedGate,
    /// Gate leading to the boss arena.
    HiddenGate,
}

impl TileKind {
    /// Reports whether a participant may ever stand on the tile.
    #[must_use]
    pub const fn is_occupiable(self) -> bool {
        !matches!(self, Self::Wall)
    }

    /// Maps a gate tile to its gate kind.
    #[must_use]
    pub const fn gate_kind(self) -> Option<GateKind> {
        match self {
            Self::LockedGate => Some(GateKind::Locked),
            Self::HiddenGate => Some(GateKind::Hidden),
            _ => None,
        }
    }
}

/// Gates that open a code challenge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateKind {
    /// Locked gate that turns into floor.
    Locked,
    /// Hidden gate that leads into the boss arena.
    Hidden,
}

/// Kinds of hostile entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostileKind {
    /// Ground pursuer held by the primary stun.
    Rat,
    /// Ground pursuer held by the secondary stun.
    Thief,
    /// Boss variant A that lives inside the arena.
    ArenaBoss,
    /// Boss variant B: a fast pursuer guarding the exit.
    GiantRat,
    /// Boss variant C: shielded from direct hits, beaten through payload targets.
    Warden,
    /// Stationary threat that hurts on contact.
    Animatronic,
}

impl HostileKind {
    /// Reports whether the hostile takes part in the greedy pursuit step.
    #[must_use]
    pub const fn is_ground_pursuer(self) -> bool {
        matches!(self, Self::Rat | Self::Thief)
    }

    /// Reports whether the hostile is one of the boss variants.
    #[must_use]
    pub const fn is_boss(self) -> bool {
        matches!(self, Self::ArenaBoss | Self::GiantRat | Self::Warden)
    }

    /// Reports whether walking into the hostile cancels the move with damage.
    #[must_use]
    pub const fn blocks_on_entry(self) -> bool {
        matches!(
            self,
            Self::ArenaBoss | Self::GiantRat | Self::Warden | Self::Animatronic
        )
    }

    /// Buff that freezes the hostile, if any.
    #[must_use]
    pub const fn stun_buff(self) -> Option<BuffKind> {
        match self {
            Self::Rat | Self::GiantRat => Some(BuffKind::HostileStun),
            Self::Thief => Some(BuffKind::SecondaryHostileStun),
            Self::ArenaBoss | Self::Warden | Self::Animatronic => None,
        }
    }
}

/// Mutually exclusive ammunition kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadKind {
    /// Standard ammunition, always available.
    Normal,
    /// Fire ammunition, unlocked through the inventory.
    Fire,
    /// Cheese ammunition, unlocked through the inventory.
    Cheese,
}

impl PayloadKind {
    /// All payload kinds in a stable order.
    pub const ALL: [PayloadKind; 3] = [PayloadKind::Normal, PayloadKind::Fire, PayloadKind::Cheese];

    /// Boss damage dealt by a direct hit before difficulty modifiers.
    #[must_use]
    pub const fn base_damage(self) -> u32 {
        match self {
            Self::Normal => 20,
            Self::Fire => 40,
            Self::Cheese => 60,
        }
    }
}

/// Consumables tracked by the inventory collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Consumable {
    /// Removes nearby rats.
    RatPoison,
    /// Stuns rats.
    Cheese,
    /// Removes nearby thieves.
    Knife,
    /// Stuns thieves.
    Flute,
    /// Removes nearby animatronics.
    WaterBucket,
    /// Grants temporary invincibility.
    MagicStar,
}

/// Tools that stay equipped once obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    /// Breaks breakable obstacles.
    Hammer,
}

/// Items the simulation hands to the inventory collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Grant {
    /// A single consumable.
    Consumable(Consumable),
    /// An equipped tool.
    Tool(Tool),
}

/// Remaining lives measured in half-life units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lives(u32);

impl Lives {
    /// Lives worth `count` whole lives.
    #[must_use]
    pub const fn whole(count: u32) -> Self {
        Self(count.saturating_mul(2))
    }

    /// Number of half-life units left.
    #[must_use]
    pub const fn halves(&self) -> u32 {
        self.0
    }

    /// Reports whether no life remains.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }

    /// Removes `damage`, stopping at zero.
    #[must_use]
    pub const fn after(self, damage: Damage) -> Self {
        Self(self.0.saturating_sub(damage.halves()))
    }
}

impl fmt::Display for Lives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}.5", self.0 / 2)
        }
    }
}

/// Damage dealt to a participant measured in half-life units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Damage(u32);

impl Damage {
    /// Half a life: partial self-damage.
    pub const HALF_LIFE: Damage = Damage(1);
    /// One whole life.
    pub const ONE_LIFE: Damage = Damage(2);

    /// Number of half-life units dealt.
    #[must_use]
    pub const fn halves(&self) -> u32 {
        self.0
    }

    /// Reports whether the damage amounts to at least one whole life.
    #[must_use]
    pub const fn is_whole_life(&self) -> bool {
        self.0 >= Self::ONE_LIFE.0
    }
}

/// Causes of participant damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DamageCause {
    /// Contact with a hostile.
    Hostile(HostileKind),
    /// Lost the hazard-liquid roll.
    Drowned,
    /// The container reward blew up.
    Malfunction,
    /// Reached by a homing hazard.
    HomingHazard,
}

impl fmt::Display for DamageCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hostile(HostileKind::Rat) => write!(f, "bitten by a rat"),
            Self::Hostile(HostileKind::Thief) => write!(f, "caught by a thief"),
            Self::Hostile(HostileKind::Animatronic) => write!(f, "jumpscared"),
            Self::Hostile(_) => write!(f, "struck by the boss"),
            Self::Drowned => write!(f, "drowned"),
            Self::Malfunction => write!(f, "the tool was faulty"),
            Self::HomingHazard => write!(f, "hit by lightning"),
        }
    }
}

/// Reasons a participant move may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Another move currently holds the turn lock.
    TurnInProgress,
    /// A code challenge is waiting for input.
    ModalPending,
    /// The participant does not exist.
    UnknownParticipant,
    /// The participant is eliminated, escaped, or crouching.
    Inactive,
    /// The destination is a wall or lies outside the grid.
    Blocked,
    /// The destination needs a tool the inventory does not hold.
    MissingTool(Tool),
    /// The destination opened an interaction instead of a move.
    Interaction(TileKind),
    /// The exit refused the participant because a requirement is unmet.
    ExitGated(ExitRequirement),
    /// A hostile occupies the destination and hurts on contact.
    HostileContact(HostileKind),
}

/// Category of a transient feedback message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Neutral information.
    Info,
    /// Something good happened.
    Success,
    /// A request was refused.
    Warning,
    /// Someone got hurt.
    Danger,
}

/// Transient message addressed to the presentation collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Feedback {
    /// Text of the message.
    pub text: String,
    /// Category of the message.
    pub severity: Severity,
}

impl Feedback {
    /// Creates a new feedback message.
    #[must_use]
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }
}

/// Timed buff categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuffKind {
    /// Freezes rats and the giant rat.
    HostileStun,
    /// Freezes thieves.
    SecondaryHostileStun,
    /// Makes every participant immune to damage.
    Invincibility,
}

/// Reports whether a buff with the given expiry is active at `now`.
#[must_use]
pub fn buff_active(expiry: Duration, now: Duration) -> bool {
    now < expiry
}

/// Sums the simulation time reported by `TimeAdvanced` events.
#[must_use]
pub fn time_advanced(events: &[Event]) -> Duration {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TimeAdvanced { dt } => Some(*dt),
            _ => None,
        })
        .fold(Duration::ZERO, Duration::saturating_add)
}

/// Fixed-period accumulator used by the tick processes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cadence {
    interval: Duration,
    elapsed: Duration,
}

impl Cadence {
    /// Creates a cadence firing every `interval`; a zero interval never fires.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
        }
    }

    /// Accumulates `dt` and returns how many whole periods elapsed.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if self.interval.is_zero() {
            return 0;
        }
        let elapsed = self.elapsed.saturating_add(dt).as_nanos();
        let interval = self.interval.as_nanos();
        // The remainder is below `interval`, which itself came from a `Duration`.
        self.elapsed = Duration::from_nanos(u64::try_from(elapsed % interval).unwrap_or(u64::MAX));
        u32::try_from(elapsed / interval).unwrap_or(u32::MAX)
    }

    /// Drops any partially accumulated period.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    /// Changes the period, keeping the accumulated time.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Period between firings.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

/// Phases of the arena boss.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BossPhase {
    /// The boss moves and emits homing hazards.
    #[default]
    Alert,
    /// The boss is harmless and takes double damage.
    Dazed,
}

/// Ways a boss encounter can end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncounterOutcome {
    /// The boss ran out of hit points.
    Victory,
    /// The level ended while the encounter was running.
    Abort,
}

/// Immutable representation of a participant used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticipantSnapshot {
    /// Identifier of the participant.
    pub id: ParticipantId,
    /// Cell currently occupied.
    pub cell: CellCoord,
    /// Lives left.
    pub lives: Lives,
    /// Whether the participant is out of play.
    pub eliminated: bool,
    /// Whether the participant reached an exit.
    pub escaped: bool,
    /// Whether the participant is crouching.
    pub crouching: bool,
    /// Direction of the last attempted move.
    pub facing: Direction,
}

impl ParticipantSnapshot {
    /// Reports whether the participant still takes part in play.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.eliminated && !self.escaped
    }
}

/// Read-only snapshot describing all participants.
#[derive(Clone, Debug, Default)]
pub struct ParticipantView {
    snapshots: Vec<ParticipantSnapshot>,
}

impl ParticipantView {
    /// Creates a new participant view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ParticipantSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over every participant in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ParticipantSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over participants that are neither eliminated nor escaped.
    pub fn active(&self) -> impl Iterator<Item = &ParticipantSnapshot> {
        self.snapshots.iter().filter(|snapshot| snapshot.is_active())
    }

    /// Looks up a participant by identifier.
    #[must_use]
    pub fn get(&self, id: ParticipantId) -> Option<&ParticipantSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == id)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ParticipantSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a hostile used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostileSnapshot {
    /// Identifier of the hostile.
    pub id: HostileId,
    /// Kind of hostile.
    pub kind: HostileKind,
    /// Cell currently occupied.
    pub cell: CellCoord,
    /// Whether the hostile is neutralized.
    pub held: bool,
}

/// Read-only snapshot describing all hostiles.
#[derive(Clone, Debug, Default)]
pub struct HostileView {
    snapshots: Vec<HostileSnapshot>,
}

impl HostileView {
    /// Creates a new hostile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<HostileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured hostiles in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &HostileSnapshot> {
        self.snapshots.iter()
    }

    /// Returns the first hostile occupying `cell`, if any.
    #[must_use]
    pub fn at(&self, cell: CellCoord) -> Option<&HostileSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.cell == cell)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<HostileSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectileSnapshot {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Cell currently occupied.
    pub cell: CellCoord,
    /// Fixed direction of travel.
    pub direction: Direction,
    /// Participant that fired it.
    pub owner: ParticipantId,
    /// Ammunition kind.
    pub payload: PayloadKind,
}

/// Immutable representation of a homing hazard used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HazardSnapshot {
    /// Identifier of the hazard.
    pub id: HazardId,
    /// Cell currently occupied.
    pub cell: CellCoord,
    /// Participant being sought.
    pub target: ParticipantId,
}

/// Immutable representation of a required-payload target used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayloadTargetSnapshot {
    /// Identifier of the target.
    pub id: PayloadTargetId,
    /// Cell currently occupied.
    pub cell: CellCoord,
    /// Payload required to destroy it.
    pub required: PayloadKind,
}

/// Read-only view into the dense tile lattice.
#[derive(Clone, Copy, Debug)]
pub struct TileView<'a> {
    cells: &'a [TileKind],
    columns: u32,
    rows: u32,
}

impl<'a> TileView<'a> {
    /// Captures a new tile view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [TileKind], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the tile kind at `cell`, or `None` outside the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<TileKind> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Enumerates every plain floor cell in row-major order.
    #[must_use]
    pub fn floor_cells(&self) -> Vec<CellCoord> {
        let columns = self.columns;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, kind)| **kind == TileKind::Floor)
            .filter_map(|(index, _)| {
                let index = u32::try_from(index).ok()?;
                Some(CellCoord::new(index % columns, index / columns))
            })
            .collect()
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.within(self.columns, self.rows) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Immutable representation of the active boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BossSnapshot {
    /// Boss variant.
    pub kind: HostileKind,
    /// Hit points left, from 0 to 100.
    pub hit_points: u32,
    /// Current phase; level bosses stay alert.
    pub phase: BossPhase,
}

/// Expiry timestamps of the timed buffs; zero means inactive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuffSnapshot {
    /// Expiry of the primary hostile stun.
    pub hostile_stun: Duration,
    /// Expiry of the secondary hostile stun.
    pub secondary_hostile_stun: Duration,
    /// Expiry of the participant invincibility.
    pub invincibility: Duration,
}

impl BuffSnapshot {
    /// Expiry timestamp stored for `buff`.
    #[must_use]
    pub const fn expiry(&self, buff: BuffKind) -> Duration {
        match buff {
            BuffKind::HostileStun => self.hostile_stun,
            BuffKind::SecondaryHostileStun => self.secondary_hostile_stun,
            BuffKind::Invincibility => self.invincibility,
        }
    }

    /// Reports whether `buff` is active at `now`.
    #[must_use]
    pub fn is_active(&self, buff: BuffKind, now: Duration) -> bool {
        buff_active(self.expiry(buff), now)
    }
}

/// Pending modal interaction shown to the presentation collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeEntrySnapshot {
    /// Gate guarded by the challenge.
    pub gate: CellCoord,
    /// Kind of gate.
    pub kind: GateKind,
    /// Digits typed so far.
    pub input: String,
}

/// Complete read-only picture of the simulation for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSnapshot {
    /// Active stage.
    pub stage: Stage,
    /// Simulation clock.
    pub now: Duration,
    /// Grid width in cells.
    pub columns: u32,
    /// Grid height in cells.
    pub rows: u32,
    /// Tile kinds in row-major order.
    pub tiles: Vec<TileKind>,
    /// Participants.
    pub participants: Vec<ParticipantSnapshot>,
    /// Hostiles.
    pub hostiles: Vec<HostileSnapshot>,
    /// Projectiles in flight.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Homing hazards.
    pub hazards: Vec<HazardSnapshot>,
    /// Required-payload targets.
    pub payload_targets: Vec<PayloadTargetSnapshot>,
    /// Active boss, if any.
    pub boss: Option<BossSnapshot>,
    /// Buff expiries.
    pub buffs: BuffSnapshot,
    /// Pending code challenge.
    pub code_entry: Option<CodeEntrySnapshot>,
    /// Progress on the container being opened, from 0 to 100.
    pub container_progress: u8,
    /// Remaining ammunition.
    pub ammunition: u32,
    /// Most recent feedback still on screen.
    pub feedback: Option<Feedback>,
}

impl WorldSnapshot {
    /// Returns the tile kind at `cell`, or `None` outside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<TileKind> {
        TileView::new(&self.tiles, self.columns, self.rows).kind(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn greedy_direction_prefers_horizontal_only_when_strictly_longer() {
        let origin = CellCoord::new(2, 2);
        assert_eq!(
            greedy_direction(origin, CellCoord::new(5, 3)),
            Some(Direction::East)
        );
        assert_eq!(
            greedy_direction(origin, CellCoord::new(0, 4)),
            Some(Direction::South)
        );
        assert_eq!(
            greedy_direction(origin, CellCoord::new(3, 1)),
            Some(Direction::North)
        );
        assert_eq!(greedy_direction(origin, origin), None);
    }

    #[test]
    fn step_refuses_negative_coordinates() {
        assert_eq!(CellCoord::new(0, 3).step(Direction::West), None);
        assert_eq!(
            CellCoord::new(0, 3).step(Direction::East),
            Some(CellCoord::new(1, 3))
        );
    }

    #[test]
    fn nearest_active_skips_inactive_and_keeps_first_on_ties() {
        let snapshot = |id: u8, column: u32, escaped: bool| ParticipantSnapshot {
            id: ParticipantId::new(id),
            cell: CellCoord::new(column, 0),
            lives: Lives::whole(3),
            eliminated: false,
            escaped,
            crouching: false,
            facing: Direction::South,
        };
        let view = ParticipantView::from_snapshots(vec![
            snapshot(1, 4, false),
            snapshot(2, 0, false),
            snapshot(3, 2, true),
        ]);

        let nearest = nearest_active(CellCoord::new(2, 0), &view).expect("active participant");
        assert_eq!(nearest.id, ParticipantId::new(1));
    }

    #[test]
    fn buffs_are_active_strictly_before_expiry() {
        let expiry = Duration::from_secs(10);
        assert!(buff_active(expiry, Duration::from_secs(9)));
        assert!(!buff_active(expiry, expiry));
        assert!(!buff_active(Duration::ZERO, Duration::ZERO));
    }

    #[test]
    fn lives_display_half_units() {
        assert_eq!(Lives::whole(3).to_string(), "3");
        assert_eq!(Lives::whole(3).after(Damage::HALF_LIFE).to_string(), "2.5");
        assert!(Lives::whole(1).after(Damage::ONE_LIFE).is_depleted());
    }

    #[test]
    fn floor_cells_are_listed_in_row_major_order() {
        let tiles = [
            TileKind::Wall,
            TileKind::Floor,
            TileKind::Floor,
            TileKind::Exit,
        ];
        let view = TileView::new(&tiles, 2, 2);
        assert_eq!(
            view.floor_cells(),
            vec![CellCoord::new(1, 0), CellCoord::new(0, 1)]
        );
        assert_eq!(view.kind(CellCoord::new(2, 0)), None);
    }

    #[test]
    fn terminal_events_are_extracted() {
        assert_eq!(
            Event::LevelFailed.terminal(),
            Some(TerminalEvent::LevelFailed)
        );
        assert_eq!(Event::EncounterStarted.terminal(), None);
    }

    #[test]
    fn cadence_counts_whole_periods_and_keeps_the_remainder() {
        let mut cadence = Cadence::new(Duration::from_millis(400));
        assert_eq!(cadence.advance(Duration::from_millis(300)), 0);
        assert_eq!(cadence.advance(Duration::from_millis(900)), 3);
        cadence.reset();
        assert_eq!(cadence.advance(Duration::from_millis(399)), 0);

        let mut idle = Cadence::new(Duration::ZERO);
        assert_eq!(idle.advance(Duration::from_secs(5)), 0);
    }

    #[test]
    fn cadence_handles_huge_frames_without_iterating() {
        let mut cadence = Cadence::new(Duration::from_nanos(1));
        assert_eq!(cadence.advance(Duration::from_secs(3_600)), u32::MAX);

        let mut cadence = Cadence::new(Duration::from_millis(400));
        assert_eq!(cadence.advance(Duration::from_secs(4_000)), 10_000);
        assert_eq!(cadence.advance(Duration::from_millis(399)), 0);
        assert_eq!(cadence.advance(Duration::from_millis(1)), 1);
    }

    #[test]
    fn time_advanced_sums_ticks_only() {
        let events = [
            Event::TimeAdvanced {
                dt: Duration::from_millis(16),
            },
            Event::EncounterStarted,
            Event::TimeAdvanced {
                dt: Duration::from_millis(34),
            },
        ];
        assert_eq!(time_advanced(&events), Duration::from_millis(50));
    }
}
