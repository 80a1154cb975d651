//! Boss encounter controller: arena swap, phases, minions and homing hazards.

use maze_escape_core::{
    BossPhase, BossSnapshot, CellCoord, Consumable, Damage, DamageCause, Direction,
    EncounterOutcome, Event, Grant, HazardOutcome, HazardStep, HostileId, HostileKind,
    ParticipantId, PayloadKind, Severity, Stage, TerminalEvent, TileKind, ARENA_BOSS_CELL,
    ARENA_ENTRY, ARENA_SIZE, PAYLOAD_TARGET_CAPACITY,
};
use tracing::{debug, info, trace};

use crate::{
    damage,
    grid::Grid,
    registry::{Hazard, Hostile, PayloadTarget, Registry},
    schedule::Action,
    World, WorldState,
};

const ENCOUNTER_REWARD: Consumable = Consumable::MagicStar;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BossState {
    pub(crate) kind: HostileKind,
    pub(crate) hit_points: u32,
    pub(crate) phase: BossPhase,
}

impl BossState {
    pub(crate) const fn new(kind: HostileKind, hit_points: u32) -> Self {
        Self {
            kind,
            hit_points,
            phase: BossPhase::Alert,
        }
    }

    pub(crate) const fn snapshot(&self) -> BossSnapshot {
        BossSnapshot {
            kind: self.kind,
            hit_points: self.hit_points,
            phase: self.phase,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct SavedPosition {
    id: ParticipantId,
    cell: CellCoord,
    facing: Direction,
}

/// Overworld captured while the arena runs.
#[derive(Clone, Debug)]
pub(crate) struct Encounter {
    saved: WorldState,
    positions: Vec<SavedPosition>,
    ammunition: u32,
}

/// Swaps the overworld for the arena and moves everyone to its entry.
pub(crate) fn enter_encounter(world: &mut World, out_events: &mut Vec<Event>) {
    let boss = Hostile {
        id: world.ids.hostile(),
        kind: HostileKind::ArenaBoss,
        cell: ARENA_BOSS_CELL,
        held: false,
    };
    let arena = WorldState {
        grid: Grid::arena(ARENA_SIZE),
        registry: Registry {
            hostiles: vec![boss],
            ..Registry::default()
        },
        boss: Some(BossState::new(
            HostileKind::ArenaBoss,
            world.config.boss_hit_points(),
        )),
    };

    let saved = std::mem::replace(&mut world.state, arena);
    let positions = world
        .participants
        .iter()
        .map(|participant| SavedPosition {
            id: participant.id,
            cell: participant.cell,
            facing: participant.facing,
        })
        .collect();
    world.encounter = Some(Encounter {
        saved,
        positions,
        ammunition: world.ammunition,
    });
    world.encounter_generation = world.encounter_generation.wrapping_add(1);
    world.turn_lock = None;
    world.stage = Stage::Arena;
    world.ammunition = world.config.arena_ammunition();

    out_events.push(Event::EncounterStarted);
    out_events.push(Event::StageChanged {
        stage: Stage::Arena,
    });
    out_events.push(Event::HostileSpawned {
        hostile: boss.id,
        kind: boss.kind,
        cell: boss.cell,
    });
    for participant in &mut world.participants {
        let from = participant.cell;
        participant.cell = ARENA_ENTRY;
        participant.facing = Direction::South;
        out_events.push(Event::ParticipantMoved {
            participant: participant.id,
            from,
            to: ARENA_ENTRY,
        });
    }

    info!(
        level = world.level.number,
        encounter = world.encounter_generation,
        "boss encounter started"
    );
    world.notify("Pistol equipped! Defeat the boss", Severity::Warning, out_events);
}

/// Restores the overworld after the arena boss ran out of hit points.
pub(crate) fn conclude_encounter(world: &mut World, out_events: &mut Vec<Event>) {
    if world.state.boss.map_or(true, |boss| boss.hit_points > 0) {
        return;
    }
    let Some(encounter) = world.encounter.take() else {
        return;
    };

    world.state = encounter.saved;
    world.ammunition = encounter.ammunition;
    world.encounter_generation = world.encounter_generation.wrapping_add(1);
    world.turn_lock = None;
    world.stage = Stage::Overworld;

    for gate in world.state.grid.cells_of(TileKind::HiddenGate) {
        world.change_tile(gate, TileKind::Floor, out_events);
    }
    for participant in &mut world.participants {
        let Some(saved) = encounter
            .positions
            .iter()
            .find(|saved| saved.id == participant.id)
        else {
            continue;
        };
        let from = participant.cell;
        participant.cell = saved.cell;
        participant.facing = saved.facing;
        participant.crouching = false;
        out_events.push(Event::ParticipantMoved {
            participant: participant.id,
            from,
            to: saved.cell,
        });
    }

    let grant = Grant::Consumable(ENCOUNTER_REWARD);
    world.inventory.grant(grant);
    out_events.push(Event::ItemGranted { grant });
    out_events.push(Event::EncounterResolved {
        outcome: EncounterOutcome::Victory,
    });
    out_events.push(Event::StageChanged {
        stage: Stage::Overworld,
    });
    info!(level = world.level.number, "boss encounter won");
    world.emit_terminal(
        TerminalEvent::BossDefeated {
            reward: ENCOUNTER_REWARD,
        },
        out_events,
    );
    world.notify("Boss defeated! +1 Magic Star", Severity::Success, out_events);
}

/// Toggles the arena boss between alert and dazed.
pub(crate) fn cycle_phase(world: &mut World, out_events: &mut Vec<Event>) {
    if world.stage != Stage::Arena {
        return;
    }
    let Some(boss) = world
        .state
        .boss
        .as_mut()
        .filter(|boss| boss.hit_points > 0)
    else {
        return;
    };
    boss.phase = match boss.phase {
        BossPhase::Alert => BossPhase::Dazed,
        BossPhase::Dazed => BossPhase::Alert,
    };
    let phase = boss.phase;
    out_events.push(Event::BossPhaseChanged { phase });

    match phase {
        BossPhase::Dazed => {
            for hazard in std::mem::take(&mut world.state.registry.hazards) {
                out_events.push(Event::HomingHazardDissipated { hazard: hazard.id });
            }
            world.notify("The boss is dazed!", Severity::Success, out_events);
        }
        BossPhase::Alert => world.notify("The boss recovered!", Severity::Warning, out_events),
    }
}

/// Summons short-lived ground pursuers on free arena floor.
pub(crate) fn spawn_minions(world: &mut World, out_events: &mut Vec<Event>) {
    if world.stage != Stage::Arena {
        return;
    }
    let mut free: Vec<CellCoord> = world
        .state
        .grid
        .cells_of(TileKind::Floor)
        .into_iter()
        .filter(|cell| {
            world.state.registry.hostile_at(*cell).is_none()
                && !world
                    .participants
                    .iter()
                    .any(|participant| participant.cell == *cell)
        })
        .collect();

    let lifetime = world.config.minion_lifetime();
    for _ in 0..world.config.minion_count() {
        if free.is_empty() {
            break;
        }
        let cell = free.swap_remove(world.dice.below(free.len()));
        let minion = Hostile {
            id: world.ids.hostile(),
            kind: HostileKind::Rat,
            cell,
            held: false,
        };
        world.state.registry.hostiles.push(minion);
        out_events.push(Event::HostileSpawned {
            hostile: minion.id,
            kind: minion.kind,
            cell,
        });
        world.schedule_after(lifetime, Action::Despawn(minion.id));
    }
    world.notify("The boss calls its rats!", Severity::Danger, out_events);
}

pub(crate) fn despawn_minion(world: &mut World, hostile: HostileId, out_events: &mut Vec<Event>) {
    if let Some(removed) = world.state.registry.remove_hostile(hostile) {
        out_events.push(Event::HostileRemoved {
            hostile,
            kind: removed.kind,
        });
    }
}

/// Launches a homing hazard from the alert arena boss.
pub(crate) fn emit_hazard(world: &mut World, target: ParticipantId, out_events: &mut Vec<Event>) {
    if world.stage != Stage::Arena || world.boss_is_dazed() {
        return;
    }
    if !world
        .participant(target)
        .is_some_and(|participant| participant.is_active())
    {
        return;
    }
    let Some(origin) = world
        .state
        .registry
        .first_of_kind(HostileKind::ArenaBoss)
        .map(|boss| boss.cell)
    else {
        return;
    };
    let hazard = Hazard {
        id: world.ids.hazard(),
        cell: origin,
        target,
    };
    world.state.registry.hazards.push(hazard);
    out_events.push(Event::HomingHazardEmitted {
        hazard: hazard.id,
        target,
    });
}

/// Applies one homing-hazard batch.
pub(crate) fn advance_hazards(
    world: &mut World,
    steps: Vec<HazardStep>,
    out_events: &mut Vec<Event>,
) {
    if world.stage != Stage::Arena {
        return;
    }
    trace!(steps = steps.len(), "homing hazard batch");
    let (columns, rows) = world.state.grid.dimensions();
    for step in steps {
        match step.outcome {
            HazardOutcome::Advance(cell) if cell.within(columns, rows) => {
                if let Some(hazard) = world
                    .state
                    .registry
                    .hazards
                    .iter_mut()
                    .find(|hazard| hazard.id == step.hazard)
                {
                    hazard.cell = cell;
                }
            }
            HazardOutcome::Advance(_) | HazardOutcome::Dissipate => {
                dissipate(world, step, out_events);
            }
            HazardOutcome::Strike { participant } => {
                if world.state.registry.remove_hazard(step.hazard).is_none() {
                    continue;
                }
                out_events.push(Event::HomingHazardDissipated {
                    hazard: step.hazard,
                });
                let crouching = world
                    .participant(participant)
                    .is_some_and(|participant| participant.crouching);
                if crouching {
                    world.notify(
                        format!("{participant} dodged the lightning"),
                        Severity::Success,
                        out_events,
                    );
                } else {
                    damage::apply_participant_damage(
                        world,
                        participant,
                        Damage::ONE_LIFE,
                        DamageCause::HomingHazard,
                        out_events,
                    );
                }
            }
        }
    }
}

fn dissipate(world: &mut World, step: HazardStep, out_events: &mut Vec<Event>) {
    if world.state.registry.remove_hazard(step.hazard).is_some() {
        out_events.push(Event::HomingHazardDissipated {
            hazard: step.hazard,
        });
    }
}

/// Places a required-payload target while the warden is standing.
pub(crate) fn spawn_payload_target(
    world: &mut World,
    cell: CellCoord,
    required: PayloadKind,
    out_events: &mut Vec<Event>,
) {
    let warden_standing = world.stage == Stage::Overworld
        && world
            .state
            .boss
            .is_some_and(|boss| boss.kind == HostileKind::Warden && boss.hit_points > 0);
    if !warden_standing {
        return;
    }
    let registry = &world.state.registry;
    if registry.payload_targets.len() >= PAYLOAD_TARGET_CAPACITY
        || registry.payload_target_at(cell).is_some()
        || world.state.grid.kind(cell) != Some(TileKind::Floor)
    {
        debug!(%cell, "payload target placement refused");
        return;
    }
    let target = PayloadTarget {
        id: world.ids.payload_target(),
        cell,
        required,
    };
    world.state.registry.payload_targets.push(target);
    out_events.push(Event::PayloadTargetSpawned {
        target: target.id,
        cell,
        required,
    });
}
