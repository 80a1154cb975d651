//! Code challenges and timed-hold containers.

use maze_escape_core::{
    CellCoord, CodeEntrySnapshot, Damage, DamageCause, Direction, Event, GateKind, Grant,
    ParticipantId, RejectReason, Severity, TileKind, Tool, CODE_LENGTH,
};
use tracing::debug;

use crate::{boss, container_malfunctions, damage, World};

const HOLD_INCREMENT: u8 = 10;
const HOLD_COMPLETE: u8 = 100;

/// Order in which the cells around a participant are searched for a container.
const HOLD_SCAN: [Direction; 4] = [
    Direction::East,
    Direction::West,
    Direction::South,
    Direction::North,
];

#[derive(Clone, Debug, PartialEq, Eq)]
struct CodeEntry {
    gate: CellCoord,
    kind: GateKind,
    input: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ContainerHold {
    participant: ParticipantId,
    cell: CellCoord,
    progress: u8,
}

/// Pending modal interaction and container progress.
#[derive(Clone, Debug, Default)]
pub(crate) struct PuzzleState {
    code_entry: Option<CodeEntry>,
    container: Option<ContainerHold>,
}

impl PuzzleState {
    pub(crate) const fn modal_pending(&self) -> bool {
        self.code_entry.is_some()
    }

    pub(crate) fn code_entry_snapshot(&self) -> Option<CodeEntrySnapshot> {
        self.code_entry.as_ref().map(|entry| CodeEntrySnapshot {
            gate: entry.gate,
            kind: entry.kind,
            input: entry.input.clone(),
        })
    }

    pub(crate) fn container_progress(&self) -> u8 {
        self.container.map_or(0, |hold| hold.progress)
    }
}

/// Opens the code challenge guarding `gate` instead of moving onto it.
pub(crate) fn open_code_entry(
    world: &mut World,
    participant: ParticipantId,
    gate: CellCoord,
    tile: TileKind,
    out_events: &mut Vec<Event>,
) {
    let Some(kind) = tile.gate_kind() else {
        return;
    };
    world.puzzle.code_entry = Some(CodeEntry {
        gate,
        kind,
        input: String::new(),
    });
    out_events.push(Event::MoveRejected {
        participant,
        reason: RejectReason::Interaction(tile),
    });
    out_events.push(Event::CodeEntryOpened { gate, kind });
    world.notify("Enter the 4-digit code", Severity::Info, out_events);
}

pub(crate) fn enter_digit(world: &mut World, digit: u8, out_events: &mut Vec<Event>) {
    let Some(entry) = world.puzzle.code_entry.as_mut() else {
        debug!(digit, "digit entered without a pending code challenge");
        world.notify("No code is being entered", Severity::Warning, out_events);
        return;
    };
    if digit > 9 {
        world.notify("Digits only", Severity::Warning, out_events);
        return;
    }
    if entry.input.len() < CODE_LENGTH {
        entry.input.push(char::from(b'0' + digit));
    }
}

pub(crate) fn clear_code(world: &mut World) {
    if let Some(entry) = world.puzzle.code_entry.as_mut() {
        entry.input.clear();
    }
}

pub(crate) fn cancel_code_entry(world: &mut World, out_events: &mut Vec<Event>) {
    if let Some(entry) = world.puzzle.code_entry.take() {
        out_events.push(Event::CodeEntryClosed { gate: entry.gate });
    }
}

/// Compares the typed digits with the code of the gate being unlocked.
pub(crate) fn submit_code(world: &mut World, out_events: &mut Vec<Event>) {
    let Some(entry) = world.puzzle.code_entry.as_mut() else {
        debug!("code submitted without a pending challenge");
        world.notify("No code is being entered", Severity::Warning, out_events);
        return;
    };
    let expected = match entry.kind {
        GateKind::Locked => &world.level.security_code,
        GateKind::Hidden => &world.level.secret_code,
    };
    if entry.input != *expected {
        entry.input.clear();
        let gate = entry.gate;
        out_events.push(Event::CodeRejected { gate });
        world.notify("Wrong code!", Severity::Warning, out_events);
        return;
    }

    let gate = entry.gate;
    let kind = entry.kind;
    world.puzzle.code_entry = None;
    out_events.push(Event::CodeEntryClosed { gate });
    match kind {
        GateKind::Locked => {
            world.change_tile(gate, TileKind::Floor, out_events);
            world.notify("Access granted!", Severity::Success, out_events);
        }
        GateKind::Hidden => {
            world.notify("Correct code!", Severity::Success, out_events);
            boss::enter_encounter(world, out_events);
        }
    }
}

/// Registers one hold attempt on the container next to `participant`.
pub(crate) fn hold_container(
    world: &mut World,
    participant: ParticipantId,
    out_events: &mut Vec<Event>,
) {
    if world.puzzle.modal_pending() {
        world.notify("Finish entering the code first", Severity::Warning, out_events);
        return;
    }
    let Some(origin) = world
        .participant(participant)
        .filter(|entry| entry.is_active())
        .map(|entry| entry.cell)
    else {
        world.notify(format!("{participant} cannot act right now"), Severity::Warning, out_events);
        return;
    };
    let Some(cell) = HOLD_SCAN
        .iter()
        .filter_map(|direction| origin.step(*direction))
        .find(|cell| world.state.grid.kind(*cell) == Some(TileKind::Container))
    else {
        world.notify("There is no chest nearby", Severity::Info, out_events);
        return;
    };

    let previous = world
        .puzzle
        .container
        .filter(|hold| hold.participant == participant && hold.cell == cell)
        .map_or(0, |hold| hold.progress);
    let progress = previous.saturating_add(HOLD_INCREMENT).min(HOLD_COMPLETE);
    out_events.push(Event::ContainerProgressed { cell, progress });

    if progress < HOLD_COMPLETE {
        world.puzzle.container = Some(ContainerHold {
            participant,
            cell,
            progress,
        });
        return;
    }

    world.puzzle.container = None;
    let roll = world.dice.unit();
    if container_malfunctions(roll) {
        world.notify("BOOM! The hammer was faulty", Severity::Danger, out_events);
        damage::apply_participant_damage(
            world,
            participant,
            Damage::HALF_LIFE,
            DamageCause::Malfunction,
            out_events,
        );
    } else {
        let grant = Grant::Tool(Tool::Hammer);
        world.inventory.grant(grant);
        out_events.push(Event::ItemGranted { grant });
        world.notify("You got the hammer!", Severity::Success, out_events);
    }
    world.change_tile(cell, TileKind::Floor, out_events);
}

/// Drops container progress when the participant working on it walks away.
pub(crate) fn participant_moved(world: &mut World, participant: ParticipantId) {
    if world
        .puzzle
        .container
        .is_some_and(|hold| hold.participant == participant)
    {
        world.puzzle.container = None;
    }
}
