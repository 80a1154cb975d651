//! Turn controller: one participant move resolves fully before the next is accepted.

use maze_escape_core::{
    pursuit_step, Damage, DamageCause, Direction, Event, ExitRequirement, HostileKind,
    HostileStep, ParticipantId, PlayMode, RejectReason, Severity, TerminalEvent, TileKind, Tool,
};
use tracing::debug;

use crate::{damage, hazard_is_lethal, puzzle, query, schedule::Action, World};

/// Resolves steps 1-6 of a move and defers the hazard roll and enemy response.
pub(crate) fn attempt_move(
    world: &mut World,
    id: ParticipantId,
    direction: Direction,
    out_events: &mut Vec<Event>,
) {
    if world.turn_lock.is_some() {
        reject(
            world,
            id,
            RejectReason::TurnInProgress,
            "Wait for the current move to finish",
            out_events,
        );
        return;
    }
    if world.puzzle.modal_pending() {
        reject(
            world,
            id,
            RejectReason::ModalPending,
            "Finish entering the code first",
            out_events,
        );
        return;
    }
    let Some(participant) = world.participant(id).copied() else {
        reject(
            world,
            id,
            RejectReason::UnknownParticipant,
            "Nobody is playing that slot",
            out_events,
        );
        return;
    };
    if !participant.is_active() || participant.crouching {
        reject(world, id, RejectReason::Inactive, "You cannot move right now", out_events);
        return;
    }

    if let Some(entry) = world.participant_mut(id) {
        entry.facing = direction;
    }

    let destination = participant.cell.step(direction);
    let Some((destination, tile)) =
        destination.and_then(|cell| world.state.grid.kind(cell).map(|kind| (cell, kind)))
    else {
        reject(world, id, RejectReason::Blocked, "Blocked", out_events);
        return;
    };

    match tile {
        TileKind::Wall => {
            reject(world, id, RejectReason::Blocked, "Blocked", out_events);
            return;
        }
        TileKind::BreakableObstacle => {
            if !world.inventory.has_tool(Tool::Hammer) {
                reject(
                    world,
                    id,
                    RejectReason::MissingTool(Tool::Hammer),
                    "You need the hammer",
                    out_events,
                );
                return;
            }
            world.change_tile(destination, TileKind::Floor, out_events);
            world.notify("Obstacle smashed!", Severity::Success, out_events);
        }
        TileKind::Container => {
            reject(
                world,
                id,
                RejectReason::Interaction(TileKind::Container),
                "Hold to open the chest",
                out_events,
            );
            return;
        }
        TileKind::LockedGate | TileKind::HiddenGate => {
            puzzle::open_code_entry(world, id, destination, tile, out_events);
            return;
        }
        TileKind::Exit => {
            if let Some((requirement, text)) = unmet_exit_requirement(world) {
                reject(world, id, RejectReason::ExitGated(requirement), text, out_events);
                return;
            }
        }
        TileKind::Floor
        | TileKind::Start
        | TileKind::HazardLiquid
        | TileKind::ClueA
        | TileKind::ClueB => {}
    }

    let blocker = world
        .state
        .registry
        .hostile_at(destination)
        .filter(|hostile| hostile.kind.blocks_on_entry() && !hostile.held)
        .map(|hostile| hostile.kind);
    if let Some(kind) = blocker {
        if kind == HostileKind::ArenaBoss && world.boss_is_dazed() {
            reject(
                world,
                id,
                RejectReason::HostileContact(kind),
                "The boss is dazed",
                out_events,
            );
        } else {
            reject(
                world,
                id,
                RejectReason::HostileContact(kind),
                "Something blocks the way",
                out_events,
            );
            damage::apply_participant_damage(
                world,
                id,
                Damage::ONE_LIFE,
                DamageCause::Hostile(kind),
                out_events,
            );
        }
        return;
    }

    world.turn_lock = Some(id);
    out_events.push(Event::TurnStarted { participant: id });
    if let Some(entry) = world.participant_mut(id) {
        entry.cell = destination;
    }
    out_events.push(Event::ParticipantMoved {
        participant: id,
        from: participant.cell,
        to: destination,
    });
    puzzle::participant_moved(world, id);

    match tile {
        TileKind::ClueA => {
            let code = world.level.security_code.clone();
            world.notify(format!("Security code: {code}"), Severity::Info, out_events);
            out_events.push(Event::SecretRevealed {
                clue: TileKind::ClueA,
                code,
            });
        }
        TileKind::ClueB => {
            let code = world.level.secret_code.clone();
            world.notify(format!("Secret room code: {code}"), Severity::Info, out_events);
            out_events.push(Event::SecretRevealed {
                clue: TileKind::ClueB,
                code,
            });
        }
        TileKind::Exit => {
            escape(world, id, out_events);
            release_lock(world, id, out_events);
            return;
        }
        TileKind::HazardLiquid => {
            let delay = world.config.hazard_settle();
            world.continue_after(delay, Action::HazardRoll(id), out_events);
            return;
        }
        _ => {}
    }

    let delay = world.config.response_settle();
    world.continue_after(delay, Action::EnemyResponse(id), out_events);
}

/// Rolls for drowning once the participant settled in hazard liquid.
pub(crate) fn resolve_hazard_roll(world: &mut World, id: ParticipantId, out_events: &mut Vec<Event>) {
    if world.turn_lock != Some(id) {
        debug!(%id, "hazard roll without a matching turn");
        return;
    }
    let in_liquid = world.participant(id).is_some_and(|participant| {
        participant.is_active()
            && world.state.grid.kind(participant.cell) == Some(TileKind::HazardLiquid)
    });
    if in_liquid {
        let roll = world.dice.unit();
        if hazard_is_lethal(roll) {
            damage::apply_participant_damage(
                world,
                id,
                Damage::ONE_LIFE,
                DamageCause::Drowned,
                out_events,
            );
            release_lock(world, id, out_events);
            return;
        }
        world.notify("Saved from the water!", Severity::Success, out_events);
    }

    let delay = world.config.response_settle();
    world.continue_after(delay, Action::EnemyResponse(id), out_events);
}

/// Runs the single synchronous pursuit step that closes a move.
pub(crate) fn resolve_enemy_response(
    world: &mut World,
    id: ParticipantId,
    out_events: &mut Vec<Event>,
) {
    if world.turn_lock != Some(id) {
        debug!(%id, "enemy response without a matching turn");
        return;
    }
    if world.any_active() {
        let steps = enemy_response_steps(world);
        world.step_hostiles(steps, out_events);
    }
    release_lock(world, id, out_events);
}

fn enemy_response_steps(world: &World) -> Vec<HostileStep> {
    let participants = query::participant_view(world);
    let tiles = world.state.grid.view();
    world
        .state
        .registry
        .hostiles
        .iter()
        .filter(|hostile| hostile.kind.is_ground_pursuer() && !hostile.held)
        .filter(|hostile| {
            !hostile
                .kind
                .stun_buff()
                .is_some_and(|buff| world.buffs.is_active(buff, world.now))
        })
        .filter_map(|hostile| {
            pursuit_step(hostile.cell, &participants, &tiles).map(|to| HostileStep {
                hostile: hostile.id,
                to,
            })
        })
        .collect()
}

fn release_lock(world: &mut World, id: ParticipantId, out_events: &mut Vec<Event>) {
    if world.turn_lock.take().is_none() {
        return;
    }
    out_events.push(Event::TurnCompleted { participant: id });
    if world.any_active() {
        damage::contact_check(world, out_events);
    }
}

fn escape(world: &mut World, id: ParticipantId, out_events: &mut Vec<Event>) {
    if let Some(participant) = world.participant_mut(id) {
        participant.escaped = true;
        participant.crouching = false;
    }
    out_events.push(Event::ParticipantEscaped { participant: id });
    world.notify(format!("{id} escaped!"), Severity::Success, out_events);

    match world.config.play_mode() {
        PlayMode::Shared => {
            world.emit_terminal(TerminalEvent::LevelEscaped { winner: None }, out_events);
            world.conclude(out_events);
        }
        PlayMode::Race => {
            world.emit_terminal(TerminalEvent::LevelEscaped { winner: Some(id) }, out_events);
        }
    }
}

fn unmet_exit_requirement(world: &World) -> Option<(ExitRequirement, String)> {
    world
        .level
        .exit_requirements
        .iter()
        .find_map(|requirement| match *requirement {
            ExitRequirement::MinimumEliminated(required) if world.eliminated_thieves < required => {
                Some(format!(
                    "Eliminate the thieves! ({}/{required})",
                    world.eliminated_thieves
                ))
            }
            ExitRequirement::NoBreakables => {
                let remaining = world.state.grid.count(TileKind::BreakableObstacle);
                (remaining > 0).then(|| format!("Break {remaining} more obstacles!"))
            }
            ExitRequirement::BossDefeated
                if world.state.boss.is_some_and(|boss| boss.hit_points > 0) =>
            {
                Some("Defeat the boss first!".to_owned())
            }
            _ => None,
        }
        .map(|text| (*requirement, text)))
}

fn reject(
    world: &mut World,
    id: ParticipantId,
    reason: RejectReason,
    text: impl Into<String>,
    out_events: &mut Vec<Event>,
) {
    debug!(%id, ?reason, "move rejected");
    out_events.push(Event::MoveRejected {
        participant: id,
        reason,
    });
    world.notify(text, Severity::Warning, out_events);
}
