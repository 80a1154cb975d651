//! Single chokepoint for hurting participants and bosses.

use maze_escape_core::{
    BossPhase, BuffKind, Damage, DamageCause, Event, HostileKind, ParticipantId, PlayMode,
    Severity, Stage, TerminalEvent,
};
use tracing::debug;

use crate::{boss, schedule::Action, World};

/// Applies `damage` to a participant, enforcing invincibility and the elimination policy.
pub(crate) fn apply_participant_damage(
    world: &mut World,
    id: ParticipantId,
    damage: Damage,
    cause: DamageCause,
    out_events: &mut Vec<Event>,
) {
    if world.buffs.is_active(BuffKind::Invincibility, world.now) {
        debug!(%id, ?cause, "damage absorbed by invincibility");
        return;
    }
    let respawn_point = world.respawn_point();
    let Some(participant) = world
        .participant_mut(id)
        .filter(|participant| participant.is_active())
    else {
        return;
    };

    participant.lives = participant.lives.after(damage);
    let remaining = participant.lives;
    let from = participant.cell;
    if remaining.is_depleted() {
        participant.eliminated = true;
        participant.crouching = false;
    } else if damage.is_whole_life() {
        participant.cell = respawn_point;
    }
    debug!(%id, ?cause, remaining = %remaining, "participant damaged");
    out_events.push(Event::ParticipantDamaged {
        participant: id,
        damage,
        cause,
        remaining,
    });

    if remaining.is_depleted() {
        out_events.push(Event::ParticipantFell { participant: id });
        match world.config.play_mode() {
            PlayMode::Race => {
                world.notify(
                    format!("{id} eliminated. Respawning..."),
                    Severity::Danger,
                    out_events,
                );
                let delay = world.config.respawn_delay();
                world.schedule_after(delay, Action::Respawn(id));
            }
            PlayMode::Shared => {
                world.notify(format!("{id} has fallen: {cause}"), Severity::Danger, out_events);
                check_failure(world, out_events);
            }
        }
        return;
    }

    if from != respawn_point && damage.is_whole_life() {
        out_events.push(Event::ParticipantMoved {
            participant: id,
            from,
            to: respawn_point,
        });
    }
    world.notify(
        format!("{id}: {cause} (lives {remaining})"),
        Severity::Danger,
        out_events,
    );
}

/// Fails the level once every participant has fallen in shared play.
fn check_failure(world: &mut World, out_events: &mut Vec<Event>) {
    let all_fallen = !world.participants.is_empty()
        && world
            .participants
            .iter()
            .all(|participant| participant.eliminated);
    if all_fallen {
        world.emit_terminal(TerminalEvent::LevelFailed, out_events);
        world.conclude(out_events);
    }
}

/// Returns a race-mode participant to play with full lives.
pub(crate) fn respawn(world: &mut World, id: ParticipantId, out_events: &mut Vec<Event>) {
    let cell = world.respawn_point();
    let lives = world.config.starting_lives();
    let Some(participant) = world
        .participant_mut(id)
        .filter(|participant| participant.eliminated && !participant.escaped)
    else {
        return;
    };
    participant.eliminated = false;
    participant.lives = lives;
    participant.cell = cell;
    out_events.push(Event::ParticipantRespawned {
        participant: id,
        cell,
    });
    world.notify(format!("{id} is back in the game"), Severity::Info, out_events);
}

/// Damages every active participant sharing a cell with an unheld hostile.
pub(crate) fn contact_check(world: &mut World, out_events: &mut Vec<Event>) {
    let dazed = world.boss_is_dazed();
    let contacts: Vec<(ParticipantId, HostileKind)> = world
        .participants
        .iter()
        .filter(|participant| participant.is_active())
        .filter_map(|participant| {
            world
                .state
                .registry
                .hostiles
                .iter()
                .filter(|hostile| !hostile.held)
                .filter(|hostile| !(dazed && hostile.kind == HostileKind::ArenaBoss))
                .find(|hostile| hostile.cell == participant.cell)
                .map(|hostile| (participant.id, hostile.kind))
        })
        .collect();

    for (participant, kind) in contacts {
        apply_participant_damage(
            world,
            participant,
            Damage::ONE_LIFE,
            DamageCause::Hostile(kind),
            out_events,
        );
    }
}

/// Subtracts `amount` from the active boss after difficulty modifiers.
pub(crate) fn apply_boss_damage(world: &mut World, amount: u32, out_events: &mut Vec<Event>) {
    let in_arena = world.stage == Stage::Arena;
    let hardcore = world.config.hardcore();
    let Some(state) = world
        .state
        .boss
        .as_mut()
        .filter(|state| state.hit_points > 0)
    else {
        return;
    };

    let was_dazed = in_arena && state.phase == BossPhase::Dazed;
    let mut dealt = amount;
    if was_dazed {
        dealt = dealt.saturating_mul(2);
    }
    if hardcore {
        dealt = (dealt / 2).max(1);
    }
    state.hit_points = state.hit_points.saturating_sub(dealt);
    if was_dazed {
        state.phase = BossPhase::Alert;
    }
    let kind = state.kind;
    let hit_points = state.hit_points;

    debug!(?kind, dealt, hit_points, "boss damaged");
    out_events.push(Event::BossDamaged {
        kind,
        amount: dealt,
        hit_points,
    });
    world.notify(format!("Boss hit! -{dealt}"), Severity::Success, out_events);
    if was_dazed {
        out_events.push(Event::BossPhaseChanged {
            phase: BossPhase::Alert,
        });
    }

    if in_arena {
        if hit_points == 0 {
            let delay = world.config.encounter_teardown();
            world.schedule_after(delay, Action::ConcludeEncounter);
        } else {
            boss::spawn_minions(world, out_events);
        }
    } else if hit_points == 0 {
        let boss = world.state.registry.first_of_kind(kind).map(|entity| entity.id);
        if let Some(removed) = boss.and_then(|id| world.state.registry.remove_hostile(id)) {
            out_events.push(Event::HostileRemoved {
                hostile: removed.id,
                kind,
            });
        }
        world.notify("Boss defeated! The exit is open", Severity::Success, out_events);
    }
}
