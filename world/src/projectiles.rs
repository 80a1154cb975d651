//! Firing and projectile collision resolution.

use maze_escape_core::{
    BuffKind, CellCoord, Event, HostileId, HostileKind, ParticipantId, PayloadKind,
    PayloadTargetId, ProjectileId, ProjectileOutcome, ProjectileStep, Severity, Stage, TileKind,
};
use tracing::trace;

use crate::{damage, registry::Projectile, World};

/// Boss damage dealt when a payload target is destroyed.
const TARGET_DAMAGE: u32 = 10;
/// Fixed damage a projectile deals to the arena boss.
const ARENA_BOSS_DAMAGE: u32 = 20;
const HARDCORE_PAYLOAD_PENALTY: u32 = 5;

pub(crate) fn fire(
    world: &mut World,
    id: ParticipantId,
    payload: PayloadKind,
    out_events: &mut Vec<Event>,
) {
    if world.stage != Stage::Arena && !world.level.armed {
        world.notify("You have no weapon here", Severity::Warning, out_events);
        return;
    }
    let Some(shooter) = world
        .participant(id)
        .filter(|participant| participant.is_active())
        .copied()
    else {
        world.notify(format!("{id} cannot fire right now"), Severity::Warning, out_events);
        return;
    };
    if world.ammunition == 0 {
        world.notify("Out of ammo!", Severity::Warning, out_events);
        return;
    }
    if !world.inventory.has_payload(payload) {
        world.notify(
            format!("You have no {} ammunition", payload_name(payload)),
            Severity::Warning,
            out_events,
        );
        return;
    }

    world.ammunition -= 1;
    let projectile = Projectile {
        id: world.ids.projectile(),
        cell: shooter.cell,
        direction: shooter.facing,
        owner: id,
        payload,
    };
    world.state.registry.projectiles.push(projectile);
    out_events.push(Event::ProjectileFired {
        projectile: projectile.id,
        owner: id,
        payload,
    });
}

/// Applies one projectile batch in submission order.
pub(crate) fn advance(world: &mut World, steps: Vec<ProjectileStep>, out_events: &mut Vec<Event>) {
    trace!(steps = steps.len(), "projectile batch");
    for step in steps {
        let Some(projectile) = world
            .state
            .registry
            .projectiles
            .iter()
            .find(|projectile| projectile.id == step.projectile)
            .copied()
        else {
            continue;
        };

        match step.outcome {
            ProjectileOutcome::Travel(cell) => travel(world, projectile, cell, out_events),
            ProjectileOutcome::Obstacle => consume(world, projectile.id, out_events),
            ProjectileOutcome::StrikeTarget { target, .. } => {
                strike_target(world, projectile, target, out_events)
            }
            ProjectileOutcome::StrikeHostile { hostile, cell } => {
                strike_hostile(world, projectile, hostile, cell, out_events)
            }
        }
    }
}

fn travel(world: &mut World, projectile: Projectile, cell: CellCoord, out_events: &mut Vec<Event>) {
    let expected = projectile.cell.step(projectile.direction);
    let open = world
        .state
        .grid
        .kind(cell)
        .is_some_and(|kind| kind != TileKind::Wall);
    if expected != Some(cell) || !open {
        consume(world, projectile.id, out_events);
        return;
    }
    if let Some(entry) = world
        .state
        .registry
        .projectiles
        .iter_mut()
        .find(|entry| entry.id == projectile.id)
    {
        entry.cell = cell;
    }
}

fn strike_target(
    world: &mut World,
    projectile: Projectile,
    target: PayloadTargetId,
    out_events: &mut Vec<Event>,
) {
    consume(world, projectile.id, out_events);
    let Some(required) = world
        .state
        .registry
        .payload_targets
        .iter()
        .find(|entry| entry.id == target)
        .map(|entry| entry.required)
    else {
        return;
    };
    if required != projectile.payload {
        world.notify(
            format!("That box needs {} ammunition", payload_name(required)),
            Severity::Info,
            out_events,
        );
        return;
    }
    if world.state.registry.remove_payload_target(target).is_some() {
        out_events.push(Event::PayloadTargetDestroyed { target });
        damage::apply_boss_damage(world, TARGET_DAMAGE, out_events);
    }
}

fn strike_hostile(
    world: &mut World,
    projectile: Projectile,
    hostile: HostileId,
    cell: CellCoord,
    out_events: &mut Vec<Event>,
) {
    let Some(kind) = world
        .state
        .registry
        .hostile(hostile)
        .filter(|entry| entry.cell == cell)
        .map(|entry| entry.kind)
    else {
        travel(world, projectile, cell, out_events);
        return;
    };

    match kind {
        HostileKind::ArenaBoss => {
            consume(world, projectile.id, out_events);
            damage::apply_boss_damage(world, ARENA_BOSS_DAMAGE, out_events);
        }
        HostileKind::GiantRat => {
            consume(world, projectile.id, out_events);
            let amount = payload_damage(projectile.payload, world.config.hardcore());
            damage::apply_boss_damage(world, amount, out_events);
            if projectile.payload == PayloadKind::Cheese {
                let (now, stun) = (world.now, world.config.cheese_hit_stun());
                world.buffs.apply(BuffKind::HostileStun, now, stun, out_events);
                world.notify("Boss stunned!", Severity::Success, out_events);
            }
        }
        HostileKind::Warden => {
            consume(world, projectile.id, out_events);
            world.notify("The shot bounces off", Severity::Info, out_events);
        }
        HostileKind::Thief if world.level.armed && world.stage == Stage::Overworld => {
            consume(world, projectile.id, out_events);
            remove_hostile(world, hostile, kind, out_events);
            world.eliminated_thieves += 1;
            let count = world.eliminated_thieves;
            world.notify(format!("Thief eliminated! ({count})"), Severity::Success, out_events);
        }
        HostileKind::Rat if world.stage == Stage::Arena => {
            consume(world, projectile.id, out_events);
            remove_hostile(world, hostile, kind, out_events);
        }
        HostileKind::Rat | HostileKind::Thief | HostileKind::Animatronic => {
            travel(world, projectile, cell, out_events)
        }
    }
}

fn remove_hostile(
    world: &mut World,
    hostile: HostileId,
    kind: HostileKind,
    out_events: &mut Vec<Event>,
) {
    if world.state.registry.remove_hostile(hostile).is_some() {
        out_events.push(Event::HostileRemoved { hostile, kind });
    }
}

fn consume(world: &mut World, projectile: ProjectileId, out_events: &mut Vec<Event>) {
    if world.state.registry.remove_projectile(projectile).is_some() {
        out_events.push(Event::ProjectileConsumed { projectile });
    }
}

/// Direct-hit damage of `payload`, reduced under hardcore.
fn payload_damage(payload: PayloadKind, hardcore: bool) -> u32 {
    let base = payload.base_damage();
    if hardcore {
        base.saturating_sub(HARDCORE_PAYLOAD_PENALTY).max(1)
    } else {
        base
    }
}

fn payload_name(payload: PayloadKind) -> &'static str {
    match payload {
        PayloadKind::Normal => "normal",
        PayloadKind::Fire => "fire",
        PayloadKind::Cheese => "cheese",
    }
}
