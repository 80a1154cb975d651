//! Consumable effects.

use maze_escape_core::{BuffKind, Consumable, Event, HostileKind, ParticipantId, Severity};

use crate::World;

const POISON_RADIUS: u32 = 4;
const MELEE_RADIUS: u32 = 3;

pub(crate) fn use_consumable(
    world: &mut World,
    id: ParticipantId,
    item: Consumable,
    out_events: &mut Vec<Event>,
) {
    if world.participant(id).is_none() {
        world.notify(format!("{id} is not in this level"), Severity::Warning, out_events);
        return;
    }
    if !world.inventory.consume(item) {
        world.notify(
            format!("You have no {}!", item_name(item)),
            Severity::Warning,
            out_events,
        );
        return;
    }
    out_events.push(Event::ItemConsumed { item });

    let now = world.now;
    match item {
        Consumable::RatPoison => {
            let removed = clear_near(world, HostileKind::Rat, POISON_RADIUS, out_events);
            world.notify(format!("{removed} rats poisoned"), Severity::Success, out_events);
        }
        Consumable::Cheese => {
            let duration = world.config.stun_duration();
            world.buffs.apply(BuffKind::HostileStun, now, duration, out_events);
            world.notify("Rats stunned!", Severity::Success, out_events);
        }
        Consumable::Knife => {
            let removed = clear_near(world, HostileKind::Thief, MELEE_RADIUS, out_events);
            world.notify(format!("{removed} thieves eliminated"), Severity::Success, out_events);
        }
        Consumable::Flute => {
            let duration = world.config.stun_duration();
            world
                .buffs
                .apply(BuffKind::SecondaryHostileStun, now, duration, out_events);
            world.notify("Thieves stunned!", Severity::Success, out_events);
        }
        Consumable::WaterBucket => {
            let removed = clear_near(world, HostileKind::Animatronic, MELEE_RADIUS, out_events);
            world.notify(
                format!("{removed} animatronics short-circuited"),
                Severity::Success,
                out_events,
            );
        }
        Consumable::MagicStar => {
            let duration = world.config.invincibility_duration();
            world
                .buffs
                .apply(BuffKind::Invincibility, now, duration, out_events);
            world.notify(
                format!("Invincible for {}s!", duration.as_secs()),
                Severity::Success,
                out_events,
            );
        }
    }
}

/// Removes unheld hostiles of `kind` within `radius` of any active participant.
fn clear_near(
    world: &mut World,
    kind: HostileKind,
    radius: u32,
    out_events: &mut Vec<Event>,
) -> usize {
    let doomed: Vec<_> = world
        .state
        .registry
        .hostiles
        .iter()
        .filter(|hostile| hostile.kind == kind && !hostile.held)
        .filter(|hostile| {
            world.participants.iter().any(|participant| {
                participant.is_active() && participant.cell.manhattan_distance(hostile.cell) <= radius
            })
        })
        .map(|hostile| hostile.id)
        .collect();

    for hostile in &doomed {
        if world.state.registry.remove_hostile(*hostile).is_some() {
            out_events.push(Event::HostileRemoved {
                hostile: *hostile,
                kind,
            });
        }
    }
    doomed.len()
}

fn item_name(item: Consumable) -> &'static str {
    match item {
        Consumable::RatPoison => "rat poison",
        Consumable::Cheese => "cheese",
        Consumable::Knife => "knives",
        Consumable::Flute => "flute",
        Consumable::WaterBucket => "water bucket",
        Consumable::MagicStar => "magic star",
    }
}
