use std::time::Duration;

use maze_escape_core::{
    BuffKind, CellCoord, Command, Consumable, Direction, Event, HostileKind, InventoryLedger,
    LevelDescription, ParticipantId, Severity,
};
use maze_escape_world::{self as world, query, Config, SeededDice, World};

const P1: ParticipantId = ParticipantId::new(1);

fn start(map: &str, item: Consumable, count: u32) -> World {
    let mut world = World::new(
        Config::default().with_settle_delays(Duration::ZERO, Duration::ZERO),
        Box::new(InventoryLedger::new().with_consumable(item, count)),
        Box::new(SeededDice::new(3)),
    );
    let mut events = Vec::new();
    let level = LevelDescription::from_ascii(1, map).expect("valid map");
    world::load_level(&mut world, level, &mut events).expect("level loads");
    world
}

fn use_item(world: &mut World, item: Consumable) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::UseConsumable {
            participant: P1,
            item,
        },
        &mut events,
    );
    events
}

fn hostile_cells(world: &World, kind: HostileKind) -> Vec<CellCoord> {
    query::hostile_view(world)
        .iter()
        .filter(|hostile| hostile.kind == kind)
        .map(|hostile| hostile.cell)
        .collect()
}

fn removed(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::HostileRemoved { .. }))
        .count()
}

fn warned(events: &[Event]) -> bool {
    events.iter().any(|event| {
        matches!(event, Event::Feedback(feedback) if feedback.severity == Severity::Warning)
    })
}

#[test]
fn rat_poison_clears_rats_within_four_cells() {
    let mut world = start("S...R...R.E", Consumable::RatPoison, 1);

    let events = use_item(&mut world, Consumable::RatPoison);

    assert!(events.contains(&Event::ItemConsumed {
        item: Consumable::RatPoison,
    }));
    assert_eq!(removed(&events), 1);
    assert_eq!(hostile_cells(&world, HostileKind::Rat), vec![CellCoord::new(8, 0)]);
    assert_eq!(query::inventory(&world).count(Consumable::RatPoison), 0);

    let empty = use_item(&mut world, Consumable::RatPoison);
    assert!(warned(&empty));
    assert!(!empty
        .iter()
        .any(|event| matches!(event, Event::ItemConsumed { .. })));
    assert_eq!(hostile_cells(&world, HostileKind::Rat), vec![CellCoord::new(8, 0)]);
}

#[test]
fn knife_spares_held_and_distant_thieves() {
    let mut world = start("S.hH..H.E", Consumable::Knife, 2);

    let events = use_item(&mut world, Consumable::Knife);

    assert_eq!(removed(&events), 1);
    assert_eq!(
        hostile_cells(&world, HostileKind::Thief),
        vec![CellCoord::new(2, 0), CellCoord::new(6, 0)]
    );
    assert_eq!(query::inventory(&world).count(Consumable::Knife), 1);
    assert_eq!(query::eliminated_count(&world), 0);
}

#[test]
fn water_bucket_short_circuits_nearby_animatronics() {
    let mut world = start("S..A.A..E", Consumable::WaterBucket, 1);

    let events = use_item(&mut world, Consumable::WaterBucket);

    assert_eq!(removed(&events), 1);
    assert_eq!(
        hostile_cells(&world, HostileKind::Animatronic),
        vec![CellCoord::new(5, 0)]
    );
    assert_eq!(query::inventory(&world).count(Consumable::WaterBucket), 0);
}

#[test]
fn flute_stuns_thieves_but_not_rats() {
    let mut world = start("S..H.E\n...R..", Consumable::Flute, 1);
    let rat = query::hostile_view(&world)
        .iter()
        .find(|hostile| hostile.kind == HostileKind::Rat)
        .expect("rat present")
        .id;

    let events = use_item(&mut world, Consumable::Flute);
    assert!(events.contains(&Event::BuffApplied {
        buff: BuffKind::SecondaryHostileStun,
        expires_at: Duration::from_secs(10),
    }));
    assert_eq!(query::inventory(&world).count(Consumable::Flute), 0);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::AttemptMove {
            participant: P1,
            direction: Direction::East,
        },
        &mut events,
    );

    assert_eq!(hostile_cells(&world, HostileKind::Thief), vec![CellCoord::new(3, 0)]);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::HostileMoved { hostile, .. } if *hostile == rat
    )));
}
