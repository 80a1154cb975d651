use std::time::Duration;

use maze_escape_core::{
    CellCoord, Command, Direction, Event, InventoryLedger, LevelDescription, LevelRules,
    ParticipantId, PayloadKind,
};
use maze_escape_system_ballistics::{Ballistics, Config};
use maze_escape_world::{self as world, query, Config as WorldConfig, SeededDice, World};

const P1: ParticipantId = ParticipantId::new(1);

fn armed(map: &str) -> (World, Vec<Event>) {
    let mut world = World::new(
        WorldConfig::default().with_settle_delays(Duration::ZERO, Duration::ZERO),
        Box::new(InventoryLedger::new()),
        Box::new(SeededDice::new(11)),
    );
    let level = LevelDescription::from_ascii(1, map)
        .expect("valid map")
        .with_rules(LevelRules {
            armed: true,
            exit_requirements: Vec::new(),
        });
    let mut events = Vec::new();
    world::load_level(&mut world, level, &mut events).expect("level loads");
    (world, events)
}

fn pump(world: &mut World, ballistics: &mut Ballistics, mut events: Vec<Event>) -> Vec<Event> {
    let mut tick = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(100),
        },
        &mut tick,
    );
    events.extend(tick);

    let projectiles = query::projectiles(world);
    let hostiles = query::hostile_view(world);
    let targets = query::payload_targets(world);
    let tiles = query::tile_view(world);
    let mut commands = Vec::new();
    ballistics.handle(
        &events,
        &projectiles,
        &hostiles,
        &targets,
        &tiles,
        &mut commands,
    );

    let mut produced = Vec::new();
    for command in commands {
        world::apply(world, command, &mut produced);
    }
    produced
}

fn fire(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Fire {
            participant: P1,
            payload: PayloadKind::Normal,
        },
        &mut events,
    );
    events
}

#[test]
fn projectiles_stop_at_walls() {
    let (mut world, events) = armed("S..E\n....\n####");
    let mut ballistics = Ballistics::new(Config::default());
    let mut events = [events, fire(&mut world)].concat();
    assert_eq!(query::ammunition(&world), 998);

    events = pump(&mut world, &mut ballistics, events);
    assert_eq!(
        query::projectiles(&world).first().map(|projectile| projectile.cell),
        Some(CellCoord::new(0, 1))
    );

    events = pump(&mut world, &mut ballistics, events);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ProjectileConsumed { .. })));
    assert!(query::projectiles(&world).is_empty());
}

#[test]
fn armed_levels_count_eliminated_thieves() {
    let (mut world, mut events) = armed("S.h..E");
    let mut moved = Vec::new();
    world::apply(
        &mut world,
        Command::AttemptMove {
            participant: P1,
            direction: Direction::East,
        },
        &mut moved,
    );
    events.extend(moved);
    events.extend(fire(&mut world));

    let mut ballistics = Ballistics::new(Config::default());
    let produced = pump(&mut world, &mut ballistics, events);

    assert!(produced
        .iter()
        .any(|event| matches!(event, Event::HostileRemoved { .. })));
    assert_eq!(query::eliminated_count(&world), 1);
    assert!(query::hostile_view(&world).iter().next().is_none());
}

#[test]
fn nothing_moves_before_a_full_period() {
    let (mut world, events) = armed("S..E\n....\n####");
    let mut ballistics = Ballistics::new(Config::new(Duration::from_millis(250)));
    let events = [events, fire(&mut world)].concat();

    let _ = pump(&mut world, &mut ballistics, events);

    assert_eq!(
        query::projectiles(&world).first().map(|projectile| projectile.cell),
        Some(CellCoord::new(0, 0))
    );
}
