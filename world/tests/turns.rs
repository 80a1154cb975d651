use std::time::Duration;

use maze_escape_core::{
    CellCoord, Command, Consumable, Direction, Event, InventoryLedger, LevelDescription,
    LevelRules, Lives, ParticipantId, PayloadKind, PlayMode, RejectReason, Severity, Stage,
    TerminalEvent, TileKind, Tool,
};
use maze_escape_world::{self as world, query, Config, Dice, World};

/// Dice that always roll the same value.
struct FixedDice {
    unit: f64,
}

impl Dice for FixedDice {
    fn unit(&mut self) -> f64 {
        self.unit
    }

    fn below(&mut self, _upper: usize) -> usize {
        0
    }
}

const P1: ParticipantId = ParticipantId::new(1);
const P2: ParticipantId = ParticipantId::new(2);
const LETHAL: f64 = 0.99;
const SAFE: f64 = 0.5;

fn instant() -> Config {
    Config::default().with_settle_delays(Duration::ZERO, Duration::ZERO)
}

fn start(map: &str, config: Config, inventory: InventoryLedger, roll: f64) -> (World, Vec<Event>) {
    let mut world = World::new(
        config,
        Box::new(inventory),
        Box::new(FixedDice { unit: roll }),
    );
    let mut events = Vec::new();
    let level = LevelDescription::from_ascii(1, map).expect("valid map");
    world::load_level(&mut world, level, &mut events).expect("level loads");
    (world, events)
}

fn step(world: &mut World, participant: ParticipantId, direction: Direction) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::AttemptMove {
            participant,
            direction,
        },
        &mut events,
    );
    events
}

fn tick(world: &mut World, millis: u64) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
        &mut events,
    );
    events
}

fn cell_of(world: &World, participant: ParticipantId) -> CellCoord {
    query::participant_view(world)
        .get(participant)
        .expect("participant present")
        .cell
}

fn lives_of(world: &World, participant: ParticipantId) -> Lives {
    query::participant_view(world)
        .get(participant)
        .expect("participant present")
        .lives
}

#[test]
fn walls_never_move_the_participant() {
    let (mut world, _) = start("S#E", instant(), InventoryLedger::new(), SAFE);

    let events = step(&mut world, P1, Direction::East);

    assert!(events.contains(&Event::MoveRejected {
        participant: P1,
        reason: RejectReason::Blocked,
    }));
    assert_eq!(cell_of(&world, P1), CellCoord::new(0, 0));
    assert!(!query::turn_in_progress(&world));

    let _ = step(&mut world, P1, Direction::North);
    assert_eq!(cell_of(&world, P1), CellCoord::new(0, 0));
}

#[test]
fn reaching_the_exit_ends_the_level() {
    let (mut world, _) = start("S..E", instant(), InventoryLedger::new(), SAFE);

    let _ = step(&mut world, P1, Direction::East);
    let _ = step(&mut world, P1, Direction::East);
    let events = step(&mut world, P1, Direction::East);

    assert!(events.contains(&Event::LevelEscaped { winner: None }));
    assert_eq!(query::stage(&world), Stage::Concluded);
    assert!(!query::turn_in_progress(&world));

    let ignored = step(&mut world, P1, Direction::West);
    assert!(ignored.is_empty(), "concluded levels accept nothing");
}

#[test]
fn second_move_waits_for_the_first_to_resolve() {
    let (mut world, _) = start("S..E", Config::default(), InventoryLedger::new(), SAFE);

    let first = step(&mut world, P1, Direction::East);
    assert!(first.contains(&Event::TurnStarted { participant: P1 }));
    assert!(query::turn_in_progress(&world));

    let second = step(&mut world, P1, Direction::East);
    assert_eq!(
        second.first(),
        Some(&Event::MoveRejected {
            participant: P1,
            reason: RejectReason::TurnInProgress,
        })
    );
    assert_eq!(cell_of(&world, P1), CellCoord::new(1, 0));

    let settled = tick(&mut world, 100);
    assert!(settled.contains(&Event::TurnCompleted { participant: P1 }));
    assert!(!query::turn_in_progress(&world));

    let _ = step(&mut world, P1, Direction::East);
    assert_eq!(cell_of(&world, P1), CellCoord::new(2, 0));
}

#[test]
fn lethal_hazard_crossings_always_return_to_start() {
    let config = instant().with_starting_lives(20_000);
    let (mut world, _) = start("SWE", config, InventoryLedger::new(), LETHAL);
    let start_cell = CellCoord::new(0, 0);

    for crossing in 1..=10_000u32 {
        let events = step(&mut world, P1, Direction::East);
        assert!(
            events.contains(&Event::TurnCompleted { participant: P1 }),
            "crossing {crossing} did not complete"
        );
        assert_eq!(cell_of(&world, P1), start_cell);
        assert_eq!(lives_of(&world, P1), Lives::whole(20_000 - crossing));
        assert!(!query::turn_in_progress(&world));
    }
}

#[test]
fn surviving_the_hazard_keeps_the_participant_in_place() {
    let (mut world, _) = start("SWE", instant(), InventoryLedger::new(), SAFE);

    let events = step(&mut world, P1, Direction::East);

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ParticipantDamaged { .. })));
    assert_eq!(cell_of(&world, P1), CellCoord::new(1, 0));
    assert_eq!(lives_of(&world, P1), Lives::whole(3));
}

#[test]
fn invincibility_absorbs_all_damage() {
    let inventory = InventoryLedger::new().with_consumable(Consumable::MagicStar, 1);
    let (mut world, _) = start("SWE", instant(), inventory, LETHAL);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::UseConsumable {
            participant: P1,
            item: Consumable::MagicStar,
        },
        &mut events,
    );
    assert!(events.contains(&Event::ItemConsumed {
        item: Consumable::MagicStar,
    }));

    let events = step(&mut world, P1, Direction::East);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ParticipantDamaged { .. })));
    assert_eq!(lives_of(&world, P1), Lives::whole(3));

    let _ = tick(&mut world, 60_000);
    let _ = step(&mut world, P1, Direction::West);
    let _ = step(&mut world, P1, Direction::East);
    assert_eq!(lives_of(&world, P1), Lives::whole(2));
}

#[test]
fn shared_play_fails_once_everyone_has_fallen() {
    let config = instant().with_starting_lives(1);
    let (mut world, _) = start("SWE", config, InventoryLedger::new(), LETHAL);

    let events = step(&mut world, P1, Direction::East);

    assert!(events.contains(&Event::ParticipantFell { participant: P1 }));
    assert!(events.contains(&Event::LevelFailed));
    assert_eq!(query::stage(&world), Stage::Concluded);
}

#[test]
fn race_participants_respawn_after_the_delay() {
    let config = instant()
        .with_participants(2)
        .with_play_mode(PlayMode::Race)
        .with_starting_lives(1);
    let (mut world, _) = start("SWE", config, InventoryLedger::new(), LETHAL);

    let events = step(&mut world, P1, Direction::East);
    assert!(events.contains(&Event::ParticipantFell { participant: P1 }));
    assert!(!events.contains(&Event::LevelFailed));
    assert_eq!(query::pending_actions(&world), 1);

    let early = tick(&mut world, 2_999);
    assert!(!early
        .iter()
        .any(|event| matches!(event, Event::ParticipantRespawned { .. })));

    let late = tick(&mut world, 1);
    assert!(late.contains(&Event::ParticipantRespawned {
        participant: P1,
        cell: CellCoord::new(0, 0),
    }));
    assert_eq!(lives_of(&world, P1), Lives::whole(1));

    let _ = step(&mut world, P2, Direction::North);
    assert_eq!(cell_of(&world, P2), CellCoord::new(0, 0));
}

#[test]
fn pursuers_close_in_after_each_move() {
    let (mut world, _) = start("S..R.E", instant(), InventoryLedger::new(), SAFE);
    let rat = query::hostile_view(&world)
        .iter()
        .next()
        .expect("rat present")
        .id;

    let events = step(&mut world, P1, Direction::East);
    assert!(events.contains(&Event::HostileMoved {
        hostile: rat,
        from: CellCoord::new(3, 0),
        to: CellCoord::new(2, 0),
    }));

    let contact = step(&mut world, P1, Direction::East);
    assert!(contact.iter().any(|event| matches!(
        event,
        Event::ParticipantDamaged { participant, .. } if *participant == P1
    )));
    assert_eq!(cell_of(&world, P1), CellCoord::new(0, 0));
    assert_eq!(lives_of(&world, P1), Lives::whole(2));
}

#[test]
fn cheese_stuns_pursuers() {
    let inventory = InventoryLedger::new().with_consumable(Consumable::Cheese, 1);
    let (mut world, _) = start("S..R.E", instant(), inventory, SAFE);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::UseConsumable {
            participant: P1,
            item: Consumable::Cheese,
        },
        &mut events,
    );

    let events = step(&mut world, P1, Direction::East);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::HostileMoved { .. })));
}

#[test]
fn ten_holds_open_the_container() {
    let (mut world, _) = start("SCE\n...", instant(), InventoryLedger::new(), SAFE);

    for _ in 0..9 {
        let mut events = Vec::new();
        world::apply(&mut world, Command::HoldContainer { participant: P1 }, &mut events);
    }
    assert_eq!(query::snapshot(&world).container_progress, 90);

    let mut events = Vec::new();
    world::apply(&mut world, Command::HoldContainer { participant: P1 }, &mut events);

    assert!(events.contains(&Event::ContainerProgressed {
        cell: CellCoord::new(1, 0),
        progress: 100,
    }));
    assert!(query::inventory(&world).has_tool(Tool::Hammer));
    assert_eq!(
        query::tile_view(&world).kind(CellCoord::new(1, 0)),
        Some(TileKind::Floor)
    );
    assert_eq!(query::snapshot(&world).container_progress, 0);
}

#[test]
fn faulty_container_costs_half_a_life() {
    let (mut world, _) = start("SCE\n...", instant(), InventoryLedger::new(), 0.05);

    for _ in 0..10 {
        let mut events = Vec::new();
        world::apply(&mut world, Command::HoldContainer { participant: P1 }, &mut events);
    }

    assert!(!query::inventory(&world).has_tool(Tool::Hammer));
    assert_eq!(lives_of(&world, P1).halves(), 5);
    assert_eq!(cell_of(&world, P1), CellCoord::new(0, 0));
}

#[test]
fn breakables_need_the_hammer() {
    let (mut world, _) = start("SBE", instant(), InventoryLedger::new(), SAFE);
    let events = step(&mut world, P1, Direction::East);
    assert!(events.contains(&Event::MoveRejected {
        participant: P1,
        reason: RejectReason::MissingTool(Tool::Hammer),
    }));

    let inventory = InventoryLedger::new().with_tool(Tool::Hammer);
    let (mut world, _) = start("SBE", instant(), inventory, SAFE);
    let events = step(&mut world, P1, Direction::East);
    assert!(events.contains(&Event::TileChanged {
        cell: CellCoord::new(1, 0),
        from: TileKind::BreakableObstacle,
        to: TileKind::Floor,
    }));
    assert_eq!(cell_of(&world, P1), CellCoord::new(1, 0));
}

#[test]
fn locked_gate_opens_with_the_security_code() {
    let (mut world, _) = start("SDE", instant(), InventoryLedger::new(), SAFE);

    let events = step(&mut world, P1, Direction::East);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::CodeEntryOpened { .. })));
    assert_eq!(cell_of(&world, P1), CellCoord::new(0, 0));

    let blocked = step(&mut world, P1, Direction::South);
    assert_eq!(
        blocked.first(),
        Some(&Event::MoveRejected {
            participant: P1,
            reason: RejectReason::ModalPending,
        })
    );

    let mut events = Vec::new();
    for digit in [1, 2, 3, 4] {
        world::apply(&mut world, Command::EnterDigit { digit }, &mut events);
    }
    world::apply(&mut world, Command::SubmitCode, &mut events);
    assert!(events.contains(&Event::CodeRejected {
        gate: CellCoord::new(1, 0),
    }));
    assert_eq!(query::code_entry(&world).expect("still open").input, "");

    let mut events = Vec::new();
    for digit in [1, 0, 0, 0] {
        world::apply(&mut world, Command::EnterDigit { digit }, &mut events);
    }
    world::apply(&mut world, Command::SubmitCode, &mut events);
    assert!(events.contains(&Event::CodeEntryClosed {
        gate: CellCoord::new(1, 0),
    }));
    assert!(query::code_entry(&world).is_none());
    assert_eq!(
        query::tile_view(&world).kind(CellCoord::new(1, 0)),
        Some(TileKind::Floor)
    );

    let _ = step(&mut world, P1, Direction::East);
    assert_eq!(cell_of(&world, P1), CellCoord::new(1, 0));
}

#[test]
fn reloading_drops_pending_turn_work() {
    let (mut world, _) = start("S..E", Config::default(), InventoryLedger::new(), SAFE);
    let _ = step(&mut world, P1, Direction::East);
    assert_eq!(query::pending_actions(&world), 1);

    let mut events = Vec::new();
    let level = LevelDescription::from_ascii(2, "S..E").expect("valid map");
    world::load_level(&mut world, level, &mut events).expect("level loads");
    assert_eq!(query::level_generation(&world), 2);
    assert_eq!(query::pending_actions(&world), 0);
    assert!(!query::turn_in_progress(&world));

    let events = tick(&mut world, 500);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::TurnCompleted { .. })));
    assert_eq!(cell_of(&world, P1), CellCoord::new(0, 0));
}

#[test]
fn race_escape_names_the_winner_and_play_continues() {
    let config = instant()
        .with_participants(2)
        .with_play_mode(PlayMode::Race);
    let (mut world, _) = start("S..E\n....", config, InventoryLedger::new(), SAFE);

    let _ = step(&mut world, P1, Direction::East);
    let _ = step(&mut world, P1, Direction::East);
    let events = step(&mut world, P1, Direction::East);

    assert!(events.contains(&Event::ParticipantEscaped { participant: P1 }));
    assert!(events.contains(&Event::LevelEscaped { winner: Some(P1) }));
    assert_eq!(query::stage(&world), Stage::Overworld);
    assert_eq!(
        events.iter().filter_map(Event::terminal).collect::<Vec<_>>(),
        vec![TerminalEvent::LevelEscaped { winner: Some(P1) }]
    );

    let after = step(&mut world, P1, Direction::West);
    assert!(after.contains(&Event::MoveRejected {
        participant: P1,
        reason: RejectReason::Inactive,
    }));

    let _ = step(&mut world, P2, Direction::South);
    let _ = step(&mut world, P2, Direction::East);
    assert_eq!(cell_of(&world, P2), CellCoord::new(1, 1));
    assert_eq!(query::stage(&world), Stage::Overworld);
}

#[test]
fn rejected_interactions_always_leave_feedback() {
    let config = instant()
        .with_participants(2)
        .with_play_mode(PlayMode::Race)
        .with_starting_lives(1);
    let mut world = World::new(
        config,
        Box::new(InventoryLedger::new().with_consumable(Consumable::Knife, 1)),
        Box::new(FixedDice { unit: LETHAL }),
    );
    let mut events = Vec::new();
    let level = LevelDescription::from_ascii(1, "SWE\nC..")
        .expect("valid map")
        .with_rules(LevelRules {
            armed: true,
            ..LevelRules::default()
        });
    world::load_level(&mut world, level, &mut events).expect("level loads");

    let fell = step(&mut world, P1, Direction::East);
    assert!(fell.contains(&Event::ParticipantFell { participant: P1 }));

    let rejected = [
        Command::HoldContainer { participant: P1 },
        Command::SetCrouch {
            participant: P1,
            crouching: true,
        },
        Command::Fire {
            participant: P1,
            payload: PayloadKind::Normal,
        },
        Command::UseConsumable {
            participant: ParticipantId::new(9),
            item: Consumable::Knife,
        },
        Command::EnterDigit { digit: 3 },
        Command::SubmitCode,
    ];
    for command in rejected {
        let mut events = Vec::new();
        world::apply(&mut world, command.clone(), &mut events);
        assert!(
            events.iter().any(|event| matches!(
                event,
                Event::Feedback(feedback) if feedback.severity == Severity::Warning
            )),
            "{command:?} was rejected silently"
        );
    }
    assert_eq!(query::inventory(&world).count(Consumable::Knife), 1);
}
