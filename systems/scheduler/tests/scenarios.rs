use std::time::Duration;

use maze_escape_core::{
    BossPhase, Command, DamageCause, Direction, Event, HostileKind, InventoryLedger,
    LevelDescription, ParticipantId, RejectReason, Stage, TerminalEvent,
    PAYLOAD_TARGET_CAPACITY,
};
use maze_escape_system_scheduler::{Scheduler, SchedulerConfig};
use maze_escape_world::{query, Config, SeededDice, World};

const P1: ParticipantId = ParticipantId::new(1);
const FRAME: Duration = Duration::from_millis(100);

fn scheduler(config: Config, map: &str) -> Scheduler {
    let world = World::new(
        config,
        Box::new(InventoryLedger::new()),
        Box::new(SeededDice::new(21)),
    );
    let mut scheduler = Scheduler::new(world, SchedulerConfig::default());
    let level = LevelDescription::from_ascii(1, map)
        .expect("valid map")
        .with_secret_code("4321");
    scheduler.load_level(level).expect("level loads");
    scheduler
}

fn sturdy() -> Config {
    Config::default()
        .with_starting_lives(50)
        .with_settle_delays(Duration::ZERO, Duration::ZERO)
}

fn run_for(scheduler: &mut Scheduler, duration: Duration) -> Vec<Event> {
    let frames = duration.as_millis() / FRAME.as_millis();
    for _ in 0..frames {
        scheduler.advance(FRAME);
    }
    scheduler.drain_events()
}

fn step(scheduler: &mut Scheduler, direction: Direction) {
    scheduler.submit(Command::AttemptMove {
        participant: P1,
        direction,
    });
}

fn enter_arena(scheduler: &mut Scheduler) {
    step(scheduler, Direction::East);
    step(scheduler, Direction::East);
    for digit in [4, 3, 2, 1] {
        scheduler.submit(Command::EnterDigit { digit });
    }
    scheduler.submit(Command::SubmitCode);
    assert_eq!(query::stage(scheduler.world()), Stage::Arena);
}

fn homing_hits(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::ParticipantDamaged {
                    participant: P1,
                    cause: DamageCause::HomingHazard,
                    ..
                }
            )
        })
        .count()
}

#[test]
fn corridor_escape_waits_for_each_turn() {
    let mut scheduler = scheduler(Config::default(), "S..E");

    step(&mut scheduler, Direction::East);
    step(&mut scheduler, Direction::East);
    let events = scheduler.drain_events();
    assert!(events.contains(&Event::MoveRejected {
        participant: P1,
        reason: RejectReason::TurnInProgress,
    }));

    let _ = run_for(&mut scheduler, Duration::from_millis(500));
    step(&mut scheduler, Direction::East);
    let _ = run_for(&mut scheduler, Duration::from_millis(500));
    step(&mut scheduler, Direction::East);
    let events = run_for(&mut scheduler, Duration::from_millis(500));

    assert_eq!(
        scheduler.terminal_events(),
        &[TerminalEvent::LevelEscaped { winner: None }]
    );
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ParticipantDamaged { .. })));
    assert_eq!(query::stage(scheduler.world()), Stage::Concluded);
}

#[test]
fn homing_hazards_strike_standing_participants() {
    let mut scheduler = scheduler(sturdy(), "S.?E\n....");
    enter_arena(&mut scheduler);

    let events = run_for(&mut scheduler, Duration::from_secs(12));

    assert!(events.iter().any(|event| matches!(
        event,
        Event::HomingHazardEmitted { target: P1, .. }
    )));
    assert!(homing_hits(&events) > 0);
}

#[test]
fn crouching_dodges_homing_hazards() {
    let mut scheduler = scheduler(sturdy(), "S.?E\n....");
    enter_arena(&mut scheduler);
    scheduler.submit(Command::SetCrouch {
        participant: P1,
        crouching: true,
    });

    let events = run_for(&mut scheduler, Duration::from_secs(12));

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::HomingHazardDissipated { .. })));
    assert_eq!(homing_hits(&events), 0);
}

#[test]
fn arena_boss_is_dazed_after_twenty_seconds() {
    let mut scheduler = scheduler(sturdy(), "S.?E\n....");
    enter_arena(&mut scheduler);
    scheduler.submit(Command::SetCrouch {
        participant: P1,
        crouching: true,
    });

    let events = run_for(&mut scheduler, Duration::from_millis(19_900));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::BossPhaseChanged { .. })));
    assert!(events.iter().any(|event| matches!(
        event,
        Event::HostileSpawned {
            kind: HostileKind::Rat,
            ..
        }
    )));

    let events = run_for(&mut scheduler, FRAME);
    assert!(events.contains(&Event::BossPhaseChanged {
        phase: BossPhase::Dazed,
    }));
    assert_eq!(
        query::boss(scheduler.world()).map(|boss| boss.phase),
        Some(BossPhase::Dazed)
    );
    assert!(query::hazards(scheduler.world()).is_empty());
}

#[test]
fn warden_payload_targets_stop_at_capacity() {
    let mut scheduler = scheduler(sturdy(), "S.....E\n...F...\n.......");

    let _ = run_for(&mut scheduler, Duration::from_secs(30));

    assert_eq!(
        query::payload_targets(scheduler.world()).len(),
        PAYLOAD_TARGET_CAPACITY
    );
}

#[test]
fn giant_rat_contact_costs_lives() {
    let mut scheduler = scheduler(sturdy(), "S.....G\n.......\n......E");

    let events = run_for(&mut scheduler, Duration::from_secs(10));

    assert!(events.iter().any(|event| matches!(
        event,
        Event::ParticipantDamaged {
            participant: P1,
            cause: DamageCause::Hostile(HostileKind::GiantRat),
            ..
        }
    )));
}

#[test]
fn draining_the_journal_releases_published_events() {
    let mut scheduler = scheduler(Config::default(), "S..E");

    assert!(scheduler
        .drain_events()
        .iter()
        .any(|event| matches!(event, Event::LevelLoaded { .. })));
    assert!(scheduler.drain_events().is_empty());

    scheduler.advance(FRAME);
    assert_eq!(
        scheduler.drain_events(),
        vec![Event::TimeAdvanced { dt: FRAME }]
    );
}
