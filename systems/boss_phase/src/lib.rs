#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Boss phase system that alternates the arena boss between alert and dazed.

use std::time::Duration;

use maze_escape_core::{time_advanced, BossPhase, BossSnapshot, Cadence, Command, Event, Stage};

/// Configuration parameters required to construct the boss phase system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    alert_duration: Duration,
    dazed_duration: Duration,
}

impl Config {
    /// Creates a configuration from the time spent in each phase.
    #[must_use]
    pub const fn new(alert_duration: Duration, dazed_duration: Duration) -> Self {
        Self {
            alert_duration,
            dazed_duration,
        }
    }

    const fn duration(&self, phase: BossPhase) -> Duration {
        match phase {
            BossPhase::Alert => self.alert_duration,
            BossPhase::Dazed => self.dazed_duration,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_secs(20), Duration::from_secs(5))
    }
}

/// Pure system that requests a phase change once the current phase elapsed.
#[derive(Debug)]
pub struct BossPhaseCycle {
    config: Config,
    in_arena: bool,
    cadence: Cadence,
}

impl BossPhaseCycle {
    /// Creates a new boss phase system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            in_arena: false,
            cadence: Cadence::new(config.alert_duration),
        }
    }

    /// Consumes world events and the boss view to emit phase commands.
    pub fn handle(&mut self, events: &[Event], boss: Option<BossSnapshot>, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::StageChanged { stage } => {
                    self.in_arena = *stage == Stage::Arena;
                    self.cadence.reset();
                }
                Event::BossPhaseChanged { .. } | Event::LevelLoaded { .. } => {
                    self.cadence.reset();
                }
                _ => {}
            }
        }

        let Some(boss) = boss.filter(|boss| self.in_arena && boss.hit_points > 0) else {
            return;
        };
        self.cadence.set_interval(self.config.duration(boss.phase));
        if self.cadence.advance(time_advanced(events)) > 0 {
            self.cadence.reset();
            out.push(Command::CycleBossPhase);
        }
    }
}

#[cfg(test)]
mod tests {
    use maze_escape_core::HostileKind;

    use super::*;

    fn boss(phase: BossPhase) -> Option<BossSnapshot> {
        Some(BossSnapshot {
            kind: HostileKind::ArenaBoss,
            hit_points: 100,
            phase,
        })
    }

    fn tick(seconds: u64) -> Event {
        Event::TimeAdvanced {
            dt: Duration::from_secs(seconds),
        }
    }

    #[test]
    fn phases_alternate_on_their_own_durations() {
        let mut cycle = BossPhaseCycle::new(Config::default());
        let mut out = Vec::new();
        cycle.handle(
            &[Event::StageChanged {
                stage: Stage::Arena,
            }],
            boss(BossPhase::Alert),
            &mut out,
        );

        cycle.handle(&[tick(19)], boss(BossPhase::Alert), &mut out);
        assert!(out.is_empty());
        cycle.handle(&[tick(1)], boss(BossPhase::Alert), &mut out);
        assert_eq!(out, vec![Command::CycleBossPhase]);

        out.clear();
        let changed = Event::BossPhaseChanged {
            phase: BossPhase::Dazed,
        };
        cycle.handle(&[changed, tick(4)], boss(BossPhase::Dazed), &mut out);
        assert!(out.is_empty());
        cycle.handle(&[tick(1)], boss(BossPhase::Dazed), &mut out);
        assert_eq!(out, vec![Command::CycleBossPhase]);
    }

    #[test]
    fn idle_outside_the_arena() {
        let mut cycle = BossPhaseCycle::new(Config::default());
        let mut out = Vec::new();
        cycle.handle(&[tick(60)], boss(BossPhase::Alert), &mut out);
        assert!(out.is_empty());
    }
}
