#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Homing-hazard system: the alert arena boss launches hazards that chase
//! their target one cell per period.

use std::time::Duration;

use maze_escape_core::{
    greedy_direction, time_advanced, BossPhase, BossSnapshot, Cadence, Command, Event,
    HazardOutcome, HazardSnapshot, HazardStep, ParticipantView, Stage,
};

/// Configuration parameters required to construct the homing system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    emit_interval: Duration,
    step_interval: Duration,
}

impl Config {
    /// Creates a configuration from the emission and advancement cadences.
    #[must_use]
    pub const fn new(emit_interval: Duration, step_interval: Duration) -> Self {
        Self {
            emit_interval,
            step_interval,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_millis(2_500), Duration::from_millis(400))
    }
}

/// Pure system that emits homing-hazard commands while an encounter runs.
#[derive(Debug)]
pub struct Homing {
    in_arena: bool,
    emit: Cadence,
    step: Cadence,
}

impl Homing {
    /// Creates a new homing system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            in_arena: false,
            emit: Cadence::new(config.emit_interval),
            step: Cadence::new(config.step_interval),
        }
    }

    /// Consumes world events and immutable views to emit hazard commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        participants: &ParticipantView,
        hazards: &[HazardSnapshot],
        boss: Option<BossSnapshot>,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::StageChanged { stage } = event {
                self.in_arena = *stage == Stage::Arena;
                self.emit.reset();
                self.step.reset();
            }
        }
        if !self.in_arena {
            return;
        }

        let dt = time_advanced(events);
        if dt.is_zero() {
            return;
        }

        if self.step.advance(dt) > 0 && !hazards.is_empty() {
            let steps = hazards
                .iter()
                .map(|hazard| HazardStep {
                    hazard: hazard.id,
                    outcome: chase(hazard, participants),
                })
                .collect();
            out.push(Command::AdvanceHomingHazards { steps });
        }

        let alert =
            boss.is_some_and(|boss| boss.hit_points > 0 && boss.phase == BossPhase::Alert);
        if self.emit.advance(dt) > 0 && alert {
            if let Some(target) = participants.active().next() {
                out.push(Command::EmitHomingHazard { target: target.id });
            }
        }
    }
}

/// Moves a hazard greedily toward its target, striking whoever stands on the entered cell.
fn chase(hazard: &HazardSnapshot, participants: &ParticipantView) -> HazardOutcome {
    let Some(target) = participants
        .get(hazard.target)
        .filter(|participant| participant.is_active())
    else {
        return HazardOutcome::Dissipate;
    };
    let next = greedy_direction(hazard.cell, target.cell)
        .and_then(|direction| hazard.cell.step(direction))
        .unwrap_or(hazard.cell);

    match participants
        .active()
        .find(|participant| participant.cell == next)
    {
        Some(struck) => HazardOutcome::Strike {
            participant: struck.id,
        },
        None => HazardOutcome::Advance(next),
    }
}
