use std::time::Duration;

use maze_escape_core::{Lives, PlayMode};

const DEFAULT_LIVES: u32 = 3;
const HARDCORE_LIVES: u32 = 1;
const DEFAULT_MINIONS: u32 = 2;

/// Tuning constants applied by the world while a level runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    participants: u8,
    lives: u32,
    play_mode: PlayMode,
    hardcore: bool,
    hazard_settle: Duration,
    response_settle: Duration,
    respawn_delay: Duration,
    encounter_teardown: Duration,
    feedback_lifetime: Duration,
    stun_duration: Duration,
    cheese_hit_stun: Duration,
    invincibility_duration: Duration,
    boss_hit_points: u32,
    arena_ammunition: u32,
    armed_ammunition: u32,
    minion_count: u32,
    minion_lifetime: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            participants: 1,
            lives: DEFAULT_LIVES,
            play_mode: PlayMode::Shared,
            hardcore: false,
            hazard_settle: Duration::from_millis(200),
            response_settle: Duration::from_millis(100),
            respawn_delay: Duration::from_secs(3),
            encounter_teardown: Duration::from_secs(1),
            feedback_lifetime: Duration::from_secs(2),
            stun_duration: Duration::from_secs(10),
            cheese_hit_stun: Duration::from_secs(20),
            invincibility_duration: Duration::from_secs(60),
            boss_hit_points: 100,
            arena_ammunition: 50,
            armed_ammunition: 999,
            minion_count: DEFAULT_MINIONS,
            minion_lifetime: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Sets the number of joined participants, clamped to `1..=4`.
    #[must_use]
    pub fn with_participants(mut self, participants: u8) -> Self {
        self.participants = participants.clamp(1, 4);
        self
    }

    /// Sets the whole lives every participant starts with outside hardcore.
    #[must_use]
    pub fn with_starting_lives(mut self, lives: u32) -> Self {
        self.lives = lives.max(1);
        self
    }

    /// Selects how participants share the level goal.
    #[must_use]
    pub fn with_play_mode(mut self, play_mode: PlayMode) -> Self {
        self.play_mode = play_mode;
        self
    }

    /// Toggles the hardcore difficulty modifier.
    #[must_use]
    pub fn with_hardcore(mut self, hardcore: bool) -> Self {
        self.hardcore = hardcore;
        self
    }

    /// Overrides both artificial settle delays used while a move resolves.
    #[must_use]
    pub fn with_settle_delays(mut self, hazard: Duration, response: Duration) -> Self {
        self.hazard_settle = hazard;
        self.response_settle = response;
        self
    }

    /// Overrides the race-mode respawn delay.
    #[must_use]
    pub fn with_respawn_delay(mut self, delay: Duration) -> Self {
        self.respawn_delay = delay;
        self
    }

    /// Overrides the delay between boss defeat and arena teardown.
    #[must_use]
    pub fn with_encounter_teardown(mut self, delay: Duration) -> Self {
        self.encounter_teardown = delay;
        self
    }

    /// Number of joined participants.
    #[must_use]
    pub const fn participants(&self) -> u8 {
        self.participants
    }

    /// Active play mode.
    #[must_use]
    pub const fn play_mode(&self) -> PlayMode {
        self.play_mode
    }

    /// Whether the hardcore modifier is active.
    #[must_use]
    pub const fn hardcore(&self) -> bool {
        self.hardcore
    }

    /// Lives every participant starts with.
    #[must_use]
    pub const fn starting_lives(&self) -> Lives {
        if self.hardcore {
            Lives::whole(HARDCORE_LIVES)
        } else {
            Lives::whole(self.lives)
        }
    }

    /// Delay between entering hazard liquid and the survival roll.
    #[must_use]
    pub const fn hazard_settle(&self) -> Duration {
        self.hazard_settle
    }

    /// Delay between relocation and the enemy response step.
    #[must_use]
    pub const fn response_settle(&self) -> Duration {
        self.response_settle
    }

    /// Delay before a race-mode participant re-enters play.
    #[must_use]
    pub const fn respawn_delay(&self) -> Duration {
        self.respawn_delay
    }

    /// Delay between boss defeat and arena teardown.
    #[must_use]
    pub const fn encounter_teardown(&self) -> Duration {
        self.encounter_teardown
    }

    /// How long the latest feedback stays in the presentation snapshot.
    #[must_use]
    pub const fn feedback_lifetime(&self) -> Duration {
        self.feedback_lifetime
    }

    /// Duration of the stuns applied by consumables.
    #[must_use]
    pub const fn stun_duration(&self) -> Duration {
        self.stun_duration
    }

    /// Duration of the stun applied when cheese ammunition hits the giant rat.
    #[must_use]
    pub const fn cheese_hit_stun(&self) -> Duration {
        self.cheese_hit_stun
    }

    /// Duration of the invincibility granted by a magic star.
    #[must_use]
    pub const fn invincibility_duration(&self) -> Duration {
        if self.hardcore {
            Duration::from_secs(self.invincibility_duration.as_secs() / 2)
        } else {
            self.invincibility_duration
        }
    }

    /// Hit points every boss starts with.
    #[must_use]
    pub const fn boss_hit_points(&self) -> u32 {
        self.boss_hit_points
    }

    /// Ammunition handed out when an encounter starts.
    #[must_use]
    pub const fn arena_ammunition(&self) -> u32 {
        self.arena_ammunition
    }

    /// Ammunition handed out on armed levels.
    #[must_use]
    pub const fn armed_ammunition(&self) -> u32 {
        self.armed_ammunition
    }

    /// Minions summoned per boss hit or periodic spawn.
    #[must_use]
    pub const fn minion_count(&self) -> u32 {
        if self.hardcore {
            self.minion_count * 2
        } else {
            self.minion_count
        }
    }

    /// Time a summoned minion stays in play.
    #[must_use]
    pub const fn minion_lifetime(&self) -> Duration {
        self.minion_lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardcore_adjusts_derived_values() {
        let config = Config::default().with_hardcore(true);
        assert_eq!(config.starting_lives(), Lives::whole(1));
        assert_eq!(config.invincibility_duration(), Duration::from_secs(30));
        assert_eq!(config.minion_count(), 4);
    }

    #[test]
    fn participant_count_is_clamped() {
        assert_eq!(Config::default().with_participants(9).participants(), 4);
        assert_eq!(Config::default().with_participants(0).participants(), 1);
    }
}
