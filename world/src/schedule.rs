use std::time::Duration;

use maze_escape_core::{HostileId, ParticipantId};

/// Deferred world actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    /// Survival roll for a participant standing in hazard liquid.
    HazardRoll(ParticipantId),
    /// Synchronous pursuit step that closes a move.
    EnemyResponse(ParticipantId),
    /// Race-mode return to play after running out of lives.
    Respawn(ParticipantId),
    /// End of a summoned minion's lifetime.
    Despawn(HostileId),
    /// Arena teardown after the boss ran out of hit points.
    ConcludeEncounter,
}

impl Action {
    /// Respawns outlive arena swaps; everything else belongs to one world state.
    const fn survives_encounter_swap(self) -> bool {
        matches!(self, Self::Respawn(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry {
    due: Duration,
    sequence: u64,
    level_generation: u32,
    encounter_generation: u32,
    action: Action,
}

/// Future actions keyed by the generation they were created under.
#[derive(Clone, Debug, Default)]
pub(crate) struct Schedule {
    entries: Vec<Entry>,
    sequence: u64,
}

/// Generations an entry must match to stay valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Generations {
    pub(crate) level: u32,
    pub(crate) encounter: u32,
}

impl Schedule {
    pub(crate) fn push(&mut self, due: Duration, generations: Generations, action: Action) {
        self.entries.push(Entry {
            due,
            sequence: self.sequence,
            level_generation: generations.level,
            encounter_generation: generations.encounter,
            action,
        });
        self.sequence = self.sequence.wrapping_add(1);
    }

    /// Removes and returns the earliest entry due at `now`, flagging stale ones.
    pub(crate) fn pop_due(
        &mut self,
        now: Duration,
        current: Generations,
    ) -> Option<(Action, bool)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= now)
            .min_by_key(|(_, entry)| (entry.due, entry.sequence))
            .map(|(index, _)| index)?;
        let entry = self.entries.swap_remove(index);
        let fresh = entry.level_generation == current.level
            && (entry.action.survives_encounter_swap()
                || entry.encounter_generation == current.encounter);
        Some((entry.action, fresh))
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
