use std::time::Duration;

use maze_escape_core::{buff_active, BuffKind, BuffSnapshot, Event};

/// Single global expiry per buff category; zero means inactive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct BuffTracker {
    expiries: BuffSnapshot,
}

impl BuffTracker {
    pub(crate) fn is_active(&self, buff: BuffKind, now: Duration) -> bool {
        buff_active(self.expiries.expiry(buff), now)
    }

    /// Starts or refreshes `buff` so it lasts `duration` from `now`.
    pub(crate) fn apply(
        &mut self,
        buff: BuffKind,
        now: Duration,
        duration: Duration,
        out_events: &mut Vec<Event>,
    ) {
        let expires_at = now.saturating_add(duration);
        *self.slot(buff) = expires_at;
        out_events.push(Event::BuffApplied { buff, expires_at });
    }

    /// Clears every buff whose expiry has been reached.
    pub(crate) fn expire(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        for buff in [
            BuffKind::HostileStun,
            BuffKind::SecondaryHostileStun,
            BuffKind::Invincibility,
        ] {
            let slot = self.slot(buff);
            if *slot != Duration::ZERO && !buff_active(*slot, now) {
                *slot = Duration::ZERO;
                out_events.push(Event::BuffExpired { buff });
            }
        }
    }

    pub(crate) const fn snapshot(&self) -> BuffSnapshot {
        self.expiries
    }

    fn slot(&mut self, buff: BuffKind) -> &mut Duration {
        match buff {
            BuffKind::HostileStun => &mut self.expiries.hostile_stun,
            BuffKind::SecondaryHostileStun => &mut self.expiries.secondary_hostile_stun,
            BuffKind::Invincibility => &mut self.expiries.invincibility,
        }
    }
}
