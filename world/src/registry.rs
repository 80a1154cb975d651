use maze_escape_core::{
    CellCoord, Direction, HazardId, HostileId, HostileKind, HostileSnapshot, ParticipantId,
    PayloadKind, PayloadTargetId, ProjectileId,
};

/// Mutable collections of every non-participant entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Registry {
    pub(crate) hostiles: Vec<Hostile>,
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) hazards: Vec<Hazard>,
    pub(crate) payload_targets: Vec<PayloadTarget>,
}

impl Registry {
    pub(crate) fn hostile(&self, id: HostileId) -> Option<&Hostile> {
        self.hostiles.iter().find(|hostile| hostile.id == id)
    }

    pub(crate) fn hostile_mut(&mut self, id: HostileId) -> Option<&mut Hostile> {
        self.hostiles.iter_mut().find(|hostile| hostile.id == id)
    }

    pub(crate) fn hostile_at(&self, cell: CellCoord) -> Option<&Hostile> {
        self.hostiles.iter().find(|hostile| hostile.cell == cell)
    }

    pub(crate) fn remove_hostile(&mut self, id: HostileId) -> Option<Hostile> {
        let index = self.hostiles.iter().position(|hostile| hostile.id == id)?;
        Some(self.hostiles.remove(index))
    }

    pub(crate) fn first_of_kind(&self, kind: HostileKind) -> Option<&Hostile> {
        self.hostiles.iter().find(|hostile| hostile.kind == kind)
    }

    pub(crate) fn remove_projectile(&mut self, id: ProjectileId) -> Option<Projectile> {
        let index = self
            .projectiles
            .iter()
            .position(|projectile| projectile.id == id)?;
        Some(self.projectiles.remove(index))
    }

    pub(crate) fn remove_hazard(&mut self, id: HazardId) -> Option<Hazard> {
        let index = self.hazards.iter().position(|hazard| hazard.id == id)?;
        Some(self.hazards.remove(index))
    }

    pub(crate) fn payload_target_at(&self, cell: CellCoord) -> Option<&PayloadTarget> {
        self.payload_targets.iter().find(|target| target.cell == cell)
    }

    pub(crate) fn remove_payload_target(&mut self, id: PayloadTargetId) -> Option<PayloadTarget> {
        let index = self
            .payload_targets
            .iter()
            .position(|target| target.id == id)?;
        Some(self.payload_targets.remove(index))
    }

    pub(crate) fn hostile_snapshots(&self) -> Vec<HostileSnapshot> {
        self.hostiles.iter().map(Hostile::snapshot).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Hostile {
    pub(crate) id: HostileId,
    pub(crate) kind: HostileKind,
    pub(crate) cell: CellCoord,
    pub(crate) held: bool,
}

impl Hostile {
    pub(crate) fn snapshot(&self) -> HostileSnapshot {
        HostileSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            held: self.held,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) cell: CellCoord,
    pub(crate) direction: Direction,
    pub(crate) owner: ParticipantId,
    pub(crate) payload: PayloadKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Hazard {
    pub(crate) id: HazardId,
    pub(crate) cell: CellCoord,
    pub(crate) target: ParticipantId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PayloadTarget {
    pub(crate) id: PayloadTargetId,
    pub(crate) cell: CellCoord,
    pub(crate) required: PayloadKind,
}

/// Monotonic identifier source that survives arena swaps.
#[derive(Clone, Debug, Default)]
pub(crate) struct IdAllocator {
    next_hostile: u32,
    next_projectile: u32,
    next_hazard: u32,
    next_payload_target: u32,
}

impl IdAllocator {
    pub(crate) fn hostile(&mut self) -> HostileId {
        HostileId::new(bump(&mut self.next_hostile))
    }

    pub(crate) fn projectile(&mut self) -> ProjectileId {
        ProjectileId::new(bump(&mut self.next_projectile))
    }

    pub(crate) fn hazard(&mut self) -> HazardId {
        HazardId::new(bump(&mut self.next_hazard))
    }

    pub(crate) fn payload_target(&mut self) -> PayloadTargetId {
        PayloadTargetId::new(bump(&mut self.next_payload_target))
    }
}

fn bump(counter: &mut u32) -> u32 {
    let value = *counter;
    *counter = counter.wrapping_add(1);
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_never_reused() {
        let mut ids = IdAllocator::default();
        let first = ids.hostile();
        let second = ids.hostile();
        assert_ne!(first, second);
        assert_eq!(ids.projectile(), ProjectileId::new(0));
        assert_eq!(ids.projectile(), ProjectileId::new(1));
    }

    #[test]
    fn removal_returns_the_entity() {
        let mut registry = Registry::default();
        registry.hostiles.push(Hostile {
            id: HostileId::new(3),
            kind: HostileKind::Rat,
            cell: CellCoord::new(1, 1),
            held: false,
        });
        assert!(registry.hostile_at(CellCoord::new(1, 1)).is_some());
        let removed = registry.remove_hostile(HostileId::new(3)).expect("present");
        assert_eq!(removed.kind, HostileKind::Rat);
        assert!(registry.remove_hostile(HostileId::new(3)).is_none());
    }
}
