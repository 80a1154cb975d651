#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ballistics system that advances projectiles one cell per period.

use std::time::Duration;

use maze_escape_core::{
    time_advanced, Cadence, Command, Event, HostileView, PayloadTargetSnapshot,
    ProjectileOutcome, ProjectileSnapshot, ProjectileStep, Stage, TileKind, TileView,
};

/// Configuration parameters required to construct the ballistics system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    step_interval: Duration,
}

impl Config {
    /// Creates a new configuration using the provided projectile cadence.
    #[must_use]
    pub const fn new(step_interval: Duration) -> Self {
        Self { step_interval }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

/// Pure system that emits one atomic projectile batch per period.
#[derive(Debug)]
pub struct Ballistics {
    cadence: Cadence,
    running: bool,
}

impl Ballistics {
    /// Creates a new ballistics system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            cadence: Cadence::new(config.step_interval),
            running: false,
        }
    }

    /// Consumes world events and immutable views to emit projectile batches.
    pub fn handle(
        &mut self,
        events: &[Event],
        projectiles: &[ProjectileSnapshot],
        hostiles: &HostileView,
        targets: &[PayloadTargetSnapshot],
        tiles: &TileView<'_>,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::StageChanged { stage } = event {
                self.running = matches!(stage, Stage::Overworld | Stage::Arena);
                self.cadence.reset();
            }
        }
        if !self.running {
            return;
        }

        // Several elapsed periods still advance by one cell; the views are a single snapshot.
        if self.cadence.advance(time_advanced(events)) == 0 || projectiles.is_empty() {
            return;
        }

        let steps = projectiles
            .iter()
            .map(|projectile| ProjectileStep {
                projectile: projectile.id,
                outcome: resolve(projectile, hostiles, targets, tiles),
            })
            .collect();
        out.push(Command::AdvanceProjectiles { steps });
    }
}

/// Classifies the cell a projectile enters next.
fn resolve(
    projectile: &ProjectileSnapshot,
    hostiles: &HostileView,
    targets: &[PayloadTargetSnapshot],
    tiles: &TileView<'_>,
) -> ProjectileOutcome {
    let Some(cell) = projectile.cell.step(projectile.direction) else {
        return ProjectileOutcome::Obstacle;
    };
    match tiles.kind(cell) {
        None | Some(TileKind::Wall) => return ProjectileOutcome::Obstacle,
        Some(_) => {}
    }
    if let Some(target) = targets.iter().find(|target| target.cell == cell) {
        return ProjectileOutcome::StrikeTarget {
            target: target.id,
            cell,
        };
    }
    if let Some(hostile) = hostiles.at(cell) {
        return ProjectileOutcome::StrikeHostile {
            hostile: hostile.id,
            cell,
        };
    }
    ProjectileOutcome::Travel(cell)
}

#[cfg(test)]
mod tests {
    use maze_escape_core::{
        CellCoord, Direction, HostileId, HostileKind, HostileSnapshot, ParticipantId, PayloadKind,
        PayloadTargetId, ProjectileId,
    };

    use super::*;

    fn projectile(cell: CellCoord, direction: Direction) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: ProjectileId::new(0),
            cell,
            direction,
            owner: ParticipantId::new(1),
            payload: PayloadKind::Normal,
        }
    }

    #[test]
    fn collision_table_prefers_walls_then_targets_then_hostiles() {
        let cells = [
            TileKind::Floor,
            TileKind::Floor,
            TileKind::Wall,
            TileKind::Floor,
        ];
        let tiles = TileView::new(&cells, 4, 1);
        let hostiles = HostileView::from_snapshots(vec![HostileSnapshot {
            id: HostileId::new(3),
            kind: HostileKind::Thief,
            cell: CellCoord::new(1, 0),
            held: false,
        }]);
        let targets = [PayloadTargetSnapshot {
            id: PayloadTargetId::new(9),
            cell: CellCoord::new(1, 0),
            required: PayloadKind::Fire,
        }];

        let east = projectile(CellCoord::new(0, 0), Direction::East);
        assert_eq!(
            resolve(&east, &hostiles, &targets, &tiles),
            ProjectileOutcome::StrikeTarget {
                target: PayloadTargetId::new(9),
                cell: CellCoord::new(1, 0),
            }
        );
        assert_eq!(
            resolve(&east, &hostiles, &[], &tiles),
            ProjectileOutcome::StrikeHostile {
                hostile: HostileId::new(3),
                cell: CellCoord::new(1, 0),
            }
        );
        let into_wall = projectile(CellCoord::new(1, 0), Direction::East);
        assert_eq!(
            resolve(&into_wall, &hostiles, &targets, &tiles),
            ProjectileOutcome::Obstacle
        );
        let off_grid = projectile(CellCoord::new(0, 0), Direction::North);
        assert_eq!(
            resolve(&off_grid, &hostiles, &targets, &tiles),
            ProjectileOutcome::Obstacle
        );
        let open = projectile(CellCoord::new(1, 0), Direction::West);
        assert_eq!(
            resolve(&open, &HostileView::default(), &[], &tiles),
            ProjectileOutcome::Travel(CellCoord::new(0, 0))
        );
    }
}
