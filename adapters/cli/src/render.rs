//! Plain-text rendering of world snapshots.

use std::fmt::Write as _;

use maze_escape_core::{CellCoord, HostileKind, TileKind, WorldSnapshot};

/// Glyph used for a bare tile; matches the level legend.
const fn tile_glyph(kind: TileKind) -> char {
    match kind {
        TileKind::Wall => '#',
        TileKind::Floor => '.',
        TileKind::Start => 'S',
        TileKind::Exit => 'E',
        TileKind::HazardLiquid => 'W',
        TileKind::BreakableObstacle => 'B',
        TileKind::Container => 'C',
        TileKind::ClueA => 'I',
        TileKind::ClueB => '!',
        TileKind::LockedGate => 'D',
        TileKind::HiddenGate => '?',
    }
}

const fn hostile_glyph(kind: HostileKind, held: bool) -> char {
    match kind {
        HostileKind::Rat => 'R',
        HostileKind::Thief if held => 'h',
        HostileKind::Thief => 'H',
        HostileKind::ArenaBoss => 'X',
        HostileKind::GiantRat => 'G',
        HostileKind::Warden => 'F',
        HostileKind::Animatronic => 'A',
    }
}

/// Renders the grid followed by a status block.
///
/// Overlays are drawn in increasing priority: payload targets, projectiles,
/// homing hazards, hostiles, then participants as their number.
pub(crate) fn render(snapshot: &WorldSnapshot) -> String {
    let mut out = String::new();
    for row in 0..snapshot.rows {
        for column in 0..snapshot.columns {
            out.push(glyph_at(snapshot, CellCoord::new(column, row)));
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "stage: {:?}  time: {:.1}s  ammo: {}",
        snapshot.stage,
        snapshot.now.as_secs_f32(),
        snapshot.ammunition
    );
    for participant in &snapshot.participants {
        let status = if participant.escaped {
            " escaped"
        } else if participant.eliminated {
            " out"
        } else if participant.crouching {
            " crouching"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{} lives: {}{status}",
            participant.id, participant.lives
        );
    }
    if let Some(boss) = snapshot.boss {
        let _ = writeln!(
            out,
            "boss: {:?} {} hp ({:?})",
            boss.kind, boss.hit_points, boss.phase
        );
    }
    if let Some(entry) = &snapshot.code_entry {
        let _ = writeln!(out, "code at {}: [{}]", entry.gate, entry.input);
    }
    if snapshot.container_progress > 0 {
        let _ = writeln!(out, "container: {}%", snapshot.container_progress);
    }
    if let Some(feedback) = &snapshot.feedback {
        let _ = writeln!(out, "> {}", feedback.text);
    }
    out
}

fn glyph_at(snapshot: &WorldSnapshot, cell: CellCoord) -> char {
    if let Some(participant) = snapshot
        .participants
        .iter()
        .find(|participant| participant.is_active() && participant.cell == cell)
    {
        return char::from_digit(u32::from(participant.id.get()), 10).unwrap_or('P');
    }
    if let Some(hostile) = snapshot.hostiles.iter().find(|hostile| hostile.cell == cell) {
        return hostile_glyph(hostile.kind, hostile.held);
    }
    if snapshot.hazards.iter().any(|hazard| hazard.cell == cell) {
        return '%';
    }
    if snapshot
        .projectiles
        .iter()
        .any(|projectile| projectile.cell == cell)
    {
        return '*';
    }
    if snapshot
        .payload_targets
        .iter()
        .any(|target| target.cell == cell)
    {
        return 'o';
    }
    snapshot.tile(cell).map_or(' ', tile_glyph)
}
