//! Level descriptions consumed from the level provider.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, HostileKind, TileKind, CODE_LENGTH};

/// Placement of a single tile inside a level description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileSpec {
    /// Cell the tile occupies.
    pub cell: CellCoord,
    /// Kind of the tile.
    pub kind: TileKind,
}

/// Placement of a single hostile inside a level description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostileSpec {
    /// Kind of hostile.
    pub kind: HostileKind,
    /// Cell the hostile starts on.
    pub cell: CellCoord,
    /// Whether the hostile starts neutralized.
    #[serde(default)]
    pub held: bool,
}

/// Prerequisite that must hold before an exit accepts a participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExitRequirement {
    /// At least this many thieves must have been shot down.
    MinimumEliminated(u32),
    /// No breakable obstacle may remain on the grid.
    NoBreakables,
    /// The level boss must be out of hit points.
    BossDefeated,
}

/// Level-specific rules layered on top of the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRules {
    /// Whether participants may fire projectiles outside the arena.
    #[serde(default)]
    pub armed: bool,
    /// Prerequisites checked when a participant steps onto an exit.
    #[serde(default)]
    pub exit_requirements: Vec<ExitRequirement>,
}

/// Finished level handed to the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDescription {
    /// Level number used for feedback and logging.
    pub number: u32,
    /// Grid width in cells.
    pub columns: u32,
    /// Grid height in cells.
    pub rows: u32,
    /// Tile placements, one per coordinate.
    pub tiles: Vec<TileSpec>,
    /// Initial hostile placements.
    #[serde(default)]
    pub hostiles: Vec<HostileSpec>,
    /// Pre-assigned four digit code for the hidden gate.
    #[serde(default)]
    pub secret_code: Option<String>,
    /// Level-specific rules.
    #[serde(default)]
    pub rules: LevelRules,
}

/// Reasons a level description is refused at load time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// The description contains no cells.
    #[error("level map is empty")]
    Empty,
    /// An ASCII row differs in width from the first row.
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Zero-based row index.
        row: u32,
        /// Width of the first row.
        expected: u32,
        /// Width of the offending row.
        found: u32,
    },
    /// An ASCII glyph is not part of the legend.
    #[error("unknown glyph `{glyph}` at {cell}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Where it appeared.
        cell: CellCoord,
    },
    /// A tile lies outside the declared grid.
    #[error("tile {0} lies outside the grid")]
    TileOutOfBounds(CellCoord),
    /// A coordinate is described more than once.
    #[error("cell {0} is described more than once")]
    DuplicateTile(CellCoord),
    /// A coordinate has no tile.
    #[error("cell {0} has no tile")]
    MissingTile(CellCoord),
    /// No start tile exists.
    #[error("level has no start tile")]
    MissingStart,
    /// More than one start tile exists.
    #[error("level has {0} start tiles")]
    MultipleStarts(usize),
    /// No exit tile exists.
    #[error("level has no exit tile")]
    MissingExit,
    /// A hostile stands on a wall.
    #[error("hostile at {0} stands on a wall")]
    HostileOnWall(CellCoord),
    /// A hostile lies outside the grid.
    #[error("hostile at {0} lies outside the grid")]
    HostileOutOfBounds(CellCoord),
    /// The pre-assigned code is not a four digit number.
    #[error("secret code `{0}` must be four digits")]
    InvalidSecretCode(String),
}

impl LevelDescription {
    /// Parses an ASCII map using the built-in legend.
    ///
    /// `#` wall, `.` floor, `S` start, `E` exit, `W` hazard liquid, `B`
    /// breakable obstacle, `C` container, `I` clue A, `!` clue B, `D` locked
    /// gate, `?` hidden gate. Hostile glyphs place a hostile on floor: `R`
    /// rat, `H` thief, `h` held thief, `G` giant rat, `F` warden, `A`
    /// animatronic. Blank lines are ignored.
    pub fn from_ascii(number: u32, map: &str) -> Result<Self, LevelError> {
        let lines: Vec<&str> = map
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let first = lines.first().ok_or(LevelError::Empty)?;
        let columns = width(first);
        let rows = u32::try_from(lines.len()).map_err(|_| LevelError::Empty)?;

        let mut tiles = Vec::new();
        let mut hostiles = Vec::new();
        for (row, line) in (0..rows).zip(lines.iter()) {
            let found = width(line);
            if found != columns {
                return Err(LevelError::Ragged {
                    row,
                    expected: columns,
                    found,
                });
            }
            for (column, glyph) in (0..columns).zip(line.chars()) {
                let cell = CellCoord::new(column, row);
                let (kind, hostile) =
                    parse_glyph(glyph).ok_or(LevelError::UnknownGlyph { glyph, cell })?;
                tiles.push(TileSpec { cell, kind });
                if let Some((kind, held)) = hostile {
                    hostiles.push(HostileSpec { kind, cell, held });
                }
            }
        }

        let description = Self {
            number,
            columns,
            rows,
            tiles,
            hostiles,
            secret_code: None,
            rules: LevelRules::default(),
        };
        description.validate()?;
        Ok(description)
    }

    /// Attaches level rules to the description.
    #[must_use]
    pub fn with_rules(mut self, rules: LevelRules) -> Self {
        self.rules = rules;
        self
    }

    /// Attaches a pre-assigned secret code to the description.
    #[must_use]
    pub fn with_secret_code(mut self, code: impl Into<String>) -> Self {
        self.secret_code = Some(code.into());
        self
    }

    /// Checks the structural requirements the engine relies on.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.columns == 0 || self.rows == 0 || self.tiles.is_empty() {
            return Err(LevelError::Empty);
        }

        let mut seen = HashSet::with_capacity(self.tiles.len());
        for tile in &self.tiles {
            if !tile.cell.within(self.columns, self.rows) {
                return Err(LevelError::TileOutOfBounds(tile.cell));
            }
            if !seen.insert(tile.cell) {
                return Err(LevelError::DuplicateTile(tile.cell));
            }
        }
        for row in 0..self.rows {
            for column in 0..self.columns {
                let cell = CellCoord::new(column, row);
                if !seen.contains(&cell) {
                    return Err(LevelError::MissingTile(cell));
                }
            }
        }

        match self.count(TileKind::Start) {
            0 => return Err(LevelError::MissingStart),
            1 => {}
            many => return Err(LevelError::MultipleStarts(many)),
        }
        if self.count(TileKind::Exit) == 0 {
            return Err(LevelError::MissingExit);
        }

        for hostile in &self.hostiles {
            match self.kind_at(hostile.cell) {
                None => return Err(LevelError::HostileOutOfBounds(hostile.cell)),
                Some(TileKind::Wall) => return Err(LevelError::HostileOnWall(hostile.cell)),
                Some(_) => {}
            }
        }

        if let Some(code) = &self.secret_code {
            if code.len() != CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
                return Err(LevelError::InvalidSecretCode(code.clone()));
            }
        }

        Ok(())
    }

    /// Cell of the start tile, if the description has one.
    #[must_use]
    pub fn start(&self) -> Option<CellCoord> {
        self.tiles
            .iter()
            .find(|tile| tile.kind == TileKind::Start)
            .map(|tile| tile.cell)
    }

    /// Cells of every exit tile.
    #[must_use]
    pub fn exits(&self) -> Vec<CellCoord> {
        self.tiles
            .iter()
            .filter(|tile| tile.kind == TileKind::Exit)
            .map(|tile| tile.cell)
            .collect()
    }

    /// Reports whether the level hosts a giant rat or a warden.
    #[must_use]
    pub fn is_boss_level(&self) -> bool {
        self.hostiles.iter().any(|hostile| {
            matches!(hostile.kind, HostileKind::GiantRat | HostileKind::Warden)
        })
    }

    /// Exit prerequisites including the implicit boss requirement.
    #[must_use]
    pub fn exit_requirements(&self) -> Vec<ExitRequirement> {
        let mut requirements = self.rules.exit_requirements.clone();
        if self.is_boss_level() && !requirements.contains(&ExitRequirement::BossDefeated) {
            requirements.push(ExitRequirement::BossDefeated);
        }
        requirements
    }

    fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|tile| tile.kind == kind).count()
    }

    fn kind_at(&self, cell: CellCoord) -> Option<TileKind> {
        self.tiles
            .iter()
            .find(|tile| tile.cell == cell)
            .map(|tile| tile.kind)
    }
}

fn width(line: &str) -> u32 {
    u32::try_from(line.chars().count()).unwrap_or(u32::MAX)
}

fn parse_glyph(glyph: char) -> Option<(TileKind, Option<(HostileKind, bool)>)> {
    let tile = |kind| Some((kind, None));
    let hostile = |kind| Some((TileKind::Floor, Some((kind, false))));
    match glyph {
        '#' => tile(TileKind::Wall),
        '.' => tile(TileKind::Floor),
        'S' => tile(TileKind::Start),
        'E' => tile(TileKind::Exit),
        'W' => tile(TileKind::HazardLiquid),
        'B' => tile(TileKind::BreakableObstacle),
        'C' => tile(TileKind::Container),
        'I' => tile(TileKind::ClueA),
        '!' => tile(TileKind::ClueB),
        'D' => tile(TileKind::LockedGate),
        '?' => tile(TileKind::HiddenGate),
        'R' => hostile(HostileKind::Rat),
        'H' => hostile(HostileKind::Thief),
        'h' => Some((TileKind::Floor, Some((HostileKind::Thief, true)))),
        'G' => hostile(HostileKind::GiantRat),
        'F' => hostile(HostileKind::Warden),
        'A' => hostile(HostileKind::Animatronic),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_corridor_with_hostiles() {
        let level = LevelDescription::from_ascii(1, "#####\n#SRE#\n#####\n").expect("valid map");
        assert_eq!(level.columns, 5);
        assert_eq!(level.rows, 3);
        assert_eq!(level.start(), Some(CellCoord::new(1, 1)));
        assert_eq!(level.exits(), vec![CellCoord::new(3, 1)]);
        assert_eq!(
            level.hostiles,
            vec![HostileSpec {
                kind: HostileKind::Rat,
                cell: CellCoord::new(2, 1),
                held: false,
            }]
        );
    }

    #[test]
    fn rejects_ragged_rows() {
        let error = LevelDescription::from_ascii(1, "S.E\n..\n").unwrap_err();
        assert_eq!(
            error,
            LevelError::Ragged {
                row: 1,
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn rejects_unknown_glyphs() {
        let error = LevelDescription::from_ascii(1, "S.X").unwrap_err();
        assert!(matches!(error, LevelError::UnknownGlyph { glyph: 'X', .. }));
    }

    #[test]
    fn requires_exactly_one_start_and_an_exit() {
        assert_eq!(
            LevelDescription::from_ascii(1, "..E").unwrap_err(),
            LevelError::MissingStart
        );
        assert_eq!(
            LevelDescription::from_ascii(1, "S.S.E").unwrap_err(),
            LevelError::MultipleStarts(2)
        );
        assert_eq!(
            LevelDescription::from_ascii(1, "S..").unwrap_err(),
            LevelError::MissingExit
        );
    }

    #[test]
    fn rejects_hostile_on_wall() {
        let mut level = LevelDescription::from_ascii(1, "S#E").expect("valid map");
        level.hostiles.push(HostileSpec {
            kind: HostileKind::Rat,
            cell: CellCoord::new(1, 0),
            held: false,
        });
        assert_eq!(
            level.validate(),
            Err(LevelError::HostileOnWall(CellCoord::new(1, 0)))
        );
    }

    #[test]
    fn rejects_duplicate_tiles() {
        let mut level = LevelDescription::from_ascii(1, "S.E").expect("valid map");
        level.tiles[1].cell = CellCoord::new(0, 0);
        assert_eq!(
            level.validate(),
            Err(LevelError::DuplicateTile(CellCoord::new(0, 0)))
        );
    }

    #[test]
    fn rejects_malformed_secret_codes() {
        let level = LevelDescription::from_ascii(1, "S.E")
            .expect("valid map")
            .with_secret_code("12a4");
        assert!(matches!(
            level.validate(),
            Err(LevelError::InvalidSecretCode(_))
        ));
    }

    #[test]
    fn boss_levels_require_boss_defeat() {
        let level = LevelDescription::from_ascii(4, "S.G.E").expect("valid map");
        assert!(level.is_boss_level());
        assert_eq!(
            level.exit_requirements(),
            vec![ExitRequirement::BossDefeated]
        );
    }

    #[test]
    fn description_survives_bincode() {
        let level = LevelDescription::from_ascii(2, "S.W.?\n#.I!E")
            .expect("valid map")
            .with_rules(LevelRules {
                armed: true,
                exit_requirements: vec![ExitRequirement::MinimumEliminated(2)],
            });
        let bytes = bincode::serialize(&level).expect("serialize");
        let restored: LevelDescription = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, level);
    }

    #[test]
    fn description_parses_from_json() {
        let json = r#"{
            "number": 7,
            "columns": 2,
            "rows": 1,
            "tiles": [
                {"cell": {"column": 0, "row": 0}, "kind": "start"},
                {"cell": {"column": 1, "row": 0}, "kind": "exit"}
            ]
        }"#;
        let level: LevelDescription = serde_json::from_str(json).expect("json");
        assert_eq!(level.validate(), Ok(()));
        assert!(!level.rules.armed);
    }
}
