//! Levels bundled with the command-line adapter.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::ValueEnum;
use maze_escape_core::{ExitRequirement, LevelDescription, LevelRules};

/// Built-in level selectable with `--builtin`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Builtin {
    /// Straight corridor with a single exit.
    Corridor,
    /// Rats and a hazard-liquid moat.
    Moat,
    /// Container, clue tiles and a locked gate.
    Vault,
    /// Armed level that requires two thieves shot down.
    Heist,
    /// Hidden gate leading to the arena boss.
    Lair,
    /// Giant rat boss level.
    Burrow,
    /// Warden boss level with payload targets.
    Keep,
}

impl Builtin {
    fn map(self) -> &'static str {
        match self {
            Self::Corridor => "S..E",
            Self::Moat => "S.#.....\n..#.R...\n.WWWW...\n......RE",
            Self::Vault => "S..C..\n.####.\n.I..!.\n####D#\n.....E",
            Self::Heist => "S..H...\n.##.##.\n...H..E",
            Self::Lair => "S...#....\n.##.#.##.\n....?...E",
            Self::Burrow => "S.......\n.##..##.\n......G.\n.......E",
            Self::Keep => "S........\n.........\n....F....\n........E",
        }
    }

    fn number(self) -> u32 {
        match self {
            Self::Corridor => 1,
            Self::Moat => 2,
            Self::Vault => 3,
            Self::Heist => 4,
            Self::Lair => 5,
            Self::Burrow => 6,
            Self::Keep => 7,
        }
    }

    /// Builds the level description.
    pub(crate) fn level(self) -> Result<LevelDescription> {
        let level = LevelDescription::from_ascii(self.number(), self.map())
            .with_context(|| format!("built-in level {self:?} is malformed"))?;
        Ok(match self {
            Self::Heist => level.with_rules(LevelRules {
                armed: true,
                exit_requirements: vec![ExitRequirement::MinimumEliminated(2)],
            }),
            Self::Keep => level.with_rules(LevelRules {
                armed: true,
                exit_requirements: Vec::new(),
            }),
            _ => level,
        })
    }
}

/// Reads a level from disk: `.json` files are deserialized, anything else is
/// parsed with the ASCII legend.
pub(crate) fn load(path: &Path, number: u32) -> Result<LevelDescription> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    if path.extension().is_some_and(|extension| extension == "json") {
        serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    } else {
        LevelDescription::from_ascii(number, contents.trim_end())
            .with_context(|| format!("parsing {}", path.display()))
    }
}
