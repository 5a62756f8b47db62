//! Level descriptions and sources
//!
//! A level is a rectangular character map plus an access code. Maps parse
//! into `LevelData`, a grid of `CellSpec`s the board consumes when it
//! builds a round. Sources implement `LevelSource`; the built-in
//! campaign is compiled in, and `LevelSet::from_json` loads the same
//! shape from a JSON document for external level packs.
//!
//! Map legend:
//!
//! ```text
//! .  floor          #  wall           *  brick
//! x  portal brick   p  player spawn   1  enemy spawn
//! b  brick hiding a bombs pickup      f  flames pickup
//! s  speed pickup   l  extra-life pickup
//! ```
//!
//! Pickups and the portal always start hidden under a brick.

use crate::powerup::PowerKind;
use serde::Deserialize;
use std::error::Error;
use std::fmt;

/// What a board cell starts the round as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSpec {
    Floor,
    Wall,
    Brick,
    PowerBrick(PowerKind),
    PortalBrick,
    /// Floor with the player mob spawned on it.
    PlayerSpawn,
    /// Floor with an enemy mob spawned on it.
    EnemySpawn,
}

#[derive(Debug)]
pub enum LevelError {
    /// The requested level index does not exist in the source.
    NoSuchLevel(usize),
    /// No level carries the entered code.
    UnknownCode(String),
    /// The map string had no rows.
    EmptyMap,
    /// A row's length differed from the first row's.
    RaggedRow { row: usize, expected: usize, got: usize },
    /// A character outside the map legend.
    UnknownTile { tile: char, x: i32, y: i32 },
    /// A playable map needs exactly one player spawn.
    PlayerSpawns(usize),
    /// The JSON document failed to parse.
    Json(serde_json::Error),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::NoSuchLevel(index) => write!(f, "no level with index {}", index),
            LevelError::UnknownCode(code) => write!(f, "no level with code {:?}", code),
            LevelError::EmptyMap => write!(f, "level map is empty"),
            LevelError::RaggedRow { row, expected, got } => write!(
                f,
                "level row {} has {} cells, expected {}",
                row, got, expected
            ),
            LevelError::UnknownTile { tile, x, y } => {
                write!(f, "unknown map tile {:?} at ({}, {})", tile, x, y)
            }
            LevelError::PlayerSpawns(count) => {
                write!(f, "level has {} player spawns, expected 1", count)
            }
            LevelError::Json(e) => write!(f, "level file error: {}", e),
        }
    }
}

impl Error for LevelError {}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        LevelError::Json(e)
    }
}

/// A parsed, validated level the board can load directly.
pub struct LevelData {
    pub index: usize,
    pub width: i32,
    pub height: i32,
    cells: Vec<CellSpec>,
}

impl LevelData {
    /// Parses a newline-separated map. Rows must be equal length and the
    /// map must contain exactly one player spawn.
    pub fn parse(index: usize, map: &str) -> Result<Self, LevelError> {
        let rows: Vec<&str> = map.lines().filter(|l| !l.is_empty()).collect();
        if rows.is_empty() {
            return Err(LevelError::EmptyMap);
        }

        let width = rows[0].chars().count();
        let mut cells = Vec::with_capacity(width * rows.len());
        let mut players = 0;

        for (y, row) in rows.iter().enumerate() {
            let got = row.chars().count();
            if got != width {
                return Err(LevelError::RaggedRow {
                    row: y,
                    expected: width,
                    got,
                });
            }
            for (x, tile) in row.chars().enumerate() {
                let spec = match tile {
                    '.' => CellSpec::Floor,
                    '#' => CellSpec::Wall,
                    '*' => CellSpec::Brick,
                    'x' => CellSpec::PortalBrick,
                    'b' => CellSpec::PowerBrick(PowerKind::Bombs),
                    'f' => CellSpec::PowerBrick(PowerKind::Flames),
                    's' => CellSpec::PowerBrick(PowerKind::Speed),
                    'l' => CellSpec::PowerBrick(PowerKind::Life),
                    'p' => {
                        players += 1;
                        CellSpec::PlayerSpawn
                    }
                    '1' => CellSpec::EnemySpawn,
                    other => {
                        return Err(LevelError::UnknownTile {
                            tile: other,
                            x: x as i32,
                            y: y as i32,
                        });
                    }
                };
                cells.push(spec);
            }
        }

        if players != 1 {
            return Err(LevelError::PlayerSpawns(players));
        }

        Ok(LevelData {
            index,
            width: width as i32,
            height: rows.len() as i32,
            cells,
        })
    }

    pub fn cell(&self, x: i32, y: i32) -> CellSpec {
        self.cells[(x + y * self.width) as usize]
    }
}

/// Where levels come from. The lifecycle controller only ever asks by
/// index or by code; sources decide storage.
pub trait LevelSource {
    /// The level at `index`, counted from 1.
    fn level(&self, index: usize) -> Result<LevelData, LevelError>;

    /// The index the given access code unlocks.
    fn index_for_code(&self, code: &str) -> Result<usize, LevelError>;

    /// The access code shown when a level starts.
    fn code_for(&self, index: usize) -> Option<&str>;
}

/// Raw shape of one level in a JSON level pack.
#[derive(Deserialize)]
struct LevelSpec {
    code: String,
    map: Vec<String>,
}

/// An ordered set of levels, from JSON or compiled in.
pub struct LevelSet {
    levels: Vec<(String, String)>,
}

impl LevelSet {
    /// Loads a level pack from a JSON array of `{ "code", "map" }`
    /// objects. Every map is parsed once up front so a broken pack fails
    /// here rather than mid-game.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let specs: Vec<LevelSpec> = serde_json::from_str(json)?;
        let levels: Vec<(String, String)> = specs
            .into_iter()
            .map(|s| (s.code, s.map.join("\n")))
            .collect();
        for (i, (_, map)) in levels.iter().enumerate() {
            LevelData::parse(i + 1, map)?;
        }
        Ok(LevelSet { levels })
    }

    /// The compiled-in campaign.
    pub fn builtin() -> Self {
        LevelSet {
            levels: vec![
                (
                    "OPEN".to_string(),
                    "###############\n\
                     #p....*...*..1#\n\
                     #.#*#.#*#.#*#.#\n\
                     #..*...s...*..#\n\
                     #.#*#.#.#.#*#.#\n\
                     #*....*f*....*#\n\
                     #.#.#*#.#*#.#.#\n\
                     #..*...x...*..#\n\
                     #.#*#.#*#.#*#.#\n\
                     #1..*..b..*...#\n\
                     ###############"
                        .to_string(),
                ),
                (
                    "CELLAR".to_string(),
                    "###############\n\
                     #p.*..#...*..1#\n\
                     #.#.#*#.#*#.#.#\n\
                     #*.b..*...*.f*#\n\
                     #.#*#.#.#.#*#.#\n\
                     #..*.1#x#1.*..#\n\
                     #.#*#.#.#.#*#.#\n\
                     #*.l..*...*.s*#\n\
                     #.#.#*#.#*#.#.#\n\
                     #1..*..#..*...#\n\
                     ###############"
                        .to_string(),
                ),
                (
                    "FURNACE".to_string(),
                    "###################\n\
                     #p.*...*.1.*...*.1#\n\
                     #.#.#*#.#.#.#*#.#.#\n\
                     #*.s.*..*f*..*.b.*#\n\
                     #.#*#.#*#.#*#.#*#.#\n\
                     #1.*..*..x..*..*..#\n\
                     #.#*#.#*#.#*#.#*#.#\n\
                     #*.f.*..*l*..*.s.*#\n\
                     #.#.#*#.#.#.#*#.#.#\n\
                     #1.*...*.1.*...*.1#\n\
                     ###################"
                        .to_string(),
                ),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl LevelSource for LevelSet {
    fn level(&self, index: usize) -> Result<LevelData, LevelError> {
        let (_, map) = self
            .levels
            .get(index.wrapping_sub(1))
            .ok_or(LevelError::NoSuchLevel(index))?;
        LevelData::parse(index, map)
    }

    fn index_for_code(&self, code: &str) -> Result<usize, LevelError> {
        self.levels
            .iter()
            .position(|(c, _)| c.eq_ignore_ascii_case(code))
            .map(|i| i + 1)
            .ok_or_else(|| LevelError::UnknownCode(code.to_string()))
    }

    fn code_for(&self, index: usize) -> Option<&str> {
        self.levels
            .get(index.wrapping_sub(1))
            .map(|(c, _)| c.as_str())
    }
}
