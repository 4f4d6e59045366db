/// Maze loader.
///
/// ## Sources (priority order):
///   1. `session.maze_file` from config, if set
///   2. Built-in embedded maze
///
/// ## Maze file format (`.txt`):
///   ```
///   # Maze Name
///   @ 1,1 26,1 13,5
///   <map rows>
///   ```
///   The `# Name` line is optional and must come first. `@` lines list
///   wanderer spawn tiles as `col,row`; there may be several.
///
/// ## Tile legend:
///   '#' = Wall            '.' = Small item      'o' = Large item
///   'G' = Gate            'P' = Player spawn    'M' = Minotaur spawn
///   anything else = Floor
///
/// Malformed layouts are rejected here, before a session ever starts.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::entity::Item;
use crate::domain::grid::{Grid, TilePos};
use crate::domain::tile::TileKind;

#[derive(Debug, Error)]
pub enum MazeError {
    #[error("maze layout is empty")]
    Empty,
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("no {what} spawn marker '{marker}' in maze")]
    MissingSpawn { marker: char, what: &'static str },
    #[error("duplicate {what} spawn marker '{marker}' at {second:?} (first at {first:?})")]
    DuplicateSpawn { marker: char, what: &'static str, first: TilePos, second: TilePos },
    #[error("wanderer spawn {pos:?} is outside the {cols}x{rows} maze")]
    SpawnOutOfBounds { pos: TilePos, cols: usize, rows: usize },
    #[error("line {line}: bad spawn coordinate '{text}'")]
    BadCoordinate { line: usize, text: String },
    #[error("could not read maze file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

/// Raw maze text, split into parts but not yet validated.
#[derive(Clone, Debug)]
pub struct MazeDef {
    pub name: String,
    pub rows: Vec<String>,
    pub wanderer_spawns: Vec<TilePos>,
}

/// A validated maze: the static grid plus everything spawned from it.
#[derive(Clone, Debug)]
pub struct Maze {
    pub name: String,
    pub grid: Grid,
    pub player_spawn: TilePos,
    pub minotaur_spawn: TilePos,
    pub wanderer_spawns: Vec<TilePos>,
    pub items: Vec<Item>,
    pub gates: Vec<TilePos>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load the configured maze file, or the embedded maze when none is set.
pub fn load(maze_file: Option<&Path>) -> Result<Maze, MazeError> {
    match maze_file {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| MazeError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let maze = parse(&text)?;
            info!(path = %path.display(), name = %maze.name, "loaded maze file");
            Ok(maze)
        }
        None => embedded(),
    }
}

/// Parse and validate maze text.
pub fn parse(text: &str) -> Result<Maze, MazeError> {
    build(parse_def(text)?)
}

/// The built-in labyrinth, used when no maze file is configured.
pub fn embedded() -> Result<Maze, MazeError> {
    build(MazeDef {
        name: "Minotaur's Labyrinth".to_string(),
        rows: DEFAULT_LAYOUT.iter().map(|s| s.to_string()).collect(),
        wanderer_spawns: DEFAULT_WANDERERS.to_vec(),
    })
}

// ══════════════════════════════════════════════════════════════
// Text parsing
// ══════════════════════════════════════════════════════════════

fn parse_def(text: &str) -> Result<MazeDef, MazeError> {
    let mut name = String::new();
    let mut rows: Vec<String> = vec![];
    let mut wanderer_spawns = vec![];

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if let Some(list) = line.strip_prefix("@ ") {
            for pair in list.split_whitespace() {
                wanderer_spawns.push(parse_coord(pair).ok_or_else(|| MazeError::BadCoordinate {
                    line: idx + 1,
                    text: pair.to_string(),
                })?);
            }
        } else if name.is_empty() && rows.iter().all(|r| r.trim().is_empty()) && is_name_line(line) {
            name = line[1..].trim().to_string();
        } else {
            rows.push(line.to_string());
        }
    }

    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }
    let lead = rows.iter().take_while(|r| r.trim().is_empty()).count();
    rows.drain(..lead);

    if name.is_empty() {
        name = "Unnamed Maze".to_string();
    }

    Ok(MazeDef { name, rows, wanderer_spawns })
}

fn parse_coord(pair: &str) -> Option<TilePos> {
    let (c, r) = pair.split_once(',')?;
    Some((c.trim().parse().ok()?, r.trim().parse().ok()?))
}

/// Distinguish `# Maze Name` from a map row such as `#o####.##`.
/// A name line is `#` + space + text containing a letter that is not a
/// tile code.
fn is_name_line(line: &str) -> bool {
    line.starts_with("# ")
        && line[1..].chars().any(|c| c.is_alphabetic() && !matches!(c, 'o' | 'G' | 'P' | 'M'))
}

// ══════════════════════════════════════════════════════════════
// Validation
// ══════════════════════════════════════════════════════════════

fn build(def: MazeDef) -> Result<Maze, MazeError> {
    let first = def.rows.first().ok_or(MazeError::Empty)?;
    let cols = first.chars().count();
    if cols == 0 {
        return Err(MazeError::Empty);
    }

    let mut tiles = Vec::with_capacity(def.rows.len());
    let mut player_spawn: Option<TilePos> = None;
    let mut minotaur_spawn: Option<TilePos> = None;
    let mut items = vec![];

    for (row, line) in def.rows.iter().enumerate() {
        let found = line.chars().count();
        if found != cols {
            return Err(MazeError::RaggedRow { row, expected: cols, found });
        }
        let mut tile_row = Vec::with_capacity(cols);
        for (col, ch) in line.chars().enumerate() {
            let pos = (col as i32, row as i32);
            let kind = TileKind::from_char(ch);
            match kind {
                TileKind::PlayerSpawn => claim_spawn(&mut player_spawn, pos, 'P', "player")?,
                TileKind::AdversarySpawn => claim_spawn(&mut minotaur_spawn, pos, 'M', "minotaur")?,
                _ => {}
            }
            if let Some(item) = Item::from_tile(pos, kind) {
                items.push(item);
            }
            tile_row.push(kind);
        }
        tiles.push(tile_row);
    }

    let grid = Grid::new(tiles);
    let player_spawn = player_spawn.ok_or(MazeError::MissingSpawn { marker: 'P', what: "player" })?;
    let minotaur_spawn =
        minotaur_spawn.ok_or(MazeError::MissingSpawn { marker: 'M', what: "minotaur" })?;

    // A spawn inside a wall is allowed: the mover steps out through any
    // open neighbor. The embedded maze has one at (13, 26).
    for &pos in &def.wanderer_spawns {
        if !grid.in_bounds(pos.0, pos.1) {
            return Err(MazeError::SpawnOutOfBounds { pos, cols: grid.cols(), rows: grid.rows() });
        }
    }

    let gates = grid.positions_of(TileKind::Gate);
    debug!(
        cols = grid.cols(),
        rows = grid.rows(),
        items = items.len(),
        gates = gates.len(),
        wanderers = def.wanderer_spawns.len(),
        "maze validated"
    );

    Ok(Maze {
        name: def.name,
        grid,
        player_spawn,
        minotaur_spawn,
        wanderer_spawns: def.wanderer_spawns,
        items,
        gates,
    })
}

fn claim_spawn(
    slot: &mut Option<TilePos>,
    pos: TilePos,
    marker: char,
    what: &'static str,
) -> Result<(), MazeError> {
    if let Some(first) = *slot {
        return Err(MazeError::DuplicateSpawn { marker, what, first, second: pos });
    }
    *slot = Some(pos);
    Ok(())
}

// ══════════════════════════════════════════════════════════════
// Embedded maze
// ══════════════════════════════════════════════════════════════

const DEFAULT_LAYOUT: &[&str] = &[
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.#####.##.#####.######",
    "     #.#####.##.#####.#     ",
    "     #.##..........##.#     ",
    "     #.##.###--###.##.#     ",
    "######.##.#      #.##.######",
    "G P   .   #   M  #   .     G",
    "######.##.#      #.##.######",
    "     #.##.########.##.#     ",
    "     #.##..........##.#     ",
    "     #.##.########.##.#     ",
    "######.##.########.##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##................##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

const DEFAULT_WANDERERS: &[TilePos] = &[
    (1, 1),
    (26, 1),
    (1, 20),
    (26, 20),
    (1, 23),
    (26, 23),
    (13, 5),
    (14, 5),
    (13, 26),
];
