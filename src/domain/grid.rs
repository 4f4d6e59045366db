/// Static maze grid: tile lookup and passability.
///
/// Built once per session from the parsed layout and never mutated.
/// Coordinates are signed so neighbor arithmetic can step off the edge;
/// anything outside `[0, cols) × [0, rows)` reads as a wall.

use super::tile::TileKind;

/// Tile coordinate as `(col, row)`.
pub type TilePos = (i32, i32);

#[derive(Clone, Debug)]
pub struct Grid {
    tiles: Vec<Vec<TileKind>>,
    cols: usize,
    rows: usize,
}

impl Grid {
    /// Wrap a rectangular tile array. Row lengths are validated by the maze
    /// loader before this is called.
    pub fn new(tiles: Vec<Vec<TileKind>>) -> Self {
        let rows = tiles.len();
        let cols = tiles.first().map_or(0, |r| r.len());
        debug_assert!(tiles.iter().all(|r| r.len() == cols));
        Grid { tiles, cols, rows }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.cols && (row as usize) < self.rows
    }

    /// Tile kind at (col, row). Out of bounds = wall.
    #[inline]
    pub fn tile_at(&self, col: i32, row: i32) -> TileKind {
        if !self.in_bounds(col, row) {
            return TileKind::Wall;
        }
        self.tiles[row as usize][col as usize]
    }

    #[inline]
    pub fn is_passable(&self, col: i32, row: i32, gates_open: bool) -> bool {
        self.tile_at(col, row).is_passable(gates_open)
    }

    /// All tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TilePos, TileKind)> + '_ {
        self.tiles.iter().enumerate().flat_map(|(row, line)| {
            line.iter()
                .enumerate()
                .map(move |(col, &kind)| ((col as i32, row as i32), kind))
        })
    }

    /// Positions of every tile of the given kind, row-major.
    pub fn positions_of(&self, kind: TileKind) -> Vec<TilePos> {
        self.iter().filter(|&(_, k)| k == kind).map(|(p, _)| p).collect()
    }

    /// Build a grid straight from a string diagram (test helper).
    #[cfg(test)]
    pub fn from_diagram(rows: &[&str]) -> Self {
        Grid::new(
            rows.iter()
                .map(|r| r.chars().map(TileKind::from_char).collect())
                .collect(),
        )
    }
}
