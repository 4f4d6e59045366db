/// Integer axis-aligned boxes for collision checks.
///
/// Entity boxes are centered on the truncated pixel position and sized to
/// the sprite, not the tile. Overlap is strict: touching edges don't collide.

use super::grid::TilePos;
use super::mover::TILE_SIZE;

const TILE: i32 = TILE_SIZE as i32;

pub const PLAYER_HITBOX: i32 = TILE;
pub const TRIBUTE_HITBOX: i32 = TILE;
pub const MINOTAUR_HITBOX: i32 = TILE * 3;

/// Side of an item marker, and its inset from the tile's top-left corner.
pub const ITEM_SIZE: i32 = TILE * 3 / 8;
pub const ITEM_INSET: i32 = (TILE - ITEM_SIZE) / 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    /// Square of side `size` centered on (cx, cy).
    pub fn centered(cx: i32, cy: i32, size: i32) -> Self {
        Rect::new(cx - size / 2, cy - size / 2, size, size)
    }

    /// Full-tile box (gates).
    pub fn tile(pos: TilePos) -> Self {
        Rect::new(pos.0 * TILE, pos.1 * TILE, TILE, TILE)
    }

    /// Item marker inside a tile.
    pub fn item(pos: TilePos) -> Self {
        Rect::new(
            pos.0 * TILE + ITEM_INSET,
            pos.1 * TILE + ITEM_INSET,
            ITEM_SIZE,
            ITEM_SIZE,
        )
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.w <= 0 || self.h <= 0 || other.w <= 0 || other.h <= 0 {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}
