/// Entities: Player (Theseus), Tribute (wanderer), Minotaur (pursuer), Item.
///
/// Every entity is a `Mover` paired with the steering strategy that feeds it.
/// Liveness of the player and the Minotaur lives in the phase state, not here;
/// a consumed tribute is simply dropped from the session.

use super::grid::TilePos;
use super::hitbox::{Rect, MINOTAUR_HITBOX, PLAYER_HITBOX, TRIBUTE_HITBOX};
use super::mover::Mover;
use super::steering::{InputSteering, PursuitSteering, WanderSteering};
use super::tile::TileKind;

/// Unit step on the tile grid. `None` is the zero vector.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The four cardinals in expansion order: +x, -x, +y, -y.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
    ];

    /// (dx, dy) in tile units; y grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Inverse of `delta` for unit steps; anything else is `None`.
    pub fn from_delta(dx: i32, dy: i32) -> Self {
        match (dx, dy) {
            (0, -1) => Direction::Up,
            (0, 1) => Direction::Down,
            (-1, 0) => Direction::Left,
            (1, 0) => Direction::Right,
            _ => Direction::None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::None => Direction::None,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_none(self) -> bool {
        self == Direction::None
    }

    /// Neighbor of `pos` one step in this direction.
    pub fn step(self, pos: TilePos) -> TilePos {
        let (dx, dy) = self.delta();
        (pos.0 + dx, pos.1 + dy)
    }
}

/// Input captured for one tick. Movement is the held direction, if any.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub movement: Option<Direction>,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub mover: Mover,
    pub steering: InputSteering,
}

impl Player {
    pub fn new(tile: TilePos, speed: f32) -> Self {
        Player {
            mover: Mover::new(tile, speed),
            steering: InputSteering::default(),
        }
    }

    pub fn hitbox(&self) -> Rect {
        self.mover.hitbox(PLAYER_HITBOX)
    }
}

/// A wandering tribute. `id` is its index in the spawn list and stays
/// stable after other tributes are consumed.
#[derive(Clone, Debug)]
pub struct Tribute {
    pub id: usize,
    pub mover: Mover,
    pub steering: WanderSteering,
}

impl Tribute {
    pub fn new(id: usize, tile: TilePos, speed: f32) -> Self {
        Tribute {
            id,
            mover: Mover::new(tile, speed),
            steering: WanderSteering,
        }
    }

    pub fn hitbox(&self) -> Rect {
        self.mover.hitbox(TRIBUTE_HITBOX)
    }
}

#[derive(Clone, Debug)]
pub struct Minotaur {
    pub mover: Mover,
    pub steering: PursuitSteering,
}

impl Minotaur {
    pub fn new(tile: TilePos, speed: f32) -> Self {
        Minotaur {
            mover: Mover::new(tile, speed),
            steering: PursuitSteering,
        }
    }

    /// Three tiles wide: the Minotaur's reach matches its sprite, not its cell.
    pub fn hitbox(&self) -> Rect {
        self.mover.hitbox(MINOTAUR_HITBOX)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ItemKind {
    Small,
    Large,
}

/// A consumable marker. Small and large items only differ in looks.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Item {
    pub pos: TilePos,
    pub kind: ItemKind,
}

impl Item {
    pub fn new(pos: TilePos, kind: ItemKind) -> Self {
        Item { pos, kind }
    }

    /// Item for a layout tile, if that tile carries one.
    pub fn from_tile(pos: TilePos, tile: TileKind) -> Option<Self> {
        match tile {
            TileKind::SmallItem => Some(Item::new(pos, ItemKind::Small)),
            TileKind::LargeItem => Some(Item::new(pos, ItemKind::Large)),
            _ => None,
        }
    }

    pub fn hitbox(&self) -> Rect {
        Rect::item(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_round_trips_for_cardinals() {
        for d in Direction::CARDINALS {
            let (dx, dy) = d.delta();
            assert_eq!(Direction::from_delta(dx, dy), d);
            assert_eq!(d.opposite().opposite(), d);
            assert_ne!(d.opposite(), d);
        }
        assert_eq!(Direction::from_delta(0, 0), Direction::None);
        assert_eq!(Direction::from_delta(2, 0), Direction::None);
    }

    #[test]
    fn minotaur_reach_spans_neighbors() {
        let player = Player::new((3, 1), 4.0);
        let minotaur = Minotaur::new((4, 1), 3.0);
        assert!(player.hitbox().overlaps(&minotaur.hitbox()));

        let far = Minotaur::new((6, 1), 3.0);
        assert!(!player.hitbox().overlaps(&far.hitbox()));
    }
}
