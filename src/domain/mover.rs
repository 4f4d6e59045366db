/// Shared movement primitive for every entity.
///
/// Position is continuous (pixels), decisions are discrete (tiles):
///   - Tile centers sit at `col * TILE_SIZE + TILE_SIZE / 2`.
///   - Only at a center may a mover resync its tile, consult its steering
///     and change direction. Between centers it coasts.
///   - Speeds must divide `TILE_SIZE` exactly, otherwise a mover steps over
///     its centers and never turns again.
///
/// The three entity kinds differ only in their `Steering`; the advance
/// algorithm below is the same for all of them.

use super::entity::Direction;
use super::grid::{Grid, TilePos};
use super::hitbox::Rect;
use super::steering::{Steer, SteerCtx, Steering};

pub const TILE_SIZE: f32 = 24.0;
pub const HALF_TILE: f32 = TILE_SIZE / 2.0;

/// Pixel position of a tile's center.
pub fn tile_center(pos: TilePos) -> (f32, f32) {
    (
        pos.0 as f32 * TILE_SIZE + HALF_TILE,
        pos.1 as f32 * TILE_SIZE + HALF_TILE,
    )
}

/// Sub-pixel resolution a speed must be expressible in. Multiples of
/// 1/256 add up exactly in `f32`, so repeated steps never drift off a center.
const SPEED_QUANTUM: f32 = 256.0;

/// Does `speed` land exactly on every tile center?
pub fn speed_divides_tile(speed: f32) -> bool {
    if !speed.is_finite() || speed <= 0.0 {
        return false;
    }
    if (speed * SPEED_QUANTUM).fract() != 0.0 {
        return false;
    }
    let steps = TILE_SIZE / speed;
    steps.fract() == 0.0 && (steps * speed) == TILE_SIZE
}

#[derive(Clone, Debug)]
pub struct Mover {
    pub x: f32,
    pub y: f32,
    /// Tile as of the last center crossing.
    pub tile: TilePos,
    /// Committed direction, applied every tick.
    pub dir: Direction,
    /// Pixels per tick.
    pub speed: f32,
}

impl Mover {
    /// Place a mover at the center of `tile`, standing still.
    pub fn new(tile: TilePos, speed: f32) -> Self {
        let (x, y) = tile_center(tile);
        Mover { x, y, tile, dir: Direction::None, speed }
    }

    pub fn is_at_tile_center(&self) -> bool {
        (self.x - HALF_TILE).rem_euclid(TILE_SIZE) == 0.0
            && (self.y - HALF_TILE).rem_euclid(TILE_SIZE) == 0.0
    }

    /// Grid cell containing the mover's center point (floor division).
    pub fn cell(&self) -> TilePos {
        (
            (self.x / TILE_SIZE).floor() as i32,
            (self.y / TILE_SIZE).floor() as i32,
        )
    }

    /// Can the mover step from its synced tile in `dir`?
    /// The zero direction is never a legal move.
    pub fn can_move(&self, dir: Direction, grid: &Grid, gates_open: bool) -> bool {
        if dir.is_none() {
            return false;
        }
        let (col, row) = dir.step(self.tile);
        grid.is_passable(col, row, gates_open)
    }

    /// One tick of movement.
    ///
    /// At a center: resync the tile, apply the steering decision if legal,
    /// and halt if the committed direction now runs into a wall or a closed
    /// gate. Then translate unconditionally.
    pub fn advance<S: Steering + ?Sized>(&mut self, steering: &mut S, ctx: &mut SteerCtx<'_>) {
        if self.is_at_tile_center() {
            self.sync_tile();

            match steering.steer(self.tile, self.dir, ctx) {
                Steer::Request(dir) => {
                    if self.can_move(dir, ctx.grid, ctx.gates_open) {
                        self.dir = dir;
                    }
                }
                Steer::Halt => self.dir = Direction::None,
            }

            if !self.can_move(self.dir, ctx.grid, ctx.gates_open) {
                self.dir = Direction::None;
            }
        }

        let (dx, dy) = self.dir.delta();
        self.x += dx as f32 * self.speed;
        self.y += dy as f32 * self.speed;
    }

    /// Recompute the tile from the pixel position. Floor, not truncation:
    /// the two differ for anything left of or above the first center.
    fn sync_tile(&mut self) {
        self.tile = (
            ((self.x - HALF_TILE) / TILE_SIZE).floor() as i32,
            ((self.y - HALF_TILE) / TILE_SIZE).floor() as i32,
        );
    }

    /// Square hitbox of the given side, centered on the truncated position.
    pub fn hitbox(&self, size: i32) -> Rect {
        Rect::centered(self.x as i32, self.y as i32, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::steering::{InputSteering, SimRng};
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn ctx<'a>(grid: &'a Grid, rng: &'a mut SimRng) -> SteerCtx<'a> {
        SteerCtx {
            grid,
            gates_open: false,
            rng,
            player: (0, 0),
            wanderers: &[],
            fleeing: false,
        }
    }

    fn steer_to(dir: Direction) -> InputSteering {
        let mut s = InputSteering::default();
        s.request(Some(dir));
        s
    }

    #[test]
    fn spawn_is_centered() {
        let m = Mover::new((3, 2), 4.0);
        assert_eq!((m.x, m.y), (84.0, 60.0));
        assert!(m.is_at_tile_center());
        assert_eq!(m.cell(), (3, 2));
    }

    #[test]
    fn speeds_must_divide_tile() {
        assert!(speed_divides_tile(4.0));
        assert!(speed_divides_tile(3.0));
        assert!(speed_divides_tile(1.5));
        assert!(speed_divides_tile(24.0));
        assert!(!speed_divides_tile(5.0));
        assert!(!speed_divides_tile(0.0));
        assert!(!speed_divides_tile(-4.0));
        assert!(!speed_divides_tile(f32::NAN));
        // 24 / x is whole, but x has no exact binary form.
        for x in [4.8, 2.4, 1.6, 1.2, 0.8, 0.6, 0.4, 0.3] {
            assert!(!speed_divides_tile(x), "{x} accepted");
        }
        assert!(speed_divides_tile(0.375));
    }

    #[test]
    fn accepted_speeds_hit_every_center() {
        let row = format!("#{}#", " ".repeat(12));
        let grid = Grid::from_diagram(&["##############", &row, "##############"]);
        for speed in [0.375, 0.75, 1.5, 3.0, 4.0, 6.0] {
            assert!(speed_divides_tile(speed));
            let mut m = Mover::new((1, 1), speed);
            let mut steer = steer_to(Direction::Right);
            let mut rng = SimRng::seed_from_u64(1);
            let mut centers = 0;
            for _ in 0..(10.0 * TILE_SIZE / speed) as usize {
                m.advance(&mut steer, &mut ctx(&grid, &mut rng));
                if m.is_at_tile_center() {
                    centers += 1;
                }
            }
            assert_eq!(centers, 10, "speed {speed}");
            assert_eq!(m.cell(), (11, 1));
        }
    }

    #[test]
    fn turns_only_at_center() {
        let grid = Grid::from_diagram(&[
            "#####",
            "#   #",
            "#   #",
            "#####",
        ]);
        let mut rng = SimRng::seed_from_u64(1);
        let mut m = Mover::new((1, 1), 4.0);
        let mut s = steer_to(Direction::Right);
        m.advance(&mut s, &mut ctx(&grid, &mut rng));
        assert_eq!(m.dir, Direction::Right);

        // Mid-tile: the down request waits for the next center.
        s.request(Some(Direction::Down));
        for _ in 0..5 {
            m.advance(&mut s, &mut ctx(&grid, &mut rng));
            assert_eq!(m.dir, Direction::Right);
        }
        assert!(m.is_at_tile_center());
        m.advance(&mut s, &mut ctx(&grid, &mut rng));
        assert_eq!(m.tile, (2, 1));
        assert_eq!(m.dir, Direction::Down);
        assert_eq!(m.x, 60.0);
        assert_eq!(m.y, 40.0);
    }

    #[test]
    fn illegal_request_keeps_course() {
        let grid = Grid::from_diagram(&[
            "#####",
            "#   #",
            "#####",
        ]);
        let mut rng = SimRng::seed_from_u64(1);
        let mut m = Mover::new((1, 1), 4.0);
        let mut s = steer_to(Direction::Right);
        m.advance(&mut s, &mut ctx(&grid, &mut rng));
        s.request(Some(Direction::Up));
        for _ in 0..6 {
            m.advance(&mut s, &mut ctx(&grid, &mut rng));
        }
        assert_eq!(m.dir, Direction::Right);
        assert_eq!(m.tile, (2, 1));
    }

    #[test]
    fn halts_at_wall() {
        let grid = Grid::from_diagram(&[
            "####",
            "#  #",
            "####",
        ]);
        let mut rng = SimRng::seed_from_u64(1);
        let mut m = Mover::new((1, 1), 4.0);
        let mut s = steer_to(Direction::Right);
        for _ in 0..20 {
            m.advance(&mut s, &mut ctx(&grid, &mut rng));
        }
        assert_eq!(m.dir, Direction::None);
        assert_eq!(m.tile, (2, 1));
        assert_eq!(m.x, 60.0);
        assert!(m.is_at_tile_center());
    }

    #[test]
    fn closed_gate_blocks_open_gate_passes() {
        let grid = Grid::from_diagram(&[
            "#####",
            "#  G#",
            "#####",
        ]);
        let mut rng = SimRng::seed_from_u64(1);
        let mut m = Mover::new((2, 1), 4.0);
        let mut s = steer_to(Direction::Right);
        m.advance(&mut s, &mut ctx(&grid, &mut rng));
        assert_eq!(m.dir, Direction::None);

        let mut open = ctx(&grid, &mut rng);
        open.gates_open = true;
        m.advance(&mut s, &mut open);
        assert_eq!(m.dir, Direction::Right);
    }

    #[test]
    fn floor_sync_left_of_origin() {
        // A mover pushed off the map's left edge still floors correctly.
        let grid = Grid::from_diagram(&["   "]);
        let mut rng = SimRng::seed_from_u64(1);
        let mut m = Mover::new((0, 0), 4.0);
        m.x = -12.0;
        let mut s = InputSteering::default();
        m.advance(&mut s, &mut ctx(&grid, &mut rng));
        assert_eq!(m.tile, (-1, 0));
    }

    proptest! {
        #[test]
        fn constant_direction_moves_exactly(n in 0usize..200, speed_idx in 0usize..4) {
            let speed = [1.5_f32, 3.0, 4.0, 6.0][speed_idx];
            let row = "#".to_string() + &" ".repeat(100) + "#";
            let wall = "#".repeat(102);
            let grid = Grid::from_diagram(&[&wall, &row, &wall]);
            let mut rng = SimRng::seed_from_u64(7);
            let mut m = Mover::new((1, 1), speed);
            let start = (m.x, m.y);
            let mut s = steer_to(Direction::Right);
            for _ in 0..n {
                m.advance(&mut s, &mut ctx(&grid, &mut rng));
                let cell = m.cell();
                prop_assert!(grid.in_bounds(cell.0, cell.1));
            }
            prop_assert_eq!(m.x - start.0, n as f32 * speed);
            prop_assert_eq!(m.y, start.1);
        }
    }
}
