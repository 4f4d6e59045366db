/// Direction-selection strategies.
///
/// A `Steering` is consulted by `Mover::advance` each time its mover sits on
/// a tile center. Three implementations:
///   1. **Input**  : the player's buffered request.
///   2. **Wander** : random legal direction, avoiding a U-turn when possible.
///   3. **Pursuit**: BFS toward the nearest goal; the goal set depends on
///      whether the Minotaur is hunting or fleeing.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use super::entity::Direction;
use super::grid::{Grid, TilePos};
use super::path;

/// Session RNG. Seedable so runs can be replayed.
pub type SimRng = ChaCha8Rng;

/// What a steering strategy wants at a tile center.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Steer {
    /// Take this direction if it's legal; otherwise keep the current one.
    Request(Direction),
    /// Stop here.
    Halt,
}

/// Everything a strategy may look at when deciding.
pub struct SteerCtx<'a> {
    pub grid: &'a Grid,
    pub gates_open: bool,
    pub rng: &'a mut SimRng,
    /// Player's synced tile.
    pub player: TilePos,
    /// Synced tiles of the living tributes.
    pub wanderers: &'a [TilePos],
    pub fleeing: bool,
}

pub trait Steering {
    fn steer(&mut self, here: TilePos, heading: Direction, ctx: &mut SteerCtx<'_>) -> Steer;
}

// ── Input ──

/// Holds the last direction the player asked for until it becomes legal.
#[derive(Clone, Debug, Default)]
pub struct InputSteering {
    requested: Direction,
}

impl InputSteering {
    /// Buffer a new request. No input leaves the previous one in place.
    pub fn request(&mut self, movement: Option<Direction>) {
        if let Some(dir) = movement {
            self.requested = dir;
        }
    }

    #[cfg(test)]
    pub fn requested(&self) -> Direction {
        self.requested
    }
}

impl Steering for InputSteering {
    fn steer(&mut self, _here: TilePos, _heading: Direction, _ctx: &mut SteerCtx<'_>) -> Steer {
        Steer::Request(self.requested)
    }
}

// ── Wander ──

#[derive(Clone, Copy, Debug, Default)]
pub struct WanderSteering;

/// Cardinals passable from `here`, in expansion order.
pub fn legal_directions(grid: &Grid, here: TilePos, gates_open: bool) -> Vec<Direction> {
    Direction::CARDINALS
        .into_iter()
        .filter(|d| {
            let (c, r) = d.step(here);
            grid.is_passable(c, r, gates_open)
        })
        .collect()
}

/// Drop the U-turn unless it is the only way out.
pub fn without_reversal(candidates: Vec<Direction>, heading: Direction) -> Vec<Direction> {
    if heading.is_none() {
        return candidates;
    }
    let back = heading.opposite();
    let forward: Vec<Direction> = candidates.iter().copied().filter(|&d| d != back).collect();
    if forward.is_empty() { candidates } else { forward }
}

impl Steering for WanderSteering {
    fn steer(&mut self, here: TilePos, heading: Direction, ctx: &mut SteerCtx<'_>) -> Steer {
        let candidates = without_reversal(legal_directions(ctx.grid, here, ctx.gates_open), heading);
        match candidates.choose(&mut *ctx.rng) {
            Some(&dir) => Steer::Request(dir),
            None => Steer::Halt,
        }
    }
}

// ── Pursuit ──

#[derive(Clone, Copy, Debug, Default)]
pub struct PursuitSteering;

/// Hunt goals: the player plus every living tribute.
pub fn hunt_goals(player: TilePos, wanderers: &[TilePos]) -> Vec<TilePos> {
    let mut goals = Vec::with_capacity(wanderers.len() + 1);
    goals.push(player);
    for &w in wanderers {
        if !goals.contains(&w) {
            goals.push(w);
        }
    }
    goals
}

/// Flee goal: the non-wall tile farthest from the player (squared distance).
/// Row-major scan, first strictly-greater wins. Falls back to the player's
/// own tile on a map with no open tiles.
pub fn flee_goal(grid: &Grid, player: TilePos) -> TilePos {
    let mut best: Option<TilePos> = None;
    let mut best_dist = -1i64;
    for (pos, kind) in grid.iter() {
        if kind.is_wall() {
            continue;
        }
        let dx = (pos.0 - player.0) as i64;
        let dy = (pos.1 - player.1) as i64;
        let dist = dx * dx + dy * dy;
        if dist > best_dist {
            best_dist = dist;
            best = Some(pos);
        }
    }
    best.unwrap_or(player)
}

impl Steering for PursuitSteering {
    fn steer(&mut self, here: TilePos, _heading: Direction, ctx: &mut SteerCtx<'_>) -> Steer {
        let goals = if ctx.fleeing {
            vec![flee_goal(ctx.grid, ctx.player)]
        } else {
            hunt_goals(ctx.player, ctx.wanderers)
        };
        let grid = ctx.grid;
        let gates_open = ctx.gates_open;
        match path::next_step(here, &goals, |c, r| grid.is_passable(c, r, gates_open)) {
            Some(dir) => Steer::Request(dir),
            None => Steer::Halt,
        }
    }
}
