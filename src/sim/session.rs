/// Session: the complete state of one run through the labyrinth.
///
/// Built from a validated `Maze` and the configured speeds. The grid is
/// never mutated after construction; everything else is dropped on restart.
///
/// Ownership:
///   - `grid`, `gates`: static, read by every mover each tick
///   - `player`, `tributes`, `minotaur`: each entity owns its mover
///   - `items`: shrinks as the player collects them
///   - `phase`: the only place global flags live
///   - `rng`: the one source of randomness, seeded for replay

use rand::SeedableRng;
use thiserror::Error;
use tracing::info;

use crate::config::SpeedConfig;
use crate::domain::entity::{Item, Minotaur, Player, Tribute};
use crate::domain::grid::{Grid, TilePos};
use crate::domain::mover::speed_divides_tile;
use crate::domain::steering::SimRng;
use super::maze::{Maze, MazeError};
use super::phase::PhaseState;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Maze(#[from] MazeError),
    #[error("{entity} speed {speed} px/tick does not divide the 24 px tile")]
    MisalignedSpeed { entity: &'static str, speed: f32 },
}

#[derive(Clone, Debug)]
pub struct Session {
    pub maze_name: String,
    pub grid: Grid,
    pub gates: Vec<TilePos>,
    pub player: Player,
    pub tributes: Vec<Tribute>,
    pub minotaur: Minotaur,
    pub items: Vec<Item>,
    pub phase: PhaseState,
    pub rng: SimRng,
    pub seed: u64,
    pub tick: u64,
}

impl Session {
    /// Start a fresh session. `seed = None` draws one from entropy; the seed
    /// actually used is kept so a run can be reproduced.
    pub fn new(maze: Maze, speed: &SpeedConfig, seed: Option<u64>) -> Result<Self, SessionError> {
        check_speed("player", speed.player)?;
        check_speed("wanderer", speed.wanderer)?;
        check_speed("minotaur", speed.minotaur)?;

        let seed = seed.unwrap_or_else(rand::random);
        let tributes = maze
            .wanderer_spawns
            .iter()
            .enumerate()
            .map(|(id, &tile)| Tribute::new(id, tile, speed.wanderer))
            .collect::<Vec<_>>();

        info!(
            maze = %maze.name,
            seed,
            items = maze.items.len(),
            tributes = tributes.len(),
            "session started"
        );

        Ok(Session {
            maze_name: maze.name,
            phase: PhaseState::new(maze.items.len()),
            player: Player::new(maze.player_spawn, speed.player),
            minotaur: Minotaur::new(maze.minotaur_spawn, speed.minotaur),
            tributes,
            items: maze.items,
            gates: maze.gates,
            grid: maze.grid,
            rng: SimRng::seed_from_u64(seed),
            seed,
            tick: 0,
        })
    }

    /// Living wanderers plus the player, if alive.
    pub fn survivors(&self) -> usize {
        self.tributes.len() + usize::from(self.phase.player_alive())
    }
}

fn check_speed(entity: &'static str, speed: f32) -> Result<(), SessionError> {
    if speed_divides_tile(speed) {
        Ok(())
    } else {
        Err(SessionError::MisalignedSpeed { entity, speed })
    }
}
