/// One-shot signals emitted during a simulation step.
/// The presentation layer consumes these for sound and status messages.

use crate::domain::grid::TilePos;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    ItemConsumed { pos: TilePos },
    AdversaryFleeing,
    AdversaryDefeated,
    /// One per tick, carrying the ids of every tribute eaten that tick.
    TributesConsumed { ids: Vec<usize> },
    PlayerKilled,
    Victory,
}
