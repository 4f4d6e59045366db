/// Read-only view of a session, rebuilt every frame for the renderer.

use crate::domain::entity::{Direction, Item};
use crate::domain::grid::TilePos;
use crate::domain::mover::Mover;
use super::phase::{AdversaryState, Outcome};
use super::session::Session;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityView {
    pub x: f32,
    pub y: f32,
    /// Cell under the center point, which may run ahead of the synced tile.
    pub cell: TilePos,
    pub dir: Direction,
}

#[derive(Clone, Debug)]
pub struct Snapshot {
    pub player: EntityView,
    pub player_alive: bool,
    pub tributes: Vec<EntityView>,
    pub minotaur: EntityView,
    pub minotaur_state: AdversaryState,
    pub items: Vec<Item>,
    pub gates_open: bool,
    pub outcome: Outcome,
    pub score: u32,
    pub survivors: usize,
    pub objective: String,
}

impl Snapshot {
    pub fn capture(s: &Session) -> Self {
        let view = |m: &Mover| EntityView {
            x: m.x,
            y: m.y,
            cell: m.cell(),
            dir: m.dir,
        };
        Snapshot {
            player: view(&s.player.mover),
            player_alive: s.phase.player_alive(),
            tributes: s.tributes.iter().map(|t| view(&t.mover)).collect(),
            minotaur: view(&s.minotaur.mover),
            minotaur_state: s.phase.adversary_state(),
            items: s.items.clone(),
            gates_open: s.phase.exit_unlocked(),
            outcome: s.phase.outcome(),
            score: s.phase.score(),
            survivors: s.survivors(),
            objective: objective(s),
        }
    }
}

/// The guidance line shown beside the survivor count.
fn objective(s: &Session) -> String {
    let left = s.phase.items_remaining();
    if left > 0 {
        format!("Pellets left: {left}")
    } else if !s.phase.exit_unlocked() {
        "Slay the Minotaur!".to_string()
    } else {
        "Exit the Labyrinth!".to_string()
    }
}
