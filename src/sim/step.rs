/// The step function: advances a session by one tick.
///
/// Processing order:
///   1. Terminal outcome → nothing happens
///   2. Buffer the player's input
///   3. Broadcast the exit flag as `gates_open` for this tick
///   4. Movement (player → tributes in spawn order → Minotaur if alive)
///   5. Item pickup
///   6. Hunt → flee transition
///   7. Player / Minotaur contact
///   8. Minotaur / tribute contact (hunting only)
///   9. Exit through a gate
///
/// A fatal contact in (7) does not cut the tick short: (8) and (9) still run.
/// All collision checks use the positions reached after movement.

use tracing::{debug, info};

use crate::domain::entity::FrameInput;
use crate::domain::grid::TilePos;
use crate::domain::hitbox::Rect;
use crate::domain::steering::SteerCtx;
use super::event::GameEvent;
use super::session::Session;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(s: &mut Session, input: FrameInput) -> Vec<GameEvent> {
    if s.phase.outcome().is_terminal() { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    s.tick += 1;

    s.player.steering.request(input.movement);
    let gates_open = s.phase.exit_unlocked();

    resolve_movement(s, gates_open);
    resolve_items(s, &mut events);
    resolve_flee(s, &mut events);
    resolve_adversary_contact(s, &mut events);
    resolve_tributes_eaten(s, &mut events);
    resolve_exit(s, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

fn resolve_movement(s: &mut Session, gates_open: bool) {
    let fleeing = s.phase.adversary_fleeing();

    let mut ctx = SteerCtx {
        grid: &s.grid,
        gates_open,
        rng: &mut s.rng,
        player: s.player.mover.tile,
        wanderers: &[],
        fleeing,
    };
    s.player.mover.advance(&mut s.player.steering, &mut ctx);
    for t in s.tributes.iter_mut() {
        t.mover.advance(&mut t.steering, &mut ctx);
    }

    if !s.phase.adversary_alive() { return; }

    // Goals use the tiles synced this tick.
    let wanderers: Vec<TilePos> = s.tributes.iter().map(|t| t.mover.tile).collect();
    let mut ctx = SteerCtx {
        grid: &s.grid,
        gates_open,
        rng: &mut s.rng,
        player: s.player.mover.tile,
        wanderers: &wanderers,
        fleeing,
    };
    s.minotaur.mover.advance(&mut s.minotaur.steering, &mut ctx);
}

// ══════════════════════════════════════════════════════════════
// Items
// ══════════════════════════════════════════════════════════════

fn resolve_items(s: &mut Session, events: &mut Vec<GameEvent>) {
    let reach = s.player.hitbox();
    let phase = &mut s.phase;
    s.items.retain(|item| {
        if !item.hitbox().overlaps(&reach) { return true; }
        phase.consume_item();
        events.push(GameEvent::ItemConsumed { pos: item.pos });
        false
    });
}

fn resolve_flee(s: &mut Session, events: &mut Vec<GameEvent>) {
    if s.phase.items_remaining() > 0 { return; }
    if s.phase.begin_flee() {
        info!(tick = s.tick, "maze cleared, minotaur flees");
        events.push(GameEvent::AdversaryFleeing);
    }
}

// ══════════════════════════════════════════════════════════════
// Contact
// ══════════════════════════════════════════════════════════════

fn resolve_adversary_contact(s: &mut Session, events: &mut Vec<GameEvent>) {
    if !s.phase.adversary_alive() { return; }
    if !s.player.hitbox().overlaps(&s.minotaur.hitbox()) { return; }

    if s.phase.adversary_fleeing() {
        if s.phase.defeat_adversary() {
            info!(tick = s.tick, "minotaur slain, gates unlocked");
            events.push(GameEvent::AdversaryDefeated);
        }
    } else if s.phase.kill_player() {
        info!(tick = s.tick, score = s.phase.score(), "player caught");
        events.push(GameEvent::PlayerKilled);
    }
}

fn resolve_tributes_eaten(s: &mut Session, events: &mut Vec<GameEvent>) {
    if !s.phase.hunting() { return; }

    let reach = s.minotaur.hitbox();
    let mut ids = vec![];
    s.tributes.retain(|t| {
        if t.hitbox().overlaps(&reach) {
            ids.push(t.id);
            false
        } else {
            true
        }
    });
    if !ids.is_empty() {
        debug!(tick = s.tick, ?ids, left = s.tributes.len(), "tributes consumed");
        events.push(GameEvent::TributesConsumed { ids });
    }
}

fn resolve_exit(s: &mut Session, events: &mut Vec<GameEvent>) {
    if !s.phase.exit_unlocked() { return; }

    let reach = s.player.hitbox();
    let at_gate = s.gates.iter().any(|&g| Rect::tile(g).overlaps(&reach));
    if at_gate && s.phase.escape() {
        info!(tick = s.tick, score = s.phase.score(), survivors = s.survivors(), "escaped");
        events.push(GameEvent::Victory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpeedConfig;
    use crate::domain::entity::{Direction, Item, ItemKind};
    use crate::sim::maze;
    use crate::sim::phase::{Outcome, PhaseState};
    use rand::{Rng, SeedableRng};

    fn session(text: &str) -> Session {
        Session::new(maze::parse(text).unwrap(), &SpeedConfig::default(), Some(11)).unwrap()
    }

    fn go(dir: Direction) -> FrameInput {
        FrameInput { movement: Some(dir) }
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    #[test]
    fn item_at_spawn_while_already_fleeing() {
        let mut s = session(
            "##########\n\
             #P      M#\n\
             ##########",
        );
        let spawn = s.player.mover.tile;
        s.items = vec![Item::new(spawn, ItemKind::Small)];
        s.phase = PhaseState::new(1);
        assert!(s.phase.begin_flee());

        let events = step(&mut s, idle());
        assert_eq!(s.phase.items_remaining(), 0);
        assert!(s.phase.adversary_fleeing());
        assert_eq!(events, vec![GameEvent::ItemConsumed { pos: spawn }]);
        assert_eq!(s.phase.score(), 10);
    }

    #[test]
    fn straddling_two_items_takes_both_in_one_tick() {
        let mut s = session(
            "###########\n\
             #P ..  . M#\n\
             ###########",
        );
        assert_eq!(s.phase.items_remaining(), 3);
        // Halfway between the centers of (3, 1) and (4, 1).
        s.player.mover.x = 96.0;

        let events = step(&mut s, idle());
        assert_eq!(
            events,
            vec![
                GameEvent::ItemConsumed { pos: (3, 1) },
                GameEvent::ItemConsumed { pos: (4, 1) },
            ]
        );
        assert_eq!(s.phase.items_remaining(), 1);
        assert_eq!(s.phase.score(), 20);
        assert!(s.phase.hunting());
    }

    #[test]
    fn walking_into_hunting_minotaur_is_defeat() {
        let mut s = session(
            "######\n\
             #PM .#\n\
             ######",
        );
        let events = step(&mut s, go(Direction::Right));
        assert_eq!(events, vec![GameEvent::PlayerKilled]);
        assert_eq!(s.phase.outcome(), Outcome::Defeat);
        assert!(!s.phase.player_alive());
        assert_eq!(s.survivors(), 0);

        // Terminal: nothing moves any more.
        let x = s.player.mover.x;
        assert!(step(&mut s, go(Direction::Left)).is_empty());
        assert_eq!(s.player.mover.x, x);
        assert_eq!(s.tick, 1);
    }

    #[test]
    fn walking_into_fleeing_minotaur_slays_it() {
        let mut s = session(
            "######\n\
             #PM  #\n\
             ######",
        );
        let events = step(&mut s, go(Direction::Right));
        assert_eq!(events, vec![GameEvent::AdversaryFleeing, GameEvent::AdversaryDefeated]);
        assert!(!s.phase.adversary_alive());
        assert!(s.phase.exit_unlocked());
        assert_eq!(s.phase.outcome(), Outcome::InProgress);

        // A dead Minotaur stays put.
        let pos = (s.minotaur.mover.x, s.minotaur.mover.y);
        for _ in 0..20 {
            step(&mut s, go(Direction::Right));
        }
        assert_eq!((s.minotaur.mover.x, s.minotaur.mover.y), pos);
    }

    #[test]
    fn item_behind_locked_gate_blocks_victory() {
        let mut s = session(
            "#######\n\
             #P  G.#\n\
             #######\n\
             #M    #\n\
             #######",
        );
        for _ in 0..600 {
            let events = step(&mut s, go(Direction::Right));
            assert!(events.is_empty());
        }
        assert!(!s.phase.adversary_fleeing());
        assert_eq!(s.phase.items_remaining(), 1);
        assert_eq!(s.phase.outcome(), Outcome::InProgress);
        assert_eq!(s.player.mover.tile, (3, 1));
        // No path to the player: the Minotaur never leaves its cell.
        assert_eq!(s.minotaur.mover.tile, (1, 3));
    }

    #[test]
    fn slay_then_exit_through_gate() {
        let mut s = session(
            "#####\n\
             GP M#\n\
             #####",
        );
        step(&mut s, go(Direction::Right));
        assert!(s.phase.exit_unlocked());

        let mut won_at = None;
        for t in 0..100 {
            let events = step(&mut s, go(Direction::Left));
            if events.contains(&GameEvent::Victory) {
                won_at = Some(t);
                break;
            }
        }
        assert!(won_at.is_some());
        assert_eq!(s.phase.outcome(), Outcome::Victory);
        assert!(step(&mut s, go(Direction::Left)).is_empty());
    }

    #[test]
    fn hunting_minotaur_eats_tributes() {
        let mut s = session(
            "@ 5,1 1,3\n\
             #########\n\
             #P.  M  #\n\
             #########\n\
             #       #\n\
             #########",
        );
        assert_eq!(s.survivors(), 3);
        let events = step(&mut s, idle());
        assert_eq!(events, vec![GameEvent::TributesConsumed { ids: vec![0] }]);
        assert_eq!(s.tributes.len(), 1);
        assert_eq!(s.tributes[0].id, 1);
        assert_eq!(s.survivors(), 2);
    }

    #[test]
    fn fleeing_minotaur_spares_tributes() {
        let mut s = session(
            "@ 5,1\n\
             #########\n\
             #P   M  #\n\
             #########",
        );
        let events = step(&mut s, idle());
        assert_eq!(events, vec![GameEvent::AdversaryFleeing]);
        assert_eq!(s.tributes.len(), 1);
    }

    #[test]
    fn item_tally_is_monotonic_on_embedded_maze() {
        let m = maze::embedded().unwrap();
        let mut s = Session::new(m, &SpeedConfig::default(), Some(2024)).unwrap();
        let mut inputs = rand_chacha::ChaCha8Rng::seed_from_u64(9);
        let mut last = s.phase.items_remaining();

        for _ in 0..5000 {
            let dir = Direction::CARDINALS[inputs.gen_range(0..4)];
            let input = if inputs.gen_bool(0.1) { go(dir) } else { idle() };
            let events = step(&mut s, input);

            let now = s.phase.items_remaining();
            assert!(now <= last);
            assert_eq!(now, s.items.len());
            let eaten = events.iter().filter(|e| matches!(e, GameEvent::ItemConsumed { .. })).count();
            assert_eq!(last - now, eaten);
            last = now;

            for m in std::iter::once(&s.player.mover)
                .chain(s.tributes.iter().map(|t| &t.mover))
                .chain(std::iter::once(&s.minotaur.mover))
            {
                assert!(s.grid.in_bounds(m.tile.0, m.tile.1));
                let cell = m.cell();
                assert!(s.grid.in_bounds(cell.0, cell.1));
            }
            if s.phase.outcome().is_terminal() { break; }
        }
    }

    #[test]
    fn same_seed_same_run() {
        let run = || {
            let mut s = Session::new(maze::embedded().unwrap(), &SpeedConfig::default(), Some(77)).unwrap();
            for i in 0..400 {
                let dir = if i % 120 < 60 { Direction::Right } else { Direction::Up };
                step(&mut s, go(dir));
            }
            (
                s.tributes.iter().map(|t| (t.id, t.mover.x, t.mover.y)).collect::<Vec<_>>(),
                s.minotaur.mover.x,
                s.minotaur.mover.y,
                s.phase.outcome(),
            )
        };
        assert_eq!(run(), run());
    }
}
