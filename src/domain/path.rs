/// Minotaur pathfinding: breadth-first search to the nearest goal.
///
/// The search is rerun from scratch at every decision point. Goals move and
/// gates open between calls, and the maze is small enough that a full BFS
/// costs at most one visit per tile.
///
/// Determinism: neighbors expand in the fixed order +x, -x, +y, -y, and the
/// search stops on the first goal *dequeued*. Among goals at equal hop
/// distance the one discovered first wins.

use std::collections::{HashMap, VecDeque};

use super::entity::Direction;
use super::grid::TilePos;

/// First step of a shortest path from `start` to the nearest goal.
///
/// Returns `None` when `start` is itself a goal or no goal is reachable.
/// `start` is expanded regardless of its own passability.
pub fn next_step<F>(start: TilePos, goals: &[TilePos], passable: F) -> Option<Direction>
where
    F: Fn(i32, i32) -> bool,
{
    let mut came_from: HashMap<TilePos, TilePos> = HashMap::with_capacity(256);
    let mut queue: VecDeque<TilePos> = VecDeque::with_capacity(256);
    came_from.insert(start, start);
    queue.push_back(start);

    let mut reached = None;
    while let Some(cur) = queue.pop_front() {
        if goals.contains(&cur) {
            reached = Some(cur);
            break;
        }
        for dir in Direction::CARDINALS {
            let next = dir.step(cur);
            if came_from.contains_key(&next) { continue; }
            if !passable(next.0, next.1) { continue; }
            came_from.insert(next, cur);
            queue.push_back(next);
        }
    }

    let goal = reached?;
    if goal == start {
        return None;
    }

    // Walk parents back until the tile adjacent to start.
    let mut cur = goal;
    loop {
        let parent = came_from[&cur];
        if parent == start { break; }
        cur = parent;
    }
    Some(Direction::from_delta(cur.0 - start.0, cur.1 - start.1))
}

/// Hop count when following `next_step` to the goal, giving up after `limit`.
#[cfg(test)]
pub fn follow<F>(start: TilePos, goals: &[TilePos], passable: F, limit: usize) -> Option<usize>
where
    F: Fn(i32, i32) -> bool,
{
    let mut pos = start;
    for hops in 0..=limit {
        if goals.contains(&pos) {
            return Some(hops);
        }
        pos = next_step(pos, goals, &passable)?.step(pos);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Grid;
    use proptest::prelude::*;

    fn open(grid: &Grid) -> impl Fn(i32, i32) -> bool + '_ {
        move |c, r| grid.is_passable(c, r, false)
    }

    #[test]
    fn start_on_goal_is_none() {
        let g = Grid::from_diagram(&["   "]);
        assert_eq!(next_step((1, 0), &[(1, 0)], open(&g)), None);
    }

    #[test]
    fn unreachable_is_none() {
        let g = Grid::from_diagram(&[" # "]);
        assert_eq!(next_step((0, 0), &[(2, 0)], open(&g)), None);
        assert_eq!(next_step((0, 0), &[], open(&g)), None);
    }

    #[test]
    fn closed_gate_blocks_path() {
        let g = Grid::from_diagram(&[" G "]);
        assert_eq!(next_step((0, 0), &[(2, 0)], |c, r| g.is_passable(c, r, false)), None);
        assert_eq!(
            next_step((0, 0), &[(2, 0)], |c, r| g.is_passable(c, r, true)),
            Some(Direction::Right),
        );
    }

    #[test]
    fn goes_around_walls() {
        let g = Grid::from_diagram(&[
            "     ",
            " ### ",
            "  #  ",
        ]);
        // (1,2) → (4,2): must climb to row 0 first.
        assert_eq!(next_step((1, 2), &[(4, 2)], open(&g)), Some(Direction::Left));
        assert_eq!(follow((1, 2), &[(4, 2)], open(&g), 50), Some(9));
    }

    #[test]
    fn nearest_goal_wins() {
        let g = Grid::from_diagram(&["       "]);
        assert_eq!(next_step((3, 0), &[(0, 0), (5, 0)], open(&g)), Some(Direction::Right));
        assert_eq!(next_step((3, 0), &[(1, 0), (6, 0)], open(&g)), Some(Direction::Left));
    }

    #[test]
    fn tie_broken_by_expansion_order() {
        let g = Grid::from_diagram(&["     "]);
        // Both goals two hops away; +x expands before -x.
        assert_eq!(next_step((2, 0), &[(0, 0), (4, 0)], open(&g)), Some(Direction::Right));
        let v = Grid::from_diagram(&[" ", " ", " "]);
        // +y before -y.
        assert_eq!(next_step((0, 1), &[(0, 0), (0, 2)], open(&v)), Some(Direction::Down));
    }

    #[test]
    fn never_steps_out_of_bounds() {
        let g = Grid::from_diagram(&["  "]);
        assert_eq!(next_step((0, 0), &[(-1, 0)], open(&g)), None);
    }

    fn maze() -> Grid {
        Grid::from_diagram(&[
            "#########",
            "#   #   #",
            "# # # # #",
            "# #   # #",
            "# ##### #",
            "#       #",
            "#########",
        ])
    }

    proptest! {
        #[test]
        fn repeated_steps_match_bfs_distance(sc in 1i32..8, sr in 1i32..6, gc in 1i32..8, gr in 1i32..6) {
            let g = maze();
            prop_assume!(g.is_passable(sc, sr, false) && g.is_passable(gc, gr, false));
            let first = next_step((sc, sr), &[(gc, gr)], open(&g));
            let again = next_step((sc, sr), &[(gc, gr)], open(&g));
            prop_assert_eq!(first, again);

            let hops = follow((sc, sr), &[(gc, gr)], open(&g), 100);
            prop_assert_eq!(hops, Some(bfs_distance(&g, (sc, sr), (gc, gr))));
        }
    }

    /// Independent distance oracle: plain BFS layers.
    fn bfs_distance(g: &Grid, from: TilePos, to: TilePos) -> usize {
        let mut dist: HashMap<TilePos, usize> = HashMap::new();
        let mut q = VecDeque::new();
        dist.insert(from, 0);
        q.push_back(from);
        while let Some(p) = q.pop_front() {
            if p == to { return dist[&p]; }
            for d in Direction::CARDINALS {
                let n = d.step(p);
                if g.is_passable(n.0, n.1, false) && !dist.contains_key(&n) {
                    dist.insert(n, dist[&p] + 1);
                    q.push_back(n);
                }
            }
        }
        usize::MAX
    }
}
