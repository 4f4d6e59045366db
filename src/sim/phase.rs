/// Session-wide phase flags and their one-way transitions.
///
/// ```text
///   Hunting ──(items = 0)──▶ Fleeing ──(player catches it)──▶ Defeated
///      │                        │                               │
///      └──(caught by it)──▶ Defeat (terminal)     exit unlocked │
///                                                               ▼
///                                         (player reaches a gate) Victory
/// ```
///
/// Every transition method returns `true` only on the call that actually
/// flips state, so callers emit exactly one signal per transition.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Outcome {
    #[default]
    InProgress,
    Defeat,
    Victory,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        self != Outcome::InProgress
    }
}

/// How the adversary should look.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AdversaryState {
    Normal,
    Fleeing,
    Defeated,
}

pub const POINTS_PER_ITEM: u32 = 10;

#[derive(Clone, Debug)]
pub struct PhaseState {
    items_remaining: usize,
    adversary_alive: bool,
    adversary_fleeing: bool,
    exit_unlocked: bool,
    player_alive: bool,
    outcome: Outcome,
    score: u32,
}

impl PhaseState {
    pub fn new(items: usize) -> Self {
        PhaseState {
            items_remaining: items,
            adversary_alive: true,
            adversary_fleeing: false,
            exit_unlocked: false,
            player_alive: true,
            outcome: Outcome::InProgress,
            score: 0,
        }
    }

    // ── Queries ──

    pub fn items_remaining(&self) -> usize { self.items_remaining }
    pub fn adversary_alive(&self) -> bool { self.adversary_alive }
    pub fn adversary_fleeing(&self) -> bool { self.adversary_fleeing }
    pub fn exit_unlocked(&self) -> bool { self.exit_unlocked }
    pub fn player_alive(&self) -> bool { self.player_alive }
    pub fn outcome(&self) -> Outcome { self.outcome }
    pub fn score(&self) -> u32 { self.score }

    /// Hunting: alive and not yet fleeing.
    pub fn hunting(&self) -> bool {
        self.adversary_alive && !self.adversary_fleeing
    }

    pub fn adversary_state(&self) -> AdversaryState {
        if !self.adversary_alive {
            AdversaryState::Defeated
        } else if self.adversary_fleeing {
            AdversaryState::Fleeing
        } else {
            AdversaryState::Normal
        }
    }

    // ── Transitions ──

    /// One item collected. The tally never goes below zero.
    pub fn consume_item(&mut self) -> bool {
        if self.items_remaining == 0 {
            return false;
        }
        self.items_remaining -= 1;
        self.score += POINTS_PER_ITEM;
        true
    }

    /// Hunting → Fleeing once the maze is cleared.
    pub fn begin_flee(&mut self) -> bool {
        if !self.hunting() {
            return false;
        }
        self.adversary_fleeing = true;
        true
    }

    /// The fleeing adversary is caught: it dies and the exit unlocks.
    pub fn defeat_adversary(&mut self) -> bool {
        if !self.adversary_alive || !self.adversary_fleeing {
            return false;
        }
        self.adversary_alive = false;
        self.exit_unlocked = true;
        true
    }

    pub fn kill_player(&mut self) -> bool {
        if !self.player_alive || self.outcome.is_terminal() {
            return false;
        }
        self.player_alive = false;
        self.outcome = Outcome::Defeat;
        true
    }

    pub fn escape(&mut self) -> bool {
        if !self.exit_unlocked || !self.player_alive || self.outcome.is_terminal() {
            return false;
        }
        self.outcome = Outcome::Victory;
        true
    }

    /// Test hook: pretend the maze was cleared without visiting the items.
    #[cfg(test)]
    pub fn clear_items(&mut self) {
        self.items_remaining = 0;
    }
}
