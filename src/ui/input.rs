/// Keyboard state tracker.
///
/// Movement is level-triggered: the player keeps asking for a direction
/// while its key is held. Restart and quit are edge-triggered so a held
/// key doesn't restart every frame.
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::Direction;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Checked in this order; the first held direction wins.
const MOVE_KEYS: [(Direction, [KeyCode; 2]); 4] = [
    (Direction::Left, [KeyCode::Left, KeyCode::Char('a')]),
    (Direction::Right, [KeyCode::Right, KeyCode::Char('d')]),
    (Direction::Up, [KeyCode::Up, KeyCode::Char('w')]),
    (Direction::Down, [KeyCode::Down, KeyCode::Char('s')]),
];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went from released to held during the last drain.
    fresh_presses: Vec<KeyCode>,
    raw_events: Vec<KeyEvent>,
    /// Only true once keyboard enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events. Call once per frame, before the tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            let Ok(Event::Key(key)) = event::read() else { continue };
            self.raw_events.push(key);
            self.apply(key, Instant::now());
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn apply(&mut self, key: KeyEvent, now: Instant) {
        let code = normalize(key.code);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&code);
            }
            KeyEventKind::Release => {}
            _ => {
                if !self.is_held(code) {
                    self.fresh_presses.push(code);
                }
                self.last_active.insert(code, now);
            }
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Held direction, Left > Right > Up > Down when several are down.
    pub fn movement(&self) -> Option<Direction> {
        MOVE_KEYS
            .iter()
            .find(|(_, keys)| keys.iter().any(|&k| self.is_held(k)))
            .map(|&(dir, _)| dir)
    }

    pub fn restart_pressed(&self) -> bool {
        self.was_pressed(KeyCode::Char('r'))
    }

    pub fn quit_pressed(&self) -> bool {
        self.was_pressed(KeyCode::Char('q')) || self.was_pressed(KeyCode::Esc) || self.ctrl_c_pressed()
    }

    fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }
}

/// Fold letter case so Shift or Caps Lock doesn't change bindings.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut InputState, code: KeyCode) {
        input.apply(KeyEvent::new(code, KeyModifiers::NONE), Instant::now());
    }

    #[test]
    fn movement_priority() {
        let mut input = InputState::new();
        assert_eq!(input.movement(), None);
        press(&mut input, KeyCode::Down);
        assert_eq!(input.movement(), Some(Direction::Down));
        press(&mut input, KeyCode::Up);
        assert_eq!(input.movement(), Some(Direction::Up));
        press(&mut input, KeyCode::Char('D'));
        assert_eq!(input.movement(), Some(Direction::Right));
        press(&mut input, KeyCode::Left);
        assert_eq!(input.movement(), Some(Direction::Left));
    }

    #[test]
    fn restart_is_edge_triggered() {
        let mut input = InputState::new();
        press(&mut input, KeyCode::Char('R'));
        assert!(input.restart_pressed());
        input.fresh_presses.clear();
        press(&mut input, KeyCode::Char('r'));
        assert!(!input.restart_pressed());
    }

    #[test]
    fn release_honored_only_when_enabled() {
        let mut input = InputState::new();
        press(&mut input, KeyCode::Left);
        let release = KeyEvent::new_with_kind(KeyCode::Left, KeyModifiers::NONE, KeyEventKind::Release);
        input.apply(release, Instant::now());
        assert!(input.is_held(KeyCode::Left));

        input.honor_release = true;
        input.apply(release, Instant::now());
        assert!(!input.is_held(KeyCode::Left));
    }
}
