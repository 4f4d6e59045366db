/// Gamepad input tracker using gilrs.
///
/// Button mapping comes from the `[gamepad]` section of config.toml.
/// Default mapping:
///   D-pad / Left Stick    →  Movement
///   Start                 →  Restart
///   Select                →  Quit
///
/// Built without the `gamepad` feature this is an always-disconnected stub
/// with the same API.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
use tracing::{info, warn};

use crate::config::GamepadConfig;
use crate::domain::entity::Direction;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers, as named in config.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

struct ActionMap {
    restart: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            restart: vec![Btn::Start],
            quit: vec![Btn::Select],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],

    /// D-pad held state, indexed Left, Right, Up, Down.
    dpad: [bool; 4],
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,
    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                warn!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        if connected {
            info!("gamepad connected");
        }

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: [false; 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Apply the configured mapping. Unknown names are skipped; a list with
    /// no usable names keeps the default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names
                .iter()
                .filter_map(|s| {
                    let btn = Btn::from_name(s);
                    if btn.is_none() {
                        warn!(button = %s, "unknown gamepad button in config");
                    }
                    btn
                })
                .collect()
        }
        let restart = parse_list(&cfg.restart);
        if !restart.is_empty() { self.action_map.restart = restart; }
        let quit = parse_list(&cfg.quit);
        if !quit.is_empty() { self.action_map.quit = quit; }
    }

    pub fn update(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        let dpad_idx = match gilrs_btn {
            Button::DPadLeft => Some(0),
            Button::DPadRight => Some(1),
            Button::DPadUp => Some(2),
            Button::DPadDown => Some(3),
            _ => None,
        };
        if let Some(i) = dpad_idx {
            self.dpad[i] = held;
            return;
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            let state = &mut self.buttons[btn as usize];
            if held && !state.held {
                state.just_pressed = true;
            }
            state.held = held;
        }
    }

    // ── Action queries ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    pub fn restart_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.restart)
    }

    pub fn quit_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.quit)
    }

    /// Held direction from the d-pad or the stick, same priority as the
    /// keyboard: Left > Right > Up > Down.
    pub fn movement(&self) -> Option<Direction> {
        let held = [
            self.dpad[0] || self.stick_x < -STICK_DEADZONE,
            self.dpad[1] || self.stick_x > STICK_DEADZONE,
            self.dpad[2] || self.stick_y > STICK_DEADZONE,
            self.dpad[3] || self.stick_y < -STICK_DEADZONE,
        ];
        [Direction::Left, Direction::Right, Direction::Up, Direction::Down]
            .into_iter()
            .zip(held)
            .find(|&(_, h)| h)
            .map(|(d, _)| d)
    }

    // ── Internal ──

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dpad = [false; 4];
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names_parse() {
        assert_eq!(Btn::from_name("start"), Some(Btn::Start));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn stick_follows_keyboard_priority() {
        let mut pad = GamepadState::new();
        pad.release_all();
        assert_eq!(pad.movement(), None);
        pad.stick_y = 0.9;
        assert_eq!(pad.movement(), Some(Direction::Up));
        pad.stick_x = 0.9;
        assert_eq!(pad.movement(), Some(Direction::Right));
        pad.dpad[0] = true;
        assert_eq!(pad.movement(), Some(Direction::Left));
        pad.stick_x = 0.1;
        pad.stick_y = -0.1;
        pad.dpad[0] = false;
        assert_eq!(pad.movement(), None);
    }

    #[test]
    fn config_remaps_actions() {
        let mut pad = GamepadState::new();
        pad.load_button_config(&GamepadConfig {
            restart: vec!["A".into(), "bogus".into()],
            quit: vec!["nothing".into()],
        });
        assert_eq!(pad.action_map.restart, vec![Btn::A]);
        assert_eq!(pad.action_map.quit, vec![Btn::Select]);

        pad.buttons[Btn::A as usize].just_pressed = true;
        assert!(pad.restart_pressed());
        assert!(!pad.quit_pressed());
    }
}
