/// Entry point and game loop.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use rand::rngs::ThreadRng;
use tracing::{error, info, warn};

use config::GameConfig;
use domain::entity::FrameInput;
use sim::event::GameEvent;
use sim::maze;
use sim::session::{Session, SessionError};
use sim::step;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::{self, Sfx, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    if let Err(e) = logging::init_logger(&config.log) {
        eprintln!("Logging disabled: {e}");
    }
    for w in &config.warnings {
        warn!("{w}");
    }

    // Validate everything before touching the terminal.
    let mut session = match new_session(&config) {
        Ok(s) => s,
        Err(e) => {
            error!("could not start: {e}");
            eprintln!("Could not start: {e}");
            std::process::exit(1);
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();
    play_start(sound.as_ref());
    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("game loop failed: {e}");
        eprintln!("Game error: {e}");
    }

    info!(score = session.phase.score(), outcome = ?session.phase.outcome(), "quit");
    println!();
    println!("Thanks for playing Minotaur's Labyrinth!");
    println!("Survivors: {}   Score: {}", session.survivors(), session.phase.score());
}

/// Maze and session from config. Rebuilt on every restart, so a fresh
/// layout is re-read from disk and the seed re-drawn if not pinned.
fn new_session(config: &GameConfig) -> Result<Session, SessionError> {
    let maze = maze::load(config.session.maze_file.as_deref())?;
    Session::new(maze, &config.speed, config.session.seed)
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.enable_key_release();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut sfx_rng = rand::thread_rng();

    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        if kb.quit_pressed() || gp.quit_pressed() {
            break;
        }
        if kb.restart_pressed() || gp.restart_pressed() {
            info!(tick = session.tick, "restart requested");
            *session = new_session(config)?;
            renderer.invalidate();
            play_start(sound);
            last_tick = Instant::now();
        }

        if last_tick.elapsed() >= tick_rate {
            let input = FrameInput {
                movement: kb.movement().or_else(|| gp.movement()),
            };
            let events = step::step(session, input);
            play_events(sound, &events, &mut sfx_rng);
            last_tick = Instant::now();
        }

        renderer.render(session)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn play_start(sound: Option<&SoundEngine>) {
    if let Some(engine) = sound {
        engine.play(Sfx::Start);
    }
}

fn play_events(sound: Option<&SoundEngine>, events: &[GameEvent], rng: &mut ThreadRng) {
    let Some(engine) = sound else { return };
    for sfx in sound::effects_for(events, rng) {
        engine.play(sfx);
    }
}
