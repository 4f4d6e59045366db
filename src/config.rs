/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Problems are collected as warnings; logging isn't up yet when this runs.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub session: SessionConfig,
    pub log: LogConfig,
    pub gamepad: GamepadConfig,
    /// Non-fatal problems found while loading, reported once logging starts.
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub player: f32,     // px/tick, must divide 24
    pub wanderer: f32,
    pub minotaur: f32,
}

#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    pub seed: Option<u64>,
    pub maze_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: String,
    pub file: PathBuf,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    session: TomlSession,
    #[serde(default)]
    log: TomlLog,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_player_speed")]
    player: f32,
    #[serde(default = "default_wanderer_speed")]
    wanderer: f32,
    #[serde(default = "default_minotaur_speed")]
    minotaur: f32,
}

#[derive(Deserialize, Debug, Default)]
struct TomlSession {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    maze_file: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_level")]
    level: String,
    #[serde(default = "default_log_file")]
    file: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }       // ~60 ticks per second
fn default_player_speed() -> f32 { 4.0 }
fn default_wanderer_speed() -> f32 { 1.5 }
fn default_minotaur_speed() -> f32 { 3.0 }
fn default_log_level() -> String { "info".into() }
fn default_log_file() -> String { "labyrinth.log".into() }
fn default_restart() -> Vec<String> { vec!["Start".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            player: default_player_speed(),
            wanderer: default_wanderer_speed(),
            minotaur: default_minotaur_speed(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            restart: default_restart(),
            quit: default_quit(),
        }
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        TomlSpeed::default().into()
    }
}

impl From<TomlSpeed> for SpeedConfig {
    fn from(t: TomlSpeed) -> Self {
        SpeedConfig {
            tick_rate_ms: t.tick_rate_ms,
            player: t.player,
            wanderer: t.wanderer,
            minotaur: t.minotaur,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = vec![];
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        Self::resolve(toml_cfg, &search_dirs, warnings)
    }

    /// Build a config from TOML text, resolving relative paths against `base`.
    #[cfg(test)]
    pub fn from_toml_str(text: &str, base: &std::path::Path) -> Self {
        let mut warnings = vec![];
        let toml_cfg = parse_toml(text, "config.toml", &mut warnings);
        Self::resolve(toml_cfg, &[base.to_path_buf()], warnings)
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf], mut warnings: Vec<String>) -> Self {
        if toml_cfg.speed.tick_rate_ms == 0 {
            warnings.push("speed.tick_rate_ms = 0 is invalid, using 16".into());
        }
        let mut speed: SpeedConfig = toml_cfg.speed.into();
        if speed.tick_rate_ms == 0 {
            speed.tick_rate_ms = default_tick_rate();
        }

        // Maze file: absolute, or the first candidate dir that has it.
        let maze_file = toml_cfg.session.maze_file.map(|name| {
            let path = PathBuf::from(&name);
            if path.is_absolute() {
                return path;
            }
            search_dirs.iter()
                .map(|d| d.join(&name))
                .find(|p| p.is_file())
                .unwrap_or(path)
        });

        GameConfig {
            speed,
            session: SessionConfig {
                seed: toml_cfg.session.seed,
                maze_file,
            },
            log: LogConfig {
                level: toml_cfg.log.level,
                file: PathBuf::from(toml_cfg.log.file),
            },
            gamepad: GamepadConfig {
                restart: toml_cfg.gamepad.restart,
                quit: toml_cfg.gamepad.quit,
            },
            warnings,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/labyrinth)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/labyrinth");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => return parse_toml(&text, &path.display().to_string(), warnings),
                Err(e) => warnings.push(format!("could not read {}: {e}", path.display())),
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str, origin: &str, warnings: &mut Vec<String>) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warnings.push(format!("{origin} parse error, using default settings: {e}"));
            TomlConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(text: &str) -> GameConfig {
        GameConfig::from_toml_str(text, std::path::Path::new("/nonexistent"))
    }

    #[test]
    fn empty_file_gives_defaults() {
        let c = cfg("");
        assert_eq!(c.speed, SpeedConfig::default());
        assert_eq!(c.speed.tick_rate_ms, 16);
        assert_eq!(c.speed.player, 4.0);
        assert_eq!(c.speed.wanderer, 1.5);
        assert_eq!(c.speed.minotaur, 3.0);
        assert_eq!(c.session.seed, None);
        assert_eq!(c.session.maze_file, None);
        assert_eq!(c.log.level, "info");
        assert_eq!(c.log.file, PathBuf::from("labyrinth.log"));
        assert_eq!(c.gamepad.restart, vec!["Start".to_string()]);
        assert_eq!(c.gamepad.quit, vec!["Select".to_string()]);
        assert!(c.warnings.is_empty());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let c = cfg("[speed]\nplayer = 6.0\n\n[session]\nseed = 42\nmaze_file = \"pit.txt\"\n");
        assert_eq!(c.speed.player, 6.0);
        assert_eq!(c.speed.minotaur, 3.0);
        assert_eq!(c.session.seed, Some(42));
        assert_eq!(c.session.maze_file, Some(PathBuf::from("pit.txt")));
        assert_eq!(c.log.level, "info");
    }

    #[test]
    fn broken_file_falls_back_with_warning() {
        let c = cfg("[speed\nplayer = ");
        assert_eq!(c.speed, SpeedConfig::default());
        assert_eq!(c.warnings.len(), 1);
    }

    #[test]
    fn zero_tick_rate_replaced() {
        let c = cfg("[speed]\ntick_rate_ms = 0\n");
        assert_eq!(c.speed.tick_rate_ms, 16);
        assert_eq!(c.warnings.len(), 1);
    }
}
