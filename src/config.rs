/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub arena: ArenaConfig,
    pub gamepad: GamepadConfig,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub particles: bool,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    /// Frame time above which movement compensation kicks in.
    pub lag_threshold_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        ArenaConfig { width: default_width() as f32, height: default_height() as f32 }
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub fire_1: Vec<String>,
    pub fire_2: Vec<String>,
    pub fire_3: Vec<String>,
    pub lightning: Vec<String>,
    pub inventory: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    arena: TomlArena,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_lag_threshold")]
    lag_threshold_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlArena {
    #[serde(default = "default_width")]
    width: u32,
    #[serde(default = "default_height")]
    height: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_fire_1")]
    fire_1: Vec<String>,
    #[serde(default = "default_fire_2")]
    fire_2: Vec<String>,
    #[serde(default = "default_fire_3")]
    fire_3: Vec<String>,
    #[serde(default = "default_lightning")]
    lightning: Vec<String>,
    #[serde(default = "default_inventory")]
    inventory: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_particles")]
    particles: bool,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }
fn default_lag_threshold() -> u64 { 25 } // 1.5x a 60Hz frame
fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }
fn default_particles() -> bool { true }

fn default_fire_1() -> Vec<String> { vec!["X".into()] }
fn default_fire_2() -> Vec<String> { vec!["B".into()] }
fn default_fire_3() -> Vec<String> { vec!["Y".into()] }
fn default_lightning() -> Vec<String> { vec!["R1".into(), "R2".into()] }
fn default_inventory() -> Vec<String> { vec!["L1".into()] }
fn default_confirm() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            lag_threshold_ms: default_lag_threshold(),
        }
    }
}

impl Default for TomlArena {
    fn default() -> Self {
        TomlArena { width: default_width(), height: default_height() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            fire_1: default_fire_1(),
            fire_2: default_fire_2(),
            fire_3: default_fire_3(),
            lightning: default_lightning(),
            inventory: default_inventory(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { seed: None, particles: default_particles() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, CWD, ~/.local/share/keybound, /usr/share/keybound.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        match read_config_text(&candidate_dirs()) {
            Some(text) => Self::parse(&text),
            None => Self::from_toml(TomlConfig::default()),
        }
    }

    /// Parse config text directly. Unknown or malformed input yields defaults.
    pub fn parse(text: &str) -> Self {
        let cfg = match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("config.toml parse error: {e}; using default settings");
                TomlConfig::default()
            }
        };
        Self::from_toml(cfg)
    }

    fn from_toml(toml_cfg: TomlConfig) -> Self {
        // Degenerate arenas cannot hold the player; fall back to defaults.
        let arena = if toml_cfg.arena.width < 200 || toml_cfg.arena.height < 200 {
            warn!(
                "arena {}x{} too small, using default",
                toml_cfg.arena.width, toml_cfg.arena.height
            );
            ArenaConfig::default()
        } else {
            ArenaConfig {
                width: toml_cfg.arena.width as f32,
                height: toml_cfg.arena.height as f32,
            }
        };

        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: toml_cfg.speed.tick_rate_ms.max(1),
                lag_threshold_ms: toml_cfg.speed.lag_threshold_ms,
            },
            arena,
            gamepad: GamepadConfig {
                fire_1: toml_cfg.gamepad.fire_1,
                fire_2: toml_cfg.gamepad.fire_2,
                fire_3: toml_cfg.gamepad.fire_3,
                lightning: toml_cfg.gamepad.lightning,
                inventory: toml_cfg.gamepad.inventory,
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
            },
            seed: toml_cfg.general.seed,
            particles: toml_cfg.general.particles,
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

    // 3. XDG data home (~/.local/share/keybound)
    if let Some(xdg) = xdg_data_home() {
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/keybound)
    let sys = PathBuf::from("/usr/share/keybound");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn xdg_data_home() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".local/share/keybound"))
}

/// Where the log file goes: the XDG data dir when it exists, else CWD.
pub fn log_dir() -> PathBuf {
    xdg_data_home()
        .filter(|d| d.is_dir())
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Text of the first readable config.toml in `search_dirs`.
fn read_config_text(search_dirs: &[PathBuf]) -> Option<String> {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                info!("loaded {}", path.display());
                return Some(text);
            }
            Err(e) => warn!("could not read {}: {e}", path.display()),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = GameConfig::parse("");
        assert_eq!(cfg.speed.tick_rate_ms, 16);
        assert_eq!(cfg.arena, ArenaConfig::default());
        assert_eq!(cfg.seed, None);
        assert!(cfg.particles);
        assert_eq!(cfg.gamepad.fire_1, vec!["X".to_string()]);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let cfg = GameConfig::parse(
            "[general]\nseed = 42\n\n[arena]\nwidth = 1024\n\n[gamepad]\nlightning = [\"L2\"]\n",
        );
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.arena.width, 1024.0);
        assert_eq!(cfg.arena.height, 600.0);
        assert_eq!(cfg.gamepad.lightning, vec!["L2".to_string()]);
        assert_eq!(cfg.gamepad.cancel, vec!["Select".to_string()]);
    }

    #[test]
    fn malformed_config_falls_back() {
        let cfg = GameConfig::parse("[speed\ntick_rate_ms = ");
        assert_eq!(cfg.speed.tick_rate_ms, 16);
    }

    #[test]
    fn tiny_arena_rejected() {
        let cfg = GameConfig::parse("[arena]\nwidth = 50\nheight = 50\n");
        assert_eq!(cfg.arena, ArenaConfig::default());
    }
}
