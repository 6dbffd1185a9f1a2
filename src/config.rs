/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
///
/// All gameplay tuning lives here: gravity, player speeds, jump impulses,
/// and the frame-counted timers for boosts, invincibility and combos.
/// Defaults reproduce the stock game feel.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tuning: TuningConfig,
}

#[derive(Clone, Debug)]
pub struct TuningConfig {
    pub tick_rate_ms: u64,
    pub gravity: f32,
    pub base_speed: f32,
    pub base_jump: f32,           // jump impulse; negative = upward
    pub boost_speed: f32,
    pub boost_jump: f32,
    pub stomp_bounce: f32,        // vertical velocity set on a successful stomp
    pub kill_value: u64,          // base score per stomp, before multipliers
    pub starting_lives: u32,
    pub invincible_ticks: u32,    // post-damage invincibility
    pub shield_ticks: u32,        // shield power-up invincibility
    pub boost_ticks: u32,         // shared speed/jump boost countdown
    pub double_points_ticks: u32,
    pub combo_window_ticks: u32,  // combo resets when this expires between stomps
    pub advance_delay_ticks: u32, // delay between flagpole touch and next level
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    tuning: TomlTuning,
}

#[derive(Deserialize, Debug)]
struct TomlTuning {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_base_speed")]
    base_speed: f32,
    #[serde(default = "default_base_jump")]
    base_jump: f32,
    #[serde(default = "default_boost_speed")]
    boost_speed: f32,
    #[serde(default = "default_boost_jump")]
    boost_jump: f32,
    #[serde(default = "default_stomp_bounce")]
    stomp_bounce: f32,
    #[serde(default = "default_kill_value")]
    kill_value: u64,
    #[serde(default = "default_starting_lives")]
    starting_lives: u32,
    #[serde(default = "default_invincible")]
    invincible_ticks: u32,
    #[serde(default = "default_shield")]
    shield_ticks: u32,
    #[serde(default = "default_boost")]
    boost_ticks: u32,
    #[serde(default = "default_double_points")]
    double_points_ticks: u32,
    #[serde(default = "default_combo_window")]
    combo_window_ticks: u32,
    #[serde(default = "default_advance_delay")]
    advance_delay_ticks: u32,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }          // ~60 simulation frames per second
fn default_gravity() -> f32 { 1.5 }
fn default_base_speed() -> f32 { 7.0 }
fn default_base_jump() -> f32 { -25.0 }
fn default_boost_speed() -> f32 { 14.0 }
fn default_boost_jump() -> f32 { -32.0 }
fn default_stomp_bounce() -> f32 { -20.0 }
fn default_kill_value() -> u64 { 500 }
fn default_starting_lives() -> u32 { 3 }
fn default_invincible() -> u32 { 100 }
fn default_shield() -> u32 { 600 }            // ~10s of shield at 60fps
fn default_boost() -> u32 { 420 }             // ~7s speed/jump boost
fn default_double_points() -> u32 { 600 }
fn default_combo_window() -> u32 { 180 }      // ~3s between stomps to keep a combo
fn default_advance_delay() -> u32 { 120 }     // ~2s on the WIN screen before next level

impl Default for TomlTuning {
    fn default() -> Self {
        TomlTuning {
            tick_rate_ms: default_tick_rate(),
            gravity: default_gravity(),
            base_speed: default_base_speed(),
            base_jump: default_base_jump(),
            boost_speed: default_boost_speed(),
            boost_jump: default_boost_jump(),
            stomp_bounce: default_stomp_bounce(),
            kill_value: default_kill_value(),
            starting_lives: default_starting_lives(),
            invincible_ticks: default_invincible(),
            shield_ticks: default_shield(),
            boost_ticks: default_boost(),
            double_points_ticks: default_double_points(),
            combo_window_ticks: default_combo_window(),
            advance_delay_ticks: default_advance_delay(),
        }
    }
}

impl From<TomlTuning> for TuningConfig {
    fn from(t: TomlTuning) -> Self {
        TuningConfig {
            tick_rate_ms: t.tick_rate_ms,
            gravity: t.gravity,
            base_speed: t.base_speed,
            base_jump: t.base_jump,
            boost_speed: t.boost_speed,
            boost_jump: t.boost_jump,
            stomp_bounce: t.stomp_bounce,
            kill_value: t.kill_value,
            starting_lives: t.starting_lives,
            invincible_ticks: t.invincible_ticks,
            shield_ticks: t.shield_ticks,
            boost_ticks: t.boost_ticks,
            double_points_ticks: t.double_points_ticks,
            combo_window_ticks: t.combo_window_ticks,
            advance_delay_ticks: t.advance_delay_ticks,
        }
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        TomlTuning::default().into()
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());
        GameConfig { tuning: toml_cfg.tuning.into() }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
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

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuning_defaults_match_stock_feel() {
        let t = TuningConfig::default();
        assert_eq!(t.gravity, 1.5);
        assert_eq!(t.base_speed, 7.0);
        assert_eq!(t.base_jump, -25.0);
        assert_eq!(t.boost_speed, 14.0);
        assert_eq!(t.stomp_bounce, -20.0);
        assert_eq!(t.kill_value, 500);
        assert_eq!(t.starting_lives, 3);
    }

    #[test]
    fn partial_toml_fills_missing_keys() {
        let cfg: TomlConfig = toml::from_str("[tuning]\ngravity = 2.0\n").expect("parse");
        assert_eq!(cfg.tuning.gravity, 2.0);
        assert_eq!(cfg.tuning.base_speed, default_base_speed());
        assert_eq!(cfg.tuning.boost_ticks, default_boost());
    }
}
