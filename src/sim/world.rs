/// WorldState: the complete snapshot of a running game session.
///
/// All mutable session state lives here — scores, timers, entity arrays —
/// and is only ever mutated by the per-frame step function and the level
/// builder. There are no ambient globals.
///
/// ## Coordinates
///
/// The simulation runs in a fixed 1200×800 world-pixel viewport. Camera
/// scroll is expressed by translating every entity leftward/rightward
/// rather than moving a camera rectangle, so the player's x stays inside
/// the visual band [100, 500] (see `sim::step`). `scroll_offset`
/// accumulates the total translation and never goes negative.

use crate::config::TuningConfig;
use crate::domain::entity::{
    Flagpole, Monster, ParallaxLayer, Particle, Platform, Player, PowerUp,
};

/// Viewport dimensions in world pixels.
pub const VIEW_W: f32 = 1200.0;
pub const VIEW_H: f32 = 800.0;

/// Top of the ground platforms.
pub const GROUND_Y: f32 = VIEW_H - 80.0;

/// Horizontal band the player is visually clamped to. At a band edge the
/// world scrolls instead of the player moving.
pub const SCROLL_BAND_MIN: f32 = 100.0;
pub const SCROLL_BAND_MAX: f32 = 500.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    Win,
    GameOver,
}

pub struct WorldState {
    // ── Entities ──
    pub player: Player,
    pub platforms: Vec<Platform>,
    pub monsters: Vec<Monster>,
    pub powerups: Vec<PowerUp>,
    pub flagpole: Flagpole,
    pub layers: Vec<ParallaxLayer>,
    pub particles: Vec<Particle>,

    // ── Session ──
    pub phase: Phase,
    pub score: u64,
    pub lives: u32,
    pub level: u32, // 1-based level index
    pub tick: u64,

    // ── Combo / multiplier ──
    pub combo: u32,
    pub combo_timer: u32, // frames until the combo chain breaks
    pub multiplier: u64,  // 1 normally, 2 under double-points
    pub double_points_timer: u32,

    // ── Power-up boost ──
    /// Shared countdown for the speed/jump boost. Reverts both to base
    /// on expiry. Shield invincibility has its own timer on the player.
    pub boost_timer: u32,

    // ── Camera ──
    pub scroll_offset: f32,

    // ── Scheduled level advance ──
    /// Set when the flagpole is reached; counts down during Win and then
    /// loads the next level. Cleared by any restart so a stale advance
    /// can never fire into a fresh session.
    pub advance_timer: Option<u32>,

    // ── Tuning ──
    pub tuning: TuningConfig,
}

impl WorldState {
    pub fn new(tuning: TuningConfig) -> Self {
        let lives = tuning.starting_lives;
        WorldState {
            player: Player::new(&tuning),
            platforms: vec![],
            monsters: vec![],
            powerups: vec![],
            flagpole: Flagpole::new(0.0, GROUND_Y),
            layers: vec![],
            particles: vec![],
            phase: Phase::Title,
            score: 0,
            lives,
            level: 1,
            tick: 0,
            combo: 0,
            combo_timer: 0,
            multiplier: 1,
            double_points_timer: 0,
            boost_timer: 0,
            scroll_offset: 0.0,
            advance_timer: None,
            tuning,
        }
    }

    /// Monsters still participating in collision checks.
    pub fn live_monsters(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.iter().filter(|m| !m.killed)
    }
}
