/// Entities: Player, Monster, Platform, PowerUp, Flagpole, ParallaxLayer,
/// Particle. Every entity owns its position/size in world pixels and
/// exposes its collision box via `aabb()`.
///
/// Particles are a tagged shape variant (Dot / Heart) with per-kind
/// rendering; there is no entity hierarchy.

use crate::config::TuningConfig;
use crate::domain::physics::{Aabb, Vec2};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

/// Per-frame input: movement is continuous (held keys), jump is
/// edge-triggered (fresh press, latched until the next simulation tick).
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

// ── Player ──

pub const PLAYER_WIDTH: f32 = 66.0;
pub const PLAYER_HEIGHT: f32 = 150.0;
pub const PLAYER_SPAWN: (f32, f32) = (100.0, 100.0);

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub width: f32,
    pub height: f32,
    pub base_speed: f32,
    pub speed: f32,        // current, may be boosted
    pub base_jump: f32,
    pub jump_power: f32,   // current, may be boosted; negative = upward
    pub frames: u32,       // animation frame counter
    pub facing: Facing,
    pub invincible_timer: u32, // frames of invincibility remaining (damage or shield)
}

impl Player {
    pub fn new(tuning: &TuningConfig) -> Self {
        Player {
            pos: Vec2::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1),
            vel: Vec2::ZERO,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            base_speed: tuning.base_speed,
            speed: tuning.base_speed,
            base_jump: tuning.base_jump,
            jump_power: tuning.base_jump,
            frames: 0,
            facing: Facing::Right,
            invincible_timer: 0,
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb { pos: self.pos, w: self.width, h: self.height }
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.invincible_timer > 0
    }

    /// Grounded enough to jump. Vertical velocity is zeroed on landing
    /// and stays zero until gravity or a jump kicks in.
    #[inline]
    pub fn is_standing(&self) -> bool {
        self.vel.y == 0.0
    }
}

// ── Monster ──

#[derive(Clone, Debug)]
pub struct Monster {
    pub pos: Vec2,
    pub start_x: f32, // patrol anchor; shifts with camera scroll
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub patrol_distance: f32, // half-distance each side of start_x
    pub direction: f32,       // 1.0 or -1.0
    pub health: u32,
    pub max_health: u32,
    pub killed: bool,
}

impl Monster {
    pub fn new(x: f32, y: f32, width: f32, height: f32, speed: f32, patrol: f32, health: u32) -> Self {
        Monster {
            pos: Vec2::new(x, y),
            start_x: x,
            width,
            height,
            speed,
            patrol_distance: patrol,
            direction: 1.0,
            health,
            max_health: health,
            killed: false,
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb { pos: self.pos, w: self.width, h: self.height }
    }

    /// Walk back and forth around `start_x`, turning at the patrol bounds.
    pub fn patrol(&mut self) {
        if self.killed {
            return;
        }
        self.pos.x += self.speed * self.direction;
        if self.pos.x > self.start_x + self.patrol_distance {
            self.direction = -1.0;
        } else if self.pos.x < self.start_x - self.patrol_distance {
            self.direction = 1.0;
        }
    }
}

// ── Platform ──

/// Static ground/floating platform. Never moves except under camera scroll.
#[derive(Clone, Debug)]
pub struct Platform {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Platform {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Platform { pos: Vec2::new(x, y), width, height }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb { pos: self.pos, w: self.width, h: self.height }
    }
}

// ── PowerUp ──

pub const POWERUP_SIZE: f32 = 45.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PowerKind {
    Speed,
    Jump,
    Shield,
    DoublePoints,
    ExtraLife,
}

#[derive(Clone, Debug)]
pub struct PowerUp {
    pub pos: Vec2,
    pub kind: PowerKind,
    pub collected: bool, // one-shot; effect never re-fires once set
}

impl PowerUp {
    pub fn new(x: f32, y: f32, kind: PowerKind) -> Self {
        PowerUp { pos: Vec2::new(x, y), kind, collected: false }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb { pos: self.pos, w: POWERUP_SIZE, h: POWERUP_SIZE }
    }
}

// ── Flagpole ──

pub const FLAGPOLE_WIDTH: f32 = 100.0;
pub const FLAGPOLE_HEIGHT: f32 = 400.0;

/// Goal marker. Reaching its x-coordinate ends the level.
#[derive(Clone, Debug)]
pub struct Flagpole {
    pub pos: Vec2,
}

impl Flagpole {
    /// `y` is derived: the pole stands on the ground line.
    pub fn new(x: f32, ground_y: f32) -> Self {
        Flagpole { pos: Vec2::new(x, ground_y - FLAGPOLE_HEIGHT) }
    }
}

// ── Parallax layers ──

/// Which background texture the renderer paints for a layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LayerKind {
    Sky,
    Hills,
}

/// A background layer scrolling at a fraction of the camera speed.
/// `speed` must be in (0, 1]: 1.0 scrolls with the foreground.
#[derive(Clone, Debug)]
pub struct ParallaxLayer {
    pub x: f32,
    pub kind: LayerKind,
    pub speed: f32,
}

// ── Particles ──

/// Opacity lost per frame; a particle lives 50 frames.
pub const PARTICLE_FADE: f32 = 0.02;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ParticleShape {
    Dot,
    Heart,
}

/// Short-lived decorative point. Decays linearly and is dropped at zero
/// opacity. Not gameplay-affecting.
#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: (u8, u8, u8),
    pub alpha: f32,
    pub shape: ParticleShape,
}

impl Particle {
    /// Advance one frame. Returns true when fully faded out.
    pub fn tick(&mut self) -> bool {
        self.pos.x += self.vel.x;
        self.pos.y += self.vel.y;
        self.alpha -= PARTICLE_FADE;
        self.alpha <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> TuningConfig {
        TuningConfig::default()
    }

    #[test]
    fn player_spawns_with_base_stats() {
        let p = Player::new(&tuning());
        assert_eq!(p.speed, p.base_speed);
        assert_eq!(p.jump_power, p.base_jump);
        assert!(!p.is_invincible());
        assert!(p.is_standing());
    }

    #[test]
    fn monster_patrol_turns_at_bounds() {
        let mut m = Monster::new(700.0, 650.0, 70.0, 70.0, 100.0, 250.0, 1);
        assert_eq!(m.direction, 1.0);
        // Walk right past the patrol bound
        for _ in 0..4 {
            m.patrol();
        }
        assert_eq!(m.direction, -1.0);
        // Walk back left past the other bound
        for _ in 0..8 {
            m.patrol();
        }
        assert_eq!(m.direction, 1.0);
    }

    #[test]
    fn killed_monster_stops_moving() {
        let mut m = Monster::new(700.0, 650.0, 70.0, 70.0, 2.5, 250.0, 1);
        m.killed = true;
        let x = m.pos.x;
        m.patrol();
        assert_eq!(m.pos.x, x);
    }

    #[test]
    fn particle_fades_out_linearly() {
        let mut p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(1.0, -1.0),
            size: 3.0,
            color: (255, 160, 0),
            alpha: 1.0,
            shape: ParticleShape::Dot,
        };
        let mut frames = 0;
        while !p.tick() {
            frames += 1;
            assert!(frames < 1000, "particle never expired");
        }
        // 1.0 / 0.02 = 50 frames of life
        assert_eq!(frames, 49);
        assert_eq!(p.pos.x, 50.0);
    }

    #[test]
    fn flagpole_stands_on_ground() {
        let f = Flagpole::new(3200.0, 720.0);
        assert_eq!(f.pos.y, 720.0 - FLAGPOLE_HEIGHT);
    }
}
