/// Motion and collision primitives — single source of truth.
///
/// Everything in the simulation is an axis-aligned box moving in
/// world pixels. Three predicates cover all gameplay collision:
///
///   1. `overlaps`  — plain AABB intersection (contact damage, pickups)
///   2. `lands_on`  — swept bottom-edge crossing (platform landings)
///   3. `stomps`    — downward overlap with an enemy's vertical extent
///
/// `lands_on` and `stomps` take the mover's vertical velocity because
/// both are defined on the *next* integrated position, not the current
/// one: a fast fall must not tunnel through a thin platform top.

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }
}

/// Axis-aligned bounding box. `pos` is the top-left corner.
#[derive(Clone, Copy, Debug)]
pub struct Aabb {
    pub pos: Vec2,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Aabb { pos: Vec2::new(x, y), w, h }
    }

    #[inline]
    pub fn left(&self) -> f32 { self.pos.x }

    #[inline]
    pub fn right(&self) -> f32 { self.pos.x + self.w }

    #[inline]
    pub fn top(&self) -> f32 { self.pos.y }

    #[inline]
    pub fn bottom(&self) -> f32 { self.pos.y + self.h }

    #[inline]
    pub fn center_x(&self) -> f32 { self.pos.x + self.w / 2.0 }

    #[inline]
    pub fn center_y(&self) -> f32 { self.pos.y + self.h / 2.0 }

    /// Plain intersection test. Touching edges count as overlap.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.right() >= other.left()
            && self.left() <= other.right()
            && self.bottom() >= other.top()
            && self.top() <= other.bottom()
    }

    /// Horizontal extents overlap, ignoring the vertical axis.
    #[inline]
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.right() >= other.left() && self.left() <= other.right()
    }
}

/// Will `mover`, falling with vertical velocity `vel_y`, land on top of
/// `platform` this frame?
///
/// True when the current bottom edge is at or above the platform top,
/// the next integrated bottom edge is at or below it, and the horizontal
/// extents overlap. Upward movers (vel_y < 0) never land.
#[inline]
pub fn lands_on(mover: &Aabb, vel_y: f32, platform: &Aabb) -> bool {
    mover.bottom() <= platform.top()
        && mover.bottom() + vel_y >= platform.top()
        && mover.overlaps_x(platform)
}

/// Is `player` stomping `monster`?
///
/// Requires downward velocity and the player's bottom edge inside the
/// monster's vertical extent, with horizontal overlap. This is checked
/// before plain contact so a kill never also costs a life.
#[inline]
pub fn stomps(player: &Aabb, vel_y: f32, monster: &Aabb) -> bool {
    vel_y > 0.0
        && player.bottom() >= monster.top()
        && player.bottom() <= monster.bottom()
        && player.overlaps_x(monster)
}
