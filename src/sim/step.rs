/// The step function: advances the world by one frame.
///
/// Processing order (data flows one way per frame):
///   1. Input → velocity assignment (and camera scroll at the band edge)
///   2. Monster patrol
///   3. Particle decay
///   4. Player integration + gravity (out-of-world ⇒ full level reset)
///   5. Platform landings
///   6. Monster contacts (stomp checked before contact damage)
///   7. Power-up pickups
///   8. Timer countdowns (boost, double-points, combo, invincibility)
///   9. Goal check
///  10. Animation frame counter
///
/// Platform landings run before monster contacts so a player standing on
/// the ground has zero vertical velocity by the time stomps are tested —
/// walking into a monster is damage, not a free stomp.

use rand::Rng;

use crate::domain::entity::{
    Facing, FrameInput, Particle, ParticleShape, PowerKind,
};
use crate::domain::physics::{self, Vec2};
use crate::sim::event::GameEvent;
use crate::sim::level;
use crate::sim::world::{Phase, WorldState, SCROLL_BAND_MAX, SCROLL_BAND_MIN, VIEW_H};

/// Particles per burst.
const BURST_COUNT: usize = 15;

pub const COLOR_STOMP: (u8, u8, u8) = (255, 160, 0);   // orange
pub const COLOR_HURT: (u8, u8, u8) = (255, 68, 68);    // red
pub const COLOR_PICKUP: (u8, u8, u8) = (0, 255, 255);  // cyan
pub const COLOR_HEART: (u8, u8, u8) = (255, 105, 180); // pink

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    if world.phase != Phase::Playing {
        return vec![];
    }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    resolve_input(world, &input, &mut events);
    resolve_monster_patrol(world);
    resolve_particles(world);
    if resolve_player_motion(world, &mut events) {
        return events; // fell out of the world; level was rebuilt
    }
    resolve_platform_landings(world);
    resolve_monster_contacts(world, &mut events);
    if world.phase != Phase::Playing {
        return events; // contact damage ended the game
    }
    resolve_powerups(world, &mut events);
    resolve_timers(world);
    resolve_win(world, &mut events);
    resolve_animation(world, &input);

    events
}

// ══════════════════════════════════════════════════════════════
// Input → velocity, camera scroll
// ══════════════════════════════════════════════════════════════

fn resolve_input(world: &mut WorldState, input: &FrameInput, events: &mut Vec<GameEvent>) {
    // Jump: edge-triggered, only from the ground
    if input.jump && world.player.is_standing() {
        world.player.vel.y = world.player.jump_power;
        events.push(GameEvent::Jumped);
    }

    if input.left {
        world.player.facing = Facing::Left;
    }
    if input.right {
        world.player.facing = Facing::Right;
    }

    // Horizontal: inside the band [100, 500] the player moves; at a band
    // edge the world translates instead.
    world.player.vel.x = 0.0;
    let speed = world.player.speed;

    if input.right && world.player.pos.x < SCROLL_BAND_MAX {
        world.player.vel.x = speed;
    } else if input.left && world.player.pos.x > SCROLL_BAND_MIN {
        world.player.vel.x = -speed;
    } else if input.right {
        scroll_world(world, speed);
    } else if input.left && world.scroll_offset > 0.0 {
        // Clamp so the offset can never go negative; at 0 this is a no-op.
        let shift = speed.min(world.scroll_offset);
        scroll_world(world, -shift);
    }
}

/// Translate the world by `shift` world pixels (positive = camera moving
/// right, entities moving left). Parallax layers move at their own
/// fraction of the shift.
fn scroll_world(world: &mut WorldState, shift: f32) {
    world.scroll_offset += shift;
    for p in &mut world.platforms {
        p.pos.x -= shift;
    }
    for m in &mut world.monsters {
        m.pos.x -= shift;
        m.start_x -= shift;
    }
    for p in &mut world.powerups {
        p.pos.x -= shift;
    }
    world.flagpole.pos.x -= shift;
    for layer in &mut world.layers {
        layer.x -= shift * layer.speed;
    }
}

// ══════════════════════════════════════════════════════════════
// Monsters & particles
// ══════════════════════════════════════════════════════════════

fn resolve_monster_patrol(world: &mut WorldState) {
    for m in &mut world.monsters {
        m.patrol();
    }
}

fn resolve_particles(world: &mut WorldState) {
    world.particles.retain_mut(|p| !p.tick());
}

// ══════════════════════════════════════════════════════════════
// Player integration + gravity
// ══════════════════════════════════════════════════════════════

/// Integrate the player and apply gravity. Returns true if the player
/// fell out of the world and the level was reset.
fn resolve_player_motion(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let p = &mut world.player;
    p.pos.x += p.vel.x;
    p.pos.y += p.vel.y;

    // Gravity, unless the NEXT integrated bottom edge would leave the
    // world — the reset fires before the out-of-bounds position is ever
    // applied, so the player never renders below the floor line.
    if p.pos.y + p.height + p.vel.y <= VIEW_H {
        p.vel.y += world.tuning.gravity;
        false
    } else {
        events.push(GameEvent::FellOutOfWorld);
        let n = world.level;
        level::build_level(world, n); // respawn at level start; no life lost
        true
    }
}

// ══════════════════════════════════════════════════════════════
// Platform landings
// ══════════════════════════════════════════════════════════════

fn resolve_platform_landings(world: &mut WorldState) {
    // Every platform is tested unconditionally; a later match recomputes
    // against the already-snapped state and may override.
    for i in 0..world.platforms.len() {
        let plat = world.platforms[i].aabb();
        let pbox = world.player.aabb();
        if physics::lands_on(&pbox, world.player.vel.y, &plat) {
            world.player.vel.y = 0.0;
            world.player.pos.y = plat.top() - world.player.height;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Monster contacts: stomp takes priority over damage
// ══════════════════════════════════════════════════════════════

fn resolve_monster_contacts(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    for i in 0..world.monsters.len() {
        if world.monsters[i].killed {
            continue;
        }
        let mbox = world.monsters[i].aabb();
        let pbox = world.player.aabb();

        if physics::stomps(&pbox, world.player.vel.y, &mbox) {
            // Stomp and contact damage are mutually exclusive per monster
            // per frame; the kill never also costs a life.
            let m = &mut world.monsters[i];
            m.health = m.health.saturating_sub(1);
            let died = m.health == 0;
            if died {
                m.killed = true;
            }

            world.player.vel.y = world.tuning.stomp_bounce;
            world.combo += 1;
            world.combo_timer = world.tuning.combo_window_ticks;
            let gained = (world.tuning.kill_value as f32
                * world.multiplier as f32
                * (1.0 + world.combo as f32 * 0.5)) as u64;
            world.score += gained;

            spawn_burst(
                &mut world.particles,
                mbox.center_x(),
                mbox.center_y(),
                COLOR_STOMP,
                ParticleShape::Dot,
            );
            events.push(GameEvent::Stomped { combo: world.combo });
            if died {
                events.push(GameEvent::MonsterKilled {
                    x: mbox.center_x(),
                    y: mbox.center_y(),
                });
            }
        } else if pbox.overlaps(&mbox) {
            damage_player(world, events);
            if world.phase != Phase::Playing {
                return;
            }
        }
    }
}

fn damage_player(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.player.is_invincible() {
        return;
    }
    world.lives = world.lives.saturating_sub(1);
    world.player.invincible_timer = world.tuning.invincible_ticks;

    let pbox = world.player.aabb();
    spawn_burst(
        &mut world.particles,
        pbox.center_x(),
        pbox.center_y(),
        COLOR_HURT,
        ParticleShape::Dot,
    );
    events.push(GameEvent::PlayerHurt { lives_left: world.lives });

    if world.lives == 0 {
        world.phase = Phase::GameOver;
        events.push(GameEvent::GameOver);
    }
}

// ══════════════════════════════════════════════════════════════
// Power-ups
// ══════════════════════════════════════════════════════════════

fn resolve_powerups(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    for i in 0..world.powerups.len() {
        if world.powerups[i].collected {
            continue;
        }
        if !world.player.aabb().overlaps(&world.powerups[i].aabb()) {
            continue;
        }
        world.powerups[i].collected = true;
        let kind = world.powerups[i].kind;
        let pbox = world.powerups[i].aabb();

        spawn_burst(
            &mut world.particles,
            pbox.center_x(),
            pbox.center_y(),
            COLOR_PICKUP,
            ParticleShape::Dot,
        );

        let t = &world.tuning;
        match kind {
            PowerKind::Speed => {
                world.player.speed = t.boost_speed;
                world.boost_timer = t.boost_ticks;
            }
            PowerKind::Jump => {
                world.player.jump_power = t.boost_jump;
                world.boost_timer = t.boost_ticks;
            }
            PowerKind::Shield => {
                // Shield rides the invincibility timer alone; the shared
                // boost countdown never touches it.
                world.player.invincible_timer = t.shield_ticks;
            }
            PowerKind::DoublePoints => {
                world.multiplier = 2;
                world.double_points_timer = t.double_points_ticks;
            }
            PowerKind::ExtraLife => {
                world.lives += 1;
                spawn_burst(
                    &mut world.particles,
                    pbox.center_x(),
                    pbox.center_y(),
                    COLOR_HEART,
                    ParticleShape::Heart,
                );
                events.push(GameEvent::ExtraLife);
            }
        }
        events.push(GameEvent::PowerUpCollected { kind });
    }
}

// ══════════════════════════════════════════════════════════════
// Timers
// ══════════════════════════════════════════════════════════════

fn resolve_timers(world: &mut WorldState) {
    // Shared speed/jump boost: both revert to base on expiry.
    if world.boost_timer > 0 {
        world.boost_timer -= 1;
        if world.boost_timer == 0 {
            world.player.speed = world.player.base_speed;
            world.player.jump_power = world.player.base_jump;
        }
    }

    if world.double_points_timer > 0 {
        world.double_points_timer -= 1;
        if world.double_points_timer == 0 {
            world.multiplier = 1;
        }
    }

    // Combo chain breaks when the window expires without a stomp.
    if world.combo_timer > 0 {
        world.combo_timer -= 1;
        if world.combo_timer == 0 {
            world.combo = 0;
        }
    }

    if world.player.invincible_timer > 0 {
        world.player.invincible_timer -= 1;
    }
}

// ══════════════════════════════════════════════════════════════
// Goal
// ══════════════════════════════════════════════════════════════

fn resolve_win(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.player.aabb().right() >= world.flagpole.pos.x {
        world.phase = Phase::Win;
        world.advance_timer = Some(world.tuning.advance_delay_ticks);
        events.push(GameEvent::LevelCleared);
    }
}

// ══════════════════════════════════════════════════════════════
// Animation
// ══════════════════════════════════════════════════════════════

fn resolve_animation(world: &mut WorldState, input: &FrameInput) {
    let moving = input.left || input.right;
    let rate = if moving { 6 } else { 12 };
    if world.tick % rate == 0 {
        world.player.frames += 1;
    }
    if world.player.frames > 28 {
        world.player.frames = 0;
    }
}

// ══════════════════════════════════════════════════════════════
// Particle bursts
// ══════════════════════════════════════════════════════════════

pub fn spawn_burst(
    particles: &mut Vec<Particle>,
    x: f32,
    y: f32,
    color: (u8, u8, u8),
    shape: ParticleShape,
) {
    let mut rng = rand::thread_rng();
    for _ in 0..BURST_COUNT {
        particles.push(Particle {
            pos: Vec2::new(x, y),
            vel: Vec2::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0)),
            size: rng.gen_range(1.0..4.0),
            color,
            alpha: 1.0,
            shape,
        });
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TuningConfig;
    use crate::domain::entity::{Monster, Platform, PowerUp};
    use crate::sim::world::GROUND_Y;

    const NO_INPUT: FrameInput = FrameInput { left: false, right: false, jump: false };

    /// A playing world with a single huge ground platform and nothing else.
    fn playing_world() -> WorldState {
        let mut w = WorldState::new(TuningConfig::default());
        level::build_level(&mut w, 1);
        w.monsters.clear();
        w.powerups.clear();
        w.platforms = vec![Platform::new(-10000.0, GROUND_Y, 20000.0, 80.0)];
        w.flagpole.pos.x = 100000.0; // out of reach
        stand_on_ground(&mut w);
        w
    }

    fn stand_on_ground(w: &mut WorldState) {
        w.player.pos = Vec2::new(200.0, GROUND_Y - w.player.height);
        w.player.vel = Vec2::ZERO;
    }

    /// Place the player mid-air falling into a stomp on `monster_x`.
    fn arm_stomp(w: &mut WorldState) {
        w.player.pos = Vec2::new(200.0, 500.0); // bottom 650 = monster top
        w.player.vel = Vec2::new(0.0, 10.0);
    }

    fn stationary_monster(x: f32, health: u32) -> Monster {
        Monster::new(x, GROUND_Y - 70.0, 70.0, 70.0, 0.0, 250.0, health)
    }

    // ── Stomp / damage priority ──

    #[test]
    fn stomp_damages_monster_not_player() {
        let mut w = playing_world();
        w.monsters.push(stationary_monster(200.0, 3));
        arm_stomp(&mut w);
        let lives_before = w.lives;

        let events = step(&mut w, NO_INPUT);

        assert_eq!(w.monsters[0].health, 2);
        assert_eq!(w.lives, lives_before, "stomp must not cost a life");
        assert_eq!(w.player.vel.y, w.tuning.stomp_bounce);
        assert!(matches!(events[0], GameEvent::Stomped { combo: 1 }));
    }

    #[test]
    fn three_stomps_kill_and_chain_combo_scoring() {
        let mut w = playing_world();
        w.monsters.push(stationary_monster(200.0, 3));

        // Hit 1: combo 1 → 500 × 1 × 1.5 = 750
        arm_stomp(&mut w);
        step(&mut w, NO_INPUT);
        assert_eq!(w.combo, 1);
        assert_eq!(w.score, 750);
        assert_eq!(w.monsters[0].health, 2);

        // Hit 2: combo 2 → +500 × 1 × 2.0 = 1000
        arm_stomp(&mut w);
        step(&mut w, NO_INPUT);
        assert_eq!(w.combo, 2);
        assert_eq!(w.score, 1750);
        assert_eq!(w.monsters[0].health, 1);

        // Hit 3: combo 3 → +500 × 1 × 2.5 = 1250, monster dies
        arm_stomp(&mut w);
        let events = step(&mut w, NO_INPUT);
        assert_eq!(w.combo, 3);
        assert_eq!(w.score, 3000);
        assert!(w.monsters[0].killed);
        assert!(events.iter().any(|e| matches!(e, GameEvent::MonsterKilled { .. })));
    }

    #[test]
    fn walking_into_monster_is_damage_not_stomp() {
        let mut w = playing_world();
        w.monsters.push(stationary_monster(200.0, 3));
        stand_on_ground(&mut w); // same x as the monster, grounded

        let events = step(&mut w, NO_INPUT);

        assert_eq!(w.monsters[0].health, 3);
        assert_eq!(w.lives, w.tuning.starting_lives - 1);
        assert!(w.player.is_invincible());
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerHurt { .. })));
    }

    #[test]
    fn last_life_contact_is_game_over() {
        let mut w = playing_world();
        w.lives = 1;
        w.monsters.push(stationary_monster(200.0, 3));
        stand_on_ground(&mut w);

        let events = step(&mut w, NO_INPUT);

        assert_eq!(w.lives, 0);
        assert_eq!(w.phase, Phase::GameOver);
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver)));
    }

    #[test]
    fn invincibility_suppresses_contact_damage() {
        let mut w = playing_world();
        w.monsters.push(stationary_monster(200.0, 3));
        stand_on_ground(&mut w);
        w.player.invincible_timer = 50;

        step(&mut w, NO_INPUT);

        assert_eq!(w.lives, w.tuning.starting_lives);
        // Timer still counts down while overlapping
        assert_eq!(w.player.invincible_timer, 49);
    }

    #[test]
    fn killed_monster_leaves_collision_checks() {
        let mut w = playing_world();
        let mut m = stationary_monster(200.0, 1);
        m.killed = true;
        w.monsters.push(m);
        stand_on_ground(&mut w);

        step(&mut w, NO_INPUT);

        assert_eq!(w.lives, w.tuning.starting_lives);
    }

    // ── Combo window ──

    #[test]
    fn combo_resets_only_when_window_expires() {
        let mut w = playing_world();
        w.combo = 2;
        w.combo_timer = 3;

        step(&mut w, NO_INPUT);
        step(&mut w, NO_INPUT);
        assert_eq!(w.combo, 2, "combo holds while the timer runs");

        step(&mut w, NO_INPUT);
        assert_eq!(w.combo, 0, "combo breaks when the timer hits zero");
    }

    // ── Power-ups ──

    fn give_powerup(w: &mut WorldState, kind: PowerKind) {
        // Centered on the standing player
        let pbox = w.player.aabb();
        w.powerups.push(PowerUp::new(pbox.left(), pbox.top() + 50.0, kind));
    }

    #[test]
    fn powerup_fires_exactly_once() {
        let mut w = playing_world();
        give_powerup(&mut w, PowerKind::Speed);

        step(&mut w, NO_INPUT);
        assert!(w.powerups[0].collected);
        assert_eq!(w.player.speed, w.tuning.boost_speed);
        assert_eq!(w.boost_timer, w.tuning.boost_ticks - 1);

        // Force the stat back; a collected power-up must never re-fire.
        w.player.speed = w.player.base_speed;
        w.boost_timer = 0;
        step(&mut w, NO_INPUT);
        assert_eq!(w.player.speed, w.player.base_speed);
        assert_eq!(w.boost_timer, 0);
    }

    #[test]
    fn boost_expiry_reverts_speed_and_jump() {
        let mut w = playing_world();
        w.player.speed = w.tuning.boost_speed;
        w.player.jump_power = w.tuning.boost_jump;
        w.boost_timer = 2;

        step(&mut w, NO_INPUT);
        assert_eq!(w.player.speed, w.tuning.boost_speed);
        step(&mut w, NO_INPUT);
        assert_eq!(w.player.speed, w.player.base_speed);
        assert_eq!(w.player.jump_power, w.player.base_jump);
    }

    #[test]
    fn boost_expiry_never_cancels_shield() {
        let mut w = playing_world();
        give_powerup(&mut w, PowerKind::Shield);
        w.boost_timer = 1; // about to expire

        step(&mut w, NO_INPUT);

        assert_eq!(w.boost_timer, 0);
        assert!(w.player.is_invincible(), "shield survives boost expiry");
        assert_eq!(w.player.invincible_timer, w.tuning.shield_ticks - 1);
    }

    #[test]
    fn double_points_doubles_then_reverts() {
        let mut w = playing_world();
        give_powerup(&mut w, PowerKind::DoublePoints);

        step(&mut w, NO_INPUT);
        assert_eq!(w.multiplier, 2);

        for _ in 0..w.tuning.double_points_ticks {
            step(&mut w, NO_INPUT);
        }
        assert_eq!(w.multiplier, 1);
    }

    #[test]
    fn double_points_multiplies_stomp_score() {
        let mut w = playing_world();
        w.multiplier = 2;
        w.monsters.push(stationary_monster(200.0, 3));
        arm_stomp(&mut w);

        step(&mut w, NO_INPUT);
        // 500 × 2 × 1.5
        assert_eq!(w.score, 1500);
    }

    #[test]
    fn extra_life_increments_lives_with_hearts() {
        let mut w = playing_world();
        give_powerup(&mut w, PowerKind::ExtraLife);

        let events = step(&mut w, NO_INPUT);

        assert_eq!(w.lives, w.tuning.starting_lives + 1);
        assert!(w.particles.iter().any(|p| p.shape == ParticleShape::Heart));
        assert!(events.iter().any(|e| matches!(e, GameEvent::ExtraLife)));
    }

    // ── Scrolling ──

    #[test]
    fn scrolling_right_translates_world() {
        let mut w = playing_world();
        w.monsters.push(stationary_monster(800.0, 1));
        w.player.pos.x = SCROLL_BAND_MAX;
        let plat_x = w.platforms[0].pos.x;
        let layer_x = w.layers[0].x;
        let speed = w.player.speed;

        step(&mut w, FrameInput { right: true, ..NO_INPUT });

        assert_eq!(w.scroll_offset, speed);
        assert_eq!(w.player.vel.x, 0.0, "player stays put while the world scrolls");
        assert_eq!(w.platforms[0].pos.x, plat_x - speed);
        assert_eq!(w.monsters[0].start_x, 800.0 - speed);
        // Parallax layers move at their own fraction
        assert_eq!(w.layers[0].x, layer_x - speed * w.layers[0].speed);
    }

    #[test]
    fn scroll_offset_never_goes_negative() {
        let mut w = playing_world();
        w.player.pos.x = SCROLL_BAND_MIN;
        w.scroll_offset = 3.0; // less than one step of scroll
        let plat_x = w.platforms[0].pos.x;

        step(&mut w, FrameInput { left: true, ..NO_INPUT });
        assert_eq!(w.scroll_offset, 0.0, "partial scroll is clamped");
        assert_eq!(w.platforms[0].pos.x, plat_x + 3.0);

        // At zero, scrolling left is a no-op
        let plat_x = w.platforms[0].pos.x;
        step(&mut w, FrameInput { left: true, ..NO_INPUT });
        assert_eq!(w.scroll_offset, 0.0);
        assert_eq!(w.platforms[0].pos.x, plat_x);
    }

    #[test]
    fn player_moves_inside_band_without_scrolling() {
        let mut w = playing_world();
        w.player.pos.x = 300.0;

        step(&mut w, FrameInput { right: true, ..NO_INPUT });

        assert_eq!(w.scroll_offset, 0.0);
        assert_eq!(w.player.pos.x, 300.0 + w.player.speed);
    }

    // ── Jumping & landing ──

    #[test]
    fn jump_only_fires_from_the_ground() {
        let mut w = playing_world();

        let events = step(&mut w, FrameInput { jump: true, ..NO_INPUT });
        assert!(w.player.vel.y < 0.0);
        assert!(events.iter().any(|e| matches!(e, GameEvent::Jumped)));

        // Airborne: a second jump press does nothing
        let vy = w.player.vel.y;
        let events = step(&mut w, FrameInput { jump: true, ..NO_INPUT });
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Jumped)));
        assert_eq!(w.player.vel.y, vy + w.tuning.gravity);
    }

    #[test]
    fn falling_player_lands_and_stops() {
        let mut w = playing_world();
        w.player.pos = Vec2::new(200.0, GROUND_Y - w.player.height - 10.0);
        w.player.vel = Vec2::new(0.0, 6.0);

        step(&mut w, NO_INPUT);

        assert_eq!(w.player.vel.y, 0.0);
        assert_eq!(w.player.pos.y, GROUND_Y - w.player.height);
    }

    #[test]
    fn all_platforms_are_tested_not_just_the_first() {
        let mut w = playing_world();
        // First platform is far away; only the second can catch the player.
        w.platforms = vec![
            Platform::new(5000.0, GROUND_Y, 100.0, 80.0),
            Platform::new(-10000.0, GROUND_Y, 20000.0, 80.0),
        ];
        stand_on_ground(&mut w);

        step(&mut w, NO_INPUT);

        assert_eq!(w.player.vel.y, 0.0);
    }

    // ── Falling out of the world ──

    #[test]
    fn fall_out_of_world_resets_level_keeps_session() {
        let mut w = playing_world();
        w.score = 1234;
        w.scroll_offset = 500.0;
        w.platforms.clear(); // nothing to land on
        w.player.pos = Vec2::new(200.0, 600.0);
        w.player.vel = Vec2::new(0.0, 30.0);

        let mut fell = false;
        for _ in 0..20 {
            let events = step(&mut w, NO_INPUT);
            if events.iter().any(|e| matches!(e, GameEvent::FellOutOfWorld)) {
                fell = true;
                break;
            }
        }

        assert!(fell, "player should fall out within a few frames");
        assert_eq!(w.level, 1, "same level, rebuilt");
        assert_eq!(w.score, 1234, "score persists through a level reset");
        assert_eq!(w.lives, w.tuning.starting_lives, "no life lost on a fall");
        assert_eq!(w.scroll_offset, 0.0);
        assert_eq!(w.player.pos.x, 100.0);
        // The tightened bound: the player never rests below the world
        assert!(w.player.pos.y + w.player.height <= VIEW_H);
    }

    // ── Goal ──

    #[test]
    fn reaching_the_flagpole_schedules_the_next_level() {
        let mut w = playing_world();
        w.flagpole.pos.x = w.player.aabb().right();

        let events = step(&mut w, NO_INPUT);

        assert_eq!(w.phase, Phase::Win);
        assert_eq!(w.advance_timer, Some(w.tuning.advance_delay_ticks));
        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelCleared)));

        // Win halts the simulation entirely
        let tick = w.tick;
        let events = step(&mut w, NO_INPUT);
        assert!(events.is_empty());
        assert_eq!(w.tick, tick);
    }

    // ── Particles ──

    #[test]
    fn burst_spawns_fifteen_fading_particles() {
        let mut particles = Vec::new();
        spawn_burst(&mut particles, 100.0, 100.0, COLOR_STOMP, ParticleShape::Dot);
        assert_eq!(particles.len(), 15);
        assert!(particles.iter().all(|p| p.alpha == 1.0));
        assert!(particles.iter().all(|p| p.size >= 1.0 && p.size < 4.0));
    }

    #[test]
    fn particles_expire_during_play() {
        let mut w = playing_world();
        spawn_burst(&mut w.particles, 200.0, 300.0, COLOR_PICKUP, ParticleShape::Dot);
        for _ in 0..60 {
            step(&mut w, NO_INPUT);
        }
        assert!(w.particles.is_empty());
    }
}
