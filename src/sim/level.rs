/// Level builder: constructs a level's entity set from its 1-based index.
///
/// Layout rules:
///   - Three ground platforms (widths 900/700/1500) at fixed offsets,
///     plus three floating platforms whose x-offsets scale with N.
///   - N+2 patrolling monsters spaced along the x-axis, health and speed
///     scaling linearly with N; every 5th level adds a tougher mini-boss.
///   - Four power-ups (Speed, Jump, Shield, ExtraLife) at N-offset spots.
///   - The flagpole moves further right as N grows.
///
/// Score and lives persist across level transitions; combo, multiplier,
/// boost state and scroll reset per level.

use crate::domain::entity::{
    Flagpole, LayerKind, Monster, ParallaxLayer, Platform, Player, PowerKind, PowerUp,
};
use crate::sim::world::{Phase, WorldState, GROUND_Y};

/// Monster health for level `n`: 1, 1, 2, 2, 3, 3, ...
fn monster_health(n: u32) -> u32 {
    1 + (n - 1) / 2
}

/// Monster patrol speed for level `n`. Level 1 matches the stock 2.5.
fn monster_speed(n: u32) -> f32 {
    2.0 + n as f32 * 0.5
}

/// Build level `n` into the world. Preserves score and lives; resets
/// everything that is per-level (combo, multiplier, boosts, scroll,
/// particles, any pending level advance).
pub fn build_level(world: &mut WorldState, n: u32) {
    let nf = n as f32;

    world.level = n;
    world.player = Player::new(&world.tuning);
    world.particles.clear();
    world.scroll_offset = 0.0;
    world.combo = 0;
    world.combo_timer = 0;
    world.multiplier = 1;
    world.double_points_timer = 0;
    world.boost_timer = 0;
    world.advance_timer = None;
    world.tick = 0;

    world.layers = vec![
        ParallaxLayer { x: 0.0, kind: LayerKind::Sky, speed: 0.1 },
        ParallaxLayer { x: 0.0, kind: LayerKind::Hills, speed: 0.5 },
    ];

    world.platforms = vec![
        // Ground run
        Platform::new(-1.0, GROUND_Y, 900.0, 80.0),
        Platform::new(1100.0, GROUND_Y, 700.0, 80.0),
        Platform::new(2000.0, GROUND_Y, 1500.0, 80.0),
        // Floating platforms drift right with the level index
        Platform::new(400.0 + nf * 30.0, GROUND_Y - 180.0, 200.0, 45.0),
        Platform::new(800.0 + nf * 50.0, GROUND_Y - 320.0, 150.0, 45.0),
        Platform::new(1400.0 + nf * 40.0, GROUND_Y - 220.0, 250.0, 45.0),
    ];

    world.monsters.clear();
    let health = monster_health(n);
    let speed = monster_speed(n);
    for i in 0..(n + 2) {
        let x = 700.0 + i as f32 * 550.0 + nf * 25.0;
        world
            .monsters
            .push(Monster::new(x, GROUND_Y - 70.0, 70.0, 70.0, speed, 250.0, health));
    }
    if n % 5 == 0 {
        // Mini-boss: bigger, tougher, wider patrol
        let mut boss = Monster::new(
            1800.0 + nf * 25.0,
            GROUND_Y - 110.0,
            110.0,
            110.0,
            speed * 0.75,
            500.0,
            health + 3,
        );
        boss.direction = -1.0;
        world.monsters.push(boss);
    }

    world.powerups = vec![
        PowerUp::new(450.0 + nf * 30.0, GROUND_Y - 250.0, PowerKind::Speed),
        PowerUp::new(850.0 + nf * 50.0, GROUND_Y - 400.0, PowerKind::Jump),
        PowerUp::new(1450.0 + nf * 40.0, GROUND_Y - 300.0, PowerKind::Shield),
        PowerUp::new(2300.0 + nf * 35.0, GROUND_Y - 150.0, PowerKind::ExtraLife),
    ];

    world.flagpole = Flagpole::new(3200.0 + (nf - 1.0) * 400.0, GROUND_Y);
    world.phase = Phase::Playing;
}

/// Full restart: level 1 with score and lives reset.
pub fn start_new_game(world: &mut WorldState) {
    world.score = 0;
    world.lives = world.tuning.starting_lives;
    build_level(world, 1);
}

/// Move on to the next level, keeping score and lives.
pub fn advance_level(world: &mut WorldState) {
    let next = world.level + 1;
    build_level(world, next);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TuningConfig;

    fn world_at_level(n: u32) -> WorldState {
        let mut w = WorldState::new(TuningConfig::default());
        build_level(&mut w, n);
        w
    }

    #[test]
    fn monster_count_is_n_plus_two() {
        for n in 1..=4 {
            let w = world_at_level(n);
            assert_eq!(w.monsters.len() as u32, n + 2, "level {n}");
        }
    }

    #[test]
    fn every_fifth_level_adds_a_mini_boss() {
        let w = world_at_level(5);
        assert_eq!(w.monsters.len() as u32, 5 + 2 + 1);
        let boss = w.monsters.last().expect("boss present");
        assert!(boss.width > 70.0);
        assert!(boss.max_health > monster_health(5));

        let w10 = world_at_level(10);
        assert_eq!(w10.monsters.len() as u32, 10 + 2 + 1);
    }

    #[test]
    fn monsters_scale_with_level() {
        let w1 = world_at_level(1);
        let w6 = world_at_level(6);
        assert!(w6.monsters[0].max_health > w1.monsters[0].max_health);
        assert!(w6.monsters[0].speed > w1.monsters[0].speed);
    }

    #[test]
    fn one_powerup_of_each_builder_kind() {
        let w = world_at_level(3);
        let kinds: Vec<_> = w.powerups.iter().map(|p| p.kind).collect();
        assert_eq!(kinds.len(), 4);
        for kind in [PowerKind::Speed, PowerKind::Jump, PowerKind::Shield, PowerKind::ExtraLife] {
            assert_eq!(kinds.iter().filter(|&&k| k == kind).count(), 1, "{kind:?}");
        }
        assert!(w.powerups.iter().all(|p| !p.collected));
    }

    #[test]
    fn goal_moves_right_with_level() {
        let x1 = world_at_level(1).flagpole.pos.x;
        let x2 = world_at_level(2).flagpole.pos.x;
        let x7 = world_at_level(7).flagpole.pos.x;
        assert!(x2 > x1);
        assert!(x7 > x2);
    }

    #[test]
    fn ground_platform_widths() {
        let w = world_at_level(1);
        let widths: Vec<f32> = w.platforms.iter().take(3).map(|p| p.width).collect();
        assert_eq!(widths, vec![900.0, 700.0, 1500.0]);
        assert_eq!(w.platforms.len(), 6);
    }

    #[test]
    fn score_and_lives_persist_combo_resets() {
        let mut w = world_at_level(1);
        w.score = 4200;
        w.lives = 5;
        w.combo = 3;
        w.multiplier = 2;
        w.boost_timer = 99;
        w.advance_timer = Some(10);

        advance_level(&mut w);
        assert_eq!(w.level, 2);
        assert_eq!(w.score, 4200);
        assert_eq!(w.lives, 5);
        assert_eq!(w.combo, 0);
        assert_eq!(w.multiplier, 1);
        assert_eq!(w.boost_timer, 0);
        assert!(w.advance_timer.is_none());
        assert_eq!(w.scroll_offset, 0.0);
    }

    #[test]
    fn full_restart_resets_session() {
        let mut w = world_at_level(4);
        w.score = 9999;
        w.lives = 1;
        start_new_game(&mut w);
        assert_eq!(w.level, 1);
        assert_eq!(w.score, 0);
        assert_eq!(w.lives, w.tuning.starting_lives);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn parallax_speeds_are_fractional() {
        let w = world_at_level(1);
        assert_eq!(w.layers.len(), 2);
        for layer in &w.layers {
            assert!(layer.speed > 0.0 && layer.speed <= 1.0);
        }
    }
}
