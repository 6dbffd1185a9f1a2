/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::entity::FrameInput;
use sim::event::GameEvent;
use sim::level;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(2);

fn main() {
    let config = GameConfig::load();

    let mut world = WorldState::new(config.tuning.clone());

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref());

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Skyhopper!");
    println!("Final Score: {}", world.score);
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(world.tuning.tick_rate_ms);

    // A jump press between ticks is latched so it cannot be lost.
    let mut pending_jump = false;

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, &kb) {
            break;
        }

        if world.phase == Phase::Playing && kb.any_pressed(KEYS_JUMP) {
            pending_jump = true;
        }

        if last_tick.elapsed() >= tick_rate {
            match world.phase {
                Phase::Playing => {
                    let frame_input = FrameInput {
                        left: kb.any_held(KEYS_LEFT) || kb.any_pressed(KEYS_LEFT),
                        right: kb.any_held(KEYS_RIGHT) || kb.any_pressed(KEYS_RIGHT),
                        jump: std::mem::take(&mut pending_jump),
                    };
                    let events = step::step(world, frame_input);
                    process_sound_events(sound, &events);
                }
                Phase::Win => {
                    tick_win_advance(world);
                }
                _ => {}
            }
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Count down the scheduled advance during the WIN screen, then load the
/// next level.
fn tick_win_advance(world: &mut WorldState) {
    if let Some(t) = world.advance_timer {
        if t <= 1 {
            level::advance_level(world);
        } else {
            world.advance_timer = Some(t - 1);
        }
    }
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::Jumped => sfx.play_jump(),
            GameEvent::Stomped { combo } => sfx.play_stomp(*combo),
            GameEvent::PlayerHurt { .. } => sfx.play_hurt(),
            GameEvent::PowerUpCollected { .. } => sfx.play_pickup(),
            GameEvent::ExtraLife => sfx.play_life(),
            GameEvent::FellOutOfWorld => sfx.play_fall(),
            GameEvent::LevelCleared => sfx.play_clear(),
            GameEvent::GameOver => sfx.play_game_over(),
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_JUMP: &[KeyCode] = &[
    KeyCode::Char(' '),
    KeyCode::Up,
    KeyCode::Char('w'),
    KeyCode::Char('W'),
];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter];

/// Reset to the title screen, preserving tuning.
fn return_to_title(world: &mut WorldState) {
    let tuning = world.tuning.clone();
    *world = WorldState::new(tuning);
}

/// Handle phase transitions driven by meta keys. Returns true to quit.
fn handle_meta(world: &mut WorldState, kb: &InputState) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM);
    let esc = kb.was_pressed(KeyCode::Esc);

    match world.phase {
        Phase::Title => {
            if confirm {
                level::start_new_game(world);
            } else if esc || kb.any_pressed(&[KeyCode::Char('q'), KeyCode::Char('Q')]) {
                return true;
            }
        }

        Phase::Playing => {
            if esc {
                return_to_title(world);
            }
        }

        // The WIN screen auto-advances; restart or ESC bail out early.
        // Both clear the scheduled advance so it cannot fire into the
        // fresh session.
        Phase::Win => {
            if kb.any_pressed(KEYS_RESTART) {
                level::start_new_game(world);
            } else if esc {
                return_to_title(world);
            }
        }

        Phase::GameOver => {
            if confirm || kb.any_pressed(KEYS_RESTART) {
                level::start_new_game(world);
            } else if esc {
                return_to_title(world);
            }
        }
    }

    false
}
