/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound effects.

use crate::domain::entity::PowerKind;

#[derive(Clone, Debug)]
#[allow(dead_code)]
pub enum GameEvent {
    Jumped,
    Stomped { combo: u32 },
    MonsterKilled { x: f32, y: f32 },
    PlayerHurt { lives_left: u32 },
    PowerUpCollected { kind: PowerKind },
    ExtraLife,
    FellOutOfWorld,
    LevelCleared,
    GameOver,
}
