//! Super Runner - A tile-based side-scrolling platformer core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, tile collisions, warps, game state)
//! - `level`: Static level catalog and fixture validation
//! - `tuning`: Data-driven physics constants
//! - `highscores`: Ranking of cleared runs

pub mod error;
pub mod highscores;
pub mod level;
pub mod sim;
pub mod tuning;

pub use error::{LevelError, RankingError, TuningError};
pub use highscores::HighScores;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// World units per fixture tile
    pub const TILE: f32 = 32.0;
    /// Simulation steps per second (one step per rendered frame)
    pub const TICK_RATE: u32 = 60;

    /// Vertical acceleration per step
    pub const GRAVITY: f32 = 0.6;
    /// Terminal downward velocity
    pub const MAX_FALL_SPEED: f32 = 12.0;
    /// Horizontal velocity while a direction is held
    pub const PLAYER_SPEED: f32 = 4.5;
    /// Initial vertical velocity of the first jump (negative is up)
    pub const JUMP_FORCE: f32 = -11.0;
    /// Second jump strength relative to the first
    pub const DOUBLE_JUMP_FACTOR: f32 = 0.85;
    pub const MAX_JUMPS: u32 = 2;
    /// Enemy patrol speed
    pub const ENEMY_SPEED: f32 = 1.2;
    /// Coin oscillation cycles per step
    pub const COIN_BOUNCE: f32 = 0.03;
    /// Respawn invincibility (steps)
    pub const INVINCIBLE_TIME: u32 = 90;
    /// Moon item invincibility (steps)
    pub const MOON_INVINCIBLE_TIME: u32 = 300;

    /// Entity sizes
    pub const PLAYER_WIDTH: f32 = 28.0;
    pub const PLAYER_HEIGHT: f32 = 34.0;
    pub const ENEMY_SIZE: f32 = 28.0;
    pub const BOSS_SIZE: f32 = 42.0;
    pub const COIN_SIZE: f32 = 20.0;
    pub const MOON_SIZE: f32 = 24.0;

    /// Score awards
    pub const SCORE_COIN: u64 = 50;
    pub const SCORE_STOMP: u64 = 200;
    pub const SCORE_BUMP_KILL: u64 = 200;
    pub const SCORE_QUESTION: u64 = 100;
    pub const SCORE_MOON: u64 = 200;
    pub const SCORE_BOSS: u64 = 1000;

    /// Clear time bonus: (PAR - elapsed seconds) * PER_SECOND, floored at 0
    pub const TIME_BONUS_PAR_SECS: u64 = 300;
    pub const TIME_BONUS_PER_SEC: u64 = 10;

    /// Lives at the start of a run
    pub const START_LIVES: u8 = 3;
}

/// Quadratic ease-out for t in [0, 1]
#[inline]
pub fn ease_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_out_quad_endpoints() {
        assert_eq!(ease_out_quad(0.0), 0.0);
        assert_eq!(ease_out_quad(1.0), 1.0);
        assert!(ease_out_quad(0.5) > 0.5);
        assert_eq!(ease_out_quad(2.0), 1.0);
    }
}
