//! Data-driven physics tuning
//!
//! Every gameplay constant the simulation reads lives here so a level designer
//! can tweak feel without touching code. Defaults reproduce the shipped game.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;

/// Physics and timing parameters threaded through every update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Kinematics ===
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub player_speed: f32,
    pub jump_force: f32,
    pub double_jump_factor: f32,
    pub max_jumps: u32,

    // === Enemies ===
    pub enemy_speed: f32,
    /// Boss patrol speed relative to a regular enemy
    pub boss_speed_factor: f32,
    /// Extra boss speed per point of damage taken
    pub boss_speed_step: f32,

    // === Contact thresholds ===
    /// Max vertical penetration (px) that still counts as a stomp
    pub stomp_threshold: f32,
    pub boss_stomp_threshold: f32,
    /// Max distance (px) between enemy feet and a struck tile's top for a bump-kill
    pub bump_kill_band: f32,
    /// Player bounce after stomping, as a fraction of jump force
    pub stomp_bounce: f32,
    pub boss_stomp_bounce: f32,

    // === Timers (steps) ===
    pub invincible_time: u32,
    pub moon_invincible_time: u32,
    pub respawn_delay: u32,
    pub boss_clear_delay: u32,
    pub tick_rate: u32,

    // === Camera ===
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            max_fall_speed: MAX_FALL_SPEED,
            player_speed: PLAYER_SPEED,
            jump_force: JUMP_FORCE,
            double_jump_factor: DOUBLE_JUMP_FACTOR,
            max_jumps: MAX_JUMPS,

            enemy_speed: ENEMY_SPEED,
            boss_speed_factor: 1.5,
            boss_speed_step: 0.4,

            stomp_threshold: 15.0,
            boss_stomp_threshold: 20.0,
            bump_kill_band: 4.0,
            stomp_bounce: 0.6,
            boss_stomp_bounce: 0.7,

            invincible_time: INVINCIBLE_TIME,
            moon_invincible_time: MOON_INVINCIBLE_TIME,
            respawn_delay: TICK_RATE,
            boss_clear_delay: TICK_RATE * 3 / 2,
            tick_rate: TICK_RATE,

            viewport_width: 960.0,
            viewport_height: 540.0,
        }
    }
}

impl Tuning {
    /// Parse a tuning document; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a tuning document from disk
    pub fn load(path: &std::path::Path) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), TuningError> {
        if self.tick_rate == 0 {
            return Err(TuningError::Invalid("tick_rate must be positive".into()));
        }
        if self.max_fall_speed <= 0.0 {
            return Err(TuningError::Invalid("max_fall_speed must be positive".into()));
        }
        if self.max_jumps == 0 {
            return Err(TuningError::Invalid("max_jumps must be at least 1".into()));
        }
        Ok(())
    }

    /// Velocity of the n-th jump (0-based) in the current airborne sequence
    pub fn jump_velocity(&self, jump_index: u32) -> f32 {
        if jump_index == 0 {
            self.jump_force
        } else {
            self.jump_force * self.double_jump_factor
        }
    }

    /// Whole seconds covered by a number of steps
    pub fn ticks_to_secs(&self, ticks: u64) -> u64 {
        ticks / self.tick_rate as u64
    }
}
