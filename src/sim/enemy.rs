//! Patrolling enemies and the boss
//!
//! Both share the same physics skeleton (gravity, patrol, wall reversal).
//! Lifecycles are explicit states; the frame loop compacts finished entities
//! after every update has run.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Body, WallResponse, has_floor_ahead, move_x, move_y};
use super::rect::Rect;
use super::tile::Tile;
use crate::consts::{BOSS_SIZE, ENEMY_SIZE};
use crate::tuning::Tuning;

/// How far below the level an entity may fall before it is removed
pub const DESPAWN_MARGIN: f32 = 200.0;
/// Steps a squashed enemy stays visible
pub const SQUISH_TICKS: u32 = 20;
/// Height of a squashed enemy
const SQUISHED_HEIGHT: f32 = 10.0;
/// Upward launch speed of a bump-killed enemy
pub const BUMP_KILL_LAUNCH: f32 = -7.0;
/// Sideways drift of a bump-killed enemy
pub const BUMP_KILL_DRIFT: f32 = 1.5;

/// Boss grace window after a hit (steps)
pub const BOSS_INVINCIBLE_TICKS: u32 = 90;
/// Boss freeze after a hit (steps)
pub const BOSS_STUN_TICKS: u32 = 40;
/// Length of the boss defeat animation (steps)
pub const BOSS_DEFEAT_TICKS: u32 = 90;
pub const BOSS_MAX_HP: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Goomba,
    Koopa,
}

/// Enemy lifecycle. `Squished` and `BumpedOff` are the two mutually exclusive
/// ways out of `Alive`; both end in `Gone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    Alive,
    /// Stomped; counts down then disappears
    Squished { timer: u32 },
    /// Knocked off by a bump from below; flies off ballistically
    BumpedOff,
    /// Ready for removal
    Gone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub body: Body,
    pub kind: EnemyKind,
    pub state: EnemyState,
    pub anim_timer: u32,
}

impl Enemy {
    pub fn new(pos: Vec2, kind: EnemyKind, speed: f32) -> Self {
        let mut body = Body::new(pos, Vec2::splat(ENEMY_SIZE));
        body.vel.x = -speed;
        Self {
            body,
            kind,
            state: EnemyState::Alive,
            anim_timer: 0,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state == EnemyState::Alive
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state == EnemyState::Gone
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    pub fn update(&mut self, tiles: &[Tile], level_height: f32, tuning: &Tuning) {
        match self.state {
            EnemyState::Gone => {}
            EnemyState::Squished { timer } => {
                let timer = timer.saturating_sub(1);
                self.state = if timer == 0 {
                    EnemyState::Gone
                } else {
                    EnemyState::Squished { timer }
                };
            }
            EnemyState::BumpedOff => {
                self.body.apply_gravity(tuning);
                self.body.pos += self.body.vel;
                if self.body.pos.y > level_height + DESPAWN_MARGIN {
                    self.state = EnemyState::Gone;
                }
            }
            EnemyState::Alive => {
                self.body.apply_gravity(tuning);
                move_x(&mut self.body, tiles, WallResponse::Reverse);
                let hit = move_y(&mut self.body, tiles);

                if hit.landed && !has_floor_ahead(&self.body, tiles) {
                    self.body.vel.x = -self.body.vel.x;
                }

                if self.body.pos.y > level_height + DESPAWN_MARGIN {
                    self.state = EnemyState::Gone;
                    return;
                }
                self.anim_timer += 1;
            }
        }
    }

    /// Squash from above. No-op unless alive.
    pub fn stomp(&mut self) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.state = EnemyState::Squished {
            timer: SQUISH_TICKS,
        };
        self.body.pos.y += self.body.size.y - SQUISHED_HEIGHT;
        self.body.size.y = SQUISHED_HEIGHT;
        self.body.vel = Vec2::ZERO;
        true
    }

    /// Knock off from below, drifting away from `from_x`. No-op unless alive.
    pub fn bump_kill(&mut self, from_x: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        let dir = if self.body.rect().center_x() >= from_x {
            1.0
        } else {
            -1.0
        };
        self.state = EnemyState::BumpedOff;
        self.body.vel = Vec2::new(dir * BUMP_KILL_DRIFT, BUMP_KILL_LAUNCH);
        true
    }

    /// Standing on top of `tile` (within `band` px vertically)
    pub fn stands_on(&self, tile: &Rect, band: f32) -> bool {
        let r = self.body.rect();
        r.overlaps_x(tile) && (r.bottom() - tile.y).abs() <= band
    }
}

/// Result of stomping the boss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StompOutcome {
    /// Grace window or already defeated
    Ignored,
    Damaged,
    Defeated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub body: Body,
    pub hp: u32,
    pub max_hp: u32,
    pub invincible: u32,
    pub stun_timer: u32,
    pub defeated: bool,
    pub defeat_anim: u32,
    pub anim_timer: u32,
}

impl Boss {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        let mut body = Body::new(pos, Vec2::splat(BOSS_SIZE));
        body.vel.x = -tuning.enemy_speed * tuning.boss_speed_factor;
        Self {
            body,
            hp: BOSS_MAX_HP,
            max_hp: BOSS_MAX_HP,
            invincible: 0,
            stun_timer: 0,
            defeated: false,
            defeat_anim: 0,
            anim_timer: 0,
        }
    }

    /// Still part of the fight
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.defeated
    }

    /// Defeat animation done; may be removed
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.defeated && self.defeat_anim >= BOSS_DEFEAT_TICKS
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    pub fn update(&mut self, tiles: &[Tile], tuning: &Tuning) {
        if self.defeated {
            self.defeat_anim += 1;
            return;
        }
        if self.invincible > 0 {
            self.invincible -= 1;
        }
        if self.stun_timer > 0 {
            self.stun_timer -= 1;
            return;
        }

        self.body.apply_gravity(tuning);
        move_x(&mut self.body, tiles, WallResponse::Reverse);
        move_y(&mut self.body, tiles);
        self.anim_timer += 1;
    }

    /// Take a hit from above. Every hit speeds the patrol up; the last one
    /// stops the boss for good.
    pub fn stomp(&mut self, tuning: &Tuning) -> StompOutcome {
        if self.defeated || self.invincible > 0 {
            return StompOutcome::Ignored;
        }
        self.hp = self.hp.saturating_sub(1);
        self.invincible = BOSS_INVINCIBLE_TICKS;
        self.stun_timer = BOSS_STUN_TICKS;

        let speed_mult = 1.0 + (self.max_hp - self.hp) as f32 * tuning.boss_speed_step;
        let dir = if self.body.vel.x > 0.0 { 1.0 } else { -1.0 };
        self.body.vel.x = dir * tuning.enemy_speed * tuning.boss_speed_factor * speed_mult;

        if self.hp == 0 {
            self.defeated = true;
            self.body.vel = Vec2::ZERO;
            return StompOutcome::Defeated;
        }
        StompOutcome::Damaged
    }
}
