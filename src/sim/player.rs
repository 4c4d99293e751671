//! The player character
//!
//! Constant-speed horizontal movement, an edge-triggered double jump, and
//! axis-separated tile collision. Anything that touches other entities (bumps,
//! deaths, pickups) is reported back to the frame loop instead of applied here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Body, WallResponse, move_x, move_y};
use super::tick::TickInput;
use super::tile::Tile;
use crate::consts::{PLAYER_HEIGHT, PLAYER_WIDTH};
use crate::tuning::Tuning;

/// How far below the level's bottom edge the player may fall before dying
pub const FALL_DEATH_MARGIN: f32 = 100.0;
/// Steps per walk animation frame
const WALK_FRAME_TICKS: u8 = 6;

/// Side effects of one player step, resolved by the frame loop
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerStep {
    /// Jump charge consumed this step (1 = first jump, 2 = double jump)
    pub jumped: Option<u32>,
    /// Tile struck from below
    pub struck_tile: Option<usize>,
    /// Fell past the bottom of the level
    pub fell_out: bool,
    /// Long invincibility sparkle should be emitted
    pub sparkle: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    /// -1 facing left, +1 facing right
    pub facing: i8,
    pub on_ground: bool,
    /// Steps of damage immunity remaining
    pub invincible: u32,
    /// Jumps used since last landing
    pub jump_count: u32,
    /// Jump intent as seen on the previous step (for edge detection)
    pub jump_held: bool,
    pub alive: bool,
    pub walk_frame: u8,
    walk_timer: u8,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            body: Body::new(pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)),
            facing: 1,
            on_ground: false,
            invincible: 0,
            jump_count: 0,
            jump_held: false,
            alive: true,
            walk_frame: 0,
            walk_timer: 0,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    #[inline]
    pub fn vel(&self) -> Vec2 {
        self.body.vel
    }

    /// Advance one step. Does nothing while dead.
    pub fn update(
        &mut self,
        input: &TickInput,
        tiles: &[Tile],
        level_height: f32,
        tuning: &Tuning,
    ) -> PlayerStep {
        let mut step = PlayerStep::default();
        if !self.alive {
            return step;
        }

        if input.left {
            self.body.vel.x = -tuning.player_speed;
            self.facing = -1;
        } else if input.right {
            self.body.vel.x = tuning.player_speed;
            self.facing = 1;
        } else {
            self.body.vel.x = 0.0;
        }

        if self.try_jump(input.jump, tuning) {
            step.jumped = Some(self.jump_count);
        }

        self.body.apply_gravity(tuning);

        move_x(&mut self.body, tiles, WallResponse::Stop);
        let hit = move_y(&mut self.body, tiles);
        self.on_ground = hit.landed;
        if hit.landed {
            self.jump_count = 0;
        }
        step.struck_tile = hit.ceiling;

        self.animate_walk();

        if self.invincible > 0 {
            self.invincible -= 1;
            step.sparkle = self.invincible > tuning.invincible_time;
        }

        if self.body.pos.y > level_height + FALL_DEATH_MARGIN {
            step.fell_out = true;
        }

        if self.body.pos.x < 0.0 {
            self.body.pos.x = 0.0;
        }

        step
    }

    /// Feed the jump intent for this step. Only a not-pressed to pressed edge
    /// consumes a charge, and only while charges remain.
    pub fn try_jump(&mut self, pressed: bool, tuning: &Tuning) -> bool {
        let edge = pressed && !self.jump_held;
        self.jump_held = pressed;
        if !edge || self.jump_count >= tuning.max_jumps {
            return false;
        }
        self.body.vel.y = tuning.jump_velocity(self.jump_count);
        self.on_ground = false;
        self.jump_count += 1;
        true
    }

    /// Kill the player. No-op while dead or invincible; returns whether the
    /// player actually died.
    pub fn die(&mut self) -> bool {
        if self.invincible > 0 || !self.alive {
            return false;
        }
        self.alive = false;
        true
    }

    /// Bounce off something stomped from above
    pub fn bounce(&mut self, factor: f32, tuning: &Tuning) {
        self.body.vel.y = tuning.jump_force * factor;
    }

    fn animate_walk(&mut self) {
        if self.body.vel.x.abs() > 0.5 && self.on_ground {
            self.walk_timer += 1;
            if self.walk_timer > WALK_FRAME_TICKS {
                self.walk_timer = 0;
                self.walk_frame = (self.walk_frame + 1) % 4;
            }
        } else if self.on_ground {
            self.walk_frame = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rect::Rect;
    use crate::sim::tile::TileKind;
    use proptest::prelude::*;

    const GROUND_Y: f32 = 384.0;

    fn flat_tiles() -> Vec<Tile> {
        vec![Tile::new(
            Rect::new(0.0, GROUND_Y, 2000.0, 96.0),
            TileKind::Ground,
        )]
    }

    fn grounded_player(tiles: &[Tile], tuning: &Tuning) -> Player {
        let mut player = Player::new(Vec2::new(100.0, GROUND_Y - PLAYER_HEIGHT));
        player.update(&TickInput::default(), tiles, 480.0, tuning);
        assert!(player.on_ground);
        player
    }

    #[test]
    fn test_jump_scenario() {
        let tuning = Tuning::default();
        let tiles = flat_tiles();
        let mut player = grounded_player(&tiles, &tuning);
        assert_eq!(player.body.pos.y, GROUND_Y - PLAYER_HEIGHT);

        assert!(player.try_jump(true, &tuning));
        assert_eq!(player.body.vel.y, -11.0);
        assert!(!player.on_ground);
        assert_eq!(player.jump_count, 1);

        // Holding is not a new edge
        assert!(!player.try_jump(true, &tuning));
        assert!(!player.try_jump(false, &tuning));

        assert!(player.try_jump(true, &tuning));
        assert_eq!(player.body.vel.y, -11.0 * 0.85);
        assert_eq!(player.jump_count, 2);

        player.try_jump(false, &tuning);
        let vy = player.body.vel.y;
        assert!(!player.try_jump(true, &tuning));
        assert_eq!(player.body.vel.y, vy);
        assert_eq!(player.jump_count, 2);
    }

    #[test]
    fn test_jump_step_applies_gravity_after_launch() {
        let tuning = Tuning::default();
        let tiles = flat_tiles();
        let mut player = grounded_player(&tiles, &tuning);
        let input = TickInput {
            jump: true,
            ..Default::default()
        };
        let step = player.update(&input, &tiles, 480.0, &tuning);
        assert_eq!(step.jumped, Some(1));
        assert!(!player.on_ground);
        assert!((player.body.vel.y - (tuning.jump_force + tuning.gravity)).abs() < 1e-5);
    }

    #[test]
    fn test_landing_resets_jump_count() {
        let tuning = Tuning::default();
        let tiles = flat_tiles();
        let mut player = grounded_player(&tiles, &tuning);
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        player.update(&jump, &tiles, 480.0, &tuning);
        assert_eq!(player.jump_count, 1);
        for _ in 0..120 {
            player.update(&TickInput::default(), &tiles, 480.0, &tuning);
            if player.on_ground {
                break;
            }
        }
        assert!(player.on_ground);
        assert_eq!(player.jump_count, 0);
    }

    #[test]
    fn test_horizontal_sets_velocity_and_facing() {
        let tuning = Tuning::default();
        let tiles = flat_tiles();
        let mut player = grounded_player(&tiles, &tuning);
        let left = TickInput {
            left: true,
            ..Default::default()
        };
        player.update(&left, &tiles, 480.0, &tuning);
        assert_eq!(player.body.vel.x, -tuning.player_speed);
        assert_eq!(player.facing, -1);
        player.update(&TickInput::default(), &tiles, 480.0, &tuning);
        assert_eq!(player.body.vel.x, 0.0);
        assert_eq!(player.facing, -1);
    }

    #[test]
    fn test_left_edge_clamp() {
        let tuning = Tuning::default();
        let tiles = flat_tiles();
        let mut player = Player::new(Vec2::new(1.0, GROUND_Y - PLAYER_HEIGHT));
        let left = TickInput {
            left: true,
            ..Default::default()
        };
        player.update(&left, &tiles, 480.0, &tuning);
        assert_eq!(player.body.pos.x, 0.0);
    }

    #[test]
    fn test_head_strike_reports_tile() {
        let tuning = Tuning::default();
        let mut tiles = flat_tiles();
        tiles.push(Tile::new(
            Rect::new(96.0, GROUND_Y - 128.0, 64.0, 32.0),
            TileKind::Brick,
        ));
        let mut player = grounded_player(&tiles, &tuning);
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        let mut struck = None;
        for i in 0..30 {
            let input = if i == 0 { jump.clone() } else { TickInput::default() };
            let step = player.update(&input, &tiles, 480.0, &tuning);
            if step.struck_tile.is_some() {
                struck = step.struck_tile;
                break;
            }
        }
        assert_eq!(struck, Some(1));
        assert_eq!(player.body.pos.y, GROUND_Y - 96.0);
        assert_eq!(player.body.vel.y, 0.0);
    }

    #[test]
    fn test_fall_out_of_level() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::new(0.0, 0.0));
        let mut fell = false;
        for _ in 0..200 {
            if player.update(&TickInput::default(), &[], 480.0, &tuning).fell_out {
                fell = true;
                break;
            }
        }
        assert!(fell);
        assert!(player.body.pos.y > 480.0 + FALL_DEATH_MARGIN);
    }

    #[test]
    fn test_die_is_idempotent_and_blocked_by_invincibility() {
        let mut player = Player::new(Vec2::ZERO);
        player.invincible = 5;
        assert!(!player.die());
        assert!(player.alive);
        player.invincible = 0;
        assert!(player.die());
        assert!(!player.die());
        assert!(!player.alive);
    }

    #[test]
    fn test_dead_player_does_not_move() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::new(50.0, 50.0));
        player.die();
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        player.update(&input, &[], 480.0, &tuning);
        assert_eq!(player.body.pos, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_sparkle_only_during_long_invincibility() {
        let tuning = Tuning::default();
        let tiles = flat_tiles();
        let mut player = grounded_player(&tiles, &tuning);
        player.invincible = tuning.moon_invincible_time;
        let step = player.update(&TickInput::default(), &tiles, 480.0, &tuning);
        assert!(step.sparkle);
        player.invincible = tuning.invincible_time;
        let step = player.update(&TickInput::default(), &tiles, 480.0, &tuning);
        assert!(!step.sparkle);
        assert_eq!(player.invincible, tuning.invincible_time - 1);
    }

    fn arb_input() -> impl Strategy<Value = TickInput> {
        (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(left, right, jump)| TickInput {
            left,
            right,
            jump,
            ..Default::default()
        })
    }

    proptest! {
        #[test]
        fn prop_jump_budget_holds(inputs in proptest::collection::vec(arb_input(), 1..240)) {
            let tuning = Tuning::default();
            let tiles = flat_tiles();
            let mut player = Player::new(Vec2::new(500.0, GROUND_Y - PLAYER_HEIGHT));
            let mut airborne_jumps = 0;
            for input in &inputs {
                let step = player.update(input, &tiles, 480.0, &tuning);
                if step.jumped.is_some() {
                    airborne_jumps += 1;
                }
                prop_assert!(player.jump_count <= tuning.max_jumps);
                prop_assert!(airborne_jumps <= tuning.max_jumps);
                if player.on_ground {
                    prop_assert_eq!(player.jump_count, 0);
                    airborne_jumps = 0;
                }
            }
        }

        #[test]
        fn prop_fall_speed_is_clamped(
            inputs in proptest::collection::vec(arb_input(), 1..300),
            start_y in -500.0f32..300.0,
        ) {
            let tuning = Tuning::default();
            let tiles = flat_tiles();
            let mut player = Player::new(Vec2::new(500.0, start_y));
            for input in &inputs {
                player.update(input, &tiles, 480.0, &tuning);
                prop_assert!(player.body.vel.y.abs() <= tuning.max_fall_speed);
            }
        }
    }
}
