//! Collectibles and decorative particles

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Body, WallResponse, move_x, move_y};
use super::rect::Rect;
use super::tile::Tile;
use crate::consts::{COIN_BOUNCE, COIN_SIZE, MOON_SIZE};
use crate::tuning::Tuning;

/// Steps a collected item stays on screen
pub const COLLECT_ANIM_TICKS: u32 = 30;
/// Vertical amplitude of idle bobbing
const BOB_AMPLITUDE: f32 = 4.0;

/// A spinning coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub pos: Vec2,
    pub base_y: f32,
    pub collected: bool,
    pub collect_anim: u32,
    pub timer: u32,
}

impl Coin {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            base_y: pos.y,
            collected: false,
            collect_anim: 0,
            timer: 0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, Vec2::splat(COIN_SIZE))
    }

    pub fn update(&mut self) {
        if self.collected {
            self.collect_anim += 1;
            return;
        }
        self.timer += 1;
        let phase = self.timer as f32 * COIN_BOUNCE * std::f32::consts::TAU;
        self.pos.y = self.base_y + phase.sin() * BOB_AMPLITUDE;
    }

    /// Returns false if already collected
    pub fn collect(&mut self) -> bool {
        if self.collected {
            return false;
        }
        self.collected = true;
        true
    }

    pub fn is_finished(&self) -> bool {
        self.collected && self.collect_anim >= COLLECT_ANIM_TICKS
    }
}

/// Initial upward speed of a freshly spawned moon
pub const MOON_LAUNCH_SPEED: f32 = -4.0;
/// Sideways speed of a freshly spawned moon
pub const MOON_LATERAL_SPEED: f32 = 1.0;
/// Deceleration while rising
const MOON_RISE_DECEL: f32 = 0.15;
/// Falling below the level by this much discards the moon
const MOON_DISCARD_MARGIN: f32 = 100.0;
/// Idle bob rate once settled
const MOON_BOB_RATE: f32 = 0.04;

/// Motion phase of a moon item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MoonPhase {
    /// Launched out of a question tile, decelerating
    Rising,
    /// Past the apex, under normal gravity
    Falling,
    /// Landed; bobbing in place
    Settled { base_y: f32, timer: u32 },
}

/// The invincibility power-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoonItem {
    pub body: Body,
    pub phase: MoonPhase,
    pub collected: bool,
    pub collect_anim: u32,
    /// Fell out of the level before landing
    pub discarded: bool,
}

impl MoonItem {
    /// Spawn on top of a struck tile, drifting toward `lateral_dir` (-1 or +1)
    pub fn spawn_from(tile: &Rect, lateral_dir: f32) -> Self {
        let pos = Vec2::new(tile.center_x() - MOON_SIZE / 2.0, tile.y - MOON_SIZE - 4.0);
        let mut body = Body::new(pos, Vec2::splat(MOON_SIZE));
        body.vel = Vec2::new(lateral_dir.signum() * MOON_LATERAL_SPEED, MOON_LAUNCH_SPEED);
        Self {
            body,
            phase: MoonPhase::Rising,
            collected: false,
            collect_anim: 0,
            discarded: false,
        }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    pub fn is_collectible(&self) -> bool {
        !self.collected && !self.discarded
    }

    pub fn update(&mut self, tiles: &[Tile], level_height: f32, tuning: &Tuning) {
        if self.collected {
            self.collect_anim += 1;
            return;
        }
        if self.discarded {
            return;
        }

        match self.phase {
            MoonPhase::Rising => {
                move_x(&mut self.body, tiles, WallResponse::Stop);
                move_y(&mut self.body, tiles);
                self.body.vel.y += MOON_RISE_DECEL;
                if self.body.vel.y >= 0.0 {
                    self.phase = MoonPhase::Falling;
                }
            }
            MoonPhase::Falling => {
                self.body.apply_gravity(tuning);
                move_x(&mut self.body, tiles, WallResponse::Stop);
                let hit = move_y(&mut self.body, tiles);
                if hit.landed {
                    self.body.vel = Vec2::ZERO;
                    self.phase = MoonPhase::Settled {
                        base_y: self.body.pos.y,
                        timer: 0,
                    };
                } else if self.body.pos.y > level_height + MOON_DISCARD_MARGIN {
                    self.discarded = true;
                }
            }
            MoonPhase::Settled { base_y, timer } => {
                let timer = timer + 1;
                self.body.pos.y = base_y + (timer as f32 * MOON_BOB_RATE).sin() * BOB_AMPLITUDE;
                self.phase = MoonPhase::Settled { base_y, timer };
            }
        }
    }

    /// Returns false if already collected or discarded
    pub fn collect(&mut self) -> bool {
        if !self.is_collectible() {
            return false;
        }
        self.collected = true;
        true
    }

    pub fn is_finished(&self) -> bool {
        self.discarded || (self.collected && self.collect_anim >= COLLECT_ANIM_TICKS)
    }
}

/// Maximum live particles
pub const MAX_PARTICLES: usize = 256;

/// Particle colors (0xRRGGBB)
pub mod palette {
    pub const JUMP: u32 = 0xffffff;
    pub const DOUBLE_JUMP: u32 = 0x87ceeb;
    pub const GOLD: u32 = 0xffd700;
    pub const STOMP: u32 = 0x4aa3df;
    pub const DEATH: u32 = 0xe94560;
    pub const BOSS_HIT: u32 = 0xff6b6b;
    pub const SPARKLE: u32 = 0xfffacd;
}

/// A visual-only particle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// Steps remaining
    pub life: u32,
    pub size: f32,
}

impl Particle {
    pub fn update(&mut self) {
        self.pos += self.vel;
        self.vel.y += 0.15;
        self.life = self.life.saturating_sub(1);
    }
}

/// Burst `count` particles at `at`, dropping any beyond the cap
pub fn spawn_particles(
    particles: &mut Vec<Particle>,
    rng: &mut Pcg32,
    at: Vec2,
    count: usize,
    color: u32,
) {
    for _ in 0..count {
        if particles.len() >= MAX_PARTICLES {
            break;
        }
        particles.push(Particle {
            pos: at,
            vel: Vec2::new(
                (rng.random::<f32>() - 0.5) * 6.0,
                (rng.random::<f32>() - 1.0) * 5.0,
            ),
            color,
            life: rng.random_range(30..50),
            size: 2.0 + rng.random::<f32>() * 4.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tile::TileKind;
    use rand::SeedableRng;

    #[test]
    fn test_coin_collects_once_and_expires() {
        let mut coin = Coin::new(Vec2::new(10.0, 10.0));
        coin.update();
        assert!(coin.pos.y != 10.0);
        assert!(coin.collect());
        assert!(!coin.collect());
        for _ in 0..COLLECT_ANIM_TICKS {
            assert!(!coin.is_finished());
            coin.update();
        }
        assert!(coin.is_finished());
    }

    #[test]
    fn test_moon_rises_falls_and_settles() {
        let tuning = Tuning::default();
        let question = Tile::new(Rect::new(320.0, 256.0, 32.0, 32.0), TileKind::Question);
        let ground = Tile::new(Rect::new(0.0, 384.0, 1000.0, 96.0), TileKind::Ground);
        let tiles = vec![question.clone(), ground];
        let mut moon = MoonItem::spawn_from(&question.rect, 1.0);
        assert!(!moon.rect().overlaps(&question.rect));
        let start_y = moon.body.pos.y;

        let mut apex = start_y;
        let mut saw_falling = false;
        for _ in 0..300 {
            moon.update(&tiles, 480.0, &tuning);
            apex = apex.min(moon.body.pos.y);
            if moon.phase == MoonPhase::Falling {
                saw_falling = true;
            }
            if matches!(moon.phase, MoonPhase::Settled { .. }) {
                break;
            }
        }
        assert!(apex < start_y);
        assert!(saw_falling);
        match moon.phase {
            MoonPhase::Settled { base_y, .. } => {
                // Lands either back on the question tile or on the ground
                assert!(base_y == 256.0 - MOON_SIZE || base_y == 384.0 - MOON_SIZE);
            }
            other => panic!("moon never settled: {other:?}"),
        }
        assert!(moon.is_collectible());
    }

    #[test]
    fn test_moon_discarded_when_falling_out() {
        let tuning = Tuning::default();
        let tile = Rect::new(320.0, 256.0, 32.0, 32.0);
        let mut moon = MoonItem::spawn_from(&tile, -1.0);
        for _ in 0..300 {
            moon.update(&[], 480.0, &tuning);
        }
        assert!(moon.discarded);
        assert!(moon.is_finished());
        assert!(!moon.collect());
    }

    #[test]
    fn test_particle_burst_respects_cap() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut particles = Vec::new();
        spawn_particles(&mut particles, &mut rng, Vec2::ZERO, MAX_PARTICLES + 20, palette::GOLD);
        assert_eq!(particles.len(), MAX_PARTICLES);
        assert!(particles.iter().all(|p| (30..50).contains(&p.life)));
    }
}
