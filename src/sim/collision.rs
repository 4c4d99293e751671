//! Axis-separated tile collision
//!
//! Bodies move one axis at a time: displace horizontally and push out of any
//! overlapping tile, then displace vertically and do the same. This is the
//! classic discrete platformer scheme; fast bodies can tunnel thin tiles, which
//! the fixture scale never produces at the clamped fall speed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::tile::Tile;
use crate::tuning::Tuning;

/// How far past the leading edge the ledge probe looks
pub const PROBE_AHEAD: f32 = 2.0;
/// How far below the feet the ledge probe looks
pub const PROBE_BELOW: f32 = 4.0;

/// A moving box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Accelerate downward, clamped to terminal velocity
    pub fn apply_gravity(&mut self, tuning: &Tuning) {
        self.vel.y = (self.vel.y + tuning.gravity).min(tuning.max_fall_speed);
    }
}

/// What a horizontal tile contact does to velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallResponse {
    /// Zero horizontal velocity (player)
    Stop,
    /// Turn around (patrolling enemies)
    Reverse,
}

/// Outcome of the vertical pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerticalHit {
    /// Came to rest on top of a tile
    pub landed: bool,
    /// Index of the tile struck from below, if any
    pub ceiling: Option<usize>,
}

/// Displace by `vel.x` and resolve against tiles.
/// Returns the index of the last tile touched.
pub fn move_x(body: &mut Body, tiles: &[Tile], response: WallResponse) -> Option<usize> {
    body.pos.x += body.vel.x;
    let mut hit = None;
    for (i, tile) in tiles.iter().enumerate() {
        if !tile.kind.is_solid() || !body.rect().overlaps(&tile.rect) {
            continue;
        }
        match response {
            WallResponse::Stop => {
                if body.vel.x > 0.0 {
                    body.pos.x = tile.rect.x - body.size.x;
                } else if body.vel.x < 0.0 {
                    body.pos.x = tile.rect.right();
                }
                body.vel.x = 0.0;
            }
            WallResponse::Reverse => {
                if body.vel.x > 0.0 {
                    body.pos.x = tile.rect.x - body.size.x;
                } else {
                    body.pos.x = tile.rect.right();
                }
                body.vel.x = -body.vel.x;
            }
        }
        hit = Some(i);
    }
    hit
}

/// Displace by `vel.y` and resolve against tiles
pub fn move_y(body: &mut Body, tiles: &[Tile]) -> VerticalHit {
    body.pos.y += body.vel.y;
    let mut hit = VerticalHit::default();
    for (i, tile) in tiles.iter().enumerate() {
        if !tile.kind.is_solid() || !body.rect().overlaps(&tile.rect) {
            continue;
        }
        if body.vel.y > 0.0 {
            body.pos.y = tile.rect.y - body.size.y;
            body.vel.y = 0.0;
            hit.landed = true;
        } else if body.vel.y < 0.0 {
            body.pos.y = tile.rect.bottom();
            body.vel.y = 0.0;
            hit.ceiling = Some(i);
        }
    }
    hit
}

/// Probe just beyond the leading edge and just below the feet for floor
pub fn has_floor_ahead(body: &Body, tiles: &[Tile]) -> bool {
    let probe_x = if body.vel.x > 0.0 {
        body.pos.x + body.size.x + PROBE_AHEAD
    } else {
        body.pos.x - PROBE_AHEAD
    };
    let probe = Vec2::new(probe_x, body.bottom() + PROBE_BELOW);
    tiles
        .iter()
        .any(|t| t.kind.is_solid() && t.rect.contains_point(probe))
}
