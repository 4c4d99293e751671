//! Tile regions of the level grid
//!
//! A tile is immutable geometry plus a little trigger state: question tiles
//! remember being struck, bumpable tiles carry a decaying bump offset.

use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Identifies a bonus area nested inside a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AreaId(pub u8);

/// Tile behavior kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Ground,
    Brick,
    Question,
    Pipe,
}

impl TileKind {
    /// Every tile kind blocks movement
    pub fn is_solid(self) -> bool {
        true
    }

    /// Struck from below, this tile bumps and knocks out enemies standing on it
    pub fn is_bumpable(self) -> bool {
        matches!(self, TileKind::Brick | TileKind::Question)
    }
}

/// Pixels a bumped tile jumps up by
pub const BUMP_OFFSET: f32 = 6.0;
/// Per-step decay of the bump offset
pub const BUMP_DECAY: f32 = 1.0;

/// A tile region in world pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub rect: Rect,
    pub kind: TileKind,
    /// Set on the first strike of a question tile; never cleared
    pub hit_once: bool,
    /// Visual upward offset after a bump (presentation only)
    pub bump_offset: f32,
    /// Pipe leads into this bonus area
    pub warp_target: Option<AreaId>,
    /// Pipe leads back out of the bonus area it sits in
    pub is_area_exit: bool,
}

impl Tile {
    pub fn new(rect: Rect, kind: TileKind) -> Self {
        Self {
            rect,
            kind,
            hit_once: false,
            bump_offset: 0.0,
            warp_target: None,
            is_area_exit: false,
        }
    }

    pub fn is_warp_pipe(&self) -> bool {
        self.kind == TileKind::Pipe && (self.warp_target.is_some() || self.is_area_exit)
    }

    /// Apply an upward strike. Returns true only on the first-ever strike of a
    /// question tile, which is when a moon item must spawn.
    pub fn strike(&mut self) -> bool {
        if !self.kind.is_bumpable() {
            return false;
        }
        self.bump_offset = BUMP_OFFSET;
        if self.kind == TileKind::Question && !self.hit_once {
            self.hit_once = true;
            return true;
        }
        false
    }

    /// Relax the bump animation toward rest
    pub fn decay_bump(&mut self) {
        if self.bump_offset > 0.0 {
            self.bump_offset = (self.bump_offset - BUMP_DECAY).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Tile {
        Tile::new(Rect::new(0.0, 0.0, 32.0, 32.0), TileKind::Question)
    }

    #[test]
    fn test_question_strike_fires_once() {
        let mut tile = question();
        assert!(tile.strike());
        assert!(tile.hit_once);
        for _ in 0..5 {
            assert!(!tile.strike());
            assert!(tile.hit_once);
        }
    }

    #[test]
    fn test_ground_and_pipe_do_not_bump() {
        let mut ground = Tile::new(Rect::new(0.0, 0.0, 32.0, 32.0), TileKind::Ground);
        assert!(!ground.strike());
        assert_eq!(ground.bump_offset, 0.0);
        assert!(!TileKind::Pipe.is_bumpable());
    }

    #[test]
    fn test_bump_offset_decays_to_zero() {
        let mut brick = Tile::new(Rect::new(0.0, 0.0, 32.0, 32.0), TileKind::Brick);
        brick.strike();
        assert_eq!(brick.bump_offset, BUMP_OFFSET);
        for _ in 0..10 {
            brick.decay_bump();
        }
        assert_eq!(brick.bump_offset, 0.0);
    }
}
