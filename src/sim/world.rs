//! The active play area
//!
//! A `World` is everything mutable about one area: tiles with their trigger
//! state, live entities and the camera. Exactly one is active at a time; the
//! primary one is moved aside (not copied) while a bonus area is played.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{Boss, Enemy};
use super::items::{Coin, MoonItem};
use super::rect::Rect;
use super::tile::{AreaId, Tile};
use crate::level::{BonusAreaDef, LevelDef, TileDef, TilePos};
use crate::tuning::Tuning;

/// Camera may look this far above the top of the level
const CAMERA_MIN_Y: f32 = -50.0;
/// Player anchor within the viewport
const CAMERA_ANCHOR_X: f32 = 0.35;
const CAMERA_ANCHOR_Y: f32 = 0.45;
/// Camera follow smoothing per step
const CAMERA_LERP_X: f32 = 0.1;
const CAMERA_LERP_Y: f32 = 0.08;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Bonus area this world was built from; `None` for the primary level
    pub area: Option<AreaId>,
    pub width: f32,
    pub height: f32,
    pub tiles: Vec<Tile>,
    pub enemies: Vec<Enemy>,
    pub coins: Vec<Coin>,
    pub moon_items: Vec<MoonItem>,
    pub boss: Option<Boss>,
    pub goal: Option<Rect>,
    /// Top-left of the viewport in world pixels
    pub camera: Vec2,
}

fn build_tiles(defs: &[TileDef]) -> Vec<Tile> {
    defs.iter()
        .map(|d| {
            let mut tile = Tile::new(d.to_rect(), d.kind);
            tile.warp_target = d.warp;
            tile.is_area_exit = d.area_exit;
            tile
        })
        .collect()
}

fn build_coins(defs: &[TilePos]) -> Vec<Coin> {
    defs.iter().map(|c| Coin::new(c.to_world())).collect()
}

impl World {
    /// Fresh primary world for a level
    pub fn from_level(def: &LevelDef, tuning: &Tuning) -> Self {
        Self {
            area: None,
            width: def.pixel_width(),
            height: def.pixel_height(),
            tiles: build_tiles(def.tiles),
            enemies: def
                .enemies
                .iter()
                .map(|e| Enemy::new(TilePos::new(e.x, e.y).to_world(), e.kind, tuning.enemy_speed))
                .collect(),
            coins: build_coins(def.coins),
            moon_items: Vec::new(),
            boss: def.boss.map(|b| Boss::new(b.to_world(), tuning)),
            goal: def.goal_rect(),
            camera: Vec2::ZERO,
        }
    }

    /// Fresh world for a bonus area
    pub fn from_bonus(def: &BonusAreaDef, id: AreaId) -> Self {
        Self {
            area: Some(id),
            width: def.width as f32 * crate::consts::TILE,
            height: def.height as f32 * crate::consts::TILE,
            tiles: build_tiles(def.tiles),
            enemies: Vec::new(),
            coins: build_coins(def.coins),
            moon_items: Vec::new(),
            boss: None,
            goal: None,
            camera: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn is_bonus(&self) -> bool {
        self.area.is_some()
    }

    /// Tile whose top-left sits at a fixture tile position
    pub fn tile_at(&self, pos: TilePos) -> Option<&Tile> {
        let origin = pos.to_world();
        self.tiles
            .iter()
            .find(|t| t.rect.x == origin.x && t.rect.y == origin.y)
    }

    /// Drop every entity whose lifecycle has ended
    pub fn compact(&mut self) {
        self.enemies.retain(|e| !e.is_finished());
        self.coins.retain(|c| !c.is_finished());
        self.moon_items.retain(|m| !m.is_finished());
        if self.boss.as_ref().is_some_and(|b| b.is_finished()) {
            log::debug!("Boss removed after defeat animation");
            self.boss = None;
        }
    }

    pub fn decay_bumps(&mut self) {
        for tile in &mut self.tiles {
            tile.decay_bump();
        }
    }

    /// Ease the camera toward the focus rectangle, clamped to the area
    pub fn update_camera(&mut self, focus: &Rect, tuning: &Tuning) {
        let target_x = focus.x - tuning.viewport_width * CAMERA_ANCHOR_X;
        let target_y = focus.y - tuning.viewport_height * CAMERA_ANCHOR_Y;

        self.camera.x += (target_x - self.camera.x) * CAMERA_LERP_X;
        self.camera.y += (target_y - self.camera.y) * CAMERA_LERP_Y;

        self.camera.x = self.camera.x.max(0.0);
        let max_x = self.width - tuning.viewport_width;
        if max_x > 0.0 {
            self.camera.x = self.camera.x.min(max_x);
        }

        self.camera.y = self.camera.y.max(CAMERA_MIN_Y);
        let max_y = self.height - tuning.viewport_height;
        self.camera.y = self.camera.y.min(max_y.max(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LEVELS;
    use crate::sim::enemy::EnemyState;

    #[test]
    fn test_world_from_level_scales_tiles() {
        let tuning = Tuning::default();
        let world = World::from_level(&LEVELS[0], &tuning);
        assert!(!world.is_bonus());
        assert_eq!(world.tiles.len(), LEVELS[0].tiles.len());
        assert_eq!(world.tiles[0].rect, Rect::new(0.0, 384.0, 640.0, 96.0));
        assert_eq!(world.enemies.len(), LEVELS[0].enemies.len());
        assert!(world.goal.is_some());
        assert!(world.boss.is_none());
        assert!(world.tiles.iter().any(|t| t.warp_target == Some(AreaId(0))));
    }

    #[test]
    fn test_bonus_world_has_exit_pipe() {
        let area = LEVELS[0].bonus_area(AreaId(0)).unwrap();
        let world = World::from_bonus(area, AreaId(0));
        assert!(world.is_bonus());
        assert!(world.tiles.iter().any(|t| t.is_area_exit));
        assert!(world.goal.is_none());
    }

    #[test]
    fn test_boss_level_has_boss_and_no_goal() {
        let world = World::from_level(&LEVELS[3], &Tuning::default());
        assert!(world.boss.is_some());
        assert!(world.goal.is_none());
    }

    #[test]
    fn test_compact_removes_only_finished() {
        let mut world = World::from_level(&LEVELS[0], &Tuning::default());
        let before = world.enemies.len();
        world.enemies[0].state = EnemyState::Gone;
        world.enemies[1].stomp();
        world.compact();
        assert_eq!(world.enemies.len(), before - 1);
    }

    #[test]
    fn test_camera_clamps_to_level() {
        let tuning = Tuning::default();
        let mut world = World::from_level(&LEVELS[0], &tuning);
        let focus = Rect::new(0.0, 0.0, 28.0, 34.0);
        for _ in 0..200 {
            world.update_camera(&focus, &tuning);
        }
        assert_eq!(world.camera.x, 0.0);
        assert!(world.camera.y >= CAMERA_MIN_Y && world.camera.y <= 0.0);

        let far = Rect::new(world.width + 500.0, 300.0, 28.0, 34.0);
        for _ in 0..500 {
            world.update_camera(&far, &tuning);
        }
        assert_eq!(world.camera.x, world.width - tuning.viewport_width);
    }

    #[test]
    fn test_tile_at_finds_return_pipe() {
        let world = World::from_level(&LEVELS[0], &Tuning::default());
        let pipe = world.tile_at(TilePos::new(70, 9)).unwrap();
        assert_eq!(pipe.rect, Rect::new(2240.0, 288.0, 64.0, 96.0));
    }
}
