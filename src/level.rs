//! Level catalog
//!
//! Static fixture data authored in tile coordinates. The simulation never
//! mutates these; a live `World` is derived from them at load or area entry.

use glam::Vec2;

use crate::consts::{PLAYER_HEIGHT, PLAYER_WIDTH, TILE};
use crate::error::LevelError;
use crate::sim::enemy::EnemyKind;
use crate::sim::rect::Rect;
use crate::sim::tile::{AreaId, TileKind};

/// A position in tile units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn to_world(self) -> Vec2 {
        Vec2::new(self.x as f32 * TILE, self.y as f32 * TILE)
    }
}

/// A rectangular tile region in tile units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileDef {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub kind: TileKind,
    pub warp: Option<AreaId>,
    pub area_exit: bool,
}

impl TileDef {
    const fn new(x: i32, y: i32, w: i32, h: i32, kind: TileKind) -> Self {
        Self {
            x,
            y,
            w,
            h,
            kind,
            warp: None,
            area_exit: false,
        }
    }

    pub const fn ground(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(x, y, w, h, TileKind::Ground)
    }

    pub const fn brick(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(x, y, w, h, TileKind::Brick)
    }

    pub const fn question(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(x, y, w, h, TileKind::Question)
    }

    pub const fn pipe(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(x, y, w, h, TileKind::Pipe)
    }

    /// Pipe leading into a bonus area
    pub const fn warp_pipe(x: i32, y: i32, w: i32, h: i32, area: u8) -> Self {
        let mut def = Self::pipe(x, y, w, h);
        def.warp = Some(AreaId(area));
        def
    }

    /// Pipe leading out of the bonus area it sits in
    pub const fn exit_pipe(x: i32, y: i32, w: i32, h: i32) -> Self {
        let mut def = Self::pipe(x, y, w, h);
        def.area_exit = true;
        def
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.x as f32 * TILE,
            self.y as f32 * TILE,
            self.w as f32 * TILE,
            self.h as f32 * TILE,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyDef {
    pub x: i32,
    pub y: i32,
    pub kind: EnemyKind,
}

const fn goomba(x: i32, y: i32) -> EnemyDef {
    EnemyDef {
        x,
        y,
        kind: EnemyKind::Goomba,
    }
}

const fn koopa(x: i32, y: i32) -> EnemyDef {
    EnemyDef {
        x,
        y,
        kind: EnemyKind::Koopa,
    }
}

const fn c(x: i32, y: i32) -> TilePos {
    TilePos::new(x, y)
}

/// Background gradient (0xRRGGBB top, bottom)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background {
    pub top: u32,
    pub bottom: u32,
}

/// A nested bonus area reachable from a warp pipe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonusAreaDef {
    pub width: i32,
    pub height: i32,
    pub tiles: &'static [TileDef],
    pub coins: &'static [TilePos],
    pub spawn: TilePos,
    /// Top-left of the pipe in the primary level the player emerges from
    pub return_pipe: TilePos,
    pub background: Background,
}

/// A complete level descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelDef {
    pub name: &'static str,
    pub width: i32,
    pub height: i32,
    /// Row of the main ground surface (goal pole reaches down to it)
    pub ground_y: i32,
    pub tiles: &'static [TileDef],
    pub enemies: &'static [EnemyDef],
    pub coins: &'static [TilePos],
    pub player_start: TilePos,
    pub goal: Option<TilePos>,
    pub boss: Option<TilePos>,
    pub bonus_areas: &'static [BonusAreaDef],
    pub background: Background,
}

impl LevelDef {
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * TILE
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * TILE
    }

    pub fn is_boss(&self) -> bool {
        self.boss.is_some()
    }

    pub fn bonus_area(&self, id: AreaId) -> Option<&'static BonusAreaDef> {
        self.bonus_areas.get(id.0 as usize)
    }

    /// Goal flag pole: one tile wide, from the flag down to the ground row
    pub fn goal_rect(&self) -> Option<Rect> {
        self.goal.map(|g| {
            Rect::new(
                g.x as f32 * TILE,
                g.y as f32 * TILE,
                TILE,
                (self.ground_y - g.y) as f32 * TILE,
            )
        })
    }

    /// Check fixture conventions
    pub fn validate(&self, index: usize) -> Result<(), LevelError> {
        if spawn_blocked(self.player_start, self.tiles) {
            return Err(LevelError::SpawnInsideTile {
                level: index,
                x: self.player_start.x,
                y: self.player_start.y,
            });
        }
        for tile in self.tiles {
            if let Some(area) = tile.warp {
                if self.bonus_area(area).is_none() {
                    return Err(LevelError::MissingBonusArea {
                        level: index,
                        area: area.0,
                    });
                }
            }
        }
        for (i, area) in self.bonus_areas.iter().enumerate() {
            if spawn_blocked(area.spawn, area.tiles) {
                return Err(LevelError::BonusSpawnInsideTile {
                    level: index,
                    area: i as u8,
                });
            }
        }
        Ok(())
    }
}

fn spawn_blocked(spawn: TilePos, tiles: &[TileDef]) -> bool {
    let pos = spawn.to_world();
    let rect = Rect::new(pos.x, pos.y, PLAYER_WIDTH, PLAYER_HEIGHT);
    tiles.iter().any(|t| t.kind.is_solid() && t.to_rect().overlaps(&rect))
}

/// Look up a level by index
pub fn level(levels: &'static [LevelDef], index: usize) -> Result<&'static LevelDef, LevelError> {
    levels.get(index).ok_or(LevelError::UnknownLevel(index))
}

/// Validate every level in a catalog, collecting all problems
pub fn validate_catalog(levels: &[LevelDef]) -> Vec<LevelError> {
    levels
        .iter()
        .enumerate()
        .filter_map(|(i, l)| l.validate(i).err())
        .collect()
}

// ---------------------------------------------------------------------------
// Shipped levels
// ---------------------------------------------------------------------------

const LEVEL1_BONUS: BonusAreaDef = BonusAreaDef {
    width: 24,
    height: 15,
    tiles: &[
        TileDef::ground(0, 12, 24, 3),
        TileDef::brick(0, 0, 24, 1),
        TileDef::brick(0, 1, 1, 11),
        TileDef::brick(23, 1, 1, 11),
        TileDef::brick(5, 9, 4, 1),
        TileDef::question(11, 7, 1, 1),
        TileDef::brick(14, 9, 3, 1),
        TileDef::exit_pipe(19, 10, 2, 2),
    ],
    coins: &[
        c(5, 7), c(6, 7), c(7, 7), c(8, 7),
        c(10, 10), c(11, 10), c(12, 10), c(13, 10),
        c(10, 4), c(11, 4), c(12, 4),
        c(14, 7), c(15, 7), c(16, 7),
    ],
    spawn: TilePos::new(3, 10),
    return_pipe: TilePos::new(70, 9),
    background: Background {
        top: 0x0b0b1a,
        bottom: 0x1a1a2e,
    },
};

/// The shipped campaign: three overworld stages and a boss arena
pub static LEVELS: &[LevelDef] = &[
    LevelDef {
        name: "WORLD 1-1",
        width: 200,
        height: 15,
        ground_y: 12,
        tiles: &[
            TileDef::ground(0, 12, 20, 3),
            TileDef::ground(23, 12, 35, 3),
            TileDef::ground(61, 12, 50, 3),
            TileDef::ground(115, 12, 85, 3),
            TileDef::brick(10, 8, 3, 1),
            TileDef::question(14, 8, 1, 1),
            TileDef::brick(16, 8, 3, 1),
            TileDef::brick(30, 11, 1, 1),
            TileDef::brick(31, 10, 1, 2),
            TileDef::brick(32, 9, 1, 3),
            TileDef::brick(33, 8, 1, 4),
            TileDef::brick(40, 9, 5, 1),
            TileDef::question(42, 6, 1, 1),
            TileDef::warp_pipe(50, 10, 2, 2, 0),
            TileDef::pipe(70, 9, 2, 3),
            TileDef::brick(75, 7, 6, 1),
            TileDef::question(78, 4, 1, 1),
            TileDef::brick(90, 9, 4, 1),
            TileDef::brick(96, 7, 4, 1),
            TileDef::brick(102, 9, 4, 1),
            TileDef::brick(120, 11, 1, 1),
            TileDef::brick(121, 10, 1, 2),
            TileDef::brick(122, 9, 1, 3),
            TileDef::brick(123, 8, 1, 4),
            TileDef::brick(124, 7, 1, 5),
        ],
        enemies: &[
            goomba(15, 10),
            goomba(35, 10),
            goomba(45, 7),
            goomba(65, 10),
            koopa(80, 5),
            goomba(95, 7),
            goomba(110, 10),
            koopa(115, 10),
        ],
        coins: &[
            c(10, 6), c(11, 6), c(12, 6),
            c(25, 10), c(26, 10), c(27, 10),
            c(41, 7), c(42, 7), c(43, 7),
            c(76, 5), c(77, 5), c(78, 5), c(79, 5),
            c(91, 7), c(92, 7),
            c(97, 5), c(98, 5),
            c(103, 7), c(104, 7),
        ],
        player_start: TilePos::new(3, 10),
        goal: Some(TilePos::new(130, 4)),
        boss: None,
        bonus_areas: &[LEVEL1_BONUS],
        background: Background {
            top: 0x5c94fc,
            bottom: 0x87ceeb,
        },
    },
    LevelDef {
        name: "WORLD 1-2",
        width: 220,
        height: 15,
        ground_y: 12,
        tiles: &[
            TileDef::ground(0, 12, 25, 3),
            TileDef::ground(28, 12, 40, 3),
            TileDef::ground(72, 12, 30, 3),
            TileDef::ground(106, 12, 55, 3),
            TileDef::brick(0, 0, 160, 1),
            TileDef::brick(8, 9, 4, 1),
            TileDef::brick(15, 7, 3, 1),
            TileDef::question(13, 9, 1, 1),
            TileDef::brick(20, 5, 4, 1),
            TileDef::brick(25, 10, 2, 1),
            TileDef::pipe(35, 10, 2, 2),
            TileDef::pipe(45, 8, 2, 4),
            TileDef::pipe(55, 9, 2, 3),
            TileDef::question(40, 7, 3, 1),
            TileDef::brick(50, 6, 5, 1),
            TileDef::brick(69, 9, 2, 1),
            TileDef::brick(80, 9, 3, 1),
            TileDef::brick(85, 7, 3, 1),
            TileDef::question(90, 5, 3, 1),
            TileDef::brick(95, 7, 3, 1),
            TileDef::brick(100, 9, 3, 1),
            TileDef::brick(115, 9, 6, 1),
            TileDef::brick(125, 7, 4, 1),
            TileDef::brick(133, 11, 1, 1),
            TileDef::brick(134, 10, 1, 2),
            TileDef::brick(135, 9, 1, 3),
            TileDef::brick(136, 8, 1, 4),
            TileDef::brick(137, 7, 1, 5),
        ],
        enemies: &[
            goomba(12, 10),
            goomba(18, 5),
            goomba(30, 10),
            koopa(38, 10),
            goomba(48, 10),
            goomba(52, 4),
            goomba(60, 10),
            goomba(75, 10),
            koopa(82, 7),
            goomba(92, 3),
            goomba(110, 10),
            koopa(118, 7),
        ],
        coins: &[
            c(9, 7), c(10, 7),
            c(16, 5), c(17, 5),
            c(21, 3), c(22, 3), c(23, 3),
            c(41, 5), c(42, 5),
            c(51, 4), c(52, 4), c(53, 4),
            c(81, 7), c(82, 7),
            c(86, 5), c(87, 5),
            c(91, 3), c(92, 3),
            c(96, 5), c(97, 5),
            c(116, 7), c(117, 7), c(118, 7),
            c(126, 5), c(127, 5),
        ],
        player_start: TilePos::new(3, 10),
        goal: Some(TilePos::new(143, 4)),
        boss: None,
        bonus_areas: &[],
        background: Background {
            top: 0x1a1a2e,
            bottom: 0x16213e,
        },
    },
    LevelDef {
        name: "WORLD 1-3",
        width: 250,
        height: 20,
        ground_y: 17,
        tiles: &[
            TileDef::ground(0, 15, 10, 5),
            TileDef::brick(13, 14, 4, 1),
            TileDef::brick(19, 12, 3, 1),
            TileDef::question(24, 10, 3, 1),
            TileDef::brick(29, 12, 4, 1),
            TileDef::brick(35, 10, 3, 1),
            TileDef::brick(40, 8, 4, 1),
            TileDef::question(46, 10, 3, 1),
            TileDef::brick(51, 12, 5, 1),
            TileDef::ground(58, 15, 15, 5),
            TileDef::brick(62, 11, 3, 1),
            TileDef::question(65, 8, 1, 1),
            TileDef::pipe(68, 13, 2, 2),
            TileDef::brick(76, 13, 3, 1),
            TileDef::brick(81, 11, 3, 1),
            TileDef::brick(86, 9, 3, 1),
            TileDef::question(91, 7, 4, 1),
            TileDef::brick(97, 9, 3, 1),
            TileDef::brick(102, 11, 3, 1),
            TileDef::brick(107, 13, 4, 1),
            TileDef::ground(114, 15, 20, 5),
            TileDef::brick(125, 14, 1, 1),
            TileDef::brick(126, 13, 1, 2),
            TileDef::brick(127, 12, 1, 3),
            TileDef::brick(128, 11, 1, 4),
        ],
        enemies: &[
            goomba(14, 12),
            goomba(30, 10),
            koopa(36, 8),
            goomba(52, 10),
            goomba(60, 13),
            koopa(64, 13),
            goomba(77, 11),
            goomba(87, 7),
            koopa(98, 7),
            goomba(108, 11),
            goomba(120, 13),
        ],
        coins: &[
            c(14, 12), c(15, 12), c(16, 12),
            c(20, 10), c(21, 10),
            c(30, 10), c(31, 10),
            c(41, 6), c(42, 6), c(43, 6),
            c(53, 10), c(54, 10),
            c(63, 9), c(64, 9),
            c(82, 9), c(83, 9),
            c(92, 5), c(93, 5), c(94, 5),
            c(103, 9), c(104, 9),
        ],
        player_start: TilePos::new(3, 13),
        goal: Some(TilePos::new(133, 7)),
        boss: None,
        bonus_areas: &[],
        background: Background {
            top: 0xe17055,
            bottom: 0xfdcb6e,
        },
    },
    LevelDef {
        name: "BOSS",
        width: 35,
        height: 15,
        ground_y: 12,
        tiles: &[
            TileDef::ground(0, 12, 35, 3),
            TileDef::brick(0, 0, 1, 12),
            TileDef::brick(34, 0, 1, 12),
            TileDef::brick(5, 9, 3, 1),
            TileDef::brick(15, 8, 4, 1),
            TileDef::brick(27, 9, 3, 1),
        ],
        enemies: &[],
        coins: &[
            c(6, 7), c(7, 7),
            c(16, 6), c(17, 6), c(18, 6),
            c(28, 7), c(29, 7),
        ],
        player_start: TilePos::new(3, 10),
        goal: None,
        boss: Some(TilePos::new(25, 10)),
        bonus_areas: &[],
        background: Background {
            top: 0x2c3e50,
            bottom: 0x8e44ad,
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_levels_validate() {
        assert!(validate_catalog(LEVELS).is_empty());
    }

    #[test]
    fn test_unknown_level_index() {
        assert_eq!(level(LEVELS, 99).unwrap_err(), LevelError::UnknownLevel(99));
        assert_eq!(level(LEVELS, 0).unwrap().name, "WORLD 1-1");
    }

    #[test]
    fn test_spawn_inside_tile_is_rejected() {
        static BAD: LevelDef = LevelDef {
            name: "bad",
            width: 10,
            height: 10,
            ground_y: 8,
            tiles: &[TileDef::ground(0, 8, 10, 2), TileDef::brick(2, 4, 2, 2)],
            enemies: &[],
            coins: &[],
            player_start: TilePos::new(2, 4),
            goal: None,
            boss: None,
            bonus_areas: &[],
            background: Background { top: 0, bottom: 0 },
        };
        assert_eq!(
            BAD.validate(5),
            Err(LevelError::SpawnInsideTile { level: 5, x: 2, y: 4 })
        );
    }

    #[test]
    fn test_warp_to_missing_area_is_rejected() {
        static BAD: LevelDef = LevelDef {
            name: "bad",
            width: 10,
            height: 10,
            ground_y: 8,
            tiles: &[TileDef::ground(0, 8, 10, 2), TileDef::warp_pipe(6, 6, 2, 2, 3)],
            enemies: &[],
            coins: &[],
            player_start: TilePos::new(1, 6),
            goal: None,
            boss: None,
            bonus_areas: &[],
            background: Background { top: 0, bottom: 0 },
        };
        assert_eq!(
            BAD.validate(0),
            Err(LevelError::MissingBonusArea { level: 0, area: 3 })
        );
    }

    #[test]
    fn test_goal_rect_reaches_ground() {
        let lvl = &LEVELS[0];
        let goal = lvl.goal_rect().unwrap();
        assert_eq!(goal.x, 130.0 * TILE);
        assert_eq!(goal.bottom(), 12.0 * TILE);
        assert!(LEVELS[3].goal_rect().is_none());
        assert!(LEVELS[3].is_boss());
    }
}
