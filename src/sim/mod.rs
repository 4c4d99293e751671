//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (fixture order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod enemy;
pub mod items;
pub mod player;
pub mod rect;
pub mod state;
pub mod tick;
pub mod tile;
pub mod warp;
pub mod world;

pub use collision::{Body, VerticalHit, WallResponse, has_floor_ahead, move_x, move_y};
pub use enemy::{Boss, Enemy, EnemyKind, EnemyState, StompOutcome};
pub use items::{Coin, MoonItem, MoonPhase, Particle};
pub use player::{Player, PlayerStep};
pub use rect::{Rect, overlaps};
pub use state::{ClearRecord, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
pub use tile::{AreaId, Tile, TileKind};
pub use warp::{Warp, WarpKind, WarpPhase, WarpState};
pub use world::World;
