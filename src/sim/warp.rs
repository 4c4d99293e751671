//! Area transitions through pipes
//!
//! A warp is a scripted sequence that owns the player's position while it
//! runs: sink into the pipe, fade out (swapping worlds partway through), fade
//! back in, and for exits rise out of the destination pipe. Normal simulation
//! is suspended for the whole sequence.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::player::Player;
use super::rect::Rect;
use super::state::{GameEvent, GameState};
use super::tick::TickInput;
use super::tile::AreaId;
use super::world::World;
use crate::consts::TILE;
use crate::ease_out_quad;

/// Phase lengths in steps
pub const SINK_TICKS: u32 = 30;
pub const FADE_OUT_TICKS: u32 = 30;
/// Step within the fade-out at which worlds are swapped
pub const SWAP_AT_TICK: u32 = 20;
pub const FADE_IN_TICKS: u32 = 30;
pub const RISE_TICKS: u32 = 30;
/// Re-trigger lockout after a completed warp
pub const WARP_COOLDOWN_TICKS: u32 = 45;
/// Bonus-area entry drops the player in from this far above the spawn
pub const DROP_IN_OFFSET: f32 = 2.0 * TILE;
/// Max gap between feet and pipe top that still counts as standing on it
const STANDING_TOLERANCE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarpKind {
    /// Primary level into a bonus area
    Enter(AreaId),
    /// Bonus area back to the primary level
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarpPhase {
    Sink,
    FadeOut,
    FadeIn,
    /// Exit only
    Rise,
}

/// An in-flight transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Warp {
    pub kind: WarpKind,
    pub phase: WarpPhase,
    /// Steps elapsed in the current phase
    pub timer: u32,
    /// Pipe the player is currently sinking into or rising out of
    pub pipe: Rect,
    /// Player y at the start of the current motion phase
    pub start_y: f32,
    pub swapped: bool,
}

/// Warp state machine owned by the game state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarpState {
    pub active: Option<Warp>,
    /// Steps until another warp may start
    pub cooldown: u32,
    /// Full-screen fade opacity, 0..=1
    pub overlay: f32,
}

impl WarpState {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Pipe that must be drawn over the player (sink and rise only)
    pub fn pipe_over_player(&self) -> Option<Rect> {
        self.active
            .filter(|w| matches!(w.phase, WarpPhase::Sink | WarpPhase::Rise))
            .map(|w| w.pipe)
    }

    /// Tick down the post-warp lockout
    pub fn cool_down(&mut self) {
        if self.active.is_none() && self.cooldown > 0 {
            self.cooldown -= 1;
        }
    }
}

fn standing_on(player: &Player, pipe: &Rect) -> bool {
    let r = player.body.rect();
    let center = r.center_x();
    (r.bottom() - pipe.y).abs() <= STANDING_TOLERANCE && center >= pipe.x && center <= pipe.right()
}

fn center_on(player: &mut Player, pipe: &Rect) {
    player.body.pos.x = pipe.center_x() - player.body.size.x / 2.0;
    player.body.vel = Vec2::ZERO;
}

/// Start a warp if the player is asking to descend a usable pipe.
/// Silently does nothing otherwise, including while a warp is running.
pub fn try_start_warp(state: &mut GameState, input: &TickInput) -> bool {
    if state.warp.is_active() || state.warp.cooldown > 0 || !input.down {
        return false;
    }
    if !state.player.alive || !state.player.on_ground {
        return false;
    }

    let level = state.level();
    let in_bonus = state.world.is_bonus() && state.saved_world.is_some();
    let found = state
        .world
        .tiles
        .iter()
        .filter(|t| t.is_warp_pipe() && standing_on(&state.player, &t.rect))
        .find_map(|t| match t.warp_target {
            Some(area) if !in_bonus && level.bonus_area(area).is_some() => {
                Some((WarpKind::Enter(area), t.rect))
            }
            _ if t.is_area_exit && in_bonus => Some((WarpKind::Exit, t.rect)),
            _ => None,
        });

    let Some((kind, pipe)) = found else {
        return false;
    };

    center_on(&mut state.player, &pipe);
    state.warp.active = Some(Warp {
        kind,
        phase: WarpPhase::Sink,
        timer: 0,
        pipe,
        start_y: state.player.body.pos.y,
        swapped: false,
    });
    // Locked out for the duration; replaced by the real cooldown on completion
    state.warp.cooldown = u32::MAX;
    log::info!("Warp started: {kind:?}");
    state.events.push(GameEvent::WarpStarted { kind });
    true
}

/// Advance the running warp by one step
pub fn step_warp(state: &mut GameState) {
    let Some(mut warp) = state.warp.active else {
        return;
    };
    state.player.body.vel = Vec2::ZERO;
    warp.timer += 1;

    match warp.phase {
        WarpPhase::Sink => {
            let t = warp.timer as f32 / SINK_TICKS as f32;
            state.player.body.pos.y = warp.start_y + state.player.body.size.y * t;
            if warp.timer >= SINK_TICKS {
                warp.phase = WarpPhase::FadeOut;
                warp.timer = 0;
            }
        }
        WarpPhase::FadeOut => {
            state.warp.overlay = warp.timer as f32 / FADE_OUT_TICKS as f32;
            if warp.timer >= SWAP_AT_TICK && !warp.swapped {
                swap_worlds(state, &mut warp);
                warp.swapped = true;
            }
            if warp.timer >= FADE_OUT_TICKS {
                warp.phase = WarpPhase::FadeIn;
                warp.timer = 0;
            }
        }
        WarpPhase::FadeIn => {
            state.warp.overlay = 1.0 - warp.timer as f32 / FADE_IN_TICKS as f32;
            if warp.timer >= FADE_IN_TICKS {
                match warp.kind {
                    WarpKind::Enter(_) => {
                        finish(state, warp.kind);
                        return;
                    }
                    WarpKind::Exit => {
                        warp.phase = WarpPhase::Rise;
                        warp.timer = 0;
                        warp.start_y = warp.pipe.y;
                    }
                }
            }
        }
        WarpPhase::Rise => {
            let t = ease_out_quad(warp.timer as f32 / RISE_TICKS as f32);
            state.player.body.pos.y = warp.start_y - state.player.body.size.y * t;
            if warp.timer >= RISE_TICKS {
                finish(state, warp.kind);
                return;
            }
        }
    }

    state.warp.active = Some(warp);
}

fn swap_worlds(state: &mut GameState, warp: &mut Warp) {
    let level = state.level();
    match warp.kind {
        WarpKind::Enter(area) => {
            let Some(def) = level.bonus_area(area) else {
                return;
            };
            let bonus = World::from_bonus(def, area);
            state.saved_world = Some(std::mem::replace(&mut state.world, bonus));

            let spawn = def.spawn.to_world();
            state.player.body.pos = Vec2::new(spawn.x, spawn.y - DROP_IN_OFFSET);
            state.player.on_ground = false;
            log::info!("Entered bonus area {}", area.0);
        }
        WarpKind::Exit => {
            let Some(primary) = state.saved_world.take() else {
                return;
            };
            let left = std::mem::replace(&mut state.world, primary);

            // Emerge from the pipe the bonus area maps back to, falling back to
            // the pipe that led in
            let pipe = left
                .area
                .and_then(|id| level.bonus_area(id))
                .and_then(|def| state.world.tile_at(def.return_pipe))
                .or_else(|| {
                    state
                        .world
                        .tiles
                        .iter()
                        .find(|t| t.warp_target.is_some() && t.warp_target == left.area)
                })
                .map(|t| t.rect);

            if let Some(pipe) = pipe {
                warp.pipe = pipe;
                center_on(&mut state.player, &pipe);
                state.player.body.pos.y = pipe.y;
            }
            log::info!("Returned to primary level");
        }
    }
}

fn finish(state: &mut GameState, kind: WarpKind) {
    state.warp.active = None;
    state.warp.cooldown = WARP_COOLDOWN_TICKS;
    state.warp.overlay = 0.0;
    log::info!("Warp complete: {kind:?}");
    state.events.push(GameEvent::WarpComplete { kind });
}
