//! Game state and session flow
//!
//! Everything the frame loop mutates lives here. Timed follow-ups (respawn,
//! boss-defeat-to-clear) are countdown fields polled by `tick`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::items::{Particle, palette, spawn_particles};
use super::player::Player;
use super::rect::Rect;
use super::warp::{WarpKind, WarpState};
use super::world::World;
use crate::consts::*;
use crate::level::{LEVELS, LevelDef};
use crate::tuning::Tuning;

/// Screen shake strength on player death
pub const SHAKE_ON_DEATH: f32 = 15.0;
/// Screen shake strength on a boss hit
pub const SHAKE_ON_BOSS_HIT: f32 = 20.0;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for `start_game`
    Title,
    /// Active gameplay
    Playing,
    /// Level finished; waiting for `advance_level`
    Cleared,
    /// Out of lives; waiting for `restart`
    GameOver,
}

/// Discrete signals for the HUD and screen flow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreChanged(u64),
    LifeLost { remaining: u8 },
    GameOver,
    GoalReached,
    BossDefeated,
    LevelCleared {
        level: usize,
        elapsed_secs: u64,
        time_bonus: u64,
        score: u64,
    },
    QuestionStruck,
    MoonCollected,
    EnemyStomped,
    EnemyBumped,
    WarpStarted { kind: WarpKind },
    WarpComplete { kind: WarpKind },
    Respawned,
    /// Advanced past the last level
    CampaignComplete,
}

/// What a ranking entry needs from a clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearRecord {
    pub score: u64,
    pub elapsed_secs: u64,
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Level catalog in play order
    pub catalog: &'static [LevelDef],
    pub level_index: usize,
    pub lives: u8,
    pub score: u64,
    /// Steps since the session started
    pub time_ticks: u64,
    /// Steps since the current level was loaded
    pub level_ticks: u64,
    pub phase: GamePhase,
    pub player: Player,
    /// Active play area
    pub world: World,
    /// Primary world parked while a bonus area is active
    pub saved_world: Option<World>,
    pub warp: WarpState,
    /// Steps until respawn or game over
    pub respawn_timer: Option<u32>,
    /// Steps until the level clears after the boss falls
    pub clear_timer: Option<u32>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub screen_shake: f32,
    /// Pending events, drained by the host each frame
    pub events: Vec<GameEvent>,
    pub last_clear: Option<ClearRecord>,
}

/// Presentation view serialized by `snapshot_json`
#[derive(Serialize)]
struct Snapshot<'a> {
    phase: GamePhase,
    level_index: usize,
    level_name: &'static str,
    score: u64,
    lives: u8,
    elapsed_secs: u64,
    player: &'a Player,
    world: &'a World,
    in_bonus_area: bool,
    warp_overlay: f32,
    pipe_over_player: Option<Rect>,
    screen_shake: f32,
}

impl GameState {
    /// Create a game on the shipped campaign, sitting at the title
    pub fn new(seed: u64) -> Self {
        Self::with_catalog(seed, LEVELS)
    }

    /// Create a game on a custom level catalog. An empty catalog falls back to
    /// the shipped one.
    pub fn with_catalog(seed: u64, catalog: &'static [LevelDef]) -> Self {
        let catalog = if catalog.is_empty() {
            log::warn!("Empty level catalog, using shipped levels");
            LEVELS
        } else {
            catalog
        };
        let tuning = Tuning::default();
        let first = &catalog[0];
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            world: World::from_level(first, &tuning),
            player: Player::new(first.player_start.to_world()),
            tuning,
            catalog,
            level_index: 0,
            lives: START_LIVES,
            score: 0,
            time_ticks: 0,
            level_ticks: 0,
            phase: GamePhase::Title,
            saved_world: None,
            warp: WarpState::default(),
            respawn_timer: None,
            clear_timer: None,
            particles: Vec::new(),
            screen_shake: 0.0,
            events: Vec::new(),
            last_clear: None,
        }
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Definition of the level being played
    pub fn level(&self) -> &'static LevelDef {
        let catalog = self.catalog;
        crate::level::level(catalog, self.level_index).unwrap_or(&catalog[0])
    }

    /// Begin a fresh run from the first level
    pub fn start_game(&mut self) {
        self.score = 0;
        self.lives = START_LIVES;
        self.time_ticks = 0;
        self.last_clear = None;
        self.load_level(0);
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::ScoreChanged(self.score));
    }

    /// Start over after a game over
    pub fn restart(&mut self) {
        log::info!("Restarting run");
        self.start_game();
    }

    /// Build the world for a level and place the player at its start. An
    /// out-of-range index loads the first level instead.
    pub fn load_level(&mut self, index: usize) {
        let index = if index < self.catalog.len() {
            index
        } else {
            log::warn!("Level index {index} out of range, loading level 0");
            0
        };
        let catalog = self.catalog;
        let def = &catalog[index];
        if let Err(e) = def.validate(index) {
            log::warn!("Loading flagged level: {e}");
        }

        self.level_index = index;
        self.level_ticks = 0;
        self.world = World::from_level(def, &self.tuning);
        self.saved_world = None;
        self.warp = WarpState::default();
        self.player = Player::new(def.player_start.to_world());
        self.respawn_timer = None;
        self.clear_timer = None;
        self.particles.clear();
        self.screen_shake = 0.0;
        log::info!("Loaded level {}: {}", index, def.name);
    }

    /// Move on after a clear. Past the last level the session returns to the
    /// title and this returns false.
    pub fn advance_level(&mut self) -> bool {
        let next = self.level_index + 1;
        if next >= self.catalog.len() {
            log::info!("Campaign complete with score {}", self.score);
            self.phase = GamePhase::Title;
            self.events.push(GameEvent::CampaignComplete);
            return false;
        }
        self.load_level(next);
        self.phase = GamePhase::Playing;
        true
    }

    pub fn award(&mut self, points: u64) {
        self.score += points;
        self.events.push(GameEvent::ScoreChanged(self.score));
    }

    pub fn burst(&mut self, at: Vec2, count: usize, color: u32) {
        spawn_particles(&mut self.particles, &mut self.rng, at, count, color);
    }

    /// Kill the player and schedule the respawn-or-game-over follow-up.
    /// No-op while dead or invincible; returns whether the player died.
    pub fn kill_player(&mut self) -> bool {
        if !self.player.die() {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        self.screen_shake = SHAKE_ON_DEATH;
        let center = self.player.body.rect().center();
        self.burst(center, 20, palette::DEATH);
        self.respawn_timer = Some(self.tuning.respawn_delay);
        log::info!("Player died, {} lives left", self.lives);
        self.events.push(GameEvent::LifeLost {
            remaining: self.lives,
        });
        true
    }

    /// Fresh player at the level start with respawn invincibility. Dying in a
    /// bonus area puts the primary world back first.
    pub fn respawn(&mut self) {
        if let Some(primary) = self.saved_world.take() {
            self.world = primary;
        }
        self.warp = WarpState::default();

        let mut player = Player::new(self.level().player_start.to_world());
        player.invincible = self.tuning.invincible_time;
        self.player = player;
        self.particles.clear();
        self.world.camera = Vec2::ZERO;
        log::debug!("Player respawned");
        self.events.push(GameEvent::Respawned);
    }

    pub(crate) fn game_over(&mut self) {
        log::info!("Game over with score {}", self.score);
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver);
    }

    /// Whole seconds spent on the current level
    pub fn elapsed_secs(&self) -> u64 {
        self.tuning.ticks_to_secs(self.level_ticks)
    }

    /// Finish the level: add the time bonus and record the clear. Only fires
    /// once per level.
    pub fn clear_level(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let elapsed_secs = self.elapsed_secs();
        let time_bonus = TIME_BONUS_PAR_SECS.saturating_sub(elapsed_secs) * TIME_BONUS_PER_SEC;
        self.award(time_bonus);
        self.phase = GamePhase::Cleared;
        self.clear_timer = None;
        self.last_clear = Some(ClearRecord {
            score: self.score,
            elapsed_secs,
        });
        log::info!(
            "Level {} cleared in {}s (+{} bonus), score {}",
            self.level_index,
            elapsed_secs,
            time_bonus,
            self.score
        );
        self.events.push(GameEvent::LevelCleared {
            level: self.level_index,
            elapsed_secs,
            time_bonus,
            score: self.score,
        });
    }

    /// The most recent clear, for the ranking collaborator
    pub fn clear_record(&self) -> Option<ClearRecord> {
        self.last_clear
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pipe that must be drawn on top of the player this frame
    pub fn pipe_drawn_over_player(&self) -> Option<Rect> {
        self.warp.pipe_over_player()
    }

    /// JSON view of everything presentation needs
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Snapshot {
            phase: self.phase,
            level_index: self.level_index,
            level_name: self.level().name,
            score: self.score,
            lives: self.lives,
            elapsed_secs: self.elapsed_secs(),
            player: &self.player,
            world: &self.world,
            in_bonus_area: self.world.is_bonus(),
            warp_overlay: self.warp.overlay,
            pipe_over_player: self.pipe_drawn_over_player(),
            screen_shake: self.screen_shake,
        })
    }
}
