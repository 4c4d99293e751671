//! Super Runner entry point
//!
//! Headless runner: plays the shipped campaign with a scripted autopilot and
//! logs the event stream. An optional first argument names a tuning JSON file.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::Path;

    use super_runner::Tuning;
    use super_runner::highscores::{HighScores, STORAGE_KEY};
    use super_runner::level::{LEVELS, validate_catalog};
    use super_runner::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

    const SEED: u64 = 0x5eed_c0de;
    /// Give up after five minutes of simulated play
    const MAX_TICKS: u32 = 60 * 60 * 5;

    /// Run right, hopping on a fixed rhythm with a double jump at the top
    fn autopilot(t: u32) -> TickInput {
        let phase = t % 48;
        TickInput {
            right: true,
            jump: phase < 8 || (14..20).contains(&phase),
            ..Default::default()
        }
    }

    pub fn run() {
        env_logger::init();
        log::info!("Super Runner (headless) starting...");

        for problem in validate_catalog(LEVELS) {
            log::warn!("{problem}");
        }

        let tuning = match std::env::args().nth(1) {
            Some(path) => match Tuning::load(Path::new(&path)) {
                Ok(t) => t,
                Err(e) => {
                    log::warn!("Ignoring tuning file {path}: {e}");
                    Tuning::default()
                }
            },
            None => Tuning::default(),
        };

        let mut state = GameState::new(SEED).with_tuning(tuning);
        let mut ranking = HighScores::new();
        state.start_game();

        for t in 0..MAX_TICKS {
            tick(&mut state, &autopilot(t));

            for event in state.drain_events() {
                match event {
                    GameEvent::ScoreChanged(_) => {}
                    other => log::debug!("t={t} {other:?}"),
                }
            }

            match state.phase {
                GamePhase::Playing => {}
                GamePhase::Cleared => {
                    if let Some(clear) = state.clear_record() {
                        ranking.add_clear("AUTO", clear);
                    }
                    if !state.advance_level() {
                        break;
                    }
                }
                GamePhase::GameOver | GamePhase::Title => break,
            }
        }

        println!(
            "level {} ({}), score {}, lives {}",
            state.level_index,
            state.level().name,
            state.score,
            state.lives
        );
        match ranking.to_json() {
            Ok(json) => println!("{STORAGE_KEY} = {json}"),
            Err(e) => log::error!("Could not encode ranking: {e}"),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by the host page; nothing to run here
}
