//! Error types for the fallible edges of the crate.
//!
//! The simulation step itself never fails; these cover fixture validation,
//! tuning input and ranking storage.

/// Problems found while loading or validating a level fixture.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LevelError {
    #[error("Level index {0} is out of range")]
    UnknownLevel(usize),

    #[error("Level {level}: player start ({x}, {y}) overlaps a solid tile")]
    SpawnInsideTile { level: usize, x: i32, y: i32 },

    #[error("Level {level}: warp pipe targets missing bonus area {area}")]
    MissingBonusArea { level: usize, area: u8 },

    #[error("Level {level}: bonus area {area} spawn overlaps a solid tile")]
    BonusSpawnInsideTile { level: usize, area: u8 },
}

/// Problems with a tuning document.
#[derive(thiserror::Error, Debug)]
pub enum TuningError {
    #[error("Malformed tuning: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid tuning value: {0}")]
    Invalid(String),
}

/// Problems decoding a stored ranking.
#[derive(thiserror::Error, Debug)]
pub enum RankingError {
    #[error("Malformed ranking: {0}")]
    Parse(#[from] serde_json::Error),
}
