//! Clear-time ranking
//!
//! Top 10 cleared runs by score. Storage is the host's business; this module
//! only (de)serializes under a fixed key.

use serde::{Deserialize, Serialize};

use crate::error::RankingError;
use crate::sim::ClearRecord;

/// Maximum number of ranking entries to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Key the host stores the serialized ranking under
pub const STORAGE_KEY: &str = "super_runner_ranking";

/// Longest name kept in an entry
const MAX_NAME_CHARS: usize = 12;

/// A single ranking entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
    /// Level clear time in whole seconds
    pub elapsed_secs: u64,
}

/// Ranking, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty ranking
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the ranking
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a score (if it qualifies). Returns the rank achieved (1-indexed).
    pub fn add_score(&mut self, name: &str, score: u64, elapsed_secs: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let name = name.trim();
        let name = if name.is_empty() { "???" } else { name };
        let entry = HighScoreEntry {
            name: name.chars().take(MAX_NAME_CHARS).collect(),
            score,
            elapsed_secs,
        };

        // Ties rank below existing entries
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        log::info!("Ranked #{rank} with {score}");
        Some(rank)
    }

    /// Record a level clear reported by the game state
    pub fn add_clear(&mut self, name: &str, clear: ClearRecord) -> Option<usize> {
        self.add_score(name, clear.score, clear.elapsed_secs)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn to_json(&self) -> Result<String, RankingError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a stored ranking, re-sorting and trimming whatever was stored
    pub fn from_json(json: &str) -> Result<Self, RankingError> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} ranking entries", scores.entries.len());
        Ok(scores)
    }
}
