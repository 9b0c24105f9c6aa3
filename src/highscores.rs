//! High score leaderboard system
//!
//! Persisted as a JSON file, tracks top 10 scores.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistenceError};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Default leaderboard file name
pub const HIGH_SCORE_FILE: &str = "highscores.json";

/// Name recorded when the player leaves the field blank
pub const DEFAULT_PLAYER_NAME: &str = "Anonymous";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's name (trimmed, never blank)
    pub name: String,
    /// Final score
    pub score: u64,
    /// Level reached
    pub difficulty: u32,
    /// Display label for the level, e.g. "Level 3"
    pub difficulty_label: String,
    /// Local time the run ended
    pub timestamp: String,
}

impl HighScoreEntry {
    /// Build an entry stamped with the current local time
    pub fn new(name: &str, score: u64, difficulty: u32) -> Self {
        Self {
            name: normalize_name(name),
            score,
            difficulty,
            difficulty_label: difficulty_label(difficulty),
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Label shown next to a score for the level reached
pub fn difficulty_label(level: u32) -> String {
    format!("Level {level}")
}

fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
    /// Backing file; `None` keeps the board in memory only
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl HighScores {
    /// Create empty in-memory leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            path: None,
        }
    }

    /// Load the leaderboard backed by `path`.
    /// A missing file starts fresh; an unreadable one is logged and replaced on the next save.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut scores = match persistence::load_json::<HighScores>(&path) {
            Ok(Some(scores)) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Discarding unreadable high scores: {e}");
                Self::new()
            }
        };

        // Files may have been edited by hand
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        scores.path = Some(path);
        scores
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the leaderboard to its backing file (no-op when in memory)
    pub fn save(&self) -> Result<(), PersistenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        persistence::save_json(path, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    fn flush(&self) {
        if let Err(e) = self.save() {
            log::error!("Failed to save high scores: {e}");
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
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

    /// Record a finished run and flush to disk.
    /// Returns the rank achieved (1-indexed) or None if it fell off the board.
    pub fn add_score(&mut self, name: &str, score: u64, difficulty: u32) -> Option<usize> {
        let rank = self.insert(HighScoreEntry::new(name, score, difficulty));
        self.flush();
        rank
    }

    /// Insert an entry in score order without touching the disk.
    /// Ties go after existing entries with the same score.
    pub fn insert(&mut self, entry: HighScoreEntry) -> Option<usize> {
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        (pos < MAX_HIGH_SCORES).then_some(pos + 1)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best entry (if any)
    pub fn top(&self) -> Option<&HighScoreEntry> {
        self.entries.first()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.top().map(|e| e.score)
    }

    /// Remove every entry and flush
    pub fn clear(&mut self) {
        self.entries.clear();
        self.flush();
        log::info!("High scores cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(name: &str, score: u64) -> HighScoreEntry {
        HighScoreEntry::new(name, score, 1)
    }

    /// Ten entries scoring 300, 280, ..., 120
    fn full_board() -> HighScores {
        let mut scores = HighScores::new();
        for i in 0..10 {
            scores.insert(entry(&format!("p{i}"), 300 - i * 20));
        }
        scores
    }

    #[test]
    fn test_partial_board_accepts_anything() {
        let mut scores = HighScores::new();
        assert!(scores.qualifies(0));
        assert_eq!(scores.potential_rank(0), Some(1));
        assert_eq!(scores.add_score("Ada", 50, 1), Some(1));
        assert_eq!(scores.add_score("Bob", 10, 1), Some(2));
        assert_eq!(scores.top_score(), Some(50));
    }

    #[test]
    fn test_full_board_ranking() {
        let mut scores = full_board();
        assert_eq!(scores.entries.last().map(|e| e.score), Some(120));
        assert!(scores.qualifies(150));
        assert_eq!(scores.potential_rank(150), Some(9));

        assert_eq!(scores.add_score("New", 150, 2), Some(9));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries[8].name, "New");
        assert_eq!(scores.entries.last().map(|e| e.score), Some(140));
    }

    #[test]
    fn test_full_board_rejects_ties_with_last() {
        let mut scores = full_board();
        assert!(!scores.qualifies(120));
        assert_eq!(scores.potential_rank(100), None);
        assert_eq!(scores.add_score("Late", 120, 1), None);
        assert!(scores.entries.iter().all(|e| e.name != "Late"));
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut scores = HighScores::new();
        scores.insert(entry("first", 100));
        scores.insert(entry("second", 100));
        assert_eq!(scores.entries[0].name, "first");
        assert_eq!(scores.entries[1].name, "second");
    }

    #[test]
    fn test_blank_name_becomes_anonymous() {
        let e = HighScoreEntry::new("   ", 10, 3);
        assert_eq!(e.name, "Anonymous");
        assert_eq!(e.difficulty_label, "Level 3");
        assert_eq!(HighScoreEntry::new("  Zed ", 10, 1).name, "Zed");
        // "YYYY-MM-DD HH:MM"
        assert_eq!(e.timestamp.len(), 16);
    }

    #[test]
    fn test_persists_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HIGH_SCORE_FILE);

        let mut scores = HighScores::load(&path);
        assert!(scores.is_empty());
        scores.add_score("Ada", 420, 1);
        scores.add_score("Bob", 990, 2);

        let reloaded = HighScores::load(&path);
        assert_eq!(reloaded.entries.len(), 2);
        assert_eq!(reloaded.top().map(|e| e.name.as_str()), Some("Bob"));

        let mut reloaded = reloaded;
        reloaded.clear();
        assert!(HighScores::load(&path).is_empty());
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HIGH_SCORE_FILE);
        std::fs::write(&path, "garbage").unwrap();

        let mut scores = HighScores::load(&path);
        assert!(scores.is_empty());
        // Next save overwrites the bad file
        scores.add_score("Ada", 1, 1);
        assert_eq!(HighScores::load(&path).entries.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_board_sorted_and_bounded(values in proptest::collection::vec(0u64..1000, 0..40)) {
            let mut scores = HighScores::new();
            for v in values {
                let rank = scores.potential_rank(v);
                let added = scores.insert(entry("p", v));
                prop_assert_eq!(rank, added);
                prop_assert!(scores.entries.len() <= MAX_HIGH_SCORES);
                prop_assert!(scores.entries.windows(2).all(|w| w[0].score >= w[1].score));
            }
        }
    }
}
