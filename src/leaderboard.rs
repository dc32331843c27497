//! Per-game leaderboards persisted in a local JSON store.
//!
//! The store is a single JSON object mapping a storage key to a list of
//! [`GameResult`]s, mirroring browser local storage. Each list is kept sorted
//! by descending score and capped at [`MAX_ENTRIES`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;

use crate::model::{GameKind, GameResult};

/// Entries kept per leaderboard.
pub const MAX_ENTRIES: usize = 5;

/// Errors from leaderboard persistence.
#[derive(Debug, Error, Diagnostic)]
pub enum LeaderboardError {
    #[error("leaderboard I/O error: {message}")]
    #[diagnostic(
        code(noteblaster::leaderboard::io),
        help(
            "Failed to read or write the leaderboard file. Check that the data \
             directory exists and has correct permissions."
        )
    )]
    Io { message: String },
}

pub type LeaderboardResult<T> = std::result::Result<T, LeaderboardError>;

/// A capped list of results, best first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<GameResult>,
}

impl Leaderboard {
    /// Build from stored entries, restoring order and cap.
    pub fn from_entries(mut entries: Vec<GameResult>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_ENTRIES);
        Self { entries }
    }

    /// Add a result and re-rank. Ties keep the earlier result ahead.
    pub fn record(&mut self, result: GameResult) {
        self.entries.push(result);
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);
    }

    pub fn entries(&self) -> &[GameResult] {
        &self.entries
    }

    pub fn best(&self) -> Option<&GameResult> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// File-backed key/value store of leaderboards.
pub struct LeaderboardStore {
    path: PathBuf,
    boards: BTreeMap<String, Value>,
}

impl LeaderboardStore {
    /// Open or create a store at the given file path.
    ///
    /// An unreadable or corrupt file is logged and treated as empty.
    pub fn open(path: &Path) -> Self {
        let boards = match std::fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "could not parse leaderboard file, starting fresh");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read leaderboard file");
                BTreeMap::new()
            }
        };
        Self {
            path: path.to_path_buf(),
            boards,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The leaderboard for a game.
    ///
    /// An entry that cannot be parsed is dropped from the store, the way a
    /// browser client discards an unparsable local-storage item.
    pub fn load(&mut self, kind: GameKind) -> Leaderboard {
        let key = kind.storage_key();
        let Some(raw) = self.boards.get(key) else {
            return Leaderboard::default();
        };
        match serde_json::from_value::<Vec<GameResult>>(raw.clone()) {
            Ok(entries) => Leaderboard::from_entries(entries),
            Err(e) => {
                tracing::warn!(key, error = %e, "could not parse leaderboard entry, discarding");
                self.boards.remove(key);
                if let Err(e) = self.flush() {
                    tracing::warn!(error = %e, "failed to persist leaderboard cleanup");
                }
                Leaderboard::default()
            }
        }
    }

    /// Record a score for a game, stamped now, and persist.
    pub fn record(&mut self, kind: GameKind, score: u32) -> LeaderboardResult<Leaderboard> {
        self.record_result(kind, GameResult::now(score))
    }

    /// Record a finished result and persist.
    pub fn record_result(
        &mut self,
        kind: GameKind,
        result: GameResult,
    ) -> LeaderboardResult<Leaderboard> {
        let mut board = self.load(kind);
        board.record(result);
        let value = serde_json::to_value(board.entries()).map_err(|e| LeaderboardError::Io {
            message: format!("serialize leaderboard: {e}"),
        })?;
        self.boards.insert(kind.storage_key().to_string(), value);
        self.flush()?;
        tracing::debug!(game = %kind, entries = board.len(), "leaderboard updated");
        Ok(board)
    }

    /// Remove every score for a game.
    pub fn clear(&mut self, kind: GameKind) -> LeaderboardResult<()> {
        if self.boards.remove(kind.storage_key()).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> LeaderboardResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LeaderboardError::Io {
                message: format!("create dir {}: {e}", parent.display()),
            })?;
        }
        let json = serde_json::to_string_pretty(&self.boards).map_err(|e| LeaderboardError::Io {
            message: format!("serialize leaderboard: {e}"),
        })?;
        std::fs::write(&self.path, json).map_err(|e| LeaderboardError::Io {
            message: format!("write {}: {e}", self.path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: u32, date: &str) -> GameResult {
        GameResult {
            score,
            date: date.into(),
        }
    }

    #[test]
    fn record_keeps_top_five_descending() {
        let mut board = Leaderboard::default();
        for (i, score) in [30, 10, 50, 20, 40, 60, 0].into_iter().enumerate() {
            board.record(result(score, &format!("d{i}")));
        }
        let scores: Vec<u32> = board.entries().iter().map(|r| r.score).collect();
        assert_eq!(scores, [60, 50, 40, 30, 20]);
    }

    #[test]
    fn ties_keep_earlier_result_first() {
        let mut board = Leaderboard::default();
        board.record(result(10, "first"));
        board.record(result(10, "second"));
        assert_eq!(board.entries()[0].date, "first");
        assert_eq!(board.best().unwrap().date, "first");
    }

    #[test]
    fn from_entries_restores_invariants() {
        let entries = (0..8).map(|s| result(s, "d")).collect();
        let board = Leaderboard::from_entries(entries);
        assert_eq!(board.len(), MAX_ENTRIES);
        assert_eq!(board.best().unwrap().score, 7);
    }

    #[test]
    fn store_persists_per_game() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("data/leaderboard.json");
        {
            let mut store = LeaderboardStore::open(&path);
            store.record(GameKind::Shooting, 40).unwrap();
            store.record(GameKind::Flashcard, 70).unwrap();
        }
        let mut store = LeaderboardStore::open(&path);
        assert_eq!(store.load(GameKind::Shooting).best().unwrap().score, 40);
        assert_eq!(store.load(GameKind::Flashcard).best().unwrap().score, 70);
        assert!(store.load(GameKind::Matching).is_empty());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("leaderboard.json");
        std::fs::write(&path, "{ not json").unwrap();
        let mut store = LeaderboardStore::open(&path);
        assert!(store.load(GameKind::Shooting).is_empty());
        store.record(GameKind::Shooting, 10).unwrap();
        assert_eq!(LeaderboardStore::open(&path).load(GameKind::Shooting).len(), 1);
    }

    #[test]
    fn corrupt_entry_is_discarded() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("leaderboard.json");
        std::fs::write(
            &path,
            r#"{"noteBlasterLeaderboard.typing": "garbage",
                "noteBlasterLeaderboard.shooting": [{"score": 5, "date": "2025-01-01T00:00:00Z"}]}"#,
        )
        .unwrap();
        let mut store = LeaderboardStore::open(&path);
        assert!(store.load(GameKind::Typing).is_empty());
        assert_eq!(store.load(GameKind::Shooting).len(), 1);
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(!on_disk.contains("garbage"));
    }

    #[test]
    fn clear_removes_only_one_game() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("leaderboard.json");
        let mut store = LeaderboardStore::open(&path);
        store.record(GameKind::Typing, 20).unwrap();
        store.record(GameKind::Matching, 900).unwrap();
        store.clear(GameKind::Typing).unwrap();
        assert!(store.load(GameKind::Typing).is_empty());
        assert_eq!(store.load(GameKind::Matching).len(), 1);
    }
}
