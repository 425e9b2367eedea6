//! High score persistence collaborator
//!
//! The engine only ever hands out an integer to persist and asks for the
//! last persisted one at startup. Storage failures must never reach the
//! simulation: loads degrade to 0, saves are fire-and-forget.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk envelope, versioned so the format can grow
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HighScoreFile {
    version: u32,
    score: u32,
}

const FILE_VERSION: u32 = 1;

/// File-backed high score store
#[derive(Debug, Clone)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store under the user's home directory (falls back to the current
    /// directory when HOME is unset)
    pub fn default_location() -> Self {
        let base = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(".rex-runner").join("highscore.json"))
    }

    /// Last persisted high score; 0 on absence or any read/parse failure
    pub fn load(&self) -> u32 {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(_) => {
                log::info!("no high score file, starting fresh");
                return 0;
            }
        };
        match serde_json::from_str::<HighScoreFile>(&json) {
            Ok(file) => {
                log::info!("loaded high score {}", file.score);
                file.score
            }
            Err(err) => {
                log::warn!("high score file unreadable: {err}");
                0
            }
        }
    }

    /// Persist a new high score; failures are logged and swallowed
    pub fn save(&self, score: u32) {
        let file = HighScoreFile {
            version: FILE_VERSION,
            score,
        };
        let json = match serde_json::to_string(&file) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("high score serialize failed: {err}");
                return;
            }
        };
        if let Some(dir) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(dir) {
                log::warn!("high score dir create failed: {err}");
                return;
            }
        }
        if let Err(err) = fs::write(&self.path, json) {
            log::warn!("high score save failed: {err}");
        } else {
            log::info!("high score saved ({score})");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> HighScoreStore {
        let path = std::env::temp_dir()
            .join(format!("rex-runner-test-{}-{}", std::process::id(), name))
            .join("highscore.json");
        let _ = fs::remove_file(&path);
        HighScoreStore::new(path)
    }

    #[test]
    fn test_missing_file_loads_zero() {
        let store = temp_store("missing");
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn test_round_trip() {
        let store = temp_store("roundtrip");
        store.save(412);
        assert_eq!(store.load(), 412);
        store.save(977);
        assert_eq!(store.load(), 977);
    }

    #[test]
    fn test_corrupt_file_loads_zero() {
        let store = temp_store("corrupt");
        store.save(100);
        fs::write(&store.path, "not json{{").unwrap();
        assert_eq!(store.load(), 0);
    }
}
