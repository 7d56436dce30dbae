//! Client-side board snapshots.
//!
//! In-progress mini-game state persisted per `(session, player)` so a
//! restarted client resumes its hunt where it left off. The snapshot is an
//! explicit serialization boundary: it carries only what restore needs, so
//! transient animation and effect state is excluded by construction.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use protocol::{Address, SessionId};

/// Restorable board state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub x: u32,
    pub y: u32,
    pub energy_used: u32,
    pub found_treasure: bool,
}

/// Storage key: one snapshot per player per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardKey {
    pub session_id: SessionId,
    pub player: Address,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Snapshot persistence contract.
pub trait BoardStore: Send + Sync {
    fn save(&self, key: &BoardKey, snapshot: &BoardSnapshot) -> Result<()>;
    fn load(&self, key: &BoardKey) -> Result<Option<BoardSnapshot>>;
    fn exists(&self, key: &BoardKey) -> bool;
    fn delete(&self, key: &BoardKey) -> Result<()>;
    fn list_keys(&self) -> Result<Vec<BoardKey>>;
}

/// JSON files under a base directory, one per key.
///
/// Writes go through a temp file and an atomic rename, so a crash mid-save
/// never leaves a torn snapshot behind.
pub struct FileBoardStore {
    base_dir: PathBuf,
}

impl FileBoardStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn snapshot_path(&self, key: &BoardKey) -> PathBuf {
        self.base_dir.join(format!(
            "board_{}_{}.json",
            key.session_id,
            hex::encode(key.player.as_bytes())
        ))
    }
}

impl BoardStore for FileBoardStore {
    fn save(&self, key: &BoardKey, snapshot: &BoardSnapshot) -> Result<()> {
        let path = self.snapshot_path(key);
        let temp_path = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| StoreError::Json(e.to_string()))?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(session_id = key.session_id, player = %key.player, "board saved");
        Ok(())
    }

    fn load(&self, key: &BoardKey) -> Result<Option<BoardSnapshot>> {
        let path = self.snapshot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        let snapshot =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Json(e.to_string()))?;
        Ok(Some(snapshot))
    }

    fn exists(&self, key: &BoardKey) -> bool {
        self.snapshot_path(key).exists()
    }

    fn delete(&self, key: &BoardKey) -> Result<()> {
        let path = self.snapshot_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!(session_id = key.session_id, player = %key.player, "board deleted");
        }
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<BoardKey>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(stem) = filename
                    .strip_prefix("board_")
                    .and_then(|s| s.strip_suffix(".json"))
                && let Some((id, addr)) = stem.split_once('_')
                && let Ok(session_id) = id.parse::<SessionId>()
                && let Ok(bytes) = hex::decode(addr)
                && let Ok(bytes) = <[u8; 32]>::try_from(bytes)
            {
                keys.push(BoardKey {
                    session_id,
                    player: Address::from_bytes(bytes),
                });
            }
        }
        keys.sort_by_key(|key| (key.session_id, *key.player.as_bytes()));
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn key(session_id: SessionId, tag: u8) -> BoardKey {
        BoardKey {
            session_id,
            player: Address::from_bytes([tag; 32]),
        }
    }

    fn snapshot() -> BoardSnapshot {
        BoardSnapshot {
            x: 3,
            y: 5,
            energy_used: 14,
            found_treasure: false,
        }
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileBoardStore::new(dir.path()).unwrap();
        let key = key(42, 1);

        assert!(!store.exists(&key));
        assert_eq!(store.load(&key).unwrap(), None);

        store.save(&key, &snapshot()).unwrap();
        assert!(store.exists(&key));
        assert_eq!(store.load(&key).unwrap(), Some(snapshot()));
    }

    #[test]
    fn save_overwrites_the_previous_snapshot() {
        let dir = tempdir().unwrap();
        let store = FileBoardStore::new(dir.path()).unwrap();
        let key = key(42, 1);

        store.save(&key, &snapshot()).unwrap();
        let mut advanced = snapshot();
        advanced.energy_used = 30;
        advanced.found_treasure = true;
        store.save(&key, &advanced).unwrap();
        assert_eq!(store.load(&key).unwrap(), Some(advanced));
    }

    #[test]
    fn snapshots_are_isolated_per_session_and_player() {
        let dir = tempdir().unwrap();
        let store = FileBoardStore::new(dir.path()).unwrap();

        store.save(&key(42, 1), &snapshot()).unwrap();
        let mut other = snapshot();
        other.x = 9;
        store.save(&key(42, 2), &other).unwrap();
        store.save(&key(43, 1), &snapshot()).unwrap();

        assert_eq!(store.load(&key(42, 1)).unwrap(), Some(snapshot()));
        assert_eq!(store.load(&key(42, 2)).unwrap(), Some(other));
        assert_eq!(
            store.list_keys().unwrap(),
            vec![key(42, 1), key(42, 2), key(43, 1)]
        );
    }

    #[test]
    fn delete_removes_only_the_named_key() {
        let dir = tempdir().unwrap();
        let store = FileBoardStore::new(dir.path()).unwrap();
        store.save(&key(42, 1), &snapshot()).unwrap();
        store.save(&key(42, 2), &snapshot()).unwrap();

        store.delete(&key(42, 1)).unwrap();
        assert!(!store.exists(&key(42, 1)));
        assert!(store.exists(&key(42, 2)));
        // Deleting a missing key is a no-op.
        store.delete(&key(42, 1)).unwrap();
    }

    #[test]
    fn corrupt_files_surface_as_json_errors() {
        let dir = tempdir().unwrap();
        let store = FileBoardStore::new(dir.path()).unwrap();
        let key = key(42, 1);
        fs::write(store.snapshot_path(&key), b"{ not json").unwrap();
        assert!(matches!(store.load(&key), Err(StoreError::Json(_))));
    }
}
