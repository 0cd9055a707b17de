//! Durable storage for the local engine.
//!
//! Values are stored as JSON strings under fixed keys. Reading never fails:
//! a missing or unreadable record is treated as absent, and failed writes are
//! logged and otherwise ignored so storage problems never block a game.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chainsweeper_core::{Game, PlayerStats};
use chainsweeper_protocol::GameMode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub trait StorageKey {
    const KEY: &'static str;
}

impl StorageKey for Game {
    const KEY: &'static str = "chainsweeper:game";
}

impl StorageKey for PlayerStats {
    const KEY: &'static str = "chainsweeper:stats";
}

impl StorageKey for GameMode {
    const KEY: &'static str = "chainsweeper:mode";
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// String key-value storage backend.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store, used by tests and as a last-resort backend.
#[derive(Debug, Default)]
pub struct MemoryStore(Mutex<HashMap<String, String>>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a data directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(file_name).with_extension("json")
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Browser `localStorage`.
#[cfg(target_arch = "wasm32")]
#[derive(Copy, Clone, Debug, Default)]
pub struct WebStorage;

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for WebStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        use gloo::storage::{LocalStorage, Storage};
        LocalStorage::raw()
            .get_item(key)
            .map_err(|err| StorageError::Backend(format!("{err:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        use gloo::storage::{LocalStorage, Storage};
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|err| StorageError::Backend(format!("{err:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        use gloo::storage::{LocalStorage, Storage};
        LocalStorage::raw()
            .remove_item(key)
            .map_err(|err| StorageError::Backend(format!("{err:?}")))
    }
}

/// Typed access to the game, statistics and mode records.
#[derive(Clone)]
pub struct PersistenceStore {
    backend: Arc<dyn KeyValueStore>,
}

impl PersistenceStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Reads a record, treating missing and unreadable ones alike as absent.
    pub fn load<T: StorageKey + DeserializeOwned>(&self) -> Option<T> {
        let raw = match self.backend.get(T::KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::debug!("No saved record under {}", T::KEY);
                return None;
            }
            Err(err) => {
                log::warn!("Could not read {} from storage: {}", T::KEY, err);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("Discarding corrupted record {}: {}", T::KEY, err);
                None
            }
        }
    }

    pub fn save<T: StorageKey + Serialize>(&self, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(StorageError::from)
            .and_then(|raw| self.backend.set(T::KEY, &raw));
        if let Err(err) = result {
            log::error!("Could not save {} to storage: {}", T::KEY, err);
        }
    }

    pub fn clear<T: StorageKey>(&self) {
        if let Err(err) = self.backend.remove(T::KEY) {
            log::error!("Could not remove {} from storage: {}", T::KEY, err);
        }
    }

    /// The saved game, if it exists and is internally consistent.
    pub fn load_game(&self) -> Option<Game> {
        let game: Game = self.load()?;
        if game.is_consistent() {
            Some(game)
        } else {
            log::warn!("Discarding inconsistent saved game");
            None
        }
    }

    /// The saved statistics, zeroed when missing or contradictory.
    pub fn load_stats(&self) -> PlayerStats {
        let stats: PlayerStats = self.load().unwrap_or_default();
        if stats.is_consistent() {
            stats
        } else {
            log::warn!(
                "Discarding saved stats with {} wins out of {} games",
                stats.games_won,
                stats.total_games_played
            );
            PlayerStats::default()
        }
    }

    pub fn load_mode(&self) -> Option<GameMode> {
        self.load()
    }
}
