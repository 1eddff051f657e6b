use crate::models::Goals;
use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tokio::fs;
use tracing::{error, warn};

pub const STREAK_KEY: &str = "streak";
pub const GOALS_KEY: &str = "goals_v1";

/// String key/value storage for client-local state.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A JSON object on disk, rewritten in full on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    pub async fn load(path: &Path) -> Self {
        let entries = match fs::read(path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    error!("failed to parse data file: {err}");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                error!("failed to read data file: {err}");
                BTreeMap::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_string(), value.to_string());
        let payload = serde_json::to_vec_pretty(&*entries).map_err(io::Error::other)?;
        std::fs::write(&self.path, payload)
    }
}

pub fn load_streak(store: &dyn KeyValueStore) -> u64 {
    store
        .get(STREAK_KEY)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

pub fn save_streak(store: &dyn KeyValueStore, streak: u64) -> io::Result<()> {
    store.set(STREAK_KEY, &streak.to_string())
}

pub fn load_goals(store: &dyn KeyValueStore) -> Goals {
    let Some(raw) = store.get(GOALS_KEY) else {
        return Goals::default();
    };
    match serde_json::from_str(&raw) {
        Ok(goals) => goals,
        Err(err) => {
            warn!("ignoring unreadable goals: {err}");
            Goals::default()
        }
    }
}

pub fn save_goals(store: &dyn KeyValueStore, goals: &Goals) -> io::Result<()> {
    let payload = serde_json::to_string(goals).map_err(io::Error::other)?;
    store.set(GOALS_KEY, &payload)
}
