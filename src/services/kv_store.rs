//! Device-local key-value persistence
//!
//! Plain string keys and values with no transactions; callers serialize what
//! they store.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{debug, info, warn};

/// Simple get/set/remove store keyed by string
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&self, key: &str) -> Result<(), String>;
}

/// Store that lives only as long as the process
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
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.entries
            .lock()
            .map_err(|e| format!("Failed to lock memory store: {}", e))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        self.entries
            .lock()
            .map_err(|e| format!("Failed to lock memory store: {}", e))?
            .remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file, rewritten on every change
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store, starting empty when the file does not exist yet.
    ///
    /// An unparseable file is moved aside to `<name>.corrupt` and the store
    /// starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, String> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw).unwrap_or_else(|e| {
                    warn!("Failed to parse {}: {}, starting empty", path.display(), e);
                    Self::set_aside(&path);
                    BTreeMap::new()
                })
            }
        } else {
            BTreeMap::new()
        };

        info!("Opened key-value store at {} ({} keys)", path.display(), entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn set_aside(path: &Path) {
        let aside = path.with_extension("json.corrupt");
        match fs::rename(path, &aside) {
            Ok(()) => warn!("Moved unreadable store to {}", aside.display()),
            Err(e) => warn!("Failed to move {} aside: {}", path.display(), e),
        }
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), String> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| format!("Failed to serialize store: {}", e))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| format!("Failed to write {}: {}", tmp.display(), e))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| format!("Failed to replace {}: {}", self.path.display(), e))?;
        debug!("Flushed {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| format!("Failed to lock key-value store: {}", e))?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| format!("Failed to lock key-value store: {}", e))?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set("consecutive_skips", "2").unwrap();
        store.set("other", "x").unwrap();
        store.remove("other").unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("consecutive_skips").as_deref(), Some("2"));
        assert_eq!(reopened.get("other"), None);
    }

    #[test]
    fn test_file_store_sets_corrupt_file_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("consecutive_skips"), None);
        assert_eq!(
            fs::read_to_string(dir.path().join("local.json.corrupt")).unwrap(),
            "not json"
        );

        store.set("consecutive_skips", "1").unwrap();
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("consecutive_skips").as_deref(), Some("1"));
    }
}
