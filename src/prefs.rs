//! Persistent user preferences.
//!
//! Two values survive between sessions: the last search query and the
//! dark-mode flag. They live in a flat string key-value store under fixed
//! keys, with no namespacing or expiry. Writes are synchronous.
//!
//! # Backends
//!
//! - [`FileStore`]: one JSON object on disk, rewritten on every change
//! - `MemoryStore`: process-local map, test builds only

use crate::error::PrefsError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const LAST_QUERY_KEY: &str = "lastQuery";
pub const DARK_MODE_KEY: &str = "darkMode";

const ENABLED: &str = "enabled";
const DISABLED: &str = "disabled";

/// Minimal string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError>;
}

/// In-memory [`KeyValueStore`].
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// [`KeyValueStore`] backed by a JSON file.
///
/// A missing file is an empty store. An unreadable or malformed file is
/// logged and treated as empty; it is overwritten on the next `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring malformed preferences file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read preferences file");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), keys = values.len(), "Opened preferences");
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

/// Typed access to the stored preferences.
#[derive(Debug)]
pub struct PreferenceStore<S> {
    store: S,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn save_last_query(&mut self, query: &str) -> Result<(), PrefsError> {
        self.store.set(LAST_QUERY_KEY, query)
    }

    /// Last saved query, or an empty string.
    pub fn load_last_query(&self) -> String {
        self.store.get(LAST_QUERY_KEY).unwrap_or_default()
    }

    pub fn save_dark_mode(&mut self, enabled: bool) -> Result<(), PrefsError> {
        self.store
            .set(DARK_MODE_KEY, if enabled { ENABLED } else { DISABLED })
    }

    /// Only the literal `"enabled"` turns dark mode on.
    pub fn load_dark_mode(&self) -> bool {
        self.store.get(DARK_MODE_KEY).as_deref() == Some(ENABLED)
    }

    #[cfg(test)]
    pub fn into_inner(self) -> S {
        self.store
    }
}
