//! Storage layer for taskbuddy
//!
//! All state lives under a single home directory:
//!
//! ```text
//! <home>/
//!   taskbuddy.toml              # Configuration
//!   session.json                # Currently signed-in identity
//!   store/                      # Per-user key-value store
//!     tasks-<uid>.json          # Full task list of one user
//!     goals-<uid>.json          # Full goal list of one user
//!     profile-<uid>.json        # Profile fields of one user
//! ```
//!
//! Stores never write deltas: every value is the complete serialized list,
//! replaced atomically.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};
use crate::identity::ActiveUser;
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};

/// Config file name inside the home directory
pub const CONFIG_FILE: &str = "taskbuddy.toml";

/// Session file name inside the home directory
pub const SESSION_FILE: &str = "session.json";

/// Directory holding the per-user values
pub const STORE_DIR: &str = "store";

/// Environment variable overriding the home directory
pub const HOME_ENV: &str = "TASKBUDDY_HOME";

/// Key under which `store` keeps the data of `uid`: `"<store>-<uid>"`.
pub fn namespaced_key(store: &str, uid: &str) -> String {
    format!("{store}-{uid}")
}

/// Key-value persistence surface the stores write through.
///
/// `get` returns `Ok(None)` for a key that was never written.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Read and decode the value under `key`.
///
/// A missing, unreadable or corrupt value yields `T::default()`; the failure
/// is logged and never reaches the caller.
pub fn load_or_default<T>(backend: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(err) => {
            tracing::error!(key, error = %err, "failed to read stored value");
            return T::default();
        }
    };

    if raw.trim().is_empty() {
        return T::default();
    }

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(key, error = %err, "stored value is malformed, treating as empty");
            T::default()
        }
    }
}

/// Serialize `value` in full and write it under `"<store>-<uid>"` for the
/// uid active right now. Does nothing while signed out.
///
/// Returns whether the value was written; failures are logged.
pub fn persist<T: Serialize + ?Sized>(
    backend: &dyn KeyValueStore,
    active: &ActiveUser,
    store: &str,
    value: &T,
) -> bool {
    let Some(uid) = active.get() else {
        tracing::debug!(store, "signed out, not persisting");
        return false;
    };
    let key = namespaced_key(store, &uid);

    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(err) => {
            tracing::error!(key = %key, error = %err, "failed to serialize value");
            return false;
        }
    };

    match backend.set(&key, &encoded) {
        Ok(()) => true,
        Err(err) => {
            tracing::error!(key = %key, error = %err, "failed to write value");
            false
        }
    }
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key under a directory, written atomically under a lock.
#[derive(Debug, Clone)]
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

    /// File backing `key`. Bytes outside `[A-Za-z0-9.-]` (including `_`)
    /// are written as `_XX` hex, so distinct keys never share a file.
    pub fn key_path(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.') {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("_{byte:02x}"));
            }
        }
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        lock::read_locked_str(&path, DEFAULT_LOCK_TIMEOUT_MS)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        lock::write_atomic_locked(&path, value.as_bytes(), DEFAULT_LOCK_TIMEOUT_MS)
    }
}

/// Home directory layout
#[derive(Debug, Clone)]
pub struct Storage {
    home: PathBuf,
}

impl Storage {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Resolve the home directory: explicit path, then `TASKBUDDY_HOME`,
    /// then the platform data directory.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self::new(path));
        }

        if let Ok(raw) = std::env::var(HOME_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Ok(Self::new(trimmed));
            }
        }

        let dirs = ProjectDirs::from("com", "taskbuddy", "taskbuddy").ok_or_else(|| {
            Error::OperationFailed("could not determine a data directory".to_string())
        })?;
        Ok(Self::new(dirs.data_dir()))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config_file(&self) -> PathBuf {
        self.home.join(CONFIG_FILE)
    }

    pub fn session_file(&self) -> PathBuf {
        self.home.join(SESSION_FILE)
    }

    pub fn store_dir(&self) -> PathBuf {
        self.home.join(STORE_DIR)
    }

    /// Create the home and store directories
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.store_dir())?;
        Ok(())
    }

    /// File-backed key-value store rooted at `store/`
    pub fn file_store(&self) -> FileStore {
        FileStore::new(self.store_dir())
    }

    /// Write JSON data atomically (write to temp, then rename)
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        lock::write_atomic(path, json.as_bytes())
    }

    /// Read JSON data from a file, `None` when it does not exist
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}
