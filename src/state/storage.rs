//! Durable key-value storage.
//!
//! The stores persist JSON documents under string keys, the same way a
//! browser's local storage would hold them. [`MemoryStorage`] backs tests and
//! embedders that persist elsewhere; [`FileStorage`] keeps one file per key
//! in a data directory and can keep rotated backups of chosen keys.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use log::debug;
use walkdir::WalkDir;

use crate::error::{Result, StudioError};

/// Storage key of the project autosave document.
pub const PROJECT_STORAGE_KEY: &str = "conlang_studio_autosave";

/// Storage key of the settings document.
pub const SETTINGS_STORAGE_KEY: &str = "conlang_studio_settings";

/// Storage key of the generative-model API key.
pub const API_KEY_STORAGE_KEY: &str = "user_gemini_api_key";

/// Directory (inside the data directory) holding rotated backups.
pub const BACKUPS_DIR: &str = "backups";

/// Extension for stored documents.
const STORAGE_EXTENSION: &str = ".json";

/// Durable string storage keyed by name.
pub trait Storage: Send + Sync {
    /// Read a key; `Ok(None)` when it was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

// ============================================================================
// In-memory storage
// ============================================================================

/// Process-local storage that records every write.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<String, String>,
    writes: Vec<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with one key, without counting it as a write.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .lock()
            .values
            .insert(key.to_string(), value.to_string());
        storage
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        // A poisoned lock only means a test panicked mid-write; the map is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Keys written so far, in write order.
    pub fn writes(&self) -> Vec<String> {
        self.lock().writes.clone()
    }

    /// Number of writes made to `key`.
    pub fn write_count(&self, key: &str) -> usize {
        self.lock().writes.iter().filter(|k| *k == key).count()
    }

    /// Raw value of a key, for assertions.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.lock().values.get(key).cloned()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.values.insert(key.to_string(), value.to_string());
        inner.writes.push(key.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().values.remove(key);
        Ok(())
    }
}

// ============================================================================
// File-backed storage
// ============================================================================

/// One JSON file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Directory holding `<key>.json` files.
    root: PathBuf,

    /// Keys whose previous value is kept in `backups/` when overwritten.
    backup_keys: Vec<String>,

    /// Maximum number of backups retained per key.
    max_backups: usize,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StudioError::DirectoryCreateError {
            path: root.clone(),
            source: e,
        })?;
        Ok(Self {
            root,
            backup_keys: Vec::new(),
            max_backups: 0,
        })
    }

    /// Keep up to `max` rotated backups of `key`.
    pub fn with_backups(mut self, key: &str, max: usize) -> Self {
        self.backup_keys.push(key.to_string());
        self.max_backups = max;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join(BACKUPS_DIR)
    }

    /// Path of the file holding `key`.
    pub fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}{}", sanitize_key(key), STORAGE_EXTENSION))
    }

    /// Copy the current value of `key` into the backups directory, then rotate.
    fn backup_previous(&self, key: &str, current: &Path) -> Result<()> {
        let backups_dir = self.backups_dir();
        fs::create_dir_all(&backups_dir).map_err(|e| StudioError::DirectoryCreateError {
            path: backups_dir.clone(),
            source: e,
        })?;

        // Millisecond stamp: autosaves can land several times per second.
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S%3f");
        let prefix = backup_prefix(key);
        let backup_path = backups_dir.join(format!("{}{}{}", prefix, timestamp, STORAGE_EXTENSION));
        fs::copy(current, &backup_path).map_err(|e| StudioError::FileWriteError {
            path: backup_path.clone(),
            source: e,
        })?;

        self.rotate_backups(key)
    }

    /// Delete the oldest backups of `key` beyond the retention limit.
    pub fn rotate_backups(&self, key: &str) -> Result<()> {
        let mut backups = self.list_backups(key)?;

        // Sorted newest first; pop from the end to drop the oldest.
        while backups.len() > self.max_backups {
            if let Some(oldest) = backups.pop() {
                fs::remove_file(&oldest).map_err(|e| StudioError::FileWriteError {
                    path: oldest,
                    source: e,
                })?;
            }
        }

        Ok(())
    }

    /// Backups of `key`, newest first.
    pub fn list_backups(&self, key: &str) -> Result<Vec<PathBuf>> {
        let backups_dir = self.backups_dir();
        if !backups_dir.exists() {
            return Ok(Vec::new());
        }

        let prefix = backup_prefix(key);
        let mut backups: Vec<PathBuf> = WalkDir::new(&backups_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy();
                name.starts_with(&prefix) && name.ends_with(STORAGE_EXTENSION)
            })
            .map(|entry| entry.path().to_path_buf())
            .collect();

        // The timestamp in the name sorts chronologically.
        backups.sort_by(|a, b| {
            let a_name = a.file_name().unwrap_or_default().to_string_lossy();
            let b_name = b.file_name().unwrap_or_default().to_string_lossy();
            b_name.cmp(&a_name)
        });

        Ok(backups)
    }

    /// Most recent backup of `key`, if any.
    pub fn latest_backup(&self, key: &str) -> Result<Option<PathBuf>> {
        Ok(self.list_backups(key)?.into_iter().next())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StudioError::FileReadError { path, source: e })
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);

        if self.max_backups > 0 && self.backup_keys.iter().any(|k| k == key) && path.exists() {
            self.backup_previous(key, &path)?;
        }

        // Write to a sibling temp file and rename so a crash never leaves half a document.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| StudioError::FileWriteError {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &path).map_err(|e| StudioError::FileWriteError {
            path: path.clone(),
            source: e,
        })?;

        debug!("Stored {} ({} bytes)", path.display(), value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| StudioError::FileWriteError { path, source: e })?;
        }
        Ok(())
    }
}

/// Keys become file names; anything outside `[A-Za-z0-9._-]` maps to `_`.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn backup_prefix(key: &str) -> String {
    format!("{}_", sanitize_key(key))
}
