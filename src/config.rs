//! Runtime configuration.
//!
//! Values come from defaults, then the `CONLANG_STUDIO_HOME` environment
//! variable, then command-line flags.

use std::env;
use std::path::PathBuf;

use crate::command::console::DEFAULT_MAX_HISTORY;
use crate::error::Result;
use crate::state::storage::PROJECT_STORAGE_KEY;
use crate::state::{BundledSeed, FileSeed, FileStorage, SeedSource};

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "CONLANG_STUDIO_HOME";

/// Data directory used when nothing else is configured.
pub const DEFAULT_DATA_DIR: &str = ".conlang-studio";

/// Rotated project backups kept by default.
pub const DEFAULT_MAX_BACKUPS: usize = 10;

/// Viewport height assumed when the host does not report one.
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 900;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    /// Directory holding the stored documents and backups.
    pub data_dir: PathBuf,

    /// Starter project; the bundled one when `None`.
    pub seed_path: Option<PathBuf>,

    pub max_backups: usize,

    /// Console log entries kept before the oldest are dropped.
    pub max_console_history: usize,

    pub viewport_height: u32,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            seed_path: None,
            max_backups: DEFAULT_MAX_BACKUPS,
            max_console_history: DEFAULT_MAX_HISTORY,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl StudioConfig {
    /// Defaults with the environment applied.
    pub fn from_env() -> Self {
        Self::default().with_home(env::var_os(HOME_ENV).map(PathBuf::from))
    }

    /// Replace the data directory when `home` is set.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        if let Some(home) = home.filter(|p| !p.as_os_str().is_empty()) {
            self.data_dir = home;
        }
        self
    }

    pub fn with_seed(mut self, seed: Option<PathBuf>) -> Self {
        if seed.is_some() {
            self.seed_path = seed;
        }
        self
    }

    /// Where the starter project is read from.
    pub fn seed_source(&self) -> Box<dyn SeedSource> {
        match &self.seed_path {
            Some(path) => Box::new(FileSeed(path.clone())),
            None => Box::new(BundledSeed),
        }
    }

    /// File storage in the data directory, keeping project backups.
    pub fn open_storage(&self) -> Result<FileStorage> {
        Ok(FileStorage::open(&self.data_dir)?.with_backups(PROJECT_STORAGE_KEY, self.max_backups))
    }
}
