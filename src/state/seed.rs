//! Starter-project sources used on first boot.

use std::fs;
use std::path::PathBuf;

use crate::error::{Result, StudioError};

/// The starter project shipped with the crate.
const BUNDLED_SEED: &str = include_str!("../../assets/seed_project.json");

/// Somewhere the first-boot project document can be fetched from.
pub trait SeedSource {
    /// Fetch the raw seed JSON. Called at most once per boot.
    fn fetch(&self) -> Result<String>;

    /// Human-readable origin for log lines.
    fn describe(&self) -> String;
}

/// Seed compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledSeed;

impl SeedSource for BundledSeed {
    fn fetch(&self) -> Result<String> {
        Ok(BUNDLED_SEED.to_string())
    }

    fn describe(&self) -> String {
        "bundled starter project".to_string()
    }
}

/// Seed read from a file on disk.
#[derive(Debug, Clone)]
pub struct FileSeed(pub PathBuf);

impl SeedSource for FileSeed {
    fn fetch(&self) -> Result<String> {
        fs::read_to_string(&self.0).map_err(|e| StudioError::SeedUnavailable {
            reason: format!("{}: {}", self.0.display(), e),
        })
    }

    fn describe(&self) -> String {
        self.0.display().to_string()
    }
}

/// Fixed seed text, for embedders and tests.
#[derive(Debug, Clone)]
pub struct StaticSeed(pub String);

impl SeedSource for StaticSeed {
    fn fetch(&self) -> Result<String> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "inline seed".to_string()
    }
}

/// A seed that is never reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSeed;

impl SeedSource for NoSeed {
    fn fetch(&self) -> Result<String> {
        Err(StudioError::SeedUnavailable {
            reason: "no seed configured".to_string(),
        })
    }

    fn describe(&self) -> String {
        "no seed".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProjectDocument;

    #[test]
    fn test_bundled_seed_parses() {
        let doc = ProjectDocument::from_json(&BundledSeed.fetch().unwrap()).unwrap();
        assert!(!doc.lexicon.is_empty());
        assert!(!doc.phonology.vowels.is_empty());
    }

    #[test]
    fn test_missing_file_seed() {
        let err = FileSeed(PathBuf::from("/definitely/not/here.json"))
            .fetch()
            .unwrap_err();
        assert_eq!(err.error_code(), "SEED_UNAVAILABLE");
    }
}
