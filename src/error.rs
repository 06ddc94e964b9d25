//! Error handling for Conlang Studio
//!
//! Every error carries an error code and, where one exists, a recovery
//! suggestion for the user. Load-boundary errors are logged and degraded by
//! the stores; the variants here are what reaches callers.

use std::path::PathBuf;

use thiserror::Error;

use crate::command::CommandId;
use crate::state::LoadOrigin;

/// Result type alias for Conlang Studio operations.
pub type Result<T> = std::result::Result<T, StudioError>;

/// Main error type for Conlang Studio operations.
#[derive(Error, Debug)]
pub enum StudioError {
    // File Errors
    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory creation failed: {path}: {source}")]
    DirectoryCreateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Storage Errors
    #[error("Storage key '{key}' is unavailable: {reason}")]
    StorageUnavailable { key: String, reason: String },

    // Document Errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid project document: {reason}")]
    InvalidDocument { reason: String },

    #[error("Seed document unavailable: {reason}")]
    SeedUnavailable { reason: String },

    // Load Lifecycle Errors
    #[error("Another load is already in progress ({origin})")]
    LoadInProgress { origin: LoadOrigin },

    #[error("Load ticket #{ticket} is not the pending load")]
    StaleLoadTicket { ticket: u64 },

    // Command Errors
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Handler for '{expected}' received a '{found}' payload")]
    PayloadMismatch {
        expected: CommandId,
        found: CommandId,
    },

    #[error("Unknown modal: {0}")]
    UnknownModal(String),

    #[error("Unknown view: {0}")]
    UnknownView(String),

    #[error("Invalid key combination '{input}': {reason}")]
    InvalidKeyCombo { input: String, reason: String },

    // Lexicon / Phonology Errors
    #[error("Duplicate lexicon entry: {word}")]
    DuplicateEntry { word: String },

    #[error("Lexicon entry not found: {selector}")]
    EntryNotFound { selector: String },

    #[error("Phoneme already exists: {symbol}")]
    PhonemeExists { symbol: String },

    #[error("Phoneme not found: {symbol}")]
    PhonemeNotFound { symbol: String },

    // Generic Errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StudioError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            StudioError::FileReadError { .. } => "FILE_READ_ERROR",
            StudioError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            StudioError::DirectoryCreateError { .. } => "DIRECTORY_CREATE_ERROR",
            StudioError::StorageUnavailable { .. } => "STORAGE_UNAVAILABLE",
            StudioError::Json(_) => "JSON_ERROR",
            StudioError::InvalidDocument { .. } => "INVALID_DOCUMENT",
            StudioError::SeedUnavailable { .. } => "SEED_UNAVAILABLE",
            StudioError::LoadInProgress { .. } => "LOAD_IN_PROGRESS",
            StudioError::StaleLoadTicket { .. } => "STALE_LOAD_TICKET",
            StudioError::UnknownCommand(_) => "UNKNOWN_COMMAND",
            StudioError::PayloadMismatch { .. } => "PAYLOAD_MISMATCH",
            StudioError::UnknownModal(_) => "UNKNOWN_MODAL",
            StudioError::UnknownView(_) => "UNKNOWN_VIEW",
            StudioError::InvalidKeyCombo { .. } => "INVALID_KEY_COMBO",
            StudioError::DuplicateEntry { .. } => "DUPLICATE_ENTRY",
            StudioError::EntryNotFound { .. } => "ENTRY_NOT_FOUND",
            StudioError::PhonemeExists { .. } => "PHONEME_EXISTS",
            StudioError::PhonemeNotFound { .. } => "PHONEME_NOT_FOUND",
            StudioError::Internal(_) => "INTERNAL_ERROR",
            StudioError::Io(_) => "IO_ERROR",
        }
    }

    /// Returns true if the application stays usable after this error.
    ///
    /// Nothing in the core is fatal; the distinction is whether the user can
    /// act on it directly (pick another file, retry once the pending load
    /// finishes) or whether it points at a bug.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            StudioError::PayloadMismatch { .. } | StudioError::Internal(_)
        )
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StudioError::FileReadError { .. } => Some("Check the file path and try again."),
            StudioError::FileWriteError { .. } | StudioError::DirectoryCreateError { .. } => {
                Some("Check that the data directory is writable.")
            }
            StudioError::Json(_) | StudioError::InvalidDocument { .. } => {
                Some("The file is not a project export. Choose a .json file saved by Conlang Studio.")
            }
            StudioError::LoadInProgress { .. } => {
                Some("Wait for the current load to finish or cancel it first.")
            }
            StudioError::UnknownModal(_) => {
                Some("Known modals: about, settings, constraints, wizard, whatsnew.")
            }
            StudioError::DuplicateEntry { .. } => {
                Some("Duplicates are disabled in the project constraints.")
            }
            StudioError::SeedUnavailable { .. } => {
                Some("Starting from an empty project instead of the starter project.")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = StudioError::DuplicateEntry {
            word: "mellon".to_string(),
        };
        assert_eq!(err.error_code(), "DUPLICATE_ENTRY");
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_payload_mismatch_is_not_recoverable() {
        let err = StudioError::PayloadMismatch {
            expected: CommandId::ZoomIn,
            found: CommandId::ZoomOut,
        };
        assert!(!err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Handler for 'zoomIn' received a 'zoomOut' payload"
        );
    }

    #[test]
    fn test_load_in_progress_message() {
        let err = StudioError::LoadInProgress {
            origin: LoadOrigin::Import,
        };
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "Another load is already in progress (import)");
    }
}
