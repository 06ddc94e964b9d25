//! State Management Module
//!
//! Provides the project and settings stores, durable storage, document
//! migrations and starter-project sources.

pub mod migration;
pub mod project_store;
pub mod seed;
pub mod settings_store;
pub mod storage;

pub use migration::migrate_document;
pub use project_store::{decode_document, LoadOrigin, LoadState, LoadTicket, ProjectStore};
pub use seed::{BundledSeed, FileSeed, NoSeed, SeedSource, StaticSeed};
pub use settings_store::SettingsStore;
pub use storage::{FileStorage, MemoryStorage, Storage};
