//! Project State Store
//!
//! Owns the single live [`ProjectDocument`]. The store starts in
//! [`LoadState::Loading`] and becomes [`LoadState::Ready`] when the first load
//! completes. Auto-persist is gated on that transition: until the stored
//! project (or the seed) has been read, nothing is written, so an existing
//! save can never be clobbered by a default "Untitled" project.
//!
//! Asynchronous loads (seed fetch, file import) are modelled with
//! [`LoadTicket`]s. The host calls [`ProjectStore::begin_load`], performs its
//! I/O, then hands the text back through [`ProjectStore::complete_load`] or
//! gives up with [`ProjectStore::cancel_load`]. Only one load may be pending.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde_json::Value;

use crate::error::{Result, StudioError};
use crate::model::{
    LexiconEntry, MorphologyState, PhonologyConfig, ProjectConstraints, ProjectDocument,
    ProjectSeed, ScriptConfig, SoundChangeRule,
};
use crate::state::migration::migrate_document;
use crate::state::seed::SeedSource;
use crate::state::storage::{Storage, PROJECT_STORAGE_KEY};

/// Lifecycle of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No load has completed yet; auto-persist is off.
    Loading,
    /// A document has been loaded; mutations persist.
    Ready,
}

/// Where a pending load comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Startup: stored autosave or seed.
    Boot,
    /// A user-picked file.
    Import,
}

impl fmt::Display for LoadOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadOrigin::Boot => f.write_str("boot"),
            LoadOrigin::Import => f.write_str("import"),
        }
    }
}

/// Handle for one outstanding load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    id: u64,
    origin: LoadOrigin,
}

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn origin(&self) -> LoadOrigin {
        self.origin
    }
}

/// The single project state owner.
pub struct ProjectStore {
    document: ProjectDocument,
    state: LoadState,
    storage: Arc<dyn Storage>,

    pending: Option<LoadTicket>,
    next_ticket: u64,

    /// When false, mutations only mark the store dirty.
    autosave_enabled: bool,
    dirty: bool,

    save_count: u64,
    last_save_time: Option<DateTime<Utc>>,
}

impl fmt::Debug for ProjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectStore")
            .field("name", &self.document.name)
            .field("state", &self.state)
            .field("pending", &self.pending)
            .field("autosave_enabled", &self.autosave_enabled)
            .field("dirty", &self.dirty)
            .field("save_count", &self.save_count)
            .finish()
    }
}

impl ProjectStore {
    /// Create a store holding the default document, waiting for its first load.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            document: ProjectDocument::default(),
            state: LoadState::Loading,
            storage,
            pending: None,
            next_ticket: 1,
            autosave_enabled: true,
            dirty: false,
            save_count: 0,
            last_save_time: None,
        }
    }

    pub fn document(&self) -> &ProjectDocument {
        &self.document
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    /// The outstanding load, if any.
    pub fn pending_load(&self) -> Option<LoadTicket> {
        self.pending
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of snapshots written to storage so far.
    pub fn save_count(&self) -> u64 {
        self.save_count
    }

    pub fn last_save_time(&self) -> Option<DateTime<Utc>> {
        self.last_save_time
    }

    /// Full document with a fresh modification stamp.
    pub fn snapshot(&self) -> ProjectDocument {
        self.document.stamped()
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Reserve the load slot. Fails while another load is outstanding.
    pub fn begin_load(&mut self, origin: LoadOrigin) -> Result<LoadTicket> {
        if let Some(pending) = self.pending {
            return Err(StudioError::LoadInProgress {
                origin: pending.origin,
            });
        }

        let ticket = LoadTicket {
            id: self.next_ticket,
            origin,
        };
        self.next_ticket += 1;
        self.pending = Some(ticket);
        debug!("Began {} load #{}", origin, ticket.id);
        Ok(ticket)
    }

    /// Finish a pending load with the text the host fetched.
    ///
    /// Boot loads never fail: unreadable content is logged and the store
    /// becomes ready with the default document. Import failures are returned
    /// and leave the current document untouched.
    pub fn complete_load(&mut self, ticket: LoadTicket, raw: Result<String>) -> Result<()> {
        self.finish_load(ticket, raw.and_then(|text| decode_document(&text)))
    }

    /// Give up on a pending load without touching the document.
    pub fn cancel_load(&mut self, ticket: LoadTicket) -> Result<()> {
        self.take_ticket(ticket)?;
        info!("Cancelled {} load #{}", ticket.origin, ticket.id);
        Ok(())
    }

    /// Replace the whole document and mark the store ready.
    pub fn load(&mut self, document: ProjectDocument) -> Result<()> {
        if let Some(pending) = self.pending {
            return Err(StudioError::LoadInProgress {
                origin: pending.origin,
            });
        }
        self.apply(document);
        Ok(())
    }

    /// Load from an already-parsed JSON value through the tolerant decoder.
    pub fn load_value(&mut self, value: Value) -> Result<()> {
        let document = ProjectDocument::from_value(migrate_document(value)?)?;
        self.load(document)
    }

    /// Load from JSON text through the tolerant decoder.
    pub fn load_json(&mut self, text: &str) -> Result<()> {
        let document = decode_document(text)?;
        self.load(document)
    }

    /// Startup sequence: stored autosave first, then the seed, then defaults.
    ///
    /// The seed is fetched at most once and only when storage holds nothing usable.
    pub fn boot(&mut self, seed: &dyn SeedSource) -> Result<()> {
        let ticket = self.begin_load(LoadOrigin::Boot)?;

        match self.storage.get(PROJECT_STORAGE_KEY) {
            Ok(Some(text)) => match decode_document(&text) {
                Ok(document) => {
                    info!("Restored project '{}' from storage", document.name);
                    return self.finish_load(ticket, Ok(document));
                }
                Err(e) => warn!("Stored project is unreadable, falling back to seed: {}", e),
            },
            Ok(None) => debug!("No stored project; loading {}", seed.describe()),
            Err(e) => warn!("Could not read stored project, falling back to seed: {}", e),
        }

        let fetched = seed.fetch().and_then(|text| decode_document(&text));
        self.finish_load(ticket, fetched)
    }

    fn take_ticket(&mut self, ticket: LoadTicket) -> Result<()> {
        match self.pending {
            Some(pending) if pending == ticket => {
                self.pending = None;
                Ok(())
            }
            _ => Err(StudioError::StaleLoadTicket { ticket: ticket.id }),
        }
    }

    fn finish_load(&mut self, ticket: LoadTicket, loaded: Result<ProjectDocument>) -> Result<()> {
        self.take_ticket(ticket)?;

        match (ticket.origin, loaded) {
            (_, Ok(document)) => {
                self.apply(document);
                Ok(())
            }
            (LoadOrigin::Boot, Err(e)) => {
                error!("Failed to load starting project, using defaults: {}", e);
                self.apply(ProjectDocument::default());
                Ok(())
            }
            (LoadOrigin::Import, Err(e)) => {
                warn!("Import failed; keeping '{}': {}", self.document.name, e);
                Err(e)
            }
        }
    }

    fn apply(&mut self, document: ProjectDocument) {
        info!(
            "Loaded project '{}' ({} entries)",
            document.name,
            document.lexicon.len()
        );
        self.document = document;
        self.state = LoadState::Ready;
        self.touched();
    }

    // ------------------------------------------------------------------------
    // Field setters
    // ------------------------------------------------------------------------

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.document.name = name.into();
        self.touched();
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.document.author = author.into();
        self.touched();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.document.description = description.into();
        self.touched();
    }

    pub fn set_lexicon(&mut self, lexicon: Vec<LexiconEntry>) {
        self.document.lexicon = lexicon;
        self.touched();
    }

    pub fn set_grammar(&mut self, grammar: impl Into<String>) {
        self.document.grammar = grammar.into();
        self.touched();
    }

    pub fn set_morphology(&mut self, morphology: MorphologyState) {
        self.document.morphology = morphology;
        self.touched();
    }

    pub fn set_phonology(&mut self, phonology: PhonologyConfig) {
        self.document.phonology = phonology;
        self.touched();
    }

    pub fn set_evolution_rules(&mut self, rules: Vec<SoundChangeRule>) {
        self.document.evolution_rules = rules;
        self.touched();
    }

    pub fn set_constraints(&mut self, constraints: ProjectConstraints) {
        self.document.constraints = constraints;
        self.touched();
    }

    pub fn set_script_config(&mut self, script: ScriptConfig) {
        self.document.script_config = script;
        self.touched();
    }

    pub fn set_notebook(&mut self, notebook: impl Into<String>) {
        self.document.notebook = notebook.into();
        self.touched();
    }

    /// Mutate the lexicon in place; persists once afterwards.
    pub fn edit_lexicon<R>(&mut self, f: impl FnOnce(&mut Vec<LexiconEntry>) -> R) -> R {
        let out = f(&mut self.document.lexicon);
        self.touched();
        out
    }

    pub fn edit_constraints<R>(&mut self, f: impl FnOnce(&mut ProjectConstraints) -> R) -> R {
        let out = f(&mut self.document.constraints);
        self.touched();
        out
    }

    pub fn edit_phonology<R>(&mut self, f: impl FnOnce(&mut PhonologyConfig) -> R) -> R {
        let out = f(&mut self.document.phonology);
        self.touched();
        out
    }

    /// Start over with a blank project carrying the wizard's fields.
    pub fn reset(&mut self, seed: Option<ProjectSeed>) {
        self.document = ProjectDocument::from_seed(seed.unwrap_or_default());
        info!("Started new project '{}'", self.document.name);
        self.touched();
    }

    // ------------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------------

    /// Pretty JSON of a fresh snapshot.
    pub fn export_json(&self) -> Result<String> {
        self.snapshot().to_pretty_json()
    }

    pub fn export_file_name(&self) -> String {
        self.document.export_file_name()
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    /// Turn auto-persist on or off. Re-enabling writes pending changes.
    pub fn set_autosave_enabled(&mut self, enabled: bool) {
        self.autosave_enabled = enabled;
        if enabled && self.dirty {
            if let Err(e) = self.flush() {
                error!("Autosave failed: {}", e);
            }
        }
    }

    pub fn autosave_enabled(&self) -> bool {
        self.autosave_enabled
    }

    /// Write the current snapshot now. Returns false before the first load.
    pub fn flush(&mut self) -> Result<bool> {
        if !self.is_ready() {
            debug!("Skipping save: no project loaded yet");
            return Ok(false);
        }

        let text = serde_json::to_string(&self.snapshot())?;
        self.storage.set(PROJECT_STORAGE_KEY, &text)?;

        self.dirty = false;
        self.save_count += 1;
        self.last_save_time = Some(Utc::now());
        debug!("Saved project '{}' ({} bytes)", self.document.name, text.len());
        Ok(true)
    }

    fn touched(&mut self) {
        if !self.is_ready() {
            return;
        }
        if !self.autosave_enabled {
            self.dirty = true;
            return;
        }
        if let Err(e) = self.flush() {
            self.dirty = true;
            error!("Autosave failed: {}", e);
        }
    }
}

/// Migrate then tolerantly decode a project document.
pub fn decode_document(text: &str) -> Result<ProjectDocument> {
    let value: Value = serde_json::from_str(text)?;
    ProjectDocument::from_value(migrate_document(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::DEFAULT_PROJECT_NAME;
    use crate::state::seed::{NoSeed, StaticSeed};
    use crate::state::storage::MemoryStorage;
    use pretty_assertions::assert_eq;

    fn store_with(storage: &Arc<MemoryStorage>) -> ProjectStore {
        ProjectStore::new(storage.clone())
    }

    #[test]
    fn test_setters_do_not_persist_before_load() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = store_with(&storage);

        store.set_name("Draft");
        store.set_grammar("VSO");
        assert_eq!(storage.write_count(PROJECT_STORAGE_KEY), 0);
        assert_eq!(store.flush().unwrap(), false);
        assert_eq!(store.state(), LoadState::Loading);
    }

    #[test]
    fn test_load_marks_ready_and_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = store_with(&storage);

        store.load_json(r#"{"name":"Klingon"}"#).unwrap();
        assert!(store.is_ready());
        assert_eq!(storage.write_count(PROJECT_STORAGE_KEY), 1);

        store.set_author("Okrand");
        assert_eq!(storage.write_count(PROJECT_STORAGE_KEY), 2);
        let saved = decode_document(&storage.peek(PROJECT_STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(saved.author, "Okrand");
    }

    #[test]
    fn test_second_begin_load_is_rejected() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = store_with(&storage);

        let first = store.begin_load(LoadOrigin::Import).unwrap();
        let err = store.begin_load(LoadOrigin::Import).unwrap_err();
        assert_eq!(err.error_code(), "LOAD_IN_PROGRESS");

        let err = store.load(ProjectDocument::default()).unwrap_err();
        assert_eq!(err.error_code(), "LOAD_IN_PROGRESS");

        store.cancel_load(first).unwrap();
        assert!(store.begin_load(LoadOrigin::Import).is_ok());
    }

    #[test]
    fn test_stale_ticket_is_rejected() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = store_with(&storage);

        let first = store.begin_load(LoadOrigin::Import).unwrap();
        store.cancel_load(first).unwrap();
        let err = store
            .complete_load(first, Ok(r#"{"name":"Late"}"#.to_string()))
            .unwrap_err();
        assert_eq!(err.error_code(), "STALE_LOAD_TICKET");
        assert_eq!(store.document().name, DEFAULT_PROJECT_NAME);
    }

    #[test]
    fn test_failed_import_keeps_document() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = store_with(&storage);
        store.load_json(r#"{"name":"Toki Pona"}"#).unwrap();
        let writes = storage.write_count(PROJECT_STORAGE_KEY);

        let ticket = store.begin_load(LoadOrigin::Import).unwrap();
        assert!(store
            .complete_load(ticket, Ok("not json".to_string()))
            .is_err());

        assert_eq!(store.document().name, "Toki Pona");
        assert_eq!(storage.write_count(PROJECT_STORAGE_KEY), writes);
        assert!(store.pending_load().is_none());
    }

    #[test]
    fn test_boot_prefers_storage_over_seed() {
        let storage = Arc::new(MemoryStorage::with_entry(
            PROJECT_STORAGE_KEY,
            r#"{"version":"1.1","name":"Alpha"}"#,
        ));
        let mut store = store_with(&storage);

        store
            .boot(&StaticSeed(r#"{"name":"Seeded"}"#.to_string()))
            .unwrap();
        assert_eq!(store.document().name, "Alpha");
    }

    #[test]
    fn test_boot_with_corrupt_storage_uses_seed() {
        let storage = Arc::new(MemoryStorage::with_entry(PROJECT_STORAGE_KEY, "{{{"));
        let mut store = store_with(&storage);

        store
            .boot(&StaticSeed(r#"{"name":"Seeded"}"#.to_string()))
            .unwrap();
        assert_eq!(store.document().name, "Seeded");
    }

    #[test]
    fn test_boot_without_seed_uses_defaults() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = store_with(&storage);

        store.boot(&NoSeed).unwrap();
        assert!(store.is_ready());
        assert_eq!(store.document().name, DEFAULT_PROJECT_NAME);
    }

    #[test]
    fn test_autosave_disabled_marks_dirty() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = store_with(&storage);
        store.load(ProjectDocument::default()).unwrap();
        store.set_autosave_enabled(false);
        let writes = storage.write_count(PROJECT_STORAGE_KEY);

        store.set_notebook("scratch");
        assert!(store.is_dirty());
        assert_eq!(storage.write_count(PROJECT_STORAGE_KEY), writes);

        store.set_autosave_enabled(true);
        assert!(!store.is_dirty());
        assert_eq!(storage.write_count(PROJECT_STORAGE_KEY), writes + 1);
    }

    #[test]
    fn test_reset_keeps_seed_fields() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = store_with(&storage);
        store.load_json(r#"{"name":"Old","grammar":"SOV"}"#).unwrap();

        store.reset(Some(ProjectSeed {
            name: "New".to_string(),
            author: "Me".to_string(),
            ..ProjectSeed::default()
        }));
        assert_eq!(store.document().name, "New");
        assert_eq!(store.document().author, "Me");
        assert!(store.document().grammar.is_empty());
    }

    #[test]
    fn test_edit_helpers_persist_once() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = store_with(&storage);
        store.load(ProjectDocument::default()).unwrap();
        let writes = storage.write_count(PROJECT_STORAGE_KEY);

        let added = store.edit_lexicon(|lexicon| {
            lexicon.push(LexiconEntry {
                id: "1".to_string(),
                word: "elen".to_string(),
                ..LexiconEntry::default()
            });
            lexicon.len()
        });
        assert_eq!(added, 1);
        assert_eq!(storage.write_count(PROJECT_STORAGE_KEY), writes + 1);
    }
}
