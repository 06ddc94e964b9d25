//! Command Integration Tests
//!
//! Drives a booted `Studio` through commands, the console, shortcuts and
//! the overlay registry.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use conlang_studio::command::{handler, Command, CommandDispatcher, CommandId, Dispatch, LogKind};
use conlang_studio::keys::KeyEvent;
use conlang_studio::model::ProjectConstraints;
use conlang_studio::search::MatchType;
use conlang_studio::state::storage::PROJECT_STORAGE_KEY;
use conlang_studio::state::{MemoryStorage, StaticSeed};
use conlang_studio::ui::{ModalId, ViewState, VisibilityRegistry, WHATS_NEW_SEEN_KEY};
use conlang_studio::{HostRequest, Studio, StudioConfig, Workspace};

const SEED: &str = r#"{
    "name": "Sindarin",
    "lexicon": [
        { "id": "s1", "word": "mellon", "pos": "Noun", "definition": "friend" },
        { "id": "s2", "word": "galad", "pos": "Noun", "definition": "light" }
    ]
}"#;

fn booted(storage: Arc<MemoryStorage>) -> Studio {
    let mut studio = Studio::new(storage, &StudioConfig::default()).unwrap();
    studio.boot(&StaticSeed(SEED.to_string())).unwrap();
    studio
}

// === Dispatcher Tests ===

#[test]
fn test_unregistered_command_is_soft_failure() {
    let storage = Arc::new(MemoryStorage::new());
    let mut ws = Workspace::new(storage.clone(), &StudioConfig::default());
    let mut dispatcher: CommandDispatcher<Workspace> = CommandDispatcher::new();

    let outcome = dispatcher.execute(&mut ws, &Command::ZoomIn).unwrap();
    assert_eq!(outcome, Dispatch::Unhandled);
    assert_eq!(ws.layout.zoom(), 100);
    assert!(storage.writes().is_empty());
}

#[test]
fn test_last_registration_wins() {
    let mut studio = booted(Arc::new(MemoryStorage::new()));

    let replaced = studio.register(vec![(
        CommandId::ZoomIn,
        handler(|ws: &mut Workspace, _: &Command| {
            ws.layout.navigate(ViewState::Grammar);
            Ok(())
        }),
    )]);
    assert_eq!(replaced, vec![CommandId::ZoomIn]);

    studio.register(vec![(
        CommandId::ZoomIn,
        handler(|ws: &mut Workspace, _: &Command| {
            ws.layout.navigate(ViewState::Phonology);
            Ok(())
        }),
    )]);

    studio.execute(&Command::ZoomIn).unwrap();
    assert_eq!(studio.workspace().layout.view, ViewState::Phonology);
    assert_eq!(studio.workspace().layout.zoom(), 100);
}

#[test]
fn test_json_command_surface() {
    let mut studio = booted(Arc::new(MemoryStorage::new()));

    let add = Command::from_json(
        r#"{"command":"addLexiconEntry","payload":{"word":"elen","pos":"Noun","definition":"star"}}"#,
    )
    .unwrap();
    assert_eq!(studio.execute(&add).unwrap(), Dispatch::Handled);

    let search =
        Command::from_json(r#"{"command":"searchLexicon","payload":{"query":"elen"}}"#).unwrap();
    studio.execute(&search).unwrap();

    let ws = studio.workspace();
    assert_eq!(ws.layout.view, ViewState::Lexicon);
    assert_eq!(ws.last_search.len(), 1);
    assert_eq!(ws.last_search[0].entry.word, "elen");
    assert_eq!(ws.last_search[0].match_type, MatchType::Exact);
}

// === Project Flow Tests ===

#[test]
fn test_import_through_host_request() {
    let mut studio = booted(Arc::new(MemoryStorage::new()));
    studio.execute(&Command::OpenProject).unwrap();

    let requests = studio.drain_requests();
    let ticket = match requests.as_slice() {
        [HostRequest::PickProjectFile { ticket }] => *ticket,
        other => panic!("unexpected requests {:?}", other),
    };

    // A second open while the picker is up is refused.
    let err = studio.execute(&Command::OpenProject).unwrap_err();
    assert_eq!(err.error_code(), "LOAD_IN_PROGRESS");

    studio
        .finish_import(ticket, Ok(r#"{"name":"Quenya"}"#.to_string()))
        .unwrap();

    let doc = studio.workspace().project.snapshot();
    assert_eq!(doc.name, "Quenya");
    assert!(doc.lexicon.is_empty());
    assert_eq!(doc.constraints, ProjectConstraints::default());
    assert_eq!(studio.workspace().layout.view, ViewState::Dashboard);
}

#[test]
fn test_new_project_with_seed_replaces_document() {
    let mut studio = booted(Arc::new(MemoryStorage::new()));
    let cmd = Command::from_json(
        r#"{"command":"newProject","payload":{"name":"Khuzdul","author":"Aulë"}}"#,
    )
    .unwrap();
    studio.execute(&cmd).unwrap();

    let doc = studio.workspace().project.document();
    assert_eq!(doc.name, "Khuzdul");
    assert_eq!(doc.author, "Aulë");
    assert!(doc.lexicon.is_empty());
    assert!(!studio.workspace().ui.is_open(ModalId::Wizard));
}

#[test]
fn test_autosave_setting_drives_project_writes() {
    let storage = Arc::new(MemoryStorage::new());
    let mut studio = booted(storage.clone());
    let ws = studio.workspace_mut();

    let mut settings = ws.settings.settings().clone();
    settings.auto_save = false;
    ws.update_settings(settings.clone());
    assert!(!ws.project.autosave_enabled());

    let writes = storage.write_count(PROJECT_STORAGE_KEY);
    ws.project.set_name("Draft");
    assert!(ws.project.is_dirty());
    assert_eq!(storage.write_count(PROJECT_STORAGE_KEY), writes);

    settings.auto_save = true;
    ws.update_settings(settings);
    assert!(ws.project.autosave_enabled());
    assert!(!ws.project.is_dirty());
    assert_eq!(storage.write_count(PROJECT_STORAGE_KEY), writes + 1);
    assert!(storage
        .peek(PROJECT_STORAGE_KEY)
        .unwrap()
        .contains(r#""name":"Draft""#));

    // A fresh workspace over the same storage starts with the stored preference.
    let reopened = Workspace::new(storage, &StudioConfig::default());
    assert!(reopened.project.autosave_enabled());
}

// === Visibility Tests ===

#[test]
fn test_registry_open_close_toggle() {
    let mut registry = VisibilityRegistry::new();
    registry.open(ModalId::Settings);
    assert!(registry.is_open(ModalId::Settings));
    registry.close(ModalId::Settings);
    assert!(!registry.is_open(ModalId::Settings));

    registry.toggle(ModalId::About);
    assert!(registry.is_open(ModalId::About));
    registry.toggle(ModalId::About);
    assert!(!registry.is_open(ModalId::About));
}

#[test]
fn test_whats_new_shown_once() {
    let storage = Arc::new(MemoryStorage::new());

    let mut studio = booted(storage.clone());
    assert!(studio.workspace().ui.is_open(ModalId::WhatsNew));
    studio.workspace_mut().ui.close(ModalId::WhatsNew);
    assert_eq!(storage.peek(WHATS_NEW_SEEN_KEY).as_deref(), Some("true"));

    let studio = booted(storage);
    assert!(!studio.workspace().ui.is_open(ModalId::WhatsNew));
}

// === Console And Shortcut Tests ===

#[test]
fn test_console_line_dispatches() {
    let mut studio = booted(Arc::new(MemoryStorage::new()));

    let entries = studio.run_console_line("console open");
    assert_eq!(entries.last().map(|e| e.kind), Some(LogKind::Success));
    assert!(studio.workspace().layout.console().open);

    let entries = studio.run_console_line("modal constraints");
    assert_eq!(entries.last().map(|e| e.kind), Some(LogKind::Success));
    assert!(studio.workspace().ui.is_open(ModalId::Constraints));

    studio.run_console_line("export");
    assert!(matches!(
        studio.drain_requests().as_slice(),
        [HostRequest::SaveFile { .. }]
    ));
}

#[test]
fn test_shortcuts_drive_console() {
    let mut studio = booted(Arc::new(MemoryStorage::new()));

    let outcome = studio.key_down(&KeyEvent::parse("alt-c").unwrap());
    assert!(outcome.prevent_default);
    assert!(studio.workspace().layout.console().open);

    studio.key_down(&KeyEvent::parse("alt-up").unwrap());
    assert_eq!(studio.workspace().layout.console().height, 800);

    studio.key_down(&KeyEvent::parse("alt-down").unwrap());
    assert!(studio.workspace().layout.console().minimized);

    studio.key_down(&KeyEvent::parse("alt-q").unwrap());
    assert!(!studio.workspace().layout.console().open);
}

#[test]
fn test_zoom_shortcuts_are_bounded() {
    let mut studio = booted(Arc::new(MemoryStorage::new()));
    let zoom_in = KeyEvent::parse("alt-+").unwrap();
    for _ in 0..10 {
        studio.key_down(&zoom_in);
        studio.key_up(&zoom_in);
    }
    assert_eq!(studio.workspace().layout.zoom(), 150);
}
