//! Default command handlers.
//!
//! Every command id gets a handler here so the application works out of the
//! box; embedders replace any of them through [`CommandDispatcher::register`].
//!
//! [`CommandDispatcher::register`]: crate::command::CommandDispatcher::register

use log::{info, warn};
use uuid::Uuid;

use crate::app::{HostRequest, WizardMode, Workspace};
use crate::command::dispatcher::{handler, Handler};
use crate::command::id::CommandId;
use crate::command::payload::Command;
use crate::error::{Result, StudioError};
use crate::model::{LexiconEntry, Phoneme};
use crate::search::{search_lexicon, PosFilter, SearchConfig};
use crate::state::LoadOrigin;
use crate::ui::{ModalId, ViewState};

/// Handlers for every [`CommandId`].
pub fn builtin_handlers() -> Vec<(CommandId, Handler<Workspace>)> {
    vec![
        (CommandId::ToggleSidebar, handler(toggle_sidebar)),
        (CommandId::OpenSidebar, handler(open_sidebar)),
        (CommandId::CloseSidebar, handler(close_sidebar)),
        (CommandId::OpenConsole, handler(open_console)),
        (CommandId::CloseConsole, handler(close_console)),
        (CommandId::MaximizeConsole, handler(maximize_console)),
        (CommandId::MinimizeConsole, handler(minimize_console)),
        (CommandId::NewProject, handler(new_project)),
        (CommandId::OpenProject, handler(open_project)),
        (CommandId::OpenProjectWizard, handler(open_project_wizard)),
        (CommandId::LoadProject, handler(load_project)),
        (CommandId::ExportProject, handler(export_project)),
        (CommandId::OpenModal, handler(open_modal)),
        (CommandId::ToggleScriptMode, handler(toggle_script_mode)),
        (CommandId::ZoomIn, handler(zoom_in)),
        (CommandId::ZoomOut, handler(zoom_out)),
        (CommandId::SetLanguage, handler(set_language)),
        (CommandId::SetAiEnabled, handler(set_ai_enabled)),
        (CommandId::SetApiKey, handler(set_api_key)),
        (CommandId::SetTheme, handler(set_theme)),
        (CommandId::UpdateCustomTheme, handler(update_custom_theme)),
        (CommandId::NavigateTo, handler(navigate_to)),
        (CommandId::AddLexiconEntry, handler(add_lexicon_entry)),
        (CommandId::DeleteLexiconEntry, handler(delete_lexicon_entry)),
        (CommandId::SearchLexicon, handler(search)),
        (CommandId::AddPhoneme, handler(add_phoneme)),
        (CommandId::UpdatePhoneme, handler(update_phoneme)),
        (CommandId::DeletePhoneme, handler(delete_phoneme)),
    ]
}

fn mismatch(expected: CommandId, found: &Command) -> StudioError {
    StudioError::PayloadMismatch {
        expected,
        found: found.id(),
    }
}

// ============================================================================
// Layout
// ============================================================================

fn toggle_sidebar(ws: &mut Workspace, _: &Command) -> Result<()> {
    ws.layout.sidebar_open = !ws.layout.sidebar_open;
    Ok(())
}

fn open_sidebar(ws: &mut Workspace, _: &Command) -> Result<()> {
    ws.layout.sidebar_open = true;
    Ok(())
}

fn close_sidebar(ws: &mut Workspace, _: &Command) -> Result<()> {
    ws.layout.sidebar_open = false;
    Ok(())
}

fn open_console(ws: &mut Workspace, _: &Command) -> Result<()> {
    ws.layout.open_console();
    Ok(())
}

fn close_console(ws: &mut Workspace, _: &Command) -> Result<()> {
    ws.layout.close_console();
    Ok(())
}

fn maximize_console(ws: &mut Workspace, _: &Command) -> Result<()> {
    ws.layout.maximize_console();
    Ok(())
}

fn minimize_console(ws: &mut Workspace, _: &Command) -> Result<()> {
    ws.layout.minimize_console();
    Ok(())
}

fn toggle_script_mode(ws: &mut Workspace, _: &Command) -> Result<()> {
    ws.layout.toggle_script_mode();
    Ok(())
}

fn zoom_in(ws: &mut Workspace, _: &Command) -> Result<()> {
    ws.layout.zoom_in();
    Ok(())
}

fn zoom_out(ws: &mut Workspace, _: &Command) -> Result<()> {
    ws.layout.zoom_out();
    Ok(())
}

fn navigate_to(ws: &mut Workspace, cmd: &Command) -> Result<()> {
    let Command::NavigateTo { view } = cmd else {
        return Err(mismatch(CommandId::NavigateTo, cmd));
    };
    ws.layout.navigate(*view);
    Ok(())
}

fn open_modal(ws: &mut Workspace, cmd: &Command) -> Result<()> {
    let Command::OpenModal { modal } = cmd else {
        return Err(mismatch(CommandId::OpenModal, cmd));
    };
    ws.ui.open(*modal);
    Ok(())
}

// ============================================================================
// Project lifecycle
// ============================================================================

fn new_project(ws: &mut Workspace, cmd: &Command) -> Result<()> {
    let Command::NewProject(seed) = cmd else {
        return Err(mismatch(CommandId::NewProject, cmd));
    };
    match seed {
        Some(seed) => {
            ws.project.reset(Some(seed.clone()));
            ws.wizard_mode = None;
            ws.ui.close(ModalId::Wizard);
            ws.layout.navigate(ViewState::Dashboard);
        }
        None => {
            ws.wizard_mode = Some(WizardMode::Create);
            ws.ui.open(ModalId::Wizard);
        }
    }
    Ok(())
}

fn open_project_wizard(ws: &mut Workspace, _: &Command) -> Result<()> {
    ws.wizard_mode = Some(WizardMode::Edit);
    ws.ui.open(ModalId::Wizard);
    Ok(())
}

fn open_project(ws: &mut Workspace, _: &Command) -> Result<()> {
    let ticket = ws.project.begin_load(LoadOrigin::Import)?;
    ws.request(HostRequest::PickProjectFile { ticket });
    Ok(())
}

fn load_project(ws: &mut Workspace, cmd: &Command) -> Result<()> {
    let Command::LoadProject { data } = cmd else {
        return Err(mismatch(CommandId::LoadProject, cmd));
    };
    ws.project.load_value(data.clone())?;
    ws.layout.navigate(ViewState::Dashboard);
    Ok(())
}

fn export_project(ws: &mut Workspace, _: &Command) -> Result<()> {
    let contents = ws.project.export_json()?;
    let file_name = ws.project.export_file_name();
    info!("Exporting project as {}", file_name);
    ws.request(HostRequest::SaveFile {
        file_name,
        contents,
    });
    Ok(())
}

// ============================================================================
// Settings
// ============================================================================

fn set_language(ws: &mut Workspace, cmd: &Command) -> Result<()> {
    let Command::SetLanguage { language } = cmd else {
        return Err(mismatch(CommandId::SetLanguage, cmd));
    };
    ws.settings.set_language(language.clone());
    ws.request(HostRequest::ApplyLanguage(language.clone()));
    Ok(())
}

fn set_ai_enabled(ws: &mut Workspace, cmd: &Command) -> Result<()> {
    let Command::SetAiEnabled { ai_enabled } = cmd else {
        return Err(mismatch(CommandId::SetAiEnabled, cmd));
    };
    ws.settings.set_ai_enabled(*ai_enabled);
    Ok(())
}

fn set_api_key(ws: &mut Workspace, cmd: &Command) -> Result<()> {
    let Command::SetApiKey { api_key } = cmd else {
        return Err(mismatch(CommandId::SetApiKey, cmd));
    };
    ws.settings.set_api_key(api_key)
}

fn set_theme(ws: &mut Workspace, cmd: &Command) -> Result<()> {
    let Command::SetTheme { theme } = cmd else {
        return Err(mismatch(CommandId::SetTheme, cmd));
    };
    ws.settings.set_theme(*theme);
    Ok(())
}

fn update_custom_theme(ws: &mut Workspace, cmd: &Command) -> Result<()> {
    let Command::UpdateCustomTheme {
        color_key,
        color_value,
    } = cmd
    else {
        return Err(mismatch(CommandId::UpdateCustomTheme, cmd));
    };
    ws.settings.set_custom_color(*color_key, color_value.clone());
    Ok(())
}

// ============================================================================
// Lexicon
// ============================================================================

fn add_lexicon_entry(ws: &mut Workspace, cmd: &Command) -> Result<()> {
    let Command::AddLexiconEntry {
        word,
        pos,
        definition,
        ipa,
        etymology,
        derived_from,
    } = cmd
    else {
        return Err(mismatch(CommandId::AddLexiconEntry, cmd));
    };

    let word = word.trim();
    if word.is_empty() {
        warn!("Ignoring lexicon entry with an empty word");
        return Ok(());
    }

    let doc = ws.project.document();
    if let Some(existing) = doc.constraints.find_duplicate(&doc.lexicon, word, None) {
        return Err(StudioError::DuplicateEntry {
            word: existing.word.clone(),
        });
    }
    for violation in doc.constraints.check_word(word, pos, &doc.phonology) {
        warn!("'{}' {}", word, violation);
    }

    let entry = LexiconEntry {
        id: Uuid::new_v4().to_string(),
        word: word.to_string(),
        ipa: ipa.clone(),
        pos: pos.clone(),
        definition: definition.clone(),
        etymology: etymology.clone(),
        derived_from: derived_from.clone(),
        notes: None,
    };
    info!("Added '{}' to the lexicon", entry.word);
    ws.project.edit_lexicon(|lexicon| lexicon.push(entry));
    Ok(())
}

fn delete_lexicon_entry(ws: &mut Workspace, cmd: &Command) -> Result<()> {
    let Command::DeleteLexiconEntry { id, word } = cmd else {
        return Err(mismatch(CommandId::DeleteLexiconEntry, cmd));
    };

    let lexicon = &ws.project.document().lexicon;
    let index = match (id, word) {
        (Some(id), _) => lexicon.iter().position(|e| &e.id == id),
        (None, Some(word)) => lexicon
            .iter()
            .position(|e| e.word.eq_ignore_ascii_case(word.trim())),
        (None, None) => None,
    };

    let Some(index) = index else {
        let selector = id.clone().or_else(|| word.clone()).unwrap_or_default();
        return Err(StudioError::EntryNotFound { selector });
    };

    ws.project.edit_lexicon(|lexicon| lexicon.remove(index));
    Ok(())
}

fn search(ws: &mut Workspace, cmd: &Command) -> Result<()> {
    let Command::SearchLexicon { query, pos } = cmd else {
        return Err(mismatch(CommandId::SearchLexicon, cmd));
    };

    let config = SearchConfig::new(query.clone()).with_pos(PosFilter::from_option(pos.as_deref()));
    ws.last_search = search_lexicon(&ws.project.document().lexicon, &config);
    ws.layout.navigate(ViewState::Lexicon);
    Ok(())
}

// ============================================================================
// Phonology
// ============================================================================

fn add_phoneme(ws: &mut Workspace, cmd: &Command) -> Result<()> {
    let Command::AddPhoneme { phoneme } = cmd else {
        return Err(mismatch(CommandId::AddPhoneme, cmd));
    };
    if ws.project.document().phonology.find(&phoneme.symbol).is_some() {
        return Err(StudioError::PhonemeExists {
            symbol: phoneme.symbol.clone(),
        });
    }

    let phoneme = phoneme.clone();
    ws.project
        .edit_phonology(|p| p.inventory_mut(phoneme.kind).push(phoneme));
    Ok(())
}

fn update_phoneme(ws: &mut Workspace, cmd: &Command) -> Result<()> {
    let Command::UpdatePhoneme { symbol, phoneme } = cmd else {
        return Err(mismatch(CommandId::UpdatePhoneme, cmd));
    };

    let phonology = &ws.project.document().phonology;
    let Some(current) = phonology.find(symbol) else {
        return Err(StudioError::PhonemeNotFound {
            symbol: symbol.clone(),
        });
    };
    if phoneme.symbol != *symbol && phonology.find(&phoneme.symbol).is_some() {
        return Err(StudioError::PhonemeExists {
            symbol: phoneme.symbol.clone(),
        });
    }

    let old_kind = current.kind;
    let replacement: Phoneme = phoneme.clone();
    ws.project.edit_phonology(|p| {
        let inventory = p.inventory_mut(old_kind);
        let Some(index) = inventory.iter().position(|ph| ph.symbol == *symbol) else {
            return;
        };
        if replacement.kind == old_kind {
            inventory[index] = replacement;
        } else {
            inventory.remove(index);
            p.inventory_mut(replacement.kind).push(replacement);
        }
    });
    Ok(())
}

fn delete_phoneme(ws: &mut Workspace, cmd: &Command) -> Result<()> {
    let Command::DeletePhoneme { symbol } = cmd else {
        return Err(mismatch(CommandId::DeletePhoneme, cmd));
    };
    let Some(kind) = ws.project.document().phonology.find(symbol).map(|p| p.kind) else {
        return Err(StudioError::PhonemeNotFound {
            symbol: symbol.clone(),
        });
    };

    ws.project
        .edit_phonology(|p| p.inventory_mut(kind).retain(|ph| ph.symbol != *symbol));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandDispatcher;
    use crate::config::StudioConfig;
    use crate::model::{PhonemeKind, ProjectDocument};
    use crate::state::MemoryStorage;
    use std::sync::Arc;

    fn setup() -> (Workspace, CommandDispatcher<Workspace>) {
        let storage = Arc::new(MemoryStorage::new());
        let mut ws = Workspace::new(storage, &StudioConfig::default());
        ws.project.load(ProjectDocument::default()).unwrap();
        let mut dispatcher = CommandDispatcher::new();
        dispatcher.register(builtin_handlers());
        (ws, dispatcher)
    }

    fn add(word: &str) -> Command {
        Command::AddLexiconEntry {
            word: word.to_string(),
            pos: "noun".to_string(),
            definition: String::new(),
            ipa: String::new(),
            etymology: None,
            derived_from: None,
        }
    }

    #[test]
    fn test_every_id_has_a_builtin() {
        let (_, dispatcher) = setup();
        assert_eq!(dispatcher.registered(), CommandId::ALL.to_vec());
    }

    #[test]
    fn test_handler_rejects_foreign_payload() {
        let err = navigate_to(&mut setup().0, &Command::ZoomIn).unwrap_err();
        assert_eq!(err.error_code(), "PAYLOAD_MISMATCH");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_duplicate_words_refused_when_disallowed() {
        let (mut ws, mut dispatcher) = setup();
        dispatcher.execute(&mut ws, &add("elen")).unwrap();
        dispatcher.execute(&mut ws, &add("elen")).unwrap();
        assert_eq!(ws.project.document().lexicon.len(), 2);

        ws.project.edit_constraints(|c| c.allow_duplicates = false);
        let err = dispatcher.execute(&mut ws, &add("ELEN")).unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_ENTRY");
        assert_eq!(ws.project.document().lexicon.len(), 2);
    }

    #[test]
    fn test_delete_by_word() {
        let (mut ws, mut dispatcher) = setup();
        dispatcher.execute(&mut ws, &add("galad")).unwrap();
        dispatcher
            .execute(
                &mut ws,
                &Command::DeleteLexiconEntry {
                    id: None,
                    word: Some("Galad".to_string()),
                },
            )
            .unwrap();
        assert!(ws.project.document().lexicon.is_empty());

        let err = dispatcher
            .execute(
                &mut ws,
                &Command::DeleteLexiconEntry {
                    id: Some("missing".to_string()),
                    word: None,
                },
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "ENTRY_NOT_FOUND");
    }

    #[test]
    fn test_phoneme_lifecycle() {
        let (mut ws, mut dispatcher) = setup();
        dispatcher
            .execute(&mut ws, &Command::AddPhoneme { phoneme: Phoneme::consonant("θ") })
            .unwrap();
        let err = dispatcher
            .execute(&mut ws, &Command::AddPhoneme { phoneme: Phoneme::vowel("θ") })
            .unwrap_err();
        assert_eq!(err.error_code(), "PHONEME_EXISTS");

        dispatcher
            .execute(
                &mut ws,
                &Command::UpdatePhoneme {
                    symbol: "θ".to_string(),
                    phoneme: Phoneme::vowel("ə"),
                },
            )
            .unwrap();
        let phonology = &ws.project.document().phonology;
        assert!(phonology.consonants.is_empty());
        assert_eq!(phonology.find("ə").map(|p| p.kind), Some(PhonemeKind::Vowel));

        dispatcher
            .execute(&mut ws, &Command::DeletePhoneme { symbol: "ə".to_string() })
            .unwrap();
        assert!(ws.project.document().phonology.vowels.is_empty());
    }

    #[test]
    fn test_export_emits_save_request() {
        let (mut ws, mut dispatcher) = setup();
        ws.project.set_name("Black Speech");
        dispatcher.execute(&mut ws, &Command::ExportProject).unwrap();
        match ws.pending_requests() {
            [HostRequest::SaveFile { file_name, contents }] => {
                assert_eq!(file_name, "black-speech.json");
                assert!(contents.contains("\"name\": \"Black Speech\""));
            }
            other => panic!("unexpected requests {:?}", other),
        }
    }

    #[test]
    fn test_new_project_without_seed_opens_wizard() {
        let (mut ws, mut dispatcher) = setup();
        dispatcher.execute(&mut ws, &Command::NewProject(None)).unwrap();
        assert!(ws.ui.is_open(ModalId::Wizard));
        assert_eq!(ws.wizard_mode, Some(WizardMode::Create));
    }
}
