//! Typed command payloads.
//!
//! A [`Command`] is one variant per [`CommandId`], carrying only the fields
//! that command uses. The JSON form is `{"command": "<id>", "payload": {...}}`;
//! commands without fields may omit `payload`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::id::CommandId;
use crate::model::{ColorRole, Phoneme, ProjectSeed, ThemeName};
use crate::ui::{ModalId, ViewState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "camelCase")]
pub enum Command {
    ToggleSidebar,
    OpenSidebar,
    CloseSidebar,
    OpenConsole,
    CloseConsole,
    MaximizeConsole,
    MinimizeConsole,

    /// With a seed: start a blank project. Without: open the wizard.
    NewProject(Option<ProjectSeed>),
    OpenProject,
    OpenProjectWizard,
    LoadProject {
        data: Value,
    },
    ExportProject,

    OpenModal {
        modal: ModalId,
    },
    ToggleScriptMode,
    ZoomIn,
    ZoomOut,

    SetLanguage {
        language: String,
    },
    #[serde(rename = "setAIEnabled", rename_all = "camelCase")]
    SetAiEnabled {
        ai_enabled: bool,
    },
    #[serde(rename_all = "camelCase")]
    SetApiKey {
        api_key: String,
    },
    SetTheme {
        theme: ThemeName,
    },
    #[serde(rename_all = "camelCase")]
    UpdateCustomTheme {
        color_key: ColorRole,
        color_value: String,
    },
    NavigateTo {
        view: ViewState,
    },

    #[serde(rename_all = "camelCase")]
    AddLexiconEntry {
        word: String,
        #[serde(default)]
        pos: String,
        #[serde(default)]
        definition: String,
        #[serde(default)]
        ipa: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        etymology: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        derived_from: Option<String>,
    },
    /// Remove by id, or by spelling when no id is given.
    DeleteLexiconEntry {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        word: Option<String>,
    },
    SearchLexicon {
        #[serde(default)]
        query: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pos: Option<String>,
    },

    AddPhoneme {
        phoneme: Phoneme,
    },
    /// Replace the phoneme currently spelled `symbol`.
    UpdatePhoneme {
        symbol: String,
        phoneme: Phoneme,
    },
    DeletePhoneme {
        symbol: String,
    },
}

impl Command {
    /// The identifier this payload dispatches under.
    pub fn id(&self) -> CommandId {
        match self {
            Command::ToggleSidebar => CommandId::ToggleSidebar,
            Command::OpenSidebar => CommandId::OpenSidebar,
            Command::CloseSidebar => CommandId::CloseSidebar,
            Command::OpenConsole => CommandId::OpenConsole,
            Command::CloseConsole => CommandId::CloseConsole,
            Command::MaximizeConsole => CommandId::MaximizeConsole,
            Command::MinimizeConsole => CommandId::MinimizeConsole,
            Command::NewProject(_) => CommandId::NewProject,
            Command::OpenProject => CommandId::OpenProject,
            Command::OpenProjectWizard => CommandId::OpenProjectWizard,
            Command::LoadProject { .. } => CommandId::LoadProject,
            Command::ExportProject => CommandId::ExportProject,
            Command::OpenModal { .. } => CommandId::OpenModal,
            Command::ToggleScriptMode => CommandId::ToggleScriptMode,
            Command::ZoomIn => CommandId::ZoomIn,
            Command::ZoomOut => CommandId::ZoomOut,
            Command::SetLanguage { .. } => CommandId::SetLanguage,
            Command::SetAiEnabled { .. } => CommandId::SetAiEnabled,
            Command::SetApiKey { .. } => CommandId::SetApiKey,
            Command::SetTheme { .. } => CommandId::SetTheme,
            Command::UpdateCustomTheme { .. } => CommandId::UpdateCustomTheme,
            Command::NavigateTo { .. } => CommandId::NavigateTo,
            Command::AddLexiconEntry { .. } => CommandId::AddLexiconEntry,
            Command::DeleteLexiconEntry { .. } => CommandId::DeleteLexiconEntry,
            Command::SearchLexicon { .. } => CommandId::SearchLexicon,
            Command::AddPhoneme { .. } => CommandId::AddPhoneme,
            Command::UpdatePhoneme { .. } => CommandId::UpdatePhoneme,
            Command::DeletePhoneme { .. } => CommandId::DeletePhoneme,
        }
    }

    /// Shorthand for opening a modal.
    pub fn open_modal(modal: ModalId) -> Self {
        Command::OpenModal { modal }
    }

    /// Parse the `{"command": ..., "payload": ...}` form.
    pub fn from_json(text: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
