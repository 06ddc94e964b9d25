//! Command identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::StudioError;

/// Every command the application can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandId {
    ToggleSidebar,
    OpenSidebar,
    CloseSidebar,
    OpenConsole,
    CloseConsole,
    MaximizeConsole,
    MinimizeConsole,
    NewProject,
    OpenProject,
    OpenProjectWizard,
    LoadProject,
    ExportProject,
    OpenModal,
    ToggleScriptMode,
    ZoomIn,
    ZoomOut,
    SetLanguage,
    SetAiEnabled,
    SetApiKey,
    SetTheme,
    UpdateCustomTheme,
    NavigateTo,
    AddLexiconEntry,
    DeleteLexiconEntry,
    SearchLexicon,
    AddPhoneme,
    UpdatePhoneme,
    DeletePhoneme,
}

impl CommandId {
    pub const ALL: [CommandId; 28] = [
        CommandId::ToggleSidebar,
        CommandId::OpenSidebar,
        CommandId::CloseSidebar,
        CommandId::OpenConsole,
        CommandId::CloseConsole,
        CommandId::MaximizeConsole,
        CommandId::MinimizeConsole,
        CommandId::NewProject,
        CommandId::OpenProject,
        CommandId::OpenProjectWizard,
        CommandId::LoadProject,
        CommandId::ExportProject,
        CommandId::OpenModal,
        CommandId::ToggleScriptMode,
        CommandId::ZoomIn,
        CommandId::ZoomOut,
        CommandId::SetLanguage,
        CommandId::SetAiEnabled,
        CommandId::SetApiKey,
        CommandId::SetTheme,
        CommandId::UpdateCustomTheme,
        CommandId::NavigateTo,
        CommandId::AddLexiconEntry,
        CommandId::DeleteLexiconEntry,
        CommandId::SearchLexicon,
        CommandId::AddPhoneme,
        CommandId::UpdatePhoneme,
        CommandId::DeletePhoneme,
    ];

    /// Wire name, as used in command JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandId::ToggleSidebar => "toggleSidebar",
            CommandId::OpenSidebar => "openSidebar",
            CommandId::CloseSidebar => "closeSidebar",
            CommandId::OpenConsole => "openConsole",
            CommandId::CloseConsole => "closeConsole",
            CommandId::MaximizeConsole => "maximizeConsole",
            CommandId::MinimizeConsole => "minimizeConsole",
            CommandId::NewProject => "newProject",
            CommandId::OpenProject => "openProject",
            CommandId::OpenProjectWizard => "openProjectWizard",
            CommandId::LoadProject => "loadProject",
            CommandId::ExportProject => "exportProject",
            CommandId::OpenModal => "openModal",
            CommandId::ToggleScriptMode => "toggleScriptMode",
            CommandId::ZoomIn => "zoomIn",
            CommandId::ZoomOut => "zoomOut",
            CommandId::SetLanguage => "setLanguage",
            CommandId::SetAiEnabled => "setAIEnabled",
            CommandId::SetApiKey => "setApiKey",
            CommandId::SetTheme => "setTheme",
            CommandId::UpdateCustomTheme => "updateCustomTheme",
            CommandId::NavigateTo => "navigateTo",
            CommandId::AddLexiconEntry => "addLexiconEntry",
            CommandId::DeleteLexiconEntry => "deleteLexiconEntry",
            CommandId::SearchLexicon => "searchLexicon",
            CommandId::AddPhoneme => "addPhoneme",
            CommandId::UpdatePhoneme => "updatePhoneme",
            CommandId::DeletePhoneme => "deletePhoneme",
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandId {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| StudioError::UnknownCommand(s.to_string()))
    }
}

impl Serialize for CommandId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CommandId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
