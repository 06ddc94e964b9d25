//! Application root.
//!
//! [`Workspace`] holds every state owner: the project store, the settings
//! store, the visibility registry and the layout. [`Studio`] wires a
//! workspace to the command dispatcher, the shortcut router and the console
//! interpreter, and runs the boot sequence. Nothing here is global; each
//! `Studio` is an independent instance.

use std::fmt;
use std::sync::Arc;

use log::{info, warn};

use crate::command::builtin::builtin_handlers;
use crate::command::console::{ConsoleShell, LogEntry};
use crate::command::dispatcher::Handler;
use crate::command::{Command, CommandDispatcher, CommandId, Dispatch};
use crate::config::StudioConfig;
use crate::error::Result;
use crate::keys::{KeyEvent, KeyOutcome, RouteContext, ShortcutRouter};
use crate::model::AppSettings;
use crate::search::SearchResult;
use crate::state::{LoadTicket, ProjectStore, SeedSource, SettingsStore, Storage};
use crate::ui::{Layout, ModalId, VisibilityRegistry, WHATS_NEW_SEEN_KEY};

/// Work the embedding host must carry out on the core's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRequest {
    /// Show a file picker; finish with [`Studio::finish_import`] or [`Studio::cancel_import`].
    PickProjectFile { ticket: LoadTicket },
    /// Offer `contents` for download under `file_name`.
    SaveFile { file_name: String, contents: String },
    /// Switch the interface language.
    ApplyLanguage(String),
}

/// Which flow the project wizard was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    Edit,
}

/// All application state, passed to command handlers.
pub struct Workspace {
    pub project: ProjectStore,
    pub settings: SettingsStore,
    pub ui: VisibilityRegistry,
    pub layout: Layout,

    /// Results of the last `searchLexicon`.
    pub last_search: Vec<SearchResult>,
    pub wizard_mode: Option<WizardMode>,

    requests: Vec<HostRequest>,
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("project", &self.project)
            .field("settings", &self.settings)
            .field("ui", &self.ui)
            .field("layout", &self.layout)
            .field("pending_requests", &self.requests.len())
            .finish()
    }
}

impl Workspace {
    pub fn new(storage: Arc<dyn Storage>, config: &StudioConfig) -> Self {
        let settings = SettingsStore::load(storage.clone());
        let mut project = ProjectStore::new(storage.clone());
        project.set_autosave_enabled(settings.settings().auto_save);

        Self {
            project,
            settings,
            ui: VisibilityRegistry::new(),
            layout: Layout::new(storage, config.viewport_height),
            last_search: Vec::new(),
            wizard_mode: None,
            requests: Vec::new(),
        }
    }

    /// Queue work for the host.
    pub fn request(&mut self, request: HostRequest) {
        self.requests.push(request);
    }

    pub fn pending_requests(&self) -> &[HostRequest] {
        &self.requests
    }

    /// Replace the settings and keep the project's autosave in step.
    ///
    /// This is the only public way to change `autoSave`; turning it back on
    /// flushes pending project changes.
    pub fn update_settings(&mut self, settings: AppSettings) {
        let auto_save = settings.auto_save;
        self.settings.update(settings);
        self.project.set_autosave_enabled(auto_save);
    }
}

pub struct Studio {
    workspace: Workspace,
    dispatcher: CommandDispatcher<Workspace>,
    shortcuts: ShortcutRouter,
    console: ConsoleShell,
    storage: Arc<dyn Storage>,
}

impl fmt::Debug for Studio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Studio")
            .field("workspace", &self.workspace)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl Studio {
    /// Build a studio with the built-in handlers and default shortcuts.
    pub fn new(storage: Arc<dyn Storage>, config: &StudioConfig) -> Result<Self> {
        let mut dispatcher = CommandDispatcher::new();
        dispatcher.register(builtin_handlers());

        Ok(Self {
            workspace: Workspace::new(storage.clone(), config),
            dispatcher,
            shortcuts: ShortcutRouter::with_defaults()?,
            console: ConsoleShell::new().with_max_history(config.max_console_history),
            storage,
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    pub fn shortcuts_mut(&mut self) -> &mut ShortcutRouter {
        &mut self.shortcuts
    }

    pub fn console_history(&self) -> &[LogEntry] {
        self.console.history()
    }

    /// Load the stored project (or the seed) and show What's New once.
    pub fn boot(&mut self, seed: &dyn SeedSource) -> Result<()> {
        self.workspace.project.boot(seed)?;

        let seen = matches!(self.storage.get(WHATS_NEW_SEEN_KEY), Ok(Some(_)));
        if !seen {
            let storage = self.storage.clone();
            self.workspace.ui.open_with(
                ModalId::WhatsNew,
                Box::new(move || {
                    if let Err(e) = storage.set(WHATS_NEW_SEEN_KEY, "true") {
                        warn!("Could not remember What's New dismissal: {}", e);
                    }
                }),
            );
        }

        info!(
            "Studio ready with project '{}'",
            self.workspace.project.document().name
        );
        Ok(())
    }

    /// Override or add handlers. Returns the ids that replaced a previous handler.
    pub fn register<I>(&mut self, entries: I) -> Vec<CommandId>
    where
        I: IntoIterator<Item = (CommandId, Handler<Workspace>)>,
    {
        self.dispatcher.register(entries)
    }

    pub fn execute(&mut self, command: &Command) -> Result<Dispatch> {
        self.dispatcher.execute(&mut self.workspace, command)
    }

    /// Route a key press and run the commands it produces.
    ///
    /// A failing command is logged and does not stop the others.
    pub fn key_down(&mut self, event: &KeyEvent) -> KeyOutcome {
        let ctx = RouteContext {
            console_open: self.workspace.layout.console().open,
        };
        let outcome = self.shortcuts.key_down(event, ctx);
        for command in &outcome.commands {
            if let Err(e) = self.dispatcher.execute(&mut self.workspace, command) {
                warn!("Shortcut command {} failed: {}", command.id(), e);
            }
        }
        outcome
    }

    pub fn key_up(&mut self, event: &KeyEvent) {
        self.shortcuts.key_up(event);
    }

    /// Interpret one console line; returns the log entries it produced.
    pub fn run_console_line(&mut self, line: &str) -> Vec<LogEntry> {
        let dispatcher = &mut self.dispatcher;
        let workspace = &mut self.workspace;
        self.console
            .run_line(line, &mut |command: Command| {
                dispatcher.execute(workspace, &command)
            })
    }

    /// Hand the picked file's text back to the store.
    pub fn finish_import(&mut self, ticket: LoadTicket, raw: Result<String>) -> Result<()> {
        self.workspace.project.complete_load(ticket, raw)?;
        self.workspace.layout.navigate(crate::ui::ViewState::Dashboard);
        Ok(())
    }

    pub fn cancel_import(&mut self, ticket: LoadTicket) -> Result<()> {
        self.workspace.project.cancel_load(ticket)
    }

    /// Take every queued host request.
    pub fn drain_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.workspace.requests)
    }
}
