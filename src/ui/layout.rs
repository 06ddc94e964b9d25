//! Workspace layout: active view, sidebar, script mode, zoom and the console
//! panel geometry.
//!
//! The console panel remembers its height and minimised state across
//! sessions through durable storage.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::StudioError;
use crate::state::Storage;

pub const DEFAULT_ZOOM: u32 = 100;
pub const MIN_ZOOM: u32 = 50;
pub const MAX_ZOOM: u32 = 150;
pub const ZOOM_STEP: u32 = 10;

pub const DEFAULT_CONSOLE_HEIGHT: u32 = 320;
pub const MIN_CONSOLE_HEIGHT: u32 = 120;
/// Matches the footer bar so a minimised console reads as part of it.
pub const MINIMIZED_CONSOLE_HEIGHT: u32 = 24;
/// Space kept free above a maximised console.
pub const CONSOLE_TOP_MARGIN: u32 = 100;

pub const CONSOLE_HEIGHT_KEY: &str = "console_panel_height";
pub const CONSOLE_MINIMIZED_KEY: &str = "console_panel_minimized";

/// Main editor views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewState {
    #[default]
    Dashboard,
    Lexicon,
    Grammar,
    Phonology,
    Genevolve,
    Console,
    Script,
    Notebook,
    Source,
}

impl ViewState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewState::Dashboard => "DASHBOARD",
            ViewState::Lexicon => "LEXICON",
            ViewState::Grammar => "GRAMMAR",
            ViewState::Phonology => "PHONOLOGY",
            ViewState::Genevolve => "GENEVOLVE",
            ViewState::Console => "CONSOLE",
            ViewState::Script => "SCRIPT",
            ViewState::Notebook => "NOTEBOOK",
            ViewState::Source => "SOURCE",
        }
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewState {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        [
            ViewState::Dashboard,
            ViewState::Lexicon,
            ViewState::Grammar,
            ViewState::Phonology,
            ViewState::Genevolve,
            ViewState::Console,
            ViewState::Script,
            ViewState::Notebook,
            ViewState::Source,
        ]
        .into_iter()
        .find(|v| v.as_str() == wanted)
        .ok_or_else(|| StudioError::UnknownView(s.trim().to_string()))
    }
}

/// Console panel state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolePanel {
    pub open: bool,
    pub minimized: bool,
    /// Current on-screen height in pixels.
    pub height: u32,
    /// Last non-minimised height, restored on open.
    pub restore_height: u32,
    pub viewport_height: u32,
}

impl ConsolePanel {
    fn new(viewport_height: u32) -> Self {
        Self {
            open: false,
            minimized: false,
            height: DEFAULT_CONSOLE_HEIGHT,
            restore_height: DEFAULT_CONSOLE_HEIGHT,
            viewport_height,
        }
    }

    /// Largest height the panel may take.
    pub fn max_height(&self) -> u32 {
        self.viewport_height
            .saturating_sub(CONSOLE_TOP_MARGIN)
            .max(MIN_CONSOLE_HEIGHT)
    }

    pub fn clamp_height(&self, height: u32) -> u32 {
        height.clamp(MIN_CONSOLE_HEIGHT, self.max_height())
    }
}

pub struct Layout {
    pub view: ViewState,
    pub sidebar_open: bool,
    pub script_mode: bool,
    zoom: u32,
    console: ConsolePanel,
    storage: Arc<dyn Storage>,
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("view", &self.view)
            .field("sidebar_open", &self.sidebar_open)
            .field("script_mode", &self.script_mode)
            .field("zoom", &self.zoom)
            .field("console", &self.console)
            .finish()
    }
}

impl Layout {
    /// Fresh layout; the console geometry is restored from storage.
    pub fn new(storage: Arc<dyn Storage>, viewport_height: u32) -> Self {
        let mut console = ConsolePanel::new(viewport_height);

        if let Some(saved) = read_key(&*storage, CONSOLE_HEIGHT_KEY).and_then(|s| s.parse().ok()) {
            console.restore_height = console.clamp_height(saved);
            console.height = console.restore_height;
        }
        if read_key(&*storage, CONSOLE_MINIMIZED_KEY).as_deref() == Some("1") {
            console.minimized = true;
            console.height = MINIMIZED_CONSOLE_HEIGHT;
        }

        Self {
            view: ViewState::Dashboard,
            sidebar_open: true,
            script_mode: false,
            zoom: DEFAULT_ZOOM,
            console,
            storage,
        }
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    pub fn console(&self) -> &ConsolePanel {
        &self.console
    }

    pub fn navigate(&mut self, view: ViewState) {
        debug!("Navigating to {}", view);
        self.view = view;
    }

    pub fn zoom_in(&mut self) -> u32 {
        self.zoom = (self.zoom + ZOOM_STEP).min(MAX_ZOOM);
        self.zoom
    }

    pub fn zoom_out(&mut self) -> u32 {
        self.zoom = self.zoom.saturating_sub(ZOOM_STEP).max(MIN_ZOOM);
        self.zoom
    }

    pub fn toggle_script_mode(&mut self) -> bool {
        self.script_mode = !self.script_mode;
        self.script_mode
    }

    // ------------------------------------------------------------------------
    // Console panel
    // ------------------------------------------------------------------------

    /// Open the console at its remembered height, never minimised.
    pub fn open_console(&mut self) {
        self.console.open = true;
        self.console.minimized = false;
        self.console.height = self.console.clamp_height(self.console.restore_height);
        self.persist_console();
    }

    pub fn close_console(&mut self) {
        self.console.open = false;
    }

    /// Grow the console to the largest allowed height.
    pub fn maximize_console(&mut self) {
        if !self.console.open {
            return;
        }
        self.console.minimized = false;
        self.console.height = self.console.max_height();
        self.console.restore_height = self.console.height;
        self.persist_console();
    }

    /// Collapse the console to the footer bar.
    pub fn minimize_console(&mut self) {
        if !self.console.open {
            return;
        }
        if !self.console.minimized {
            self.console.restore_height = self.console.height;
        }
        self.console.minimized = true;
        self.console.height = MINIMIZED_CONSOLE_HEIGHT;
        self.persist_console();
    }

    /// User drag-resize; ignored while minimised.
    pub fn resize_console(&mut self, height: u32) {
        if self.console.minimized {
            return;
        }
        self.console.height = self.console.clamp_height(height);
        self.console.restore_height = self.console.height;
        self.persist_console();
    }

    pub fn set_viewport_height(&mut self, viewport_height: u32) {
        self.console.viewport_height = viewport_height;
        if !self.console.minimized {
            self.console.height = self.console.clamp_height(self.console.height);
        }
    }

    fn persist_console(&self) {
        let minimized = if self.console.minimized { "1" } else { "0" };
        let result = self
            .storage
            .set(CONSOLE_MINIMIZED_KEY, minimized)
            .and_then(|_| {
                if self.console.minimized {
                    Ok(())
                } else {
                    self.storage
                        .set(CONSOLE_HEIGHT_KEY, &self.console.height.to_string())
                }
            });
        if let Err(e) = result {
            warn!("Could not save console layout: {}", e);
        }
    }
}

fn read_key(storage: &dyn Storage, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!("Could not read {}: {}", key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStorage;

    fn layout() -> (Arc<MemoryStorage>, Layout) {
        let storage = Arc::new(MemoryStorage::new());
        let layout = Layout::new(storage.clone(), 900);
        (storage, layout)
    }

    #[test]
    fn test_zoom_is_clamped() {
        let (_, mut layout) = layout();
        for _ in 0..10 {
            layout.zoom_in();
        }
        assert_eq!(layout.zoom(), MAX_ZOOM);
        for _ in 0..20 {
            layout.zoom_out();
        }
        assert_eq!(layout.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_view_parsing() {
        assert_eq!("lexicon".parse::<ViewState>().unwrap(), ViewState::Lexicon);
        assert_eq!(
            "nowhere".parse::<ViewState>().unwrap_err().error_code(),
            "UNKNOWN_VIEW"
        );
    }

    #[test]
    fn test_console_maximize_and_minimize() {
        let (storage, mut layout) = layout();
        layout.open_console();
        assert_eq!(layout.console().height, DEFAULT_CONSOLE_HEIGHT);

        layout.maximize_console();
        assert_eq!(layout.console().height, 800);

        layout.minimize_console();
        assert!(layout.console().minimized);
        assert_eq!(layout.console().height, MINIMIZED_CONSOLE_HEIGHT);
        assert_eq!(storage.peek(CONSOLE_MINIMIZED_KEY).as_deref(), Some("1"));
        assert_eq!(storage.peek(CONSOLE_HEIGHT_KEY).as_deref(), Some("800"));

        layout.close_console();
        layout.open_console();
        assert!(!layout.console().minimized);
        assert_eq!(layout.console().height, 800);
    }

    #[test]
    fn test_console_commands_ignored_when_closed() {
        let (storage, mut layout) = layout();
        layout.maximize_console();
        layout.minimize_console();
        assert!(!layout.console().minimized);
        assert!(storage.writes().is_empty());
    }

    #[test]
    fn test_console_height_restored_and_clamped() {
        let storage = Arc::new(MemoryStorage::with_entry(CONSOLE_HEIGHT_KEY, "5000"));
        let layout = Layout::new(storage, 900);
        assert_eq!(layout.console().height, 800);

        let storage = Arc::new(MemoryStorage::with_entry(CONSOLE_HEIGHT_KEY, "10"));
        let layout = Layout::new(storage, 900);
        assert_eq!(layout.console().height, MIN_CONSOLE_HEIGHT);
    }

    #[test]
    fn test_resize_clamps() {
        let (_, mut layout) = layout();
        layout.open_console();
        layout.resize_console(50);
        assert_eq!(layout.console().height, MIN_CONSOLE_HEIGHT);
    }
}
