//! Keyboard Shortcut Router
//!
//! Turns raw key-down/key-up events into commands. Every shortcut whose
//! combo matches fires, in table order. While the console is open, holding
//! Alt with `c` down adds console controls: Up maximises, Down minimises and
//! `q` closes it.

use std::collections::HashSet;

use log::debug;

use crate::command::Command;
use crate::error::Result;
use crate::keys::combo::{KeyCombo, KeyEvent};
use crate::ui::ModalId;

/// One entry of the shortcut table.
#[derive(Debug, Clone, PartialEq)]
pub struct Shortcut {
    pub combo: KeyCombo,
    pub command: Command,
}

/// State the router consults besides the key itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteContext {
    pub console_open: bool,
}

/// Commands produced by one key-down.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyOutcome {
    pub commands: Vec<Command>,
    /// The host should suppress the key's default action.
    pub prevent_default: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ShortcutRouter {
    shortcuts: Vec<Shortcut>,
    pressed: HashSet<String>,
}

impl ShortcutRouter {
    /// Router with an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Router with the application's default shortcuts.
    pub fn with_defaults() -> Result<Self> {
        let mut router = Self::new();
        for (combo, command) in [
            ("alt-c", Command::OpenConsole),
            ("alt-b", Command::ToggleSidebar),
            ("alt-n", Command::NewProject(None)),
            ("alt-o", Command::OpenProject),
            ("alt-e", Command::ExportProject),
            ("alt-+", Command::ZoomIn),
            ("alt--", Command::ZoomOut),
            ("alt-,", Command::open_modal(ModalId::Settings)),
        ] {
            router.bind(combo, command)?;
        }
        Ok(router)
    }

    /// Append a shortcut. Existing bindings of the same combo stay and also fire.
    pub fn bind(&mut self, combo: &str, command: Command) -> Result<()> {
        let combo: KeyCombo = combo.parse()?;
        self.shortcuts.push(Shortcut { combo, command });
        Ok(())
    }

    pub fn shortcuts(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    pub fn is_pressed(&self, key: &str) -> bool {
        self.pressed.contains(&key.to_lowercase())
    }

    pub fn key_down(&mut self, event: &KeyEvent, ctx: RouteContext) -> KeyOutcome {
        let key = event.normalized_key();
        self.pressed.insert(key.clone());

        let mut outcome = KeyOutcome::default();
        for shortcut in self.shortcuts.iter().filter(|s| s.combo.matches(event)) {
            debug!("Shortcut {} -> {}", shortcut.combo, shortcut.command.id());
            outcome.commands.push(shortcut.command.clone());
            outcome.prevent_default = true;
        }

        if ctx.console_open && event.alt && self.pressed.contains("c") {
            let console_command = match key.as_str() {
                "arrowup" => Some(Command::MaximizeConsole),
                "arrowdown" => Some(Command::MinimizeConsole),
                "q" => Some(Command::CloseConsole),
                _ => None,
            };
            if let Some(command) = console_command {
                outcome.commands.push(command);
                outcome.prevent_default = true;
            }
        }

        outcome
    }

    pub fn key_up(&mut self, event: &KeyEvent) {
        self.pressed.remove(&event.normalized_key());
    }

    /// Forget all held keys, e.g. when the window loses focus.
    pub fn reset(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alt(key: &str) -> KeyEvent {
        KeyEvent::plain(key).with_alt()
    }

    #[test]
    fn test_default_table() {
        let mut router = ShortcutRouter::with_defaults().unwrap();
        let ctx = RouteContext::default();

        let outcome = router.key_down(&alt("b"), ctx);
        assert_eq!(outcome.commands, vec![Command::ToggleSidebar]);
        assert!(outcome.prevent_default);

        let outcome = router.key_down(&alt(","), ctx);
        assert_eq!(outcome.commands, vec![Command::open_modal(ModalId::Settings)]);

        let outcome = router.key_down(&KeyEvent::plain("b"), ctx);
        assert!(outcome.commands.is_empty());
        assert!(!outcome.prevent_default);
    }

    #[test]
    fn test_all_matches_fire() {
        let mut router = ShortcutRouter::with_defaults().unwrap();
        router.bind("alt-b", Command::ZoomIn).unwrap();
        let outcome = router.key_down(&alt("b"), RouteContext::default());
        assert_eq!(outcome.commands, vec![Command::ToggleSidebar, Command::ZoomIn]);
    }

    #[test]
    fn test_console_subrouting_needs_c_held() {
        let mut router = ShortcutRouter::with_defaults().unwrap();
        let open = RouteContext { console_open: true };

        let outcome = router.key_down(&alt("ArrowUp"), open);
        assert!(outcome.commands.is_empty());

        let outcome = router.key_down(&alt("c"), open);
        assert_eq!(outcome.commands, vec![Command::OpenConsole]);

        let outcome = router.key_down(&alt("ArrowUp"), open);
        assert_eq!(outcome.commands, vec![Command::MaximizeConsole]);
        let outcome = router.key_down(&alt("ArrowDown"), open);
        assert_eq!(outcome.commands, vec![Command::MinimizeConsole]);
        let outcome = router.key_down(&alt("q"), open);
        assert_eq!(outcome.commands, vec![Command::CloseConsole]);

        router.key_up(&alt("c"));
        let outcome = router.key_down(&alt("ArrowUp"), open);
        assert!(outcome.commands.is_empty());
    }

    #[test]
    fn test_console_subrouting_requires_open_console() {
        let mut router = ShortcutRouter::with_defaults().unwrap();
        router.key_down(&alt("c"), RouteContext::default());
        let outcome = router.key_down(&alt("q"), RouteContext::default());
        assert!(outcome.commands.is_empty());
    }

    #[test]
    fn test_reset_clears_pressed() {
        let mut router = ShortcutRouter::new();
        router.key_down(&KeyEvent::plain("C"), RouteContext::default());
        assert!(router.is_pressed("c"));
        router.reset();
        assert!(!router.is_pressed("c"));
    }
}
