//! UI Visibility Registry
//!
//! Tracks which overlays are open. The registry is the only writer of the
//! map; overlays are independent, so opening one never closes another.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::StudioError;

/// Storage flag set once the What's New modal has been dismissed.
pub const WHATS_NEW_SEEN_KEY: &str = "whats_new_v1.1_seen";

/// Overlays known to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModalId {
    About,
    Settings,
    Constraints,
    Wizard,
    WhatsNew,
}

impl ModalId {
    pub const ALL: [ModalId; 5] = [
        ModalId::About,
        ModalId::Settings,
        ModalId::Constraints,
        ModalId::Wizard,
        ModalId::WhatsNew,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModalId::About => "about",
            ModalId::Settings => "settings",
            ModalId::Constraints => "constraints",
            ModalId::Wizard => "wizard",
            ModalId::WhatsNew => "whatsNew",
        }
    }
}

impl fmt::Display for ModalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModalId {
    type Err = StudioError;

    /// Case-insensitive, with the aliases the console and menus use.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "about" => Ok(ModalId::About),
            "settings" => Ok(ModalId::Settings),
            "constraints" => Ok(ModalId::Constraints),
            "wizard" | "new" => Ok(ModalId::Wizard),
            "whatsnew" | "whats-new" => Ok(ModalId::WhatsNew),
            _ => Err(StudioError::UnknownModal(s.trim().to_string())),
        }
    }
}

impl Serialize for ModalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ModalId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Callback run once when a modal closes.
pub type OnClose = Box<dyn FnOnce()>;

/// Open/closed flag per overlay; unset means closed.
#[derive(Default)]
pub struct VisibilityRegistry {
    open: BTreeMap<ModalId, bool>,
    on_close: HashMap<ModalId, OnClose>,
}

impl fmt::Debug for VisibilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityRegistry")
            .field("open", &self.open_modals())
            .field("pending_callbacks", &self.on_close.len())
            .finish()
    }
}

impl VisibilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, id: ModalId) {
        debug!("Opening modal {}", id);
        self.open.insert(id, true);
    }

    /// Open and run `on_close` the next time this modal closes.
    ///
    /// Replaces any callback still pending for the same modal.
    pub fn open_with(&mut self, id: ModalId, on_close: OnClose) {
        self.on_close.insert(id, on_close);
        self.open(id);
    }

    pub fn close(&mut self, id: ModalId) {
        let was_open = self.is_open(id);
        self.open.insert(id, false);
        if was_open {
            debug!("Closed modal {}", id);
        }
        if let Some(callback) = self.on_close.remove(&id) {
            callback();
        }
    }

    pub fn toggle(&mut self, id: ModalId) {
        if self.is_open(id) {
            self.close(id);
        } else {
            self.open(id);
        }
    }

    pub fn is_open(&self, id: ModalId) -> bool {
        self.open.get(&id).copied().unwrap_or(false)
    }

    /// Currently open overlays in stable order.
    pub fn open_modals(&self) -> Vec<ModalId> {
        self.open
            .iter()
            .filter(|(_, open)| **open)
            .map(|(id, _)| *id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use test_case::test_case;

    #[test_case("about", ModalId::About ; "about")]
    #[test_case("Settings", ModalId::Settings ; "case insensitive")]
    #[test_case("new", ModalId::Wizard ; "new is the wizard")]
    #[test_case("whats-new", ModalId::WhatsNew ; "dashed alias")]
    #[test_case("whatsNew", ModalId::WhatsNew ; "camel case id")]
    fn test_modal_aliases(input: &str, expected: ModalId) {
        assert_eq!(input.parse::<ModalId>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_modal() {
        let err = "preferences".parse::<ModalId>().unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_MODAL");
    }

    #[test]
    fn test_open_close_toggle() {
        let mut registry = VisibilityRegistry::new();
        assert!(!registry.is_open(ModalId::About));

        registry.open(ModalId::About);
        registry.open(ModalId::About);
        assert!(registry.is_open(ModalId::About));

        registry.toggle(ModalId::About);
        assert!(!registry.is_open(ModalId::About));

        registry.close(ModalId::About);
        assert!(!registry.is_open(ModalId::About));

        registry.toggle(ModalId::Settings);
        assert!(registry.is_open(ModalId::Settings));
    }

    #[test]
    fn test_modals_are_independent() {
        let mut registry = VisibilityRegistry::new();
        registry.open(ModalId::Settings);
        registry.open(ModalId::Constraints);
        assert_eq!(
            registry.open_modals(),
            vec![ModalId::Settings, ModalId::Constraints]
        );
    }

    #[test]
    fn test_on_close_runs_once() {
        let calls = Rc::new(Cell::new(0));
        let mut registry = VisibilityRegistry::new();

        let counter = calls.clone();
        registry.open_with(
            ModalId::Wizard,
            Box::new(move || counter.set(counter.get() + 1)),
        );
        registry.close(ModalId::Wizard);
        registry.open(ModalId::Wizard);
        registry.close(ModalId::Wizard);

        assert_eq!(calls.get(), 1);
    }
}
