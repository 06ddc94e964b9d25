//! Keyboard input: combo parsing and shortcut routing.

pub mod combo;
pub mod router;

pub use combo::{KeyCombo, KeyEvent};
pub use router::{KeyOutcome, RouteContext, Shortcut, ShortcutRouter};
