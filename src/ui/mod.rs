//! UI-facing state: overlay visibility and workspace layout.

pub mod layout;
pub mod visibility;

pub use layout::{ConsolePanel, Layout, ViewState};
pub use visibility::{ModalId, VisibilityRegistry, WHATS_NEW_SEEN_KEY};
