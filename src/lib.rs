//! Conlang Studio - application core for a constructed-language editor
//!
//! The core owns everything a front end needs besides rendering:
//! 1. Project state - the single working document, its load lifecycle and autosave
//! 2. Settings - theme, language and preferences persisted on every change
//! 3. Commands - a named-command dispatcher shared by menus, shortcuts and the console
//!
//! # Architecture
//!
//! Triggers never touch state directly:
//! - Menus, keyboard shortcuts and the console produce [`command::Command`]s
//! - The [`command::CommandDispatcher`] routes each command to one handler
//! - Handlers mutate the [`app::Workspace`], whose stores persist through a [`state::Storage`]

pub mod app;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod keys;
pub mod model;
pub mod search;
pub mod state;
pub mod ui;

pub use app::{HostRequest, Studio, Workspace};
pub use config::StudioConfig;
pub use error::{Result, StudioError};
