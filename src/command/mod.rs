//! Command Module
//!
//! Named commands with typed payloads, the dispatcher that routes them to
//! handlers, the built-in handler set and the console interpreter.

pub mod builtin;
pub mod console;
pub mod dispatcher;
pub mod id;
pub mod payload;

pub use console::{ConsoleShell, LogEntry, LogKind};
pub use dispatcher::{handler, CommandDispatcher, Dispatch, Handler, Registration};
pub use id::CommandId;
pub use payload::Command;
