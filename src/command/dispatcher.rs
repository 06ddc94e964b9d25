//! Command dispatcher
//!
//! Maps each [`CommandId`] to exactly one handler. Registration merges: a
//! later handler for the same id replaces the earlier one, which is how
//! feature modules override the built-in defaults. Dispatching an id with no
//! handler is a soft failure: a warning, no state change, no error.

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};

use crate::command::id::CommandId;
use crate::command::payload::Command;
use crate::error::Result;

/// A command handler operating on the dispatch context `C`.
pub type Handler<C> = Box<dyn FnMut(&mut C, &Command) -> Result<()>>;

/// Outcome of registering one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// An earlier handler for the same id was dropped.
    Replaced,
}

/// Outcome of executing a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    /// No handler is registered for the command's id.
    Unhandled,
}

pub struct CommandDispatcher<C> {
    handlers: HashMap<CommandId, Handler<C>>,
}

impl<C> fmt::Debug for CommandDispatcher<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("registered", &self.registered())
            .finish()
    }
}

impl<C> Default for CommandDispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> CommandDispatcher<C> {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a single handler.
    pub fn register_one(
        &mut self,
        id: CommandId,
        handler: impl FnMut(&mut C, &Command) -> Result<()> + 'static,
    ) -> Registration {
        match self.handlers.insert(id, Box::new(handler)) {
            Some(_) => {
                debug!("Handler for {} replaced", id);
                Registration::Replaced
            }
            None => Registration::Added,
        }
    }

    /// Merge a batch of handlers. Returns the ids whose previous handler was replaced.
    pub fn register<I>(&mut self, entries: I) -> Vec<CommandId>
    where
        I: IntoIterator<Item = (CommandId, Handler<C>)>,
    {
        entries
            .into_iter()
            .filter_map(|(id, handler)| match self.handlers.insert(id, handler) {
                Some(_) => {
                    debug!("Handler for {} replaced", id);
                    Some(id)
                }
                None => None,
            })
            .collect()
    }

    /// Run the handler registered for the command's id.
    ///
    /// Handler errors are returned to the caller; a missing handler is not an error.
    pub fn execute(&mut self, ctx: &mut C, command: &Command) -> Result<Dispatch> {
        let id = command.id();
        match self.handlers.get_mut(&id) {
            Some(handler) => {
                debug!("Executing {}", id);
                handler(ctx, command)?;
                Ok(Dispatch::Handled)
            }
            None => {
                warn!("No handler registered for {}", id);
                Ok(Dispatch::Unhandled)
            }
        }
    }

    /// Check if a handler is registered
    pub fn has_handler(&self, id: CommandId) -> bool {
        self.handlers.contains_key(&id)
    }

    /// Registered ids in declaration order.
    pub fn registered(&self) -> Vec<CommandId> {
        CommandId::ALL
            .into_iter()
            .filter(|id| self.handlers.contains_key(id))
            .collect()
    }
}

/// Box a closure as a [`Handler`] for use with [`CommandDispatcher::register`].
pub fn handler<C>(f: impl FnMut(&mut C, &Command) -> Result<()> + 'static) -> Handler<C> {
    Box::new(f)
}
