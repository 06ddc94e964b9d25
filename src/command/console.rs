//! Console line interpreter.
//!
//! A tiny shell over the command dispatcher. Each input line is echoed into
//! the log, parsed as `WORD [ARG]` (case-insensitive) and turned into at most
//! one dispatched command. The log is what the console view renders.

use chrono::Local;
use serde::Serialize;

use crate::command::dispatcher::Dispatch;
use crate::command::payload::Command;
use crate::error::Result;
use crate::ui::ModalId;

const BANNER: &str = "Conlang Studio console";

/// Log entries kept by default; the oldest are dropped past this.
pub const DEFAULT_MAX_HISTORY: usize = 500;

const HELP_LINES: &[&str] = &[
    "AVAILABLE COMMANDS:",
    "CLEAR - Clears the terminal.",
    "HELP - Shows this help message.",
    "ABOUT - Shows info about this console.",
    "SIDEBAR - Toggle the sidebar.",
    "CONSOLE OPEN|CLOSE|MAX|MIN - Control console pane.",
    "NEW - Start a new project.",
    "OPEN - Open an existing project.",
    "EXPORT - Export the current project.",
    "MODAL <name> - Open a modal (about, settings, constraints, wizard, whatsnew).",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Command,
    Success,
    Error,
    Info,
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub content: String,
    pub timestamp: String,
}

/// Executes a command on behalf of the console.
pub type Executor<'a> = dyn FnMut(Command) -> Result<Dispatch> + 'a;

#[derive(Debug, Clone)]
pub struct ConsoleShell {
    history: Vec<LogEntry>,
    max_history: usize,
}

impl Default for ConsoleShell {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleShell {
    /// A fresh console showing the banner.
    pub fn new() -> Self {
        let mut shell = Self {
            history: Vec::new(),
            max_history: DEFAULT_MAX_HISTORY,
        };
        shell.clear();
        shell
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history.max(1);
        self.trim();
        self
    }

    pub fn history(&self) -> &[LogEntry] {
        &self.history
    }

    fn clear(&mut self) {
        self.history.clear();
        self.history.push(LogEntry {
            kind: LogKind::Info,
            content: BANNER.to_string(),
            timestamp: String::new(),
        });
    }

    fn log(&mut self, kind: LogKind, content: impl Into<String>) {
        self.history.push(LogEntry {
            kind,
            content: content.into(),
            timestamp: Local::now().format("%H:%M:%S").to_string(),
        });
    }

    /// Interpret one line. Returns the entries appended for it.
    pub fn run_line(&mut self, line: &str, exec: &mut Executor<'_>) -> Vec<LogEntry> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }

        self.log(LogKind::Command, line);
        let start = self.history.len() - 1;

        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_uppercase();
        let arg = words.next();

        match verb.as_str() {
            "CLEAR" | "CLS" => {
                self.clear();
                return Vec::new();
            }
            "HELP" => {
                for help in HELP_LINES {
                    self.log(LogKind::Output, *help);
                }
            }
            "ABOUT" => self.log(
                LogKind::Output,
                format!("{} v{} - command-aware shell.", BANNER, env!("CARGO_PKG_VERSION")),
            ),
            "SIDEBAR" => self.dispatch(exec, Command::ToggleSidebar, "Sidebar toggled."),
            "CONSOLE" => {
                let Some(action) = arg.map(str::to_ascii_uppercase) else {
                    self.log(LogKind::Error, "Specify OPEN, CLOSE, MAX, or MIN.");
                    return self.finish(start);
                };
                let command = match action.as_str() {
                    "OPEN" => Command::OpenConsole,
                    "CLOSE" => Command::CloseConsole,
                    "MAX" => Command::MaximizeConsole,
                    "MIN" => Command::MinimizeConsole,
                    _ => {
                        self.log(LogKind::Error, format!("Unknown console action: {}", action));
                        return self.finish(start);
                    }
                };
                let message = format!("Console {} command executed.", action.to_lowercase());
                self.dispatch(exec, command, &message);
            }
            "NEW" => self.dispatch(exec, Command::NewProject(None), "Launching new project wizard."),
            "OPEN" => self.dispatch(exec, Command::OpenProject, "Open project triggered."),
            "EXPORT" => self.dispatch(exec, Command::ExportProject, "Export command dispatched."),
            "MODAL" => match arg.map(str::parse::<ModalId>) {
                Some(Ok(modal)) => {
                    let message = format!("Opened modal: {}.", modal);
                    self.dispatch(exec, Command::open_modal(modal), &message);
                }
                _ => self.log(
                    LogKind::Error,
                    format!("Unknown modal: {}", arg.unwrap_or("<missing>")),
                ),
            },
            _ => self.log(LogKind::Error, format!("Command not recognized: {}", line)),
        }

        self.finish(start)
    }

    /// Entries appended since `start`, then the oldest dropped past the cap.
    fn finish(&mut self, start: usize) -> Vec<LogEntry> {
        let entries = self.history[start..].to_vec();
        self.trim();
        entries
    }

    fn trim(&mut self) {
        if self.history.len() > self.max_history {
            let excess = self.history.len() - self.max_history;
            self.history.drain(..excess);
        }
    }

    fn dispatch(&mut self, exec: &mut Executor<'_>, command: Command, success: &str) {
        let id = command.id();
        match exec(command) {
            Ok(Dispatch::Handled) => self.log(LogKind::Success, success),
            Ok(Dispatch::Unhandled) => {
                self.log(LogKind::Error, format!("No handler registered for {}", id))
            }
            Err(e) => self.log(LogKind::Error, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudioError;

    fn run(shell: &mut ConsoleShell, line: &str) -> (Vec<LogEntry>, Vec<Command>) {
        let mut seen = Vec::new();
        let entries = shell.run_line(line, &mut |cmd: Command| {
            seen.push(cmd);
            Ok(Dispatch::Handled)
        });
        (entries, seen)
    }

    #[test]
    fn test_console_subcommands() {
        let mut shell = ConsoleShell::new();
        let (entries, seen) = run(&mut shell, "console max");
        assert_eq!(seen, vec![Command::MaximizeConsole]);
        assert_eq!(entries[0].kind, LogKind::Command);
        assert_eq!(entries[1].content, "Console max command executed.");
    }

    #[test]
    fn test_modal_with_alias() {
        let mut shell = ConsoleShell::new();
        let (_, seen) = run(&mut shell, "MODAL whats-new");
        assert_eq!(seen, vec![Command::open_modal(ModalId::WhatsNew)]);

        let (entries, seen) = run(&mut shell, "modal");
        assert!(seen.is_empty());
        assert_eq!(entries[1].content, "Unknown modal: <missing>");
    }

    #[test]
    fn test_unknown_line() {
        let mut shell = ConsoleShell::new();
        let (entries, seen) = run(&mut shell, "launch rockets");
        assert!(seen.is_empty());
        assert_eq!(entries[1].kind, LogKind::Error);
    }

    #[test]
    fn test_clear_resets_history() {
        let mut shell = ConsoleShell::new();
        run(&mut shell, "help");
        assert!(shell.history().len() > 2);
        run(&mut shell, "cls");
        assert_eq!(shell.history().len(), 1);
        assert_eq!(shell.history()[0].content, BANNER);
    }

    #[test]
    fn test_history_is_capped() {
        let mut shell = ConsoleShell::new().with_max_history(5);
        let (entries, _) = run(&mut shell, "help");
        assert_eq!(entries.len(), 1 + HELP_LINES.len());
        assert_eq!(shell.history().len(), 5);
        assert_eq!(shell.history()[4].content, HELP_LINES[HELP_LINES.len() - 1]);

        for _ in 0..20 {
            run(&mut shell, "sidebar");
        }
        assert_eq!(shell.history().len(), 5);
        assert_eq!(shell.history()[4].content, "Sidebar toggled.");
    }

    #[test]
    fn test_handler_error_is_logged() {
        let mut shell = ConsoleShell::new();
        let entries = shell.run_line("open", &mut |_: Command| {
            Err(StudioError::Internal("picker busy".to_string()))
        });
        assert_eq!(entries[1].kind, LogKind::Error);
        assert!(entries[1].content.contains("picker busy"));
    }
}
