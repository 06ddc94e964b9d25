//! CLI Module
//!
//! Command-line interface driving the studio core against a file-backed store.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{StudioConfig, HOME_ENV};

/// Conlang Studio - constructed-language project workbench
#[derive(Parser, Debug)]
#[command(name = "conlang-studio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Data directory holding the stored project and settings
    #[arg(long, global = true, env = HOME_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Starter project used when nothing is stored yet
    #[arg(long, global = true)]
    pub seed: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Configuration with the command-line overrides applied.
    pub fn config(&self) -> StudioConfig {
        StudioConfig::from_env()
            .with_home(self.data_dir.clone())
            .with_seed(self.seed.clone())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a summary of the current project
    #[command(name = "info")]
    Info,

    /// Start a blank project
    #[command(name = "new")]
    New {
        /// Project name
        name: String,

        #[arg(short, long, default_value = "")]
        author: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Import a project export, replacing the current project
    #[command(name = "import")]
    Import {
        /// Path to the exported JSON file
        path: PathBuf,
    },

    /// Export the current project
    #[command(name = "export")]
    Export {
        /// Output file; defaults to `<name>.json` in the working directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Add a word to the lexicon
    #[command(name = "add-word")]
    AddWord {
        word: String,

        /// Part of speech
        #[arg(short, long, default_value = "")]
        pos: String,

        #[arg(short, long, default_value = "")]
        definition: String,

        #[arg(short, long, default_value = "")]
        ipa: String,
    },

    /// Search the lexicon
    #[command(name = "search")]
    Search {
        query: String,

        /// Restrict to one part of speech
        #[arg(short, long)]
        pos: Option<String>,
    },

    /// Execute a command given as `{"command": ..., "payload": ...}` JSON
    #[command(name = "run")]
    Run {
        json: String,
    },

    /// Run a line through the console interpreter
    #[command(name = "console")]
    Console {
        #[arg(required = true, num_args = 1..)]
        line: Vec<String>,
    },

    /// Press key combinations (e.g. `alt-c alt-up`) and run what they trigger
    #[command(name = "keys")]
    Keys {
        #[arg(required = true, num_args = 1..)]
        combos: Vec<String>,
    },

    /// Show the stored settings
    #[command(name = "settings")]
    Settings,

    /// List rotated project backups
    #[command(name = "backups")]
    Backups,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from([
            "conlang-studio",
            "search",
            "mel",
            "--pos",
            "Noun",
            "--data-dir",
            "/tmp/studio",
        ]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/studio")));
        assert_eq!(cli.config().data_dir, PathBuf::from("/tmp/studio"));
        match cli.command {
            Some(Commands::Search { query, pos }) => {
                assert_eq!(query, "mel");
                assert_eq!(pos.as_deref(), Some("Noun"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_keys() {
        let cli = Cli::parse_from(["conlang-studio", "keys", "alt-c", "alt-up"]);
        match cli.command {
            Some(Commands::Keys { combos }) => assert_eq!(combos, vec!["alt-c", "alt-up"]),
            other => panic!("unexpected {:?}", other),
        }
    }
}
