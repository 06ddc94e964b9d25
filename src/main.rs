//! Conlang Studio CLI
//!
//! Command-line interface for the Conlang Studio core.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::debug;

use conlang_studio::cli::commands;
use conlang_studio::cli::{Cli, Commands};
use conlang_studio::StudioConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let config = cli.config();
    debug!("Using data directory {}", config.data_dir.display());

    match cli.command {
        Some(cmd) => handle_command(cmd, &config),
        None => {
            println!("Conlang Studio v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands, config: &StudioConfig) -> Result<()> {
    match cmd {
        Commands::Info => commands::show_info(config),
        Commands::New {
            name,
            author,
            description,
        } => commands::new_project(config, &name, &author, &description),
        Commands::Import { path } => commands::import_project(config, &path),
        Commands::Export { output } => commands::export_project(config, output.as_deref()),
        Commands::AddWord {
            word,
            pos,
            definition,
            ipa,
        } => commands::add_word(config, &word, &pos, &definition, &ipa),
        Commands::Search { query, pos } => commands::search(config, &query, pos.as_deref()),
        Commands::Run { json } => commands::run_json(config, &json),
        Commands::Console { line } => commands::run_console(config, &line.join(" ")),
        Commands::Keys { combos } => commands::press_keys(config, &combos),
        Commands::Settings => commands::show_settings(config),
        Commands::Backups => commands::list_backups(config),
    }
}
