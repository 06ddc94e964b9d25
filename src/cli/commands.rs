//! CLI Command Implementations
//!
//! Each command boots a [`Studio`] over the configured data directory, drives
//! it through the same command surface the UI uses and prints the outcome.
//! Host requests (file picker, downloads) are fulfilled against the file system.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::{info, warn};

use crate::app::{HostRequest, Studio};
use crate::command::{Command, Dispatch};
use crate::config::StudioConfig;
use crate::keys::KeyEvent;
use crate::model::ProjectSeed;
use crate::state::storage::PROJECT_STORAGE_KEY;
use crate::state::Storage;

/// Open the data directory and boot a studio over it.
pub fn open_studio(config: &StudioConfig) -> Result<Studio> {
    let storage = config
        .open_storage()
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;
    let storage: Arc<dyn Storage> = Arc::new(storage);

    let mut studio = Studio::new(storage, config)?;
    let seed = config.seed_source();
    studio.boot(seed.as_ref())?;
    Ok(studio)
}

/// Execute one command, failing when no handler picked it up.
fn execute(studio: &mut Studio, command: Command) -> Result<()> {
    let id = command.id();
    match studio.execute(&command)? {
        Dispatch::Handled => Ok(()),
        Dispatch::Unhandled => bail!("no handler registered for {}", id),
    }
}

/// Print a summary of the current project.
pub fn show_info(config: &StudioConfig) -> Result<()> {
    let studio = open_studio(config)?;
    let project = studio.workspace().project.document();
    let phonology = &project.phonology;

    println!("Project: {}", project.name);
    if !project.author.is_empty() {
        println!("Author: {}", project.author);
    }
    if !project.description.is_empty() {
        println!("Description: {}", project.description);
    }
    println!("Version: {}", project.version);
    println!("{:-<60}", "");
    println!("Lexicon entries: {}", project.lexicon.len());
    println!(
        "Phonemes: {} consonants, {} vowels",
        phonology.consonants.len(),
        phonology.vowels.len()
    );
    println!("Sound changes: {}", project.evolution_rules.len());
    println!("Glyphs: {}", project.script_config.glyphs.len());
    println!("{:-<60}", "");
    println!("Fingerprint: {}", project.fingerprint()?);

    Ok(())
}

/// Replace the current project with a blank one.
pub fn new_project(config: &StudioConfig, name: &str, author: &str, description: &str) -> Result<()> {
    info!("Creating new project: {}", name);

    let mut studio = open_studio(config)?;
    execute(
        &mut studio,
        Command::NewProject(Some(ProjectSeed {
            name: name.to_string(),
            author: author.to_string(),
            description: description.to_string(),
            constraints: None,
        })),
    )?;

    println!("Project created: {}", studio.workspace().project.document().name);
    Ok(())
}

/// Import an exported project through the same open/finish flow as the UI.
pub fn import_project(config: &StudioConfig, path: &Path) -> Result<()> {
    info!("Importing project: {}", path.display());

    let mut studio = open_studio(config)?;
    execute(&mut studio, Command::OpenProject)?;

    let ticket = studio
        .drain_requests()
        .into_iter()
        .find_map(|request| match request {
            HostRequest::PickProjectFile { ticket } => Some(ticket),
            _ => None,
        })
        .context("open project did not request a file")?;

    let raw = fs::read_to_string(path).map_err(|source| crate::StudioError::FileReadError {
        path: path.to_path_buf(),
        source,
    });
    studio
        .finish_import(ticket, raw)
        .with_context(|| format!("importing {}", path.display()))?;

    let project = studio.workspace().project.document();
    println!("Project imported: {}", project.name);
    println!("Lexicon entries: {}", project.lexicon.len());
    Ok(())
}

/// Write the current project as an export file.
pub fn export_project(config: &StudioConfig, output: Option<&Path>) -> Result<()> {
    let mut studio = open_studio(config)?;
    execute(&mut studio, Command::ExportProject)?;

    for request in studio.drain_requests() {
        if let HostRequest::SaveFile { file_name, contents } = request {
            let target = output
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(&file_name));
            fs::write(&target, contents)
                .with_context(|| format!("writing {}", target.display()))?;
            println!("Project exported: {}", target.display());
            return Ok(());
        }
    }

    bail!("export produced no file")
}

/// Add a word to the lexicon.
pub fn add_word(
    config: &StudioConfig,
    word: &str,
    pos: &str,
    definition: &str,
    ipa: &str,
) -> Result<()> {
    let mut studio = open_studio(config)?;
    let before = studio.workspace().project.document().lexicon.len();

    execute(
        &mut studio,
        Command::AddLexiconEntry {
            word: word.to_string(),
            pos: pos.to_string(),
            definition: definition.to_string(),
            ipa: ipa.to_string(),
            etymology: None,
            derived_from: None,
        },
    )?;

    let lexicon = &studio.workspace().project.document().lexicon;
    if lexicon.len() == before {
        warn!("Nothing was added for '{}'", word);
        return Ok(());
    }
    if let Some(entry) = lexicon.last() {
        println!("Added {} ({}) [{}]", entry.word, entry.pos, entry.id);
    }
    Ok(())
}

/// Search the lexicon and print ranked results.
pub fn search(config: &StudioConfig, query: &str, pos: Option<&str>) -> Result<()> {
    let mut studio = open_studio(config)?;
    execute(
        &mut studio,
        Command::SearchLexicon {
            query: query.to_string(),
            pos: pos.map(str::to_string),
        },
    )?;

    let results = &studio.workspace().last_search;
    if results.is_empty() {
        println!("No matches.");
        return Ok(());
    }

    for result in results {
        println!(
            "{:>4}  {:<20} {:<12} {:?}  {}",
            result.relevance_score,
            result.entry.word,
            result.entry.pos,
            result.match_type,
            result.entry.definition
        );
    }
    Ok(())
}

/// Execute a JSON command.
pub fn run_json(config: &StudioConfig, json: &str) -> Result<()> {
    let command = Command::from_json(json).context("parsing command JSON")?;
    let id = command.id();

    let mut studio = open_studio(config)?;
    execute(&mut studio, command)?;
    report_requests(&mut studio);

    println!("Executed {}", id);
    Ok(())
}

/// Run a console line and print what it logged.
pub fn run_console(config: &StudioConfig, line: &str) -> Result<()> {
    let mut studio = open_studio(config)?;
    for entry in studio.run_console_line(line) {
        println!("[{:?}] {}", entry.kind, entry.content);
    }
    report_requests(&mut studio);
    Ok(())
}

/// Press each combo in turn, keeping earlier keys held.
pub fn press_keys(config: &StudioConfig, combos: &[String]) -> Result<()> {
    let mut studio = open_studio(config)?;
    for combo in combos {
        let event = KeyEvent::parse(combo)?;
        let outcome = studio.key_down(&event);
        if outcome.commands.is_empty() {
            println!("{}: no shortcut", combo);
        }
        for command in &outcome.commands {
            println!("{}: {}", combo, command.id());
        }
    }

    let console = studio.workspace().layout.console();
    println!(
        "Console: {} (height {}, minimized {})",
        if console.open { "open" } else { "closed" },
        console.height,
        console.minimized
    );
    report_requests(&mut studio);
    Ok(())
}

/// Print the stored settings and the resolved palette.
pub fn show_settings(config: &StudioConfig) -> Result<()> {
    let studio = open_studio(config)?;
    let settings = studio.workspace().settings.settings();

    println!("{}", serde_json::to_string_pretty(settings)?);
    println!("{:-<60}", "");
    for (role, value) in settings.palette().iter() {
        println!("{:<16} {}", role.as_str(), value);
    }
    println!(
        "API key: {}",
        if studio.workspace().settings.has_api_key() {
            "set"
        } else {
            "not set"
        }
    );
    Ok(())
}

/// List rotated project backups, newest first.
pub fn list_backups(config: &StudioConfig) -> Result<()> {
    let storage = config.open_storage()?;
    let backups = storage.list_backups(PROJECT_STORAGE_KEY)?;

    if backups.is_empty() {
        println!("No backups.");
        return Ok(());
    }

    println!("Backups in {}:", storage.backups_dir().display());
    for path in backups {
        if let Some(name) = path.file_name() {
            println!("  {}", name.to_string_lossy());
        }
    }
    Ok(())
}

/// Print and discard host requests the CLI does not fulfil.
fn report_requests(studio: &mut Studio) {
    for request in studio.drain_requests() {
        match request {
            HostRequest::PickProjectFile { ticket } => {
                println!("Open requested; use `conlang-studio import <path>` instead.");
                if let Err(e) = studio.cancel_import(ticket) {
                    warn!("Could not cancel the pending import: {}", e);
                }
            }
            HostRequest::SaveFile { file_name, .. } => {
                println!("Download requested: {} (use `conlang-studio export`)", file_name);
            }
            HostRequest::ApplyLanguage(language) => println!("Language: {}", language),
        }
    }
}
