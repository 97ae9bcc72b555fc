use super::error;
use super::output;
use super::progress::TerminalProgress;
use super::prompt::{pick_location, PromptSource};
use super::{Commands, ConfigAction, LocationAction};
use crate::app::config::Config;
use crate::app::location::LocationStore;
use crate::file::backup::backup_directory;
use crate::file::listing::{create_folder, list_directory};
use crate::file::sanitize::sanitize;
use crate::transfer::error::{ErrorKind, TransferError};
use crate::transfer::file::FileTransferEngine;
use crate::transfer::folder::FolderTransferEngine;
use crate::transfer::orchestrator::{
    resolve_destination, DropLineSource, SessionEnd, SessionSummary, TransferMode,
    TransferOrchestrator,
};
use crate::transfer::progress::{CancelFlag, NoProgress, ProgressSink};
use anyhow::Result;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Everything a command needs from startup
pub struct Context {
    pub config: Config,
    pub cancel: CancelFlag,
}

impl Context {
    pub fn new(config: Config, cancel: CancelFlag) -> Self {
        Self { config, cancel }
    }

    fn file_engine(&self) -> FileTransferEngine {
        FileTransferEngine::new()
            .with_chunk_size(self.config.transfer.chunk_size)
            .with_cancel(self.cancel.clone())
    }

    /// Progress bars only when enabled, not emitting JSON, and on a terminal
    fn progress_sink(&self, json: bool) -> Box<dyn ProgressSink> {
        if self.config.transfer.show_progress && !json && std::io::stdout().is_terminal() {
            Box::new(TerminalProgress::new())
        } else {
            Box::new(NoProgress)
        }
    }
}

/// Handle a CLI command and return exit code
pub fn handle_command(command: Commands, ctx: &Context) -> i32 {
    let result = match command {
        Commands::Copy { paths, dest, json } => {
            handle_transfer(paths, dest, json, TransferMode::Copy, ctx)
        }
        Commands::Move { paths, dest, json } => {
            handle_transfer(paths, dest, json, TransferMode::Move, ctx)
        }
        Commands::Drop {
            dest,
            move_items,
            max_attempts,
        } => handle_drop(dest, move_items, max_attempts, ctx),
        Commands::Location { action } => handle_location(action),
        Commands::Backup { dir, json } => handle_backup(dir, json, ctx),
        Commands::List { dir, json } => handle_list(dir, json),
        Commands::Mkdir {
            name,
            parent,
            set_default,
        } => handle_mkdir(&name, parent, set_default),
        Commands::Config { action } => handle_config(action, &ctx.config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            error::ERROR
        }
    }
}

/// Exit code for an error detected before anything was transferred
pub fn exit_code_for(err: &TransferError) -> i32 {
    match err.kind() {
        ErrorKind::NotFound => error::NOT_FOUND,
        ErrorKind::NotAFile
        | ErrorKind::NotADirectory
        | ErrorKind::SourceEqualsDestination => error::INVALID_INPUT,
        ErrorKind::Cancelled => error::INTERRUPTED,
        _ => error::ERROR,
    }
}

/// Exit code summarizing a whole session
pub fn session_exit_code(summary: &SessionSummary) -> i32 {
    if summary.end == SessionEnd::Interrupted {
        return error::INTERRUPTED;
    }
    let failures: Vec<_> = summary.outcomes.iter().filter(|o| !o.success()).collect();
    if failures.is_empty() {
        error::SUCCESS
    } else if failures
        .iter()
        .all(|o| o.error_kind() == Some(ErrorKind::NotFound))
    {
        error::NOT_FOUND
    } else {
        error::ERROR
    }
}

/// Load the location store, falling back to an empty one
fn load_locations() -> LocationStore {
    LocationStore::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load locations: {:#}", e);
        LocationStore::default()
    })
}

fn remember_destination(destination: &Path) {
    let mut store = load_locations();
    store.remember(destination.to_path_buf());
    if let Err(e) = store.save() {
        tracing::warn!("Failed to save recent locations: {:#}", e);
    }
}

/// Destination for a session, or the exit code to stop with
fn session_destination(dest: Option<String>) -> std::result::Result<PathBuf, i32> {
    let store = load_locations();
    resolve_destination(dest.as_deref(), store.default_location()).map_err(|e| {
        eprintln!("Error: invalid destination: {}", e);
        match e.kind() {
            ErrorKind::TransferIo => error::ERROR,
            _ => error::INVALID_INPUT,
        }
    })
}

/// Batch copy or move of command-line paths
fn handle_transfer(
    paths: Vec<String>,
    dest: Option<String>,
    json: bool,
    mode: TransferMode,
    ctx: &Context,
) -> Result<i32> {
    let destination = match session_destination(dest) {
        Ok(destination) => destination,
        Err(code) => return Ok(code),
    };

    let orchestrator = TransferOrchestrator::new(ctx.file_engine(), destination.clone(), mode)
        .with_max_attempts(ctx.config.transfer.max_attempts);
    let progress = ctx.progress_sink(json);
    let summary = orchestrator.run_batch(paths, progress.as_ref(), |outcome| {
        if !json {
            println!("{}", output::format_outcome(outcome));
        }
    });

    remember_destination(&destination);
    println!("{}", output::format_summary(&summary, json));
    Ok(session_exit_code(&summary))
}

/// Interactive drop session
fn handle_drop(
    dest: Option<String>,
    move_items: bool,
    max_attempts: Option<u32>,
    ctx: &Context,
) -> Result<i32> {
    let destination = match session_destination(dest) {
        Ok(destination) => destination,
        Err(code) => return Ok(code),
    };
    let mode = if move_items {
        TransferMode::Move
    } else {
        TransferMode::Copy
    };

    let orchestrator = TransferOrchestrator::new(ctx.file_engine(), destination.clone(), mode)
        .with_max_attempts(max_attempts.unwrap_or(ctx.config.transfer.max_attempts));
    println!(
        "{} to {}",
        match mode {
            TransferMode::Copy => "Copying",
            TransferMode::Move => "Moving",
        },
        destination.display()
    );

    let progress = ctx.progress_sink(false);
    let mut source = DropLineSource::new(PromptSource::new(ctx.cancel.clone()));
    let summary = orchestrator.run_session(&mut source, progress.as_ref());

    if !summary.outcomes.is_empty() {
        remember_destination(&destination);
    }
    println!("{}", output::format_summary(&summary, false));

    Ok(match summary.end {
        SessionEnd::Interrupted => error::INTERRUPTED,
        SessionEnd::MaxAttempts => error::ERROR,
        SessionEnd::Completed | SessionEnd::Declined => error::SUCCESS,
    })
}

fn handle_location(action: LocationAction) -> Result<i32> {
    let mut store = load_locations();
    match action {
        LocationAction::Set { dir } => {
            let path = sanitize(&dir);
            if !path.is_dir() {
                eprintln!("Error: not a directory: {}", path.display());
                return Ok(error::INVALID_INPUT);
            }
            store.set_default(path.clone());
            store.save()?;
            println!("Default location set to {}", path.display());
        }
        LocationAction::Show => match (&store.default_location, store.default_location()) {
            (_, Some(location)) => println!("{}", location.display()),
            (Some(stale), None) => {
                println!("Default location {} no longer exists", stale.display());
                return Ok(error::NOT_FOUND);
            }
            (None, None) => println!("No default location set"),
        },
        LocationAction::Recent => {
            if store.recent.is_empty() {
                println!("No recent locations");
            }
            for (i, location) in store.recent.iter().enumerate() {
                println!("{}. {}", i + 1, location.display());
            }
        }
        LocationAction::Clear => {
            store.clear_default();
            store.save()?;
            println!("Default location cleared");
        }
        LocationAction::Pick => {
            let Some(path) = pick_location(&store)? else {
                println!("No location chosen");
                return Ok(error::SUCCESS);
            };
            if !path.is_dir() {
                eprintln!("Error: not a directory: {}", path.display());
                return Ok(error::INVALID_INPUT);
            }
            store.set_default(path.clone());
            store.save()?;
            println!("Default location set to {}", path.display());
        }
    }
    Ok(error::SUCCESS)
}

/// Directory argument, else the default location, else the current directory
fn target_directory(dir: Option<String>) -> Result<PathBuf> {
    if let Some(raw) = dir {
        return Ok(sanitize(&raw));
    }
    if let Some(location) = load_locations().default_location() {
        return Ok(location.to_path_buf());
    }
    Ok(std::env::current_dir()?)
}

fn handle_backup(dir: Option<String>, json: bool, ctx: &Context) -> Result<i32> {
    let dir = target_directory(dir)?;
    let engine = FolderTransferEngine::new(ctx.file_engine());
    let progress = ctx.progress_sink(json);

    let report = match backup_directory(&engine, &dir, progress.as_ref()) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(exit_code_for(&e));
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", output::format_folder_report(&report));
    }

    Ok(match report.error_kind {
        None => error::SUCCESS,
        Some(ErrorKind::Cancelled) => error::INTERRUPTED,
        Some(_) => error::ERROR,
    })
}

fn handle_mkdir(name: &str, parent: Option<String>, set_default: bool) -> Result<i32> {
    let parent = match parent {
        Some(raw) => sanitize(&raw),
        None => std::env::current_dir()?,
    };
    if !parent.is_dir() {
        eprintln!("Error: not a directory: {}", parent.display());
        return Ok(error::INVALID_INPUT);
    }

    let created = match create_folder(&parent, name) {
        Ok(created) => created,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(error::INVALID_INPUT);
        }
    };
    println!("Created {}", created.display());

    if set_default {
        let mut store = load_locations();
        store.set_default(created.clone());
        store.save()?;
        println!("Default location set to {}", created.display());
    }
    Ok(error::SUCCESS)
}

fn handle_list(dir: Option<String>, json: bool) -> Result<i32> {
    let dir = target_directory(dir)?;
    if !dir.exists() {
        eprintln!("Error: path does not exist: {}", dir.display());
        return Ok(error::NOT_FOUND);
    }
    if !dir.is_dir() {
        eprintln!("Error: not a directory: {}", dir.display());
        return Ok(error::INVALID_INPUT);
    }

    let entries = list_directory(&dir)?;
    println!("{}", output::format_listing(&entries, json));
    Ok(error::SUCCESS)
}

fn handle_config(action: ConfigAction, config: &Config) -> Result<i32> {
    match action {
        ConfigAction::Get { key } => {
            let value = get_config_value(config, &key)?;
            println!("{}", value);
            Ok(error::SUCCESS)
        }
        ConfigAction::Set { key, value } => {
            let mut config = config.clone();
            if let Err(e) = set_config_value(&mut config, &key, &value) {
                eprintln!("Error: {:#}", e);
                return Ok(error::INVALID_INPUT);
            }
            config.save()?;
            println!("Configuration updated: {} = {}", key, value);
            Ok(error::SUCCESS)
        }
        ConfigAction::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("{}", toml::to_string_pretty(config)?);
            }
            Ok(error::SUCCESS)
        }
    }
}

/// Get configuration value by dot notation key
fn get_config_value(config: &Config, key: &str) -> Result<String> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["transfer", "chunk_size"] => Ok(config.transfer.chunk_size.to_string()),
        ["transfer", "max_attempts"] => Ok(config.transfer.max_attempts.to_string()),
        ["transfer", "show_progress"] => Ok(config.transfer.show_progress.to_string()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set configuration value by dot notation key, then validate the result
fn set_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["transfer", "chunk_size"] => config.transfer.chunk_size = value.parse()?,
        ["transfer", "max_attempts"] => config.transfer.max_attempts = value.parse()?,
        ["transfer", "show_progress"] => config.transfer.show_progress = value.parse()?,
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    config.validate().map_err(|errors| {
        anyhow::anyhow!(
            "{}",
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}
