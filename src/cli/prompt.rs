//! dialoguer-backed drivers for interactive sessions

use super::output;
use crate::app::location::LocationStore;
use crate::file::listing::create_folder;
use crate::file::sanitize::sanitize;
use crate::transfer::orchestrator::{Acquired, ItemOutcome, ItemSource};
use crate::transfer::progress::CancelFlag;
use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use std::path::PathBuf;

/// Prompts for one line at a time; an empty answer ends the session.
///
/// Wrap it in `DropLineSource` so a line holding several dropped paths
/// becomes several items.
pub struct PromptSource {
    cancel: CancelFlag,
}

impl PromptSource {
    pub fn new(cancel: CancelFlag) -> Self {
        Self { cancel }
    }
}

impl ItemSource for PromptSource {
    fn next_item(&mut self) -> Acquired {
        if self.cancel.is_raised() {
            return Acquired::Interrupted;
        }

        let answer = Input::<String>::new()
            .with_prompt("Path (drag files or folders here, empty to finish)")
            .allow_empty(true)
            .interact_text();

        if self.cancel.is_raised() {
            return Acquired::Interrupted;
        }
        match answer {
            Ok(raw) if raw.trim().is_empty() => Acquired::Declined,
            Ok(raw) => Acquired::Path(raw),
            Err(e) => {
                tracing::debug!("Prompt aborted: {}", e);
                Acquired::Interrupted
            }
        }
    }

    fn confirm_continue(&mut self) -> bool {
        if self.cancel.is_raised() {
            return false;
        }
        Confirm::new()
            .with_prompt("Transfer another item?")
            .default(true)
            .interact()
            .unwrap_or(false)
    }

    fn report(&mut self, outcome: &ItemOutcome) {
        println!("{}", output::format_outcome(outcome));
    }
}

enum LocationChoice {
    Existing(PathBuf),
    Custom,
    CreateNew,
}

/// Let the user choose a default location: current dir, home, recent, typed,
/// or a new folder created under the current directory
pub fn pick_location(store: &LocationStore) -> Result<Option<PathBuf>> {
    let mut choices: Vec<(String, LocationChoice)> = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        choices.push((
            format!("Current directory ({})", cwd.display()),
            LocationChoice::Existing(cwd),
        ));
    }
    if let Some(home) = dirs::home_dir() {
        choices.push((
            format!("Home directory ({})", home.display()),
            LocationChoice::Existing(home),
        ));
    }
    for recent in store.recent.iter().filter(|p| p.is_dir()) {
        choices.push((
            format!("Recent: {}", recent.display()),
            LocationChoice::Existing(recent.clone()),
        ));
    }
    choices.push(("Custom path...".to_string(), LocationChoice::Custom));
    choices.push(("Create a new folder...".to_string(), LocationChoice::CreateNew));

    let labels: Vec<&str> = choices.iter().map(|(label, _)| label.as_str()).collect();
    let selection = Select::new()
        .with_prompt("Choose the default location")
        .items(&labels)
        .default(0)
        .interact_opt()?;

    let Some(index) = selection else {
        return Ok(None);
    };
    match &choices[index].1 {
        LocationChoice::Existing(path) => Ok(Some(path.clone())),
        LocationChoice::Custom => {
            let raw: String = Input::new()
                .with_prompt("Directory")
                .interact_text()?;
            Ok(Some(sanitize(&raw)))
        }
        LocationChoice::CreateNew => {
            let name: String = Input::new()
                .with_prompt("Folder name to create")
                .interact_text()?;
            let parent = std::env::current_dir()?;
            let confirmed = Confirm::new()
                .with_prompt(format!("Create {}?", parent.join(name.trim()).display()))
                .default(true)
                .interact()?;
            if !confirmed {
                return Ok(None);
            }
            Ok(Some(create_folder(&parent, &name)?))
        }
    }
}
