use anyhow::{bail, Context};
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

/// One child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Only set for regular files
    pub size_bytes: Option<u64>,
}

/// Immediate children of `dir`, sorted by name
pub fn list_directory(dir: &Path) -> anyhow::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read directory {:?}", dir))? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let kind = if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let size_bytes = match kind {
            EntryKind::File => Some(entry.metadata()?.len()),
            _ => None,
        };

        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
            kind,
            size_bytes,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Create the folder `name` under `parent` and return its path.
///
/// `name` may be quoted and may hold nested components (`photos/2024`), but
/// must stay below `parent`. An existing directory is accepted as is.
pub fn create_folder(parent: &Path, name: &str) -> anyhow::Result<PathBuf> {
    let name = name.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    if name.is_empty() {
        bail!("Folder name is empty");
    }

    let relative = Path::new(name);
    if relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        bail!("Folder name must stay inside {:?}: {}", parent, name);
    }

    let path = parent.join(relative);
    if path.exists() && !path.is_dir() {
        bail!("{:?} exists and is not a directory", path);
    }
    fs::create_dir_all(&path).with_context(|| format!("Failed to create folder {:?}", path))?;
    tracing::info!("Created folder {:?}", path);
    Ok(path)
}
