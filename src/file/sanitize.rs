//! Normalization and validation of user-supplied paths.
//!
//! Paths arrive from prompts, command lines and terminal drag-and-drop, so
//! they may be quoted, escaped, use Windows separators or start with `~`.
//! [`sanitize`] turns any such input into an absolute path; the
//! `validate_*` functions then check it before any engine touches it.

use crate::transfer::error::{TransferError, TransferResult};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Normalize a raw path string into an absolute, symlink-resolved path.
///
/// Steps: trim whitespace, strip one layer of matching quotes, un-escape
/// `\ ` sequences, turn remaining backslashes into `/`, expand a leading `~`,
/// make the path absolute and resolve symlinks. Never fails; for paths that
/// do not exist the longest existing ancestor is canonicalized and the rest
/// is appended after lexical `.`/`..` cleanup.
pub fn sanitize(raw: &str) -> PathBuf {
    let trimmed = strip_quotes(raw.trim()).trim();
    let unescaped = trimmed.replace("\\ ", " ").replace('\\', "/");
    resolve_path(&expand_home(&unescaped))
}

/// Absolute, symlink-resolved form of an already-parsed path
pub fn resolve_path(path: &Path) -> PathBuf {
    resolve(&absolutize(path))
}

/// Metadata of `path`, following symlinks.
///
/// A stat refused by the OS is `PermissionDenied`; every other failure
/// means there is nothing usable at `path` and is `NotFound`.
pub fn stat(path: &Path) -> TransferResult<fs::Metadata> {
    fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => TransferError::PermissionDenied(path.to_path_buf()),
        _ => TransferError::NotFound(path.to_path_buf()),
    })
}

/// Check that `path` is an existing, readable regular file
pub fn validate_file(path: &Path) -> TransferResult<PathBuf> {
    let metadata = stat(path)?;
    if !metadata.is_file() {
        return Err(TransferError::NotAFile(path.to_path_buf()));
    }
    if fs::File::open(path).is_err() {
        return Err(TransferError::PermissionDenied(path.to_path_buf()));
    }
    Ok(path.to_path_buf())
}

/// Check that `path` is an existing, readable directory
pub fn validate_folder(path: &Path) -> TransferResult<PathBuf> {
    let metadata = stat(path)?;
    if !metadata.is_dir() {
        return Err(TransferError::NotADirectory(path.to_path_buf()));
    }
    if fs::read_dir(path).is_err() {
        return Err(TransferError::PermissionDenied(path.to_path_buf()));
    }
    Ok(path.to_path_buf())
}

/// Split one pasted or dropped line into the paths it holds.
///
/// A line that already names an existing path stays a single item, spaces
/// and all. Anything else is split on whitespace outside quotes, with `\ `
/// read as a literal space, which is how terminals render several dropped
/// files.
pub fn split_drop_line(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if sanitize(trimmed).exists() {
        return vec![trimmed.to_string()];
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_item = false;
    let mut quote: Option<char> = None;
    let mut chars = trimmed.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    in_item = true;
                }
                '\\' if chars.peek() == Some(&' ') => {
                    chars.next();
                    current.push(' ');
                    in_item = true;
                }
                c if c.is_whitespace() => {
                    if in_item {
                        items.push(std::mem::take(&mut current));
                        in_item = false;
                    }
                }
                c => {
                    current.push(c);
                    in_item = true;
                }
            },
        }
    }
    if in_item {
        items.push(current);
    }
    items
}

fn strip_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn expand_home(s: &str) -> PathBuf {
    if s == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = s.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(s)
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize_lexically(path);
    }
    match std::env::current_dir() {
        Ok(cwd) => normalize_lexically(&cwd.join(path)),
        Err(_) => normalize_lexically(path),
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn resolve(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }

    // Canonicalize the deepest existing ancestor and re-append the missing tail
    let mut tail = Vec::new();
    let mut current = path.to_path_buf();
    while let Some(name) = current.file_name().map(|n| n.to_os_string()) {
        tail.push(name);
        if !current.pop() {
            break;
        }
        if let Ok(mut base) = fs::canonicalize(&current) {
            for part in tail.iter().rev() {
                base.push(part);
            }
            return base;
        }
    }
    path.to_path_buf()
}
