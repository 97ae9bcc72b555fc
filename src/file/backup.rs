use crate::file::naming::backup_name;
use crate::file::sanitize::validate_folder;
use crate::transfer::error::{TransferError, TransferResult};
use crate::transfer::folder::FolderTransferEngine;
use crate::transfer::progress::ProgressSink;
use crate::transfer::report::FolderTransferReport;
use chrono::{DateTime, Local};
use std::path::Path;

/// Copy `dir` to a sibling named `<name>_backup_<YYYYmmdd_HHMMSS>`.
///
/// A second backup within the same second gets a `_1`, `_2`, ... suffix.
pub fn backup_directory(
    engine: &FolderTransferEngine,
    dir: &Path,
    progress: &dyn ProgressSink,
) -> TransferResult<FolderTransferReport> {
    backup_directory_at(engine, dir, &Local::now(), progress)
}

/// Same as [`backup_directory`] with an explicit timestamp
pub fn backup_directory_at(
    engine: &FolderTransferEngine,
    dir: &Path,
    timestamp: &DateTime<Local>,
    progress: &dyn ProgressSink,
) -> TransferResult<FolderTransferReport> {
    let dir = validate_folder(dir)?;
    let parent = dir
        .parent()
        .ok_or_else(|| TransferError::unwritable(&dir, "directory has no parent to hold a backup"))?;
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| TransferError::NotADirectory(dir.clone()))?;

    let root_name = backup_name(&name, timestamp);
    tracing::info!("Backing up {:?} as {}", dir, root_name);
    engine.copy_folder_as(&dir, parent, &root_name, progress)
}
