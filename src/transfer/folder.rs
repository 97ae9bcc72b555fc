use super::error::{TransferError, TransferResult};
use super::file::{entry_name, prepare_destination_dir, ChunkedCopy, FileTransferEngine};
use super::progress::{ProgressSink, ProgressUnit};
use super::report::FolderTransferReport;
use crate::file::metadata::copy_metadata;
use crate::file::naming::resolve_unique_destination;
use crate::file::sanitize::{resolve_path, validate_folder};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::{DirEntry, WalkDir};

/// Copies or moves whole directory trees, one file at a time
#[derive(Debug, Clone, Default)]
pub struct FolderTransferEngine {
    files: FileTransferEngine,
}

impl FolderTransferEngine {
    /// Build on top of a file engine, sharing its chunk size and cancel flag
    pub fn new(files: FileTransferEngine) -> Self {
        Self { files }
    }

    /// Copy `source_dir` into `destination_dir`.
    ///
    /// The new root takes the source's base name, suffixed `_1`, `_2`, ...
    /// when that name is already taken.
    pub fn copy_folder(
        &self,
        source_dir: &Path,
        destination_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> TransferResult<FolderTransferReport> {
        let name = entry_name(source_dir);
        self.copy_folder_as(source_dir, destination_dir, &name, progress)
    }

    /// Copy `source_dir` into `destination_dir` under a root named after `root_name`
    pub fn copy_folder_as(
        &self,
        source_dir: &Path,
        destination_dir: &Path,
        root_name: &str,
        progress: &dyn ProgressSink,
    ) -> TransferResult<FolderTransferReport> {
        let source = validate_folder(source_dir)?;
        ensure_outside_source(&source, destination_dir)?;
        prepare_destination_dir(destination_dir)?;

        let root = resolve_unique_destination(destination_dir, root_name);
        Ok(self.copy_tree(&source, &root, progress))
    }

    /// Copy, then delete the whole source tree only if every entry made it across.
    ///
    /// Entries the copy had to skip keep the source in place: the report
    /// comes back as a cleanup failure with both trees on disk.
    pub fn move_folder(
        &self,
        source_dir: &Path,
        destination_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> TransferResult<FolderTransferReport> {
        let report = self.copy_folder(source_dir, destination_dir, progress)?;
        if !report.success {
            return Ok(report);
        }

        let removed = if report.skipped.is_empty() {
            fs::remove_dir_all(source_dir)
        } else {
            Err(io::Error::other(format!(
                "{} source entries could not be recreated (first: {:?})",
                report.skipped.len(),
                report.skipped[0]
            )))
        };

        match removed {
            Ok(()) => {
                tracing::info!("Moved folder {:?} to {:?}", source_dir, report.destination_path);
                Ok(report)
            }
            Err(e) => {
                let error = TransferError::PostMoveCleanupFailed {
                    source_path: source_dir.to_path_buf(),
                    destination: report.destination_path.clone(),
                    source: e,
                };
                tracing::warn!("{}", error);
                Ok(report.into_cleanup_failure(&error))
            }
        }
    }

    fn copy_tree(&self, source: &Path, root: &Path, progress: &dyn ProgressSink) -> FolderTransferReport {
        let start = Instant::now();
        let folder_name = entry_name(source);
        let mut files_copied = 0u64;

        let result = count_tree(source)
            .map_err(|e| TransferError::io("count_tree", source, e))
            .and_then(|(total_files, total_bytes)| {
                progress.start(&folder_name, total_files, ProgressUnit::Files);
                let mirrored = self.mirror(source, root, total_files, &mut files_copied, progress);
                progress.finish(mirrored.is_ok());
                mirrored.map(|skipped| (total_files, total_bytes, skipped))
            });

        let duration_seconds = start.elapsed().as_secs_f64();
        match result {
            Ok((total_files, total_size_bytes, skipped)) => {
                tracing::info!(
                    "Copied folder {} ({} files, {} bytes) to {:?} in {:.3}s",
                    folder_name,
                    total_files,
                    total_size_bytes,
                    root,
                    duration_seconds
                );
                if !skipped.is_empty() {
                    tracing::warn!("{} entries of {:?} were not copied", skipped.len(), source);
                }
                FolderTransferReport {
                    success: true,
                    folder_name,
                    total_files,
                    total_size_bytes,
                    files_copied,
                    duration_seconds,
                    destination_path: root.to_path_buf(),
                    skipped,
                    error: None,
                    error_kind: None,
                }
            }
            Err(e) => {
                tracing::warn!("Folder copy of {:?} aborted after {} files: {}", source, files_copied, e);
                // Partial tree stays on disk; totals are re-derived best effort
                let (total_files, total_size_bytes) = count_tree(source).unwrap_or((files_copied, 0));
                FolderTransferReport {
                    success: false,
                    folder_name,
                    total_files,
                    total_size_bytes,
                    files_copied,
                    duration_seconds,
                    destination_path: root.to_path_buf(),
                    skipped: Vec::new(),
                    error: Some(e.to_string()),
                    error_kind: Some(e.kind()),
                }
            }
        }
    }

    /// Recreate the tree under `root`, advancing the file counter per copied file.
    ///
    /// Returns the source entries that could not be recreated.
    fn mirror(
        &self,
        source: &Path,
        root: &Path,
        total_files: u64,
        files_copied: &mut u64,
        progress: &dyn ProgressSink,
    ) -> TransferResult<Vec<PathBuf>> {
        fs::create_dir_all(root).map_err(|e| TransferError::io("create_dir", root, e))?;
        let cancel = self.files.cancel_flag();
        let cancelled = |files_done: u64| TransferError::FolderCancelled {
            files_done,
            total_files,
        };
        let mut skipped = Vec::new();

        for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
            if cancel.is_raised() {
                return Err(cancelled(*files_copied));
            }

            let entry = entry.map_err(|e| TransferError::io("walk", source, io::Error::from(e)))?;
            let target = target_path(source, root, entry.path());

            match classify(&entry) {
                TreeEntry::Directory => {
                    fs::create_dir_all(&target)
                        .map_err(|e| TransferError::io("create_dir", &target, e))?;
                }
                TreeEntry::File(_) => {
                    let mut chunked = ChunkedCopy::new(self.files.chunk_size(), cancel);
                    chunked.run(entry.path(), &target, |_| {}).map_err(|e| match e {
                        TransferError::Cancelled { .. } => cancelled(*files_copied),
                        other => other,
                    })?;
                    copy_metadata(entry.path(), &target)
                        .map_err(|e| TransferError::io("copy_metadata", &target, e))?;

                    *files_copied += 1;
                    tracing::debug!("Copied {:?} ({} bytes)", target, chunked.bytes_done);
                    progress.update(*files_copied, total_files);
                }
                TreeEntry::Link => match recreate_link(entry.path(), &target) {
                    Ok(()) => tracing::debug!("Recreated link {:?}", target),
                    Err(e) if e.kind() == io::ErrorKind::Unsupported => {
                        tracing::warn!("Skipping link {:?}: {}", entry.path(), e);
                        skipped.push(entry.path().to_path_buf());
                    }
                    Err(e) => return Err(TransferError::io("symlink", &target, e)),
                },
                TreeEntry::Special => {
                    tracing::warn!("Skipping {:?}: not a file, directory or link", entry.path());
                    skipped.push(entry.path().to_path_buf());
                }
            }
        }

        Ok(skipped)
    }
}

/// How one walked entry is carried over to the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TreeEntry {
    Directory,
    /// Regular file, or a symlink resolving to one; holds its size
    File(u64),
    /// Symlink to a directory or to nothing; recreated as a link
    Link,
    /// Socket, FIFO or device node
    Special,
}

fn classify(entry: &DirEntry) -> TreeEntry {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        return TreeEntry::Directory;
    }
    if file_type.is_file() {
        return TreeEntry::File(entry.metadata().map(|m| m.len()).unwrap_or(0));
    }
    if file_type.is_symlink() {
        return match fs::metadata(entry.path()) {
            Ok(metadata) if metadata.is_file() => TreeEntry::File(metadata.len()),
            _ => TreeEntry::Link,
        };
    }
    TreeEntry::Special
}

#[cfg(unix)]
fn recreate_link(link: &Path, target: &Path) -> io::Result<()> {
    let points_to = fs::read_link(link)?;
    std::os::unix::fs::symlink(points_to, target)
}

#[cfg(not(unix))]
fn recreate_link(_link: &Path, _target: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "directory links are not recreated on this platform",
    ))
}

/// Pre-pass walk: number of copyable files and their total size
pub fn count_tree(source: &Path) -> io::Result<(u64, u64)> {
    let mut files = 0u64;
    let mut bytes = 0u64;
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        if let TreeEntry::File(size) = classify(&entry) {
            files += 1;
            bytes += size;
        }
    }
    Ok((files, bytes))
}

fn target_path(source: &Path, root: &Path, entry: &Path) -> PathBuf {
    match entry.strip_prefix(source) {
        Ok(relative) => root.join(relative),
        Err(_) => root.join(entry.file_name().unwrap_or_default()),
    }
}

/// Refuse to copy a tree into itself
fn ensure_outside_source(source: &Path, destination_dir: &Path) -> TransferResult<()> {
    let source = resolve_path(source);
    let destination = resolve_path(destination_dir);
    if destination.starts_with(&source) {
        return Err(TransferError::SourceEqualsDestination {
            source_path: source,
            destination,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::error::ErrorKind;
    use crate::transfer::progress::{CancelFlag, NoProgress};
    use std::cell::RefCell;
    use tempfile::TempDir;

    fn make_tree(root: &Path) {
        fs::create_dir_all(root.join("docs/drafts")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("readme.md"), b"hello").unwrap();
        fs::write(root.join("docs/a.txt"), vec![1u8; 100]).unwrap();
        fs::write(root.join("docs/drafts/b.txt"), vec![2u8; 50]).unwrap();
    }

    #[test]
    fn test_count_tree() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("project");
        make_tree(&src);
        assert_eq!(count_tree(&src).unwrap(), (3, 155));
    }

    #[test]
    fn test_copy_folder_mirrors_structure() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("project");
        make_tree(&src);
        let dst = temp.path().join("dst");

        let report = FolderTransferEngine::default()
            .copy_folder(&src, &dst, &NoProgress)
            .unwrap();

        assert!(report.success);
        assert_eq!(report.folder_name, "project");
        assert_eq!(report.total_files, 3);
        assert_eq!(report.total_size_bytes, 155);
        assert_eq!(report.files_copied, 3);
        assert_eq!(report.destination_path, dst.join("project"));
        assert!(dst.join("project/empty").is_dir());
        assert_eq!(fs::read(dst.join("project/docs/drafts/b.txt")).unwrap(), vec![2u8; 50]);
    }

    #[test]
    fn test_copy_folder_progress_counts_files() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("project");
        make_tree(&src);

        let seen = RefCell::new(Vec::new());
        let sink = |done: u64, total: u64| seen.borrow_mut().push((done, total));
        FolderTransferEngine::default()
            .copy_folder(&src, &temp.path().join("dst"), &sink)
            .unwrap();

        assert_eq!(*seen.borrow(), vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_copy_folder_twice_suffixes_root() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("project");
        make_tree(&src);
        let dst = temp.path().join("dst");
        let engine = FolderTransferEngine::default();

        let first = engine.copy_folder(&src, &dst, &NoProgress).unwrap();
        let second = engine.copy_folder(&src, &dst, &NoProgress).unwrap();

        assert_eq!(first.destination_path, dst.join("project"));
        assert_eq!(second.destination_path, dst.join("project_1"));
        assert!(dst.join("project/readme.md").exists());
    }

    #[test]
    fn test_copy_folder_into_itself_rejected() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("project");
        make_tree(&src);

        let err = FolderTransferEngine::default()
            .copy_folder(&src, &src.join("docs"), &NoProgress)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceEqualsDestination);
    }

    #[test]
    fn test_copy_folder_file_source_rejected() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        fs::write(&file, b"a").unwrap();

        let err = FolderTransferEngine::default()
            .copy_folder(&file, &temp.path().join("dst"), &NoProgress)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotADirectory);
        assert!(!temp.path().join("dst").exists());
    }

    #[test]
    fn test_cancelled_copy_keeps_partial_tree_and_source() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("project");
        make_tree(&src);
        let dst = temp.path().join("dst");

        let cancel = CancelFlag::new();
        let engine = FolderTransferEngine::new(FileTransferEngine::new().with_cancel(cancel.clone()));
        let sink = |done: u64, _total: u64| {
            if done == 1 {
                cancel.raise();
            }
        };
        let report = engine.move_folder(&src, &dst, &sink).unwrap();

        assert!(!report.success);
        assert_eq!(report.error_kind, Some(ErrorKind::Cancelled));
        assert_eq!(report.files_copied, 1);
        assert_eq!(report.total_files, 3);
        assert!(dst.join("project").is_dir());
        assert!(src.join("readme.md").exists());
    }

    #[test]
    fn test_move_folder_removes_source() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("project");
        make_tree(&src);
        let dst = temp.path().join("dst");

        let report = FolderTransferEngine::default()
            .move_folder(&src, &dst, &NoProgress)
            .unwrap();

        assert!(report.success);
        assert!(!src.exists());
        assert_eq!(count_tree(&dst.join("project")).unwrap(), (3, 155));
    }

    #[test]
    fn test_cancelled_copy_reports_files_done() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("project");
        make_tree(&src);

        let cancel = CancelFlag::new();
        let engine = FolderTransferEngine::new(FileTransferEngine::new().with_cancel(cancel.clone()));
        let sink = |done: u64, _total: u64| {
            if done == 2 {
                cancel.raise();
            }
        };
        let report = engine.copy_folder(&src, &temp.path().join("dst"), &sink).unwrap();

        assert_eq!(
            report.error.as_deref(),
            Some("Folder transfer cancelled after 2 of 3 files")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_carried_over() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("linked");
        fs::create_dir_all(&src).unwrap();
        fs::write(temp.path().join("outside.txt"), b"outside").unwrap();
        fs::create_dir_all(temp.path().join("outside_dir")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("outside.txt"), src.join("link.txt")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("gone.txt"), src.join("dangling.txt")).unwrap();
        std::os::unix::fs::symlink("../outside_dir", src.join("dirlink")).unwrap();

        let dst = temp.path().join("dst");
        let report = FolderTransferEngine::default()
            .copy_folder(&src, &dst, &NoProgress)
            .unwrap();

        assert!(report.success);
        assert!(report.skipped.is_empty());
        assert_eq!(report.total_files, 1);
        // file links are followed, the rest stay links
        assert_eq!(fs::read(dst.join("linked/link.txt")).unwrap(), b"outside");
        assert!(!fs::symlink_metadata(dst.join("linked/link.txt")).unwrap().is_symlink());
        assert_eq!(
            fs::read_link(dst.join("linked/dangling.txt")).unwrap(),
            temp.path().join("gone.txt")
        );
        assert_eq!(
            fs::read_link(dst.join("linked/dirlink")).unwrap(),
            PathBuf::from("../outside_dir")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_move_folder_with_dir_and_dangling_links_loses_nothing() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("proj");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(temp.path().join("outside_dir")).unwrap();
        fs::write(src.join("a.txt"), b"a").unwrap();
        std::os::unix::fs::symlink("../outside_dir", src.join("dirlink")).unwrap();
        std::os::unix::fs::symlink("nowhere", src.join("dangling")).unwrap();

        let dst = temp.path().join("dst");
        let report = FolderTransferEngine::default()
            .move_folder(&src, &dst, &NoProgress)
            .unwrap();

        assert!(report.success);
        assert!(!src.exists());
        assert_eq!(fs::read(dst.join("proj/a.txt")).unwrap(), b"a");
        assert_eq!(
            fs::read_link(dst.join("proj/dirlink")).unwrap(),
            PathBuf::from("../outside_dir")
        );
        assert_eq!(
            fs::read_link(dst.join("proj/dangling")).unwrap(),
            PathBuf::from("nowhere")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_move_folder_keeps_source_when_entries_are_skipped() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("proj");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.txt"), b"a").unwrap();
        let _socket = std::os::unix::net::UnixListener::bind(src.join("control.sock")).unwrap();

        let dst = temp.path().join("dst");
        let report = FolderTransferEngine::default()
            .move_folder(&src, &dst, &NoProgress)
            .unwrap();

        assert!(!report.success);
        assert!(report.left_duplicate());
        assert_eq!(report.skipped, vec![src.join("control.sock")]);
        assert!(src.join("a.txt").exists());
        assert!(src.join("control.sock").exists());
        assert_eq!(fs::read(dst.join("proj/a.txt")).unwrap(), b"a");
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_aborts_walk_and_keeps_source() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let src = temp.path().join("proj");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.txt"), b"first").unwrap();
        let locked = src.join("b_locked.txt");
        fs::write(&locked, b"secret").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // root reads anything; nothing to observe then
        if fs::File::open(&locked).is_ok() {
            return;
        }

        let dst = temp.path().join("dst");
        let report = FolderTransferEngine::default()
            .move_folder(&src, &dst, &NoProgress)
            .unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

        assert!(!report.success);
        assert_eq!(report.error_kind, Some(ErrorKind::TransferIo));
        assert_eq!(report.files_copied, 1);
        assert_eq!(report.total_files, 2);
        // partial tree and source both stay
        assert_eq!(fs::read(dst.join("proj/a.txt")).unwrap(), b"first");
        assert!(src.join("a.txt").exists());
        assert_eq!(fs::read(&locked).unwrap(), b"secret");
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_folder_is_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let src = temp.path().join("sealed");
        fs::create_dir_all(&src).unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o000)).unwrap();
        let readable = fs::read_dir(&src).is_ok();

        let result = FolderTransferEngine::default().copy_folder(&src, &temp.path().join("dst"), &NoProgress);
        fs::set_permissions(&src, fs::Permissions::from_mode(0o755)).unwrap();

        if readable {
            return;
        }
        assert_eq!(result.unwrap_err().kind(), ErrorKind::PermissionDenied);
        assert!(!temp.path().join("dst").exists());
    }
}
