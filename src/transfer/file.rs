use super::error::{TransferError, TransferResult};
use super::progress::{CancelFlag, ProgressSink, ProgressUnit};
use super::report::TransferReport;
use crate::file::metadata::copy_metadata;
use crate::file::naming::resolve_unique_destination;
use crate::file::sanitize::validate_file;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Instant;

/// Default size of a streamed chunk (1 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Copies or moves single files in fixed-size chunks
#[derive(Debug, Clone)]
pub struct FileTransferEngine {
    chunk_size: usize,
    cancel: CancelFlag,
}

impl Default for FileTransferEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTransferEngine {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Copy `source` into `destination_dir` under a non-colliding name.
    ///
    /// Validation problems are returned as `Err` before anything is written.
    /// Failures once streaming has started are captured in the report and
    /// the partial destination file is left in place.
    pub fn copy_file(
        &self,
        source: &Path,
        destination_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> TransferResult<TransferReport> {
        let source = validate_file(source)?;
        let name = entry_name(&source);
        prepare_destination_dir(destination_dir)?;

        let destination = resolve_unique_destination(destination_dir, &name);
        Ok(self.copy_to(&source, &destination, progress))
    }

    /// Copy, then remove the source only if the copy succeeded.
    ///
    /// A failed removal after a good copy is reported as
    /// `PostMoveCleanupFailed`: both the source and the copy now exist.
    pub fn move_file(
        &self,
        source: &Path,
        destination_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> TransferResult<TransferReport> {
        let report = self.copy_file(source, destination_dir, progress)?;
        if !report.success {
            return Ok(report);
        }

        match fs::remove_file(source) {
            Ok(()) => {
                tracing::info!("Moved {:?} to {:?}", source, report.destination);
                Ok(report)
            }
            Err(e) => {
                let error = TransferError::PostMoveCleanupFailed {
                    source_path: source.to_path_buf(),
                    destination: report.destination.clone(),
                    source: e,
                };
                tracing::warn!("{}", error);
                Ok(report.into_cleanup_failure(&error))
            }
        }
    }

    /// Stream `source` to the exact path `destination` and build a report
    pub fn copy_to(
        &self,
        source: &Path,
        destination: &Path,
        progress: &dyn ProgressSink,
    ) -> TransferReport {
        let start = Instant::now();
        let name = entry_name(source);
        let total = fs::metadata(source).map(|m| m.len()).unwrap_or(0);

        progress.start(&name, total, ProgressUnit::Bytes);
        let mut chunked = ChunkedCopy::new(self.chunk_size, &self.cancel);
        let result = chunked
            .run(source, destination, |done| progress.update(done, total))
            .and_then(|()| {
                copy_metadata(source, destination)
                    .map_err(|e| TransferError::io("copy_metadata", destination, e))
            });
        progress.finish(result.is_ok());

        match result {
            Ok(()) => {
                let report = TransferReport::succeeded(
                    name,
                    chunked.bytes_done,
                    start.elapsed(),
                    destination.to_path_buf(),
                );
                tracing::info!(
                    "Copied {} ({} bytes) in {:.3}s",
                    report.name,
                    report.size_bytes,
                    report.duration_seconds
                );
                report
            }
            Err(e) => {
                tracing::warn!("Copy of {:?} failed: {}", source, e);
                TransferReport::failed(
                    name,
                    chunked.bytes_done,
                    start.elapsed(),
                    destination.to_path_buf(),
                    &e,
                )
            }
        }
    }
}

/// Chunked byte stream between two files, tracking how far it got
pub(crate) struct ChunkedCopy<'a> {
    chunk_size: usize,
    cancel: &'a CancelFlag,
    pub(crate) bytes_done: u64,
}

impl<'a> ChunkedCopy<'a> {
    pub(crate) fn new(chunk_size: usize, cancel: &'a CancelFlag) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            cancel,
            bytes_done: 0,
        }
    }

    /// Copy bytes, calling `on_chunk` with the cumulative count after each chunk.
    ///
    /// The cancel flag is checked before every chunk, never mid-chunk.
    pub(crate) fn run(
        &mut self,
        source: &Path,
        destination: &Path,
        mut on_chunk: impl FnMut(u64),
    ) -> TransferResult<()> {
        let mut reader = File::open(source).map_err(|e| TransferError::io("open", source, e))?;
        let mut writer =
            File::create(destination).map_err(|e| TransferError::io("create", destination, e))?;
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            if self.cancel.is_raised() {
                return Err(TransferError::Cancelled {
                    bytes_done: self.bytes_done,
                });
            }

            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransferError::io("read", source, e)),
            };
            writer
                .write_all(&buffer[..read])
                .map_err(|e| TransferError::io("write", destination, e))?;

            self.bytes_done += read as u64;
            on_chunk(self.bytes_done);
        }

        writer
            .flush()
            .map_err(|e| TransferError::io("flush", destination, e))?;
        Ok(())
    }
}

/// Make sure `dir` exists (creating parents) and accepts writes
pub(crate) fn prepare_destination_dir(dir: &Path) -> TransferResult<()> {
    match fs::metadata(dir) {
        Ok(metadata) if !metadata.is_dir() => {
            return Err(TransferError::unwritable(dir, "exists and is not a directory"));
        }
        Ok(metadata) if metadata.permissions().readonly() => {
            return Err(TransferError::unwritable(dir, "directory is read-only"));
        }
        Ok(_) => return Ok(()),
        Err(_) => {}
    }

    fs::create_dir_all(dir).map_err(|e| TransferError::unwritable(dir, e.to_string()))?;
    tracing::debug!("Created destination directory {:?}", dir);
    Ok(())
}

/// Final path component as a display string
pub(crate) fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
