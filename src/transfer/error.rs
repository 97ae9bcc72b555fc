use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Failure category carried by reports and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    NotAFile,
    NotADirectory,
    PermissionDenied,
    DestinationUnwritable,
    SourceEqualsDestination,
    PostMoveCleanupFailed,
    TransferIo,
    Cancelled,
}

impl ErrorKind {
    /// Validation kinds are detected before anything on disk is touched
    pub fn is_validation(self) -> bool {
        matches!(
            self,
            ErrorKind::NotFound
                | ErrorKind::NotAFile
                | ErrorKind::NotADirectory
                | ErrorKind::PermissionDenied
                | ErrorKind::DestinationUnwritable
                | ErrorKind::SourceEqualsDestination
        )
    }
}

/// Errors that can occur while validating or performing a transfer
#[derive(Error, Debug)]
pub enum TransferError {
    /// Path does not exist
    #[error("Path does not exist: {0}")]
    NotFound(PathBuf),

    /// Path exists but is not a regular file
    #[error("Not a file: {0}")]
    NotAFile(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Source cannot be read
    #[error("No read permission: {0}")]
    PermissionDenied(PathBuf),

    /// Destination directory cannot be created or written
    #[error("Destination is not writable {path}: {reason}")]
    DestinationUnwritable { path: PathBuf, reason: String },

    /// Destination lies on or inside the source
    #[error("Source and destination overlap: {source_path} -> {destination}")]
    SourceEqualsDestination {
        source_path: PathBuf,
        destination: PathBuf,
    },

    /// Copy finished but the source could not be removed afterwards
    #[error("Copied to {destination} but failed to remove source {source_path}: {source}")]
    PostMoveCleanupFailed {
        source_path: PathBuf,
        destination: PathBuf,
        source: std::io::Error,
    },

    /// Underlying I/O failure during the byte or tree transfer
    #[error("I/O error during {operation} on {path}: {source}")]
    TransferIo {
        operation: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    /// User interrupt honoured at a chunk or file boundary
    #[error("Transfer cancelled after {bytes_done} bytes")]
    Cancelled { bytes_done: u64 },

    /// User interrupt honoured between files of a folder transfer
    #[error("Folder transfer cancelled after {files_done} of {total_files} files")]
    FolderCancelled { files_done: u64, total_files: u64 },
}

/// Result type for transfer operations
pub type TransferResult<T> = Result<T, TransferError>;

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::NotFound(_) => ErrorKind::NotFound,
            TransferError::NotAFile(_) => ErrorKind::NotAFile,
            TransferError::NotADirectory(_) => ErrorKind::NotADirectory,
            TransferError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            TransferError::DestinationUnwritable { .. } => ErrorKind::DestinationUnwritable,
            TransferError::SourceEqualsDestination { .. } => ErrorKind::SourceEqualsDestination,
            TransferError::PostMoveCleanupFailed { .. } => ErrorKind::PostMoveCleanupFailed,
            TransferError::TransferIo { .. } => ErrorKind::TransferIo,
            TransferError::Cancelled { .. } | TransferError::FolderCancelled { .. } => {
                ErrorKind::Cancelled
            }
        }
    }

    /// Create an I/O error for a named operation
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::TransferIo {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Create a destination error from the failure that prevented writing
    pub fn unwritable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DestinationUnwritable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
