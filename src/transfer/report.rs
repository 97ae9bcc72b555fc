//! Structured results of single-item transfers
//!
//! Reports are built once when a transfer completes or fails and are never
//! mutated afterwards. Formatting for humans happens in the CLI layer.

use super::error::{ErrorKind, TransferError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of a single file copy or move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReport {
    pub success: bool,
    /// Base name of the source file
    pub name: String,
    /// Bytes written to the destination
    pub size_bytes: u64,
    pub duration_seconds: f64,
    pub throughput_bytes_per_sec: f64,
    /// Resolved destination file path
    pub destination: PathBuf,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
}

impl TransferReport {
    pub fn succeeded(name: String, size_bytes: u64, elapsed: Duration, destination: PathBuf) -> Self {
        let duration_seconds = elapsed.as_secs_f64();
        Self {
            success: true,
            name,
            size_bytes,
            duration_seconds,
            throughput_bytes_per_sec: throughput(size_bytes, duration_seconds),
            destination,
            error: None,
            error_kind: None,
        }
    }

    pub fn failed(
        name: String,
        size_bytes: u64,
        elapsed: Duration,
        destination: PathBuf,
        error: &TransferError,
    ) -> Self {
        let duration_seconds = elapsed.as_secs_f64();
        Self {
            success: false,
            name,
            size_bytes,
            duration_seconds,
            throughput_bytes_per_sec: throughput(size_bytes, duration_seconds),
            destination,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }

    /// Turn a successful copy report into a cleanup failure (duplicate data on disk)
    pub(crate) fn into_cleanup_failure(self, error: &TransferError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            ..self
        }
    }

    /// True when the destination holds a full copy but the source still exists
    pub fn left_duplicate(&self) -> bool {
        self.error_kind == Some(ErrorKind::PostMoveCleanupFailed)
    }
}

/// Outcome of a whole directory tree copy or move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderTransferReport {
    pub success: bool,
    pub folder_name: String,
    /// Files found by the pre-pass walk
    pub total_files: u64,
    /// Bytes found by the pre-pass walk
    pub total_size_bytes: u64,
    /// Files actually written before success or failure
    pub files_copied: u64,
    pub duration_seconds: f64,
    pub destination_path: PathBuf,
    /// Source entries that could not be recreated (sockets, FIFOs, devices)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<PathBuf>,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
}

impl FolderTransferReport {
    pub(crate) fn into_cleanup_failure(self, error: &TransferError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            ..self
        }
    }

    pub fn left_duplicate(&self) -> bool {
        self.error_kind == Some(ErrorKind::PostMoveCleanupFailed)
    }
}

/// Bytes per second, zero when no measurable time elapsed
pub fn throughput(bytes: u64, duration_seconds: f64) -> f64 {
    if duration_seconds > 0.0 {
        bytes as f64 / duration_seconds
    } else {
        0.0
    }
}
