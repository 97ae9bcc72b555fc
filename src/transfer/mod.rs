//! Copy and move engines plus the session orchestrator
//!
//! Everything in here is synchronous: one transfer runs to completion (or
//! failure) before the next one starts.

pub mod error;
pub mod file;
pub mod folder;
pub mod orchestrator;
pub mod progress;
pub mod report;

pub use error::{ErrorKind, TransferError, TransferResult};
pub use file::FileTransferEngine;
pub use folder::FolderTransferEngine;
pub use orchestrator::{SessionSummary, TransferMode, TransferOrchestrator};
pub use progress::{CancelFlag, NoProgress, ProgressSink};
pub use report::{FolderTransferReport, TransferReport};
