//! Session driver for batches and interactive drop loops.
//!
//! A session is an explicit state machine fed by an [`ItemSource`]. The
//! source hands out raw path strings (from a command line, a prompt, a drag
//! and drop) and receives each outcome back for display; the orchestrator
//! itself never prints.

use super::error::{ErrorKind, TransferError, TransferResult};
use super::file::FileTransferEngine;
use super::folder::FolderTransferEngine;
use super::progress::{CancelFlag, ProgressSink};
use super::report::{FolderTransferReport, TransferReport};
use crate::file::sanitize::{sanitize, split_drop_line, stat};
use serde::Serialize;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Default number of consecutive failures before a session gives up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    Copy,
    Move,
}

/// What happened to one item of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemOutcome {
    File {
        source: PathBuf,
        report: TransferReport,
    },
    Folder {
        source: PathBuf,
        report: FolderTransferReport,
    },
    /// Validation failed; nothing was written
    Rejected {
        source: PathBuf,
        kind: ErrorKind,
        error: String,
    },
}

impl ItemOutcome {
    fn rejected(source: PathBuf, error: &TransferError) -> Self {
        ItemOutcome::Rejected {
            source,
            kind: error.kind(),
            error: error.to_string(),
        }
    }

    pub fn source(&self) -> &Path {
        match self {
            ItemOutcome::File { source, .. }
            | ItemOutcome::Folder { source, .. }
            | ItemOutcome::Rejected { source, .. } => source,
        }
    }

    pub fn success(&self) -> bool {
        match self {
            ItemOutcome::File { report, .. } => report.success,
            ItemOutcome::Folder { report, .. } => report.success,
            ItemOutcome::Rejected { .. } => false,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ItemOutcome::File { report, .. } => report.error_kind,
            ItemOutcome::Folder { report, .. } => report.error_kind,
            ItemOutcome::Rejected { kind, .. } => Some(*kind),
        }
    }

    /// Copy landed but the source could not be removed
    pub fn left_duplicate(&self) -> bool {
        self.error_kind() == Some(ErrorKind::PostMoveCleanupFailed)
    }
}

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEnd {
    /// The source ran out of items
    Completed,
    /// The user chose not to continue
    Declined,
    /// Too many consecutive failures
    MaxAttempts,
    /// Ctrl-C or an equivalent interrupt
    Interrupted,
}

/// Accumulated result of one session, discarded after display
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub mode: TransferMode,
    pub destination: PathBuf,
    /// Sources that transferred successfully, in order
    pub processed: Vec<PathBuf>,
    pub outcomes: Vec<ItemOutcome>,
    pub end: SessionEnd,
}

impl SessionSummary {
    fn new(mode: TransferMode, destination: PathBuf) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            mode,
            destination,
            processed: Vec::new(),
            outcomes: Vec::new(),
            end: SessionEnd::Completed,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.processed.len()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success()).count()
    }

    pub fn duplicates(&self) -> usize {
        self.outcomes.iter().filter(|o| o.left_duplicate()).count()
    }
}

/// Result of asking an [`ItemSource`] for the next path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquired {
    /// Raw, unsanitized path text
    Path(String),
    /// No more items
    Exhausted,
    /// The user declined to provide an item
    Declined,
    /// Input was interrupted
    Interrupted,
}

/// Supplies items to a session and receives their outcomes
pub trait ItemSource {
    fn next_item(&mut self) -> Acquired;

    /// Asked after every reported item; `false` ends the session
    fn confirm_continue(&mut self) -> bool {
        true
    }

    fn report(&mut self, _outcome: &ItemOutcome) {}
}

/// Fixed list of sources, e.g. from the command line
pub struct BatchSource<F> {
    items: VecDeque<String>,
    on_outcome: F,
}

impl<F: FnMut(&ItemOutcome)> BatchSource<F> {
    pub fn new<I, S>(items: I, on_outcome: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            on_outcome,
        }
    }
}

impl<F: FnMut(&ItemOutcome)> ItemSource for BatchSource<F> {
    fn next_item(&mut self) -> Acquired {
        match self.items.pop_front() {
            Some(item) => Acquired::Path(item),
            None => Acquired::Exhausted,
        }
    }

    fn report(&mut self, outcome: &ItemOutcome) {
        (self.on_outcome)(outcome)
    }
}

/// Wraps a line-based source and hands out each path of a multi-path line
/// as its own item. Paths queued from one line are not interrupted by
/// continue prompts.
pub struct DropLineSource<S> {
    inner: S,
    pending: VecDeque<String>,
}

impl<S: ItemSource> DropLineSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            pending: VecDeque::new(),
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ItemSource> ItemSource for DropLineSource<S> {
    fn next_item(&mut self) -> Acquired {
        if let Some(item) = self.pending.pop_front() {
            return Acquired::Path(item);
        }
        match self.inner.next_item() {
            Acquired::Path(line) => {
                let mut items: VecDeque<String> = split_drop_line(&line).into();
                match items.pop_front() {
                    Some(first) => {
                        if !items.is_empty() {
                            tracing::debug!("Dropped line holds {} paths", items.len() + 1);
                        }
                        self.pending = items;
                        Acquired::Path(first)
                    }
                    None => Acquired::Declined,
                }
            }
            other => other,
        }
    }

    fn confirm_continue(&mut self) -> bool {
        !self.pending.is_empty() || self.inner.confirm_continue()
    }

    fn report(&mut self, outcome: &ItemOutcome) {
        self.inner.report(outcome)
    }
}

/// States of a single session
#[derive(Debug)]
enum SessionState {
    AwaitingInput,
    Validating(String),
    Transferring { source: PathBuf, is_dir: bool },
    Reporting(ItemOutcome),
    AwaitingContinue,
    Done(SessionEnd),
}

/// Dispatches items to the file or folder engine and tracks the session
#[derive(Debug, Clone)]
pub struct TransferOrchestrator {
    files: FileTransferEngine,
    folders: FolderTransferEngine,
    destination: PathBuf,
    mode: TransferMode,
    max_attempts: u32,
}

impl TransferOrchestrator {
    pub fn new(files: FileTransferEngine, destination: PathBuf, mode: TransferMode) -> Self {
        Self {
            folders: FolderTransferEngine::new(files.clone()),
            files,
            destination,
            mode,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    fn cancel(&self) -> &CancelFlag {
        self.files.cancel_flag()
    }

    /// Sanitize one raw path and transfer it to the session destination
    pub fn transfer_item(&self, raw: &str, progress: &dyn ProgressSink) -> ItemOutcome {
        match self.validate_item(raw) {
            Ok((source, is_dir)) => self.transfer_path(source, is_dir, progress),
            Err(rejected) => rejected,
        }
    }

    /// Sanitize and stat a raw path; a rejection is already a final outcome
    fn validate_item(&self, raw: &str) -> Result<(PathBuf, bool), ItemOutcome> {
        let source = sanitize(raw);
        match source_is_dir(&source) {
            Ok(is_dir) => Ok((source, is_dir)),
            Err(e) => {
                tracing::warn!("Rejected {:?}: {}", source, e);
                Err(ItemOutcome::rejected(source, &e))
            }
        }
    }

    /// Run a session over a fixed list of raw paths
    pub fn run_batch<I, S>(
        &self,
        sources: I,
        progress: &dyn ProgressSink,
        on_outcome: impl FnMut(&ItemOutcome),
    ) -> SessionSummary
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut source = BatchSource::new(sources, on_outcome);
        self.run_session(&mut source, progress)
    }

    /// Drive a session until the source is exhausted, the user declines,
    /// `max_attempts` consecutive failures occur, or an interrupt arrives.
    pub fn run_session(
        &self,
        items: &mut dyn ItemSource,
        progress: &dyn ProgressSink,
    ) -> SessionSummary {
        let span = tracing::info_span!(
            "session",
            mode = ?self.mode,
            destination = %self.destination.display()
        );
        let _enter = span.enter();

        let mut summary = SessionSummary::new(self.mode, self.destination.clone());
        let mut consecutive_failures = 0u32;
        let mut state = SessionState::AwaitingInput;

        let end = loop {
            state = match state {
                SessionState::AwaitingInput => {
                    if self.cancel().is_raised() {
                        SessionState::Done(SessionEnd::Interrupted)
                    } else {
                        match items.next_item() {
                            Acquired::Path(raw) => SessionState::Validating(raw),
                            Acquired::Exhausted => SessionState::Done(SessionEnd::Completed),
                            Acquired::Declined => SessionState::Done(SessionEnd::Declined),
                            Acquired::Interrupted => SessionState::Done(SessionEnd::Interrupted),
                        }
                    }
                }
                SessionState::Validating(raw) => match self.validate_item(&raw) {
                    Ok((source, is_dir)) => SessionState::Transferring { source, is_dir },
                    Err(rejected) => SessionState::Reporting(rejected),
                },
                SessionState::Transferring { source, is_dir } => {
                    SessionState::Reporting(self.transfer_path(source, is_dir, progress))
                }
                SessionState::Reporting(outcome) => {
                    items.report(&outcome);
                    let interrupted = outcome.error_kind() == Some(ErrorKind::Cancelled)
                        || self.cancel().is_raised();

                    if outcome.success() {
                        consecutive_failures = 0;
                        summary.processed.push(outcome.source().to_path_buf());
                    } else {
                        consecutive_failures += 1;
                    }
                    summary.outcomes.push(outcome);

                    if interrupted {
                        SessionState::Done(SessionEnd::Interrupted)
                    } else if consecutive_failures >= self.max_attempts {
                        tracing::warn!(
                            "Stopping after {} consecutive failures",
                            consecutive_failures
                        );
                        SessionState::Done(SessionEnd::MaxAttempts)
                    } else {
                        SessionState::AwaitingContinue
                    }
                }
                SessionState::AwaitingContinue => {
                    if items.confirm_continue() {
                        SessionState::AwaitingInput
                    } else {
                        SessionState::Done(SessionEnd::Declined)
                    }
                }
                SessionState::Done(end) => break end,
            };
        };

        summary.end = end;
        tracing::info!(
            session_id = %summary.session_id,
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            end = ?summary.end,
            "Session finished"
        );
        summary
    }

    fn transfer_path(&self, source: PathBuf, is_dir: bool, progress: &dyn ProgressSink) -> ItemOutcome {
        let destination = self.destination.as_path();
        let outcome = if is_dir {
            let result = match self.mode {
                TransferMode::Copy => self.folders.copy_folder(&source, destination, progress),
                TransferMode::Move => self.folders.move_folder(&source, destination, progress),
            };
            result.map(|report| ItemOutcome::Folder {
                source: source.clone(),
                report,
            })
        } else {
            let result = match self.mode {
                TransferMode::Copy => self.files.copy_file(&source, destination, progress),
                TransferMode::Move => self.files.move_file(&source, destination, progress),
            };
            result.map(|report| ItemOutcome::File {
                source: source.clone(),
                report,
            })
        };

        outcome.unwrap_or_else(|e| {
            tracing::warn!("Rejected {:?}: {}", source, e);
            ItemOutcome::rejected(source, &e)
        })
    }
}

/// `true` for directories, `false` for anything else that exists
fn source_is_dir(source: &Path) -> TransferResult<bool> {
    stat(source).map(|m| m.is_dir())
}

/// Pick the session destination: explicit directory, then a still-valid
/// default location, then the current working directory.
pub fn resolve_destination(
    explicit: Option<&str>,
    default_location: Option<&Path>,
) -> TransferResult<PathBuf> {
    if let Some(raw) = explicit {
        let path = sanitize(raw);
        let metadata = fs::metadata(&path).map_err(|_| TransferError::NotFound(path.clone()))?;
        if !metadata.is_dir() {
            return Err(TransferError::NotADirectory(path));
        }
        return Ok(path);
    }

    if let Some(location) = default_location.filter(|p| p.is_dir()) {
        return Ok(location.to_path_buf());
    }

    std::env::current_dir().map_err(|e| TransferError::io("current_dir", ".", e))
}
