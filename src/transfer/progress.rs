//! Progress reporting and cancellation hooks for transfers.
//!
//! The engines never render anything themselves: they push `(done, total)`
//! updates into whatever [`ProgressSink`] the caller hands them, which may be
//! a terminal progress bar, a test recorder, or nothing at all.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// What the `done`/`total` counters of an update measure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressUnit {
    Bytes,
    Files,
}

/// Receiver of progress updates at chunk or file granularity.
///
/// Callbacks are invoked synchronously on the transferring thread.
pub trait ProgressSink {
    /// A transfer of `total` units is about to start
    fn start(&self, _label: &str, _total: u64, _unit: ProgressUnit) {}

    /// Cumulative progress after a chunk or file
    fn update(&self, done: u64, total: u64);

    /// The transfer ended, successfully or not
    fn finish(&self, _success: bool) {}
}

/// A sink that ignores every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&self, _done: u64, _total: u64) {}
}

impl<F> ProgressSink for F
where
    F: Fn(u64, u64),
{
    fn update(&self, done: u64, total: u64) {
        self(done, total)
    }
}

/// Shared interrupt flag checked between chunks and between files
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_closure_sink_receives_updates() {
        let seen = RefCell::new(Vec::new());
        let sink = |done: u64, total: u64| seen.borrow_mut().push((done, total));
        sink.start("x", 3, ProgressUnit::Files);
        sink.update(1, 3);
        sink.update(3, 3);
        sink.finish(true);
        assert_eq!(*seen.borrow(), vec![(1, 3), (3, 3)]);
    }

    #[test]
    fn test_cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_raised());
        flag.raise();
        assert!(clone.is_raised());
    }
}
