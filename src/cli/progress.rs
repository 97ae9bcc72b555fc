use crate::transfer::progress::{ProgressSink, ProgressUnit};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

const BYTES_TEMPLATE: &str =
    "{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({binary_bytes_per_sec}, {eta})";
const FILES_TEMPLATE: &str = "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%)";

/// Terminal progress bar, one bar per transfer
#[derive(Default)]
pub struct TerminalProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_bar(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        let mut guard = self.bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut *guard)
    }
}

fn style_for(unit: ProgressUnit) -> ProgressStyle {
    let template = match unit {
        ProgressUnit::Bytes => BYTES_TEMPLATE,
        ProgressUnit::Files => FILES_TEMPLATE,
    };
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

impl ProgressSink for TerminalProgress {
    fn start(&self, label: &str, total: u64, unit: ProgressUnit) {
        self.with_bar(|slot| {
            if let Some(old) = slot.take() {
                old.finish_and_clear();
            }
            let bar = ProgressBar::new(total);
            bar.set_style(style_for(unit));
            bar.set_message(label.to_string());
            bar.enable_steady_tick(Duration::from_millis(100));
            *slot = Some(bar);
        });
    }

    fn update(&self, done: u64, total: u64) {
        self.with_bar(|slot| {
            if let Some(bar) = slot {
                bar.set_length(total);
                bar.set_position(done);
            }
        });
    }

    fn finish(&self, success: bool) {
        self.with_bar(|slot| {
            if let Some(bar) = slot.take() {
                if success {
                    bar.finish();
                } else {
                    bar.abandon();
                }
            }
        });
    }
}
