use crate::file::listing::{Entry, EntryKind};
use crate::transfer::orchestrator::{ItemOutcome, SessionEnd, SessionSummary, TransferMode};
use crate::transfer::report::{FolderTransferReport, TransferReport};
use serde::Serialize;

/// Format bytes into human-readable string (KB, MB, GB)
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a single file transfer report
pub fn format_file_report(report: &TransferReport) -> String {
    if report.success {
        format!(
            "✓ {} ({}) in {:.2}s, {}/s -> {}",
            report.name,
            format_bytes(report.size_bytes),
            report.duration_seconds,
            format_bytes(report.throughput_bytes_per_sec as u64),
            report.destination.display()
        )
    } else if report.left_duplicate() {
        format!(
            "! {} copied to {} but the source could not be removed: {}",
            report.name,
            report.destination.display(),
            report.error.as_deref().unwrap_or("unknown error")
        )
    } else {
        format!(
            "✗ {} failed after {}: {}",
            report.name,
            format_bytes(report.size_bytes),
            report.error.as_deref().unwrap_or("unknown error")
        )
    }
}

/// Format a folder transfer report
pub fn format_folder_report(report: &FolderTransferReport) -> String {
    if report.success {
        let skipped = match report.skipped.len() {
            0 => String::new(),
            n => format!(" ({} entries skipped)", n),
        };
        format!(
            "✓ {}/ ({} files, {}) in {:.2}s -> {}{}",
            report.folder_name,
            report.total_files,
            format_bytes(report.total_size_bytes),
            report.duration_seconds,
            report.destination_path.display(),
            skipped
        )
    } else if report.left_duplicate() {
        format!(
            "! {}/ copied to {} but the source could not be removed: {}",
            report.folder_name,
            report.destination_path.display(),
            report.error.as_deref().unwrap_or("unknown error")
        )
    } else {
        format!(
            "✗ {}/ failed after {}/{} files (partial copy left at {}): {}",
            report.folder_name,
            report.files_copied,
            report.total_files,
            report.destination_path.display(),
            report.error.as_deref().unwrap_or("unknown error")
        )
    }
}

/// Format the outcome of one session item
pub fn format_outcome(outcome: &ItemOutcome) -> String {
    match outcome {
        ItemOutcome::File { report, .. } => format_file_report(report),
        ItemOutcome::Folder { report, .. } => format_folder_report(report),
        ItemOutcome::Rejected { error, .. } => format!("✗ {}", error),
    }
}

/// Format the end-of-session summary (human or JSON)
pub fn format_summary(summary: &SessionSummary, json: bool) -> String {
    if json {
        return to_json(summary);
    }

    let verb = match summary.mode {
        TransferMode::Copy => "Copied",
        TransferMode::Move => "Moved",
    };
    let mut output = format!(
        "{} {} item(s) to {}",
        verb,
        summary.succeeded(),
        summary.destination.display()
    );

    if summary.failed() > 0 {
        output.push_str(&format!(", {} failed", summary.failed()));
    }
    if summary.duplicates() > 0 {
        output.push_str(&format!(
            "\nWarning: {} item(s) exist in both source and destination",
            summary.duplicates()
        ));
    }
    match summary.end {
        SessionEnd::Completed | SessionEnd::Declined => {}
        SessionEnd::MaxAttempts => output.push_str("\nStopped after too many consecutive failures"),
        SessionEnd::Interrupted => output.push_str("\nInterrupted"),
    }
    for path in &summary.processed {
        output.push_str(&format!("\n  {}", path.display()));
    }

    output
}

/// Format a directory listing (human or JSON)
pub fn format_listing(entries: &[Entry], json: bool) -> String {
    if json {
        return to_json(entries);
    }
    if entries.is_empty() {
        return "Directory is empty.".to_string();
    }

    entries
        .iter()
        .map(|entry| match entry.kind {
            EntryKind::Directory => format!("[dir]  {}/", entry.name),
            EntryKind::Symlink => format!("[link] {}", entry.name),
            EntryKind::File => format!(
                "[file] {} ({})",
                entry.name,
                format_bytes(entry.size_bytes.unwrap_or(0))
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
