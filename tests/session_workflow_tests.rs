mod common;

use common::*;
use datamgr::app::location::LocationStore;
use datamgr::file::backup::backup_directory;
use datamgr::transfer::orchestrator::{Acquired, ItemOutcome, ItemSource, SessionEnd};
use datamgr::transfer::{
    CancelFlag, FileTransferEngine, FolderTransferEngine, NoProgress, TransferMode,
    TransferOrchestrator,
};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::collections::VecDeque;
use std::fs;

/// Stands in for the prompt driver: fixed answers, recorded reports
struct ScriptedUser {
    inputs: VecDeque<Acquired>,
    keep_going: bool,
    cancel_after_reports: Option<(usize, CancelFlag)>,
    reports: Vec<String>,
}

impl ScriptedUser {
    fn new(inputs: Vec<Acquired>) -> Self {
        Self {
            inputs: inputs.into(),
            keep_going: true,
            cancel_after_reports: None,
            reports: Vec::new(),
        }
    }
}

impl ItemSource for ScriptedUser {
    fn next_item(&mut self) -> Acquired {
        self.inputs.pop_front().unwrap_or(Acquired::Declined)
    }

    fn confirm_continue(&mut self) -> bool {
        self.keep_going
    }

    fn report(&mut self, outcome: &ItemOutcome) {
        self.reports
            .push(outcome.source().file_name().unwrap().to_string_lossy().into_owned());
        if let Some((limit, flag)) = &self.cancel_after_reports {
            if self.reports.len() >= *limit {
                flag.raise();
            }
        }
    }
}

fn raw(path: &std::path::Path) -> Acquired {
    Acquired::Path(path.display().to_string())
}

#[test]
fn test_drop_session_with_quoted_and_escaped_input() {
    let temp = tempfile::tempdir().unwrap();
    let file = write_file(temp.path(), "My Documents/report final.pdf", b"%PDF");
    let folder = temp.path().join("project");
    create_project_tree(&folder);
    let dst = temp.path().join("dst");
    fs::create_dir_all(&dst).unwrap();

    let mut user = ScriptedUser::new(vec![
        Acquired::Path(format!("'{}'", file.display())),
        Acquired::Path(folder.display().to_string().replace(' ', "\\ ") + "  "),
    ]);
    let summary = TransferOrchestrator::new(FileTransferEngine::new(), dst.clone(), TransferMode::Copy)
        .run_session(&mut user, &NoProgress);

    assert_eq!(user.reports, vec!["report final.pdf", "project"]);
    assert_eq!(summary.end, SessionEnd::Declined);
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(snapshot_tree(&dst.join("project")), snapshot_tree(&folder));
    verify_file_content(&dst.join("report final.pdf"), b"%PDF").unwrap();
}

#[test]
fn test_session_gives_up_after_max_attempts() {
    let temp = tempfile::tempdir().unwrap();
    let good = write_file(temp.path(), "good.txt", b"ok");

    let mut user = ScriptedUser::new(vec![
        Acquired::Path("/no/such/file".to_string()),
        Acquired::Path("\"/still/missing\"".to_string()),
        Acquired::Path("~/definitely-not-here-datamgr".to_string()),
        raw(&good),
    ]);
    let summary = TransferOrchestrator::new(
        FileTransferEngine::new(),
        temp.path().join("dst"),
        TransferMode::Copy,
    )
    .with_max_attempts(3)
    .run_session(&mut user, &NoProgress);

    assert_eq!(summary.end, SessionEnd::MaxAttempts);
    assert_eq!(summary.failed(), 3);
    assert!(summary.processed.is_empty());
    assert!(good.exists());
    assert!(!temp.path().join("dst").exists());
}

#[test]
fn test_user_declines_after_first_item() {
    let temp = tempfile::tempdir().unwrap();
    let a = write_file(temp.path(), "a.txt", b"a");
    let b = write_file(temp.path(), "b.txt", b"b");

    let mut user = ScriptedUser::new(vec![raw(&a), raw(&b)]);
    user.keep_going = false;
    let summary = TransferOrchestrator::new(
        FileTransferEngine::new(),
        temp.path().join("dst"),
        TransferMode::Move,
    )
    .run_session(&mut user, &NoProgress);

    assert_eq!(summary.end, SessionEnd::Declined);
    assert_eq!(user.reports, vec!["a.txt"]);
    assert!(!a.exists());
    assert!(b.exists());
}

#[test]
fn test_interrupt_mid_session_keeps_summary() {
    let temp = tempfile::tempdir().unwrap();
    let a = write_file(temp.path(), "a.txt", b"a");
    let b = write_file(temp.path(), "b.txt", b"b");

    let cancel = CancelFlag::new();
    let mut user = ScriptedUser::new(vec![raw(&a), raw(&b)]);
    user.cancel_after_reports = Some((1, cancel.clone()));
    let summary = TransferOrchestrator::new(
        FileTransferEngine::new().with_cancel(cancel),
        temp.path().join("dst"),
        TransferMode::Copy,
    )
    .run_session(&mut user, &NoProgress);

    assert_eq!(summary.end, SessionEnd::Interrupted);
    assert_eq!(summary.succeeded(), 1);
    assert!(!temp.path().join("dst").join("b.txt").exists());
}

#[test]
fn test_batch_summary_serializes() {
    let temp = tempfile::tempdir().unwrap();
    let a = write_file(temp.path(), "a.txt", b"a");

    let summary = TransferOrchestrator::new(
        FileTransferEngine::new(),
        temp.path().join("dst"),
        TransferMode::Copy,
    )
    .run_batch(
        [a.display().to_string(), "/no/such/file".to_string()],
        &NoProgress,
        |_| {},
    );

    let json: serde_json::Value = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["mode"], "copy");
    assert_eq!(json["end"], "completed");
    assert_eq!(json["outcomes"][0]["type"], "file");
    assert_eq!(json["outcomes"][0]["report"]["success"], true);
    assert_eq!(json["outcomes"][1]["type"], "rejected");
    assert_eq!(json["outcomes"][1]["kind"], "not_found");
}

#[test]
fn test_backup_then_list() {
    let temp = tempfile::tempdir().unwrap();
    let dir = temp.path().join("work");
    create_project_tree(&dir);

    let report = backup_directory(&FolderTransferEngine::default(), &dir, &NoProgress).unwrap();

    assert!(report.success);
    assert_eq!(report.total_files, 10);
    let backup_name = report
        .destination_path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    assert!(backup_name.starts_with("work_backup_"));
    assert_eq!(snapshot_tree(&report.destination_path), snapshot_tree(&dir));

    let entries = datamgr::file::listing::list_directory(temp.path()).unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.clone()).collect();
    assert_eq!(names, vec!["work".to_string(), backup_name]);
}

#[test]
#[serial]
fn test_default_location_persists_across_loads() {
    let config_dir = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    datamgr::util::paths::set_config_dir_override(Some(config_dir.path().to_path_buf()));

    let mut store = LocationStore::load().unwrap();
    store.set_default(target.path().to_path_buf());
    store.save().unwrap();
    let reloaded = LocationStore::load().unwrap();

    datamgr::util::paths::set_config_dir_override(None);

    assert_eq!(reloaded.default_location(), Some(target.path()));
    assert_eq!(reloaded.recent, vec![target.path().to_path_buf()]);
}
