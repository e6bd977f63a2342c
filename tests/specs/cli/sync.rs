//! `vsync sync` — Full Orchestrator (C7), Reconciler (C8), and the
//! scheduled wrapper, driven end-to-end against a live `vsyncd` (§4.6,
//! §4.7, §6). The daemon only wires the in-memory fakes (§1), so these
//! specs exercise the IPC round trip and run bookkeeping rather than
//! real cross-system sync outcomes.

use crate::prelude::*;

#[test]
fn sync_full_starts_a_run_and_it_completes() {
    let temp = Project::empty();
    let started = temp.vsync().args(&["sync", "full"]).passes().stdout();
    assert!(started.contains("started"), "expected a started-run line, got {started}");

    let completed = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.vsync().args(&["sync", "list", "recent"]).passes().stdout().contains("succeeded")
    });
    assert!(completed, "a full sync over zero projects should complete quickly");
}

#[test]
fn sync_full_auto_starts_the_daemon() {
    let temp = Project::empty();
    // No prior `daemon start` — the CLI should boot vsyncd on demand.
    temp.vsync().args(&["sync", "full"]).passes();
    temp.vsync().args(&["daemon", "status"]).passes().stdout_has("running");
}

#[test]
fn sync_progress_reports_before_any_run() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes();
    temp.vsync().args(&["sync", "progress"]).passes();
}

#[test]
fn sync_list_recent_is_empty_before_any_run() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes();
    temp.vsync().args(&["sync", "list", "recent"]).passes().stdout_has("no runs");
}

#[test]
fn sync_list_failed_stays_empty_after_a_clean_run() {
    let temp = Project::empty();
    temp.vsync().args(&["sync", "full"]).passes();

    let completed =
        wait_for(SPEC_WAIT_MAX_MS, || temp.vsync().args(&["sync", "list", "recent"]).passes().stdout().contains("succeeded"));
    assert!(completed, "run should complete");

    temp.vsync().args(&["sync", "list", "failed"]).passes().stdout_has("no runs");
}

#[test]
fn sync_cancel_of_unknown_run_fails_not_found() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes();
    temp.vsync().args(&["sync", "cancel", "does-not-exist"]).fails();
}

#[test]
fn sync_reconcile_runs_over_a_single_project() {
    let temp = Project::empty();
    temp.vsync().args(&["sync", "reconcile", "--project", "PROJ"]).passes().stdout_has("started");
}

#[test]
fn sync_reconcile_accepts_dry_run_and_hard_delete_flags() {
    let temp = Project::empty();
    temp.vsync()
        .args(&["sync", "reconcile", "--project", "PROJ", "--dry-run", "--hard-delete"])
        .passes()
        .stdout_has("started");
}

#[test]
fn sync_scheduled_status_reports_not_running_before_start() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes();
    temp.vsync().args(&["sync", "scheduled", "status"]).passes().stdout_has("not running");
}

#[test]
fn sync_scheduled_start_then_status_reports_running() {
    let temp = Project::empty();
    temp.vsync().args(&["sync", "scheduled", "start", "--interval-secs", "1"]).passes();
    temp.vsync().args(&["sync", "scheduled", "status"]).passes().stdout_has("running");
}

#[test]
fn sync_scheduled_stop_reports_not_running_again() {
    let temp = Project::empty();
    temp.vsync().args(&["sync", "scheduled", "start", "--interval-secs", "1"]).passes();
    temp.vsync().args(&["sync", "scheduled", "stop"]).passes();
    temp.vsync().args(&["sync", "scheduled", "status"]).passes().stdout_has("not running");
}

#[test]
fn agents_provision_is_best_effort_and_always_acks() {
    let temp = Project::empty();
    temp.vsync().args(&["agents", "--project", "PROJ"]).passes().stdout_has("requested");
}
