// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use vs_core::ProjectCode;

#[test]
fn begin_then_finish_updates_history() {
    let state = RunState::new();
    let cancel = state.begin_run("run-1".to_string(), RunKind::Full, None, 1_000);
    assert!(!cancel.is_cancelled());

    let runs = state.list_runs(RunListFilter::Recent);
    assert_eq!(runs.len(), 1);
    assert!(matches!(runs[0].outcome, RunOutcome::Running));

    state.finish_run("run-1", RunOutcome::Succeeded, 2_000);
    let runs = state.list_runs(RunListFilter::Recent);
    assert!(matches!(runs[0].outcome, RunOutcome::Succeeded));
    assert_eq!(runs[0].finished_at_ms, Some(2_000));
}

#[test]
fn cancel_flips_the_matching_signal_only() {
    let state = RunState::new();
    let a = state.begin_run("a".to_string(), RunKind::Full, None, 0);
    let b = state.begin_run("b".to_string(), RunKind::Reconcile, None, 0);

    assert!(state.cancel("a"));
    assert!(a.is_cancelled());
    assert!(!b.is_cancelled());
    assert!(!state.cancel("missing"));
}

#[test]
fn list_runs_failed_filters_non_failed() {
    let state = RunState::new();
    state.begin_run("ok".to_string(), RunKind::Full, None, 0);
    state.finish_run("ok", RunOutcome::Succeeded, 1);
    state.begin_run("bad".to_string(), RunKind::Full, Some(ProjectCode::new("ACME").unwrap()), 0);
    state.finish_run("bad", RunOutcome::Failed { error: "boom".to_string() }, 1);

    let failed = state.list_runs(RunListFilter::Failed);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].run_id, "bad");
}

#[tokio::test]
async fn scheduled_status_reflects_start_and_stop() {
    let state = RunState::new();
    assert!(!state.scheduled_status().running);

    let handle = ScheduledHandle {
        interval_secs: 60,
        cancel: CancelSignal::new(),
        task: tokio::spawn(async {}),
        iterations_completed: 0,
    };
    state.set_scheduled(handle);
    assert!(state.scheduled_status().running);
    assert_eq!(state.scheduled_status().interval_secs, Some(60));

    assert!(state.stop_scheduled());
    assert!(!state.scheduled_status().running);
    assert!(!state.stop_scheduled());
}
