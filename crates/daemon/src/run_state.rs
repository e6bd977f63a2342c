// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory run bookkeeping shared between the listener's request handlers
//! and the background tasks they spawn: run history for `sync list`, the
//! live progress query for `sync progress`, per-run cancel signals for
//! `sync cancel`, and the scheduled-wrapper's on/off state for
//! `sync scheduled {start,stop,restart,status}`.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use vs_engine::runtime::{CancelSignal, QueryHandle};
use vs_engine::OrchestratorProgress;
use vs_wire::{ProgressSnapshot, RunKind, RunListFilter, RunOutcome, RunSummary, ScheduledStatus};

/// Run history is capped so a long-lived daemon doesn't grow this
/// unboundedly; only the most recent runs matter for `sync list`.
const MAX_RUN_HISTORY: usize = 200;

pub struct ScheduledHandle {
    pub interval_secs: u64,
    pub cancel: CancelSignal,
    pub task: JoinHandle<()>,
    pub iterations_completed: u64,
}

/// Shared state the listener's request handlers read and mutate.
pub struct RunState {
    progress: QueryHandle<OrchestratorProgress>,
    runs: Mutex<Vec<RunSummary>>,
    active_cancels: Mutex<HashMap<String, CancelSignal>>,
    scheduled: Mutex<Option<ScheduledHandle>>,
}

impl RunState {
    pub fn new() -> Self {
        let (progress, _rx) = QueryHandle::new(OrchestratorProgress::default());
        Self {
            progress,
            runs: Mutex::new(Vec::new()),
            active_cancels: Mutex::new(HashMap::new()),
            scheduled: Mutex::new(None),
        }
    }

    pub fn progress_handle(&self) -> &QueryHandle<OrchestratorProgress> {
        &self.progress
    }

    pub fn progress_snapshot(&self) -> ProgressSnapshot {
        let p = self.progress.current();
        ProgressSnapshot {
            status: p.status.to_string(),
            current_project: p.current_project,
            projects_total: p.projects_total,
            projects_completed: p.projects_completed,
            issues_synced: p.issues_synced,
            errors: p.errors,
            started_at_ms: p.started_at_ms,
            elapsed_ms: p.elapsed_ms,
        }
    }

    /// Record a new run as started, returning the cancel signal handlers
    /// should race the run's future against.
    pub fn begin_run(&self, run_id: String, kind: RunKind, project: Option<vs_core::ProjectCode>, started_at_ms: u64) -> CancelSignal {
        let cancel = CancelSignal::new();
        self.active_cancels.lock().insert(run_id.clone(), cancel.clone());
        let mut runs = self.runs.lock();
        runs.push(RunSummary { run_id, kind, project, started_at_ms, finished_at_ms: None, outcome: RunOutcome::Running });
        trim(&mut runs);
        cancel
    }

    pub fn finish_run(&self, run_id: &str, outcome: RunOutcome, finished_at_ms: u64) {
        self.active_cancels.lock().remove(run_id);
        let mut runs = self.runs.lock();
        if let Some(entry) = runs.iter_mut().find(|r| r.run_id == run_id) {
            entry.outcome = outcome;
            entry.finished_at_ms = Some(finished_at_ms);
        }
    }

    /// Signal cancellation for `run_id`. Returns `true` if a matching
    /// in-flight run was found.
    pub fn cancel(&self, run_id: &str) -> bool {
        match self.active_cancels.lock().get(run_id) {
            Some(signal) => {
                signal.cancel();
                true
            }
            None => false,
        }
    }

    pub fn list_runs(&self, filter: RunListFilter) -> Vec<RunSummary> {
        let runs = self.runs.lock();
        match filter {
            RunListFilter::Recent => runs.iter().rev().cloned().collect(),
            RunListFilter::Failed => runs
                .iter()
                .rev()
                .filter(|r| matches!(r.outcome, RunOutcome::Failed { .. }))
                .cloned()
                .collect(),
        }
    }

    pub fn scheduled_status(&self) -> ScheduledStatus {
        match &*self.scheduled.lock() {
            Some(handle) => ScheduledStatus {
                running: true,
                interval_secs: Some(handle.interval_secs),
                iterations_completed: handle.iterations_completed,
            },
            None => ScheduledStatus::default(),
        }
    }

    /// Install the scheduled-wrapper task, replacing (and cancelling) any
    /// previous one.
    pub fn set_scheduled(&self, handle: ScheduledHandle) {
        if let Some(previous) = self.scheduled.lock().replace(handle) {
            previous.cancel.cancel();
            previous.task.abort();
        }
    }

    /// Stop the scheduled wrapper if running. Returns `true` if one was
    /// actually stopped.
    pub fn stop_scheduled(&self) -> bool {
        match self.scheduled.lock().take() {
            Some(handle) => {
                handle.cancel.cancel();
                handle.task.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_scheduled_running(&self) -> bool {
        self.scheduled.lock().is_some()
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

fn trim(runs: &mut Vec<RunSummary>) {
    let len = runs.len();
    if len > MAX_RUN_HISTORY {
        runs.drain(0..len - MAX_RUN_HISTORY);
    }
}

#[cfg(test)]
#[path = "run_state_tests.rs"]
mod tests;
