// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DTOs describing daemon-side run state, decoupled from the engine's own
//! internal cursor/result types (§4.10) so the wire contract doesn't shift
//! whenever the orchestrator's continuation shape does.

use serde::{Deserialize, Serialize};
use vs_core::ProjectCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunKind {
    Full,
    Reconcile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum RunOutcome {
    Running,
    Succeeded,
    Failed { error: String },
    Cancelled,
}

/// One row of `vsync sync list {recent,failed}` (§4.10).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub kind: RunKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectCode>,
    pub started_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_ms: Option<u64>,
    pub outcome: RunOutcome,
}

/// `vsync sync progress` snapshot (§4.6 "Progress query").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_project: Option<ProjectCode>,
    pub projects_total: usize,
    pub projects_completed: usize,
    pub issues_synced: u64,
    pub errors: u64,
    pub started_at_ms: u64,
    pub elapsed_ms: u64,
}

/// `vsync sync scheduled status` (§4.10).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledStatus {
    pub running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<u64>,
    pub iterations_completed: u64,
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
