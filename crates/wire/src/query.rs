// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only queries against daemon state.

use serde::{Deserialize, Serialize};

/// Which subset of run history `vsync sync list` asks for (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunListFilter {
    Recent,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Query {
    /// Progress of the in-flight (or last) full orchestrator run.
    Progress,
    /// Recent or failed run history.
    ListRuns { filter: RunListFilter },
    /// State of the scheduled periodic wrapper around C7.
    ScheduledStatus,
    /// Daemon liveness/uptime, for `vsync daemon status`.
    DaemonStatus,
}
