// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use vs_core::ProjectCode;

use super::Query;

/// Request from CLI to daemon (§4.10, §6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping.
    Ping,

    /// Version handshake.
    Hello { version: String },

    /// Trigger C7 now.
    SyncFull {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        project: Option<ProjectCode>,
    },

    /// Trigger C8.
    SyncReconcile {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        project: Option<ProjectCode>,
        #[serde(default)]
        dry_run: bool,
        #[serde(default)]
        hard_delete: bool,
    },

    /// Start the scheduled periodic wrapper around C7.
    ScheduledStart { interval_secs: u64 },
    /// Stop the scheduled wrapper.
    ScheduledStop,
    /// Stop then start the scheduled wrapper with a new interval.
    ScheduledRestart { interval_secs: u64 },

    /// Read-only query.
    Query(Query),

    /// Send the cancel signal to a run.
    Cancel { run_id: String },

    /// Best-effort trigger of the out-of-scope agent-provisioning side
    /// channel (§1, §4.10) — failures are logged, never fatal.
    AgentsProvision {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        project: Option<ProjectCode>,
    },

    /// Graceful shutdown.
    Shutdown,
}
