// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use super::{ProgressSnapshot, RunSummary, ScheduledStatus};

/// Error kind carried by [`Response::Error`], mapped to the CLI's exit
/// codes at the client boundary (§6: `1` runtime unreachable, `2`
/// not-found, `3` cancelled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    Cancelled,
    Validation,
    Internal,
}

/// Response from daemon to CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Pong,
    Hello { version: String },

    /// Generic acknowledgement for fire-and-forget requests.
    Ack,

    /// A run was accepted and assigned an id.
    Started { run_id: String },

    Progress(ProgressSnapshot),
    Runs { runs: Vec<RunSummary> },
    ScheduledStatus(ScheduledStatus),
    DaemonStatus { uptime_secs: u64, pid: u32, version: String },

    /// Daemon is shutting down.
    ShuttingDown,

    Error { kind: ErrorKind, message: String },
}
