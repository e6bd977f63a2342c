// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The metrics point emitted by the Full Orchestrator (C7) on completion,
//! per §4.6. The sink it's emitted through is out of scope (§1); this is
//! only the shape of the payload.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorMetrics {
    pub projects_processed: u64,
    pub issues_synced: u64,
    pub duration_ms: u64,
    pub errors: u64,
}

impl OrchestratorMetrics {
    pub fn merge(&mut self, other: &OrchestratorMetrics) {
        self.projects_processed += other.projects_processed;
        self.issues_synced += other.issues_synced;
        self.duration_ms += other.duration_ms;
        self.errors += other.errors;
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
