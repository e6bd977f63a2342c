// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The logical `WorkItem` and its per-system mirror ids (§3).

use serde::{Deserialize, Serialize};

use crate::canonical_id::CanonicalId;
use crate::priority::Priority;

/// Per-system mirror ids for a logical work item. At most one mirror per
/// system per canonical item — enforced by construction, not by this type
/// (the store is the authority for cross-row uniqueness).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_log_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_task_id: Option<String>,
}

impl MirrorIds {
    pub fn is_empty(&self) -> bool {
        self.tracker_id.is_none() && self.repo_log_id.is_none() && self.docs_task_id.is_none()
    }
}

/// Per-system last-known modification timestamps, epoch milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorTimestamps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker_modified_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_log_modified_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_modified_at: Option<u64>,
}

/// The logical work item, as understood by the sync engine: one title,
/// one status, one canonical id, regardless of how many systems mirror it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: CanonicalId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CanonicalId>,
    #[serde(default)]
    pub mirrors: MirrorIds,
    #[serde(default)]
    pub timestamps: MirrorTimestamps,
}

impl WorkItem {
    pub fn new(id: CanonicalId, title: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            status: status.into(),
            priority: Priority::default(),
            parent: None,
            mirrors: MirrorIds::default(),
            timestamps: MirrorTimestamps::default(),
        }
    }
}

/// Which external system a change originated from, per §4.3's
/// `BidirectionalSyncInput.source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceSystem {
    Tracker,
    RepoLog,
    Docs,
}

crate::simple_display! {
    SourceSystem {
        Tracker => "tracker",
        RepoLog => "repoLog",
        Docs => "docs",
    }
}

#[cfg(test)]
#[path = "workitem_tests.rs"]
mod tests;
