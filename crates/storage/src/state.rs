// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized SyncState built from WAL replay (C2, §3).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use vs_core::{CanonicalId, ProjectCode};

/// Direction the last Docs-mirror sync moved content, per §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncDirection {
    Import,
    Export,
}

/// Lifecycle status of a [`DocsPageRow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocsPageSyncStatus {
    Synced,
    DeletedRemote,
}

/// A SyncState row, keyed by canonical id. Mirrors §3's field list:
/// `project, title, description, status, priority`, plus per-system
/// `{system}_id`/`{system}_modified_at`/`{system}_status`, plus parent links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStateRow {
    pub canonical_id: CanonicalId,
    pub project: ProjectCode,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker_modified_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_log_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_log_modified_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_log_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_modified_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_canonical: Option<CanonicalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_repo_log_id: Option<String>,

    #[serde(default)]
    pub deleted: bool,
}

impl SyncStateRow {
    pub fn new(canonical_id: CanonicalId, project: ProjectCode, title: impl Into<String>) -> Self {
        Self {
            canonical_id,
            project,
            title: title.into(),
            description: None,
            status: String::new(),
            priority: None,
            tracker_id: None,
            tracker_modified_at: None,
            tracker_status: None,
            repo_log_id: None,
            repo_log_modified_at: None,
            repo_log_status: None,
            docs_id: None,
            docs_modified_at: None,
            docs_status: None,
            parent_canonical: None,
            parent_repo_log_id: None,
            deleted: false,
        }
    }

    /// The `(system, timestamp)` pairs known for this row, used by the
    /// engine's conflict-check fast path (§4.3 step 2).
    pub fn known_timestamps(&self) -> Vec<(&'static str, u64)> {
        let mut out = Vec::with_capacity(3);
        if let Some(t) = self.tracker_modified_at {
            out.push(("tracker", t));
        }
        if let Some(t) = self.repo_log_modified_at {
            out.push(("repoLog", t));
        }
        if let Some(t) = self.docs_modified_at {
            out.push(("docs", t));
        }
        out
    }

    /// Merge a partial update in-place, rejecting any `{system}_modified_at`
    /// that is strictly older than what's already stored (§3 invariant,
    /// §4.2 store guarantee). Fields absent from `update` (`None`) are left
    /// unchanged — this is the "merge-by-canonical-id" semantics of `Upsert`.
    pub fn merge(&mut self, update: SyncStateUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(priority) = update.priority {
            self.priority = Some(priority);
        }
        if let Some(parent) = update.parent_canonical {
            self.parent_canonical = Some(parent);
        }
        if let Some(parent_repo_log_id) = update.parent_repo_log_id {
            self.parent_repo_log_id = Some(parent_repo_log_id);
        }

        if accepts_timestamp(self.tracker_modified_at, update.tracker_modified_at) {
            if update.tracker_id.is_some() {
                self.tracker_id = update.tracker_id;
            }
            self.tracker_modified_at = update.tracker_modified_at.or(self.tracker_modified_at);
            if update.tracker_status.is_some() {
                self.tracker_status = update.tracker_status;
            }
        }
        if accepts_timestamp(self.repo_log_modified_at, update.repo_log_modified_at) {
            if update.repo_log_id.is_some() {
                self.repo_log_id = update.repo_log_id;
            }
            self.repo_log_modified_at = update.repo_log_modified_at.or(self.repo_log_modified_at);
            if update.repo_log_status.is_some() {
                self.repo_log_status = update.repo_log_status;
            }
        }
        if accepts_timestamp(self.docs_modified_at, update.docs_modified_at) {
            if update.docs_id.is_some() {
                self.docs_id = update.docs_id;
            }
            self.docs_modified_at = update.docs_modified_at.or(self.docs_modified_at);
            if update.docs_status.is_some() {
                self.docs_status = update.docs_status;
            }
        }
    }
}

/// True when `incoming` should be accepted against `stored`: either the
/// system has no stored timestamp yet, or `incoming` is not strictly older.
fn accepts_timestamp(stored: Option<u64>, incoming: Option<u64>) -> bool {
    match (stored, incoming) {
        (_, None) => true,
        (None, Some(_)) => true,
        (Some(stored), Some(incoming)) => incoming >= stored,
    }
}

/// A partial update applied to a [`SyncStateRow`] via [`SyncStateRow::merge`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStateUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub parent_canonical: Option<CanonicalId>,
    #[serde(default)]
    pub parent_repo_log_id: Option<String>,

    #[serde(default)]
    pub tracker_id: Option<String>,
    #[serde(default)]
    pub tracker_modified_at: Option<u64>,
    #[serde(default)]
    pub tracker_status: Option<String>,

    #[serde(default)]
    pub repo_log_id: Option<String>,
    #[serde(default)]
    pub repo_log_modified_at: Option<u64>,
    #[serde(default)]
    pub repo_log_status: Option<String>,

    #[serde(default)]
    pub docs_id: Option<String>,
    #[serde(default)]
    pub docs_modified_at: Option<u64>,
    #[serde(default)]
    pub docs_status: Option<String>,
}

/// A per-page Docs-mirror record (§3, §4.8).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocsPageRow {
    pub canonical_page_id: String,
    pub book_slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    pub project: ProjectCode,
    pub local_relative_path: String,
    pub content_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_content_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_modified_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_modified_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_export_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_import_at: Option<u64>,
    pub sync_direction: SyncDirection,
    pub sync_status: DocsPageSyncStatus,
}

/// Append-only operations persisted to the WAL (§3 [EXPANDED]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SyncOp {
    UpsertRow { canonical_id: CanonicalId, project: ProjectCode, title: String, update: SyncStateUpdate },
    UpsertPage(DocsPageRow),
    MarkDeleted { canonical_id: CanonicalId },
    HardDelete { canonical_id: CanonicalId },
    SetLastExport { project: ProjectCode, at_ms: u64 },
}

/// In-memory state rebuilt from the WAL/snapshot (§3 [EXPANDED]).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedSyncState {
    pub rows: HashMap<CanonicalId, SyncStateRow>,
    pub pages: HashMap<String, DocsPageRow>,
    #[serde(default)]
    pub last_export_at: HashMap<ProjectCode, u64>,
}

impl MaterializedSyncState {
    /// Apply a single [`SyncOp`]. Handlers are idempotent: replaying the
    /// same op twice reproduces the same state (feeds the WAL-replay
    /// durability property in §8).
    pub fn apply(&mut self, op: &SyncOp) {
        match op {
            SyncOp::UpsertRow { canonical_id, project, title, update } => {
                let row = self
                    .rows
                    .entry(canonical_id.clone())
                    .or_insert_with(|| SyncStateRow::new(canonical_id.clone(), project.clone(), title.clone()));
                row.merge(update.clone());
            }
            SyncOp::UpsertPage(page) => {
                self.pages.insert(page.local_relative_path.clone(), page.clone());
            }
            SyncOp::MarkDeleted { canonical_id } => {
                if let Some(row) = self.rows.get_mut(canonical_id) {
                    row.deleted = true;
                }
            }
            SyncOp::HardDelete { canonical_id } => {
                self.rows.remove(canonical_id);
            }
            SyncOp::SetLastExport { project, at_ms } => {
                self.last_export_at.insert(project.clone(), *at_ms);
            }
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
