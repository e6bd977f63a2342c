// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `TrackerAdapter` (C3, §6): the centralized issue tracker.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vs_core::{ActivityError, CanonicalId, Priority, Project, ProjectCode};

/// An issue as read from Tracker. `modified_at` is the authoritative
/// timestamp the sync engine's conflict check (§4.3) compares against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerIssue {
    pub id: CanonicalId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CanonicalId>,
    pub modified_at: u64,
}

/// Fields accepted when creating an issue Tracker doesn't know about yet
/// (the id is assigned by Tracker, not supplied).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CanonicalId>,
}

/// A partial update to an existing Tracker issue. Absent fields are left
/// unchanged, mirroring the store's merge-by-canonical-id semantics (§4.2).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CanonicalId>,
}

/// Read/write capability for the centralized issue tracker (§6).
#[async_trait]
pub trait TrackerAdapter: Send + Sync + 'static {
    async fn list_projects(&self) -> Result<Vec<Project>, ActivityError>;

    /// Bulk-prefetch up to `limit` issues per project, used by the Full
    /// Orchestrator (C7) and the Project-Sync Pipeline's phase3 fast path.
    async fn list_issues_bulk(
        &self,
        projects: &[ProjectCode],
        limit: usize,
    ) -> Result<HashMap<ProjectCode, Vec<TrackerIssue>>, ActivityError>;

    async fn get_issue(&self, id: &CanonicalId) -> Result<TrackerIssue, ActivityError>;

    async fn create_issue(
        &self,
        project: &ProjectCode,
        draft: IssueDraft,
    ) -> Result<TrackerIssue, ActivityError>;

    async fn update_issue(
        &self,
        id: &CanonicalId,
        update: IssueUpdate,
    ) -> Result<TrackerIssue, ActivityError>;
}
