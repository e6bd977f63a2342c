// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RepoLogAdapter` (C3, §6): the filesystem-backed per-repo issue log.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vs_core::{ActivityError, ProjectCode};

/// A RepoLog issue, as read from a repo's issue directory. `labels` carries
/// the `tracker:<Status>` disambiguation markers the mapper (C1) reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoLogIssue {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub labels: HashSet<String>,
    pub modified_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_repo_log_id: Option<String>,
}

/// Create-or-update payload for [`RepoLogAdapter::upsert`]. `id` is `None`
/// to create a new issue; `Some` to update an existing one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoLogUpsert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub labels: HashSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_repo_log_id: Option<String>,
}

/// Read/write capability for the per-repo filesystem issue log (§6).
///
/// `repoPath` keys the single-mutator-per-project lock (§5 "Shared
/// resources"); the adapter itself does not serialize — callers that share
/// a repo path must serialize their own calls.
#[async_trait]
pub trait RepoLogAdapter: Send + Sync + 'static {
    async fn init(&self, repo_path: &Path, project: &ProjectCode) -> Result<(), ActivityError>;

    async fn list_issues(&self, repo_path: &Path) -> Result<Vec<RepoLogIssue>, ActivityError>;

    async fn get_issue(&self, id: &str, repo_path: &Path) -> Result<RepoLogIssue, ActivityError>;

    async fn upsert(
        &self,
        repo_path: &Path,
        issue: RepoLogUpsert,
    ) -> Result<RepoLogIssue, ActivityError>;

    /// Commit the working copy; retryable per §7, but a failure here does
    /// not undo in-system writes already made (sync is not all-or-nothing
    /// across systems).
    async fn commit(&self, repo_path: &Path, message: &str) -> Result<(), ActivityError>;

    /// Best-effort reverse lookup from a project code to its repo path;
    /// non-fatal on failure (webhook ingester proceeds without RepoLog).
    async fn resolve_repo_path(
        &self,
        project: &ProjectCode,
    ) -> Result<Option<PathBuf>, ActivityError>;
}
