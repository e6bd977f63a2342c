// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The RepoLog File Watcher ingester (§4.4): turns a batch of changed
//! files under a project's `repoPath` into baseline records or propagated
//! syncs, depending on whether the item already carries a `tracker:PROJ-N`
//! label and whether SyncState has seen it before (the "first-sighting
//! rule").

use std::path::PathBuf;
use std::sync::Arc;

use vs_adapters::{IssueDraft, RepoLogAdapter, RepoLogIssue, TrackerAdapter};
use vs_core::{
    passes_rank_guard, ActivityError, CanonicalId, MirrorIds, Priority, ProjectCode, SourceSystem,
    WorkItem,
};
use vs_store::{Store, SyncStateUpdate};

use crate::runtime::CancelSignal;
use crate::sync_engine::{BidirectionalSyncInput, SyncContext, SyncEngine, SyncOutcome};

use super::REPO_LOG_ITEM_SLEEP_MS;

/// `{project, repoPath, changedFiles[], timestamp}` (§6 event surfaces).
#[derive(Debug, Clone)]
pub struct RepoLogChangeEvent {
    pub project: ProjectCode,
    pub repo_path: PathBuf,
    pub changed_files: Vec<PathBuf>,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoLogIngestOutcome {
    /// Items with no `tracker:PROJ-N` label: upserted into Tracker and
    /// baselined.
    pub created_in_tracker: u64,
    /// Items already labelled but never seen before: baselined without
    /// syncing (first-sighting rule).
    pub baseline_recorded: u64,
    pub synced: u64,
    pub skipped_rank_guard: u64,
    pub unchanged: u64,
    pub errors: u64,
}

impl RepoLogIngestOutcome {
    pub fn items_processed(&self) -> u64 {
        self.created_in_tracker
            + self.baseline_recorded
            + self.synced
            + self.skipped_rank_guard
            + self.unchanged
    }
}

/// Ingest one RepoLog file-change batch (§4.4 "RepoLog File Watcher").
/// `changed_files` is accepted for parity with the real watcher's event
/// shape; the source enumerates every item under `repoPath` regardless of
/// which files changed, since labels/status can only be read by listing.
pub async fn ingest_repo_log_changes(
    engine: &SyncEngine,
    store: &Store,
    tracker: &Arc<dyn TrackerAdapter>,
    repo_log: &Arc<dyn RepoLogAdapter>,
    event: RepoLogChangeEvent,
    cancel: &CancelSignal,
) -> Result<RepoLogIngestOutcome, ActivityError> {
    let _ = &event.changed_files;
    let mut outcome = RepoLogIngestOutcome::default();
    let items = repo_log.list_issues(&event.repo_path).await?;

    for issue in items {
        if cancel.is_cancelled() {
            break;
        }

        match process_one(engine, store, tracker, &event, &issue).await {
            Ok(item_outcomes) => {
                for item_outcome in item_outcomes {
                    match item_outcome {
                        ItemOutcome::CreatedInTracker => outcome.created_in_tracker += 1,
                        ItemOutcome::BaselineRecorded => outcome.baseline_recorded += 1,
                        ItemOutcome::Synced => outcome.synced += 1,
                        ItemOutcome::SkippedRankGuard => outcome.skipped_rank_guard += 1,
                        ItemOutcome::Unchanged => outcome.unchanged += 1,
                    }
                }
            }
            Err(err) => {
                tracing::warn!(issue = %issue.id, error = %err, "repo-log ingest item failed");
                outcome.errors += 1;
            }
        }

        tokio::time::sleep(std::time::Duration::from_millis(REPO_LOG_ITEM_SLEEP_MS)).await;
    }

    Ok(outcome)
}

enum ItemOutcome {
    CreatedInTracker,
    BaselineRecorded,
    Synced,
    SkippedRankGuard,
    Unchanged,
}

/// Process one RepoLog issue, fanning out to one outcome per `tracker:`
/// label it carries (§4.4, §4.5's "multiple labels" open question —
/// resolved as intentional fan-out, see DESIGN.md). An issue with no
/// label at all produces exactly one [`ItemOutcome::CreatedInTracker`].
async fn process_one(
    engine: &SyncEngine,
    store: &Store,
    tracker: &Arc<dyn TrackerAdapter>,
    event: &RepoLogChangeEvent,
    issue: &RepoLogIssue,
) -> Result<Vec<ItemOutcome>, ActivityError> {
    let tracker_status = vs_core::RepoLogStatus::parse(&issue.status)
        .map(|s| s.to_tracker(&issue.labels))
        .unwrap_or(vs_core::TrackerStatus::Backlog);

    let canonicals = vs_core::extract_tracker_labels(&issue.labels);
    if canonicals.is_empty() {
        let draft = IssueDraft {
            title: issue.title.clone(),
            description: issue.description.clone(),
            status: Some(tracker_status.to_string()),
            priority: None,
            parent: None,
        };
        let created = tracker.create_issue(&event.project, draft).await?;
        store
            .upsert(
                created.id.clone(),
                event.project.clone(),
                issue.title.clone(),
                SyncStateUpdate {
                    title: Some(issue.title.clone()),
                    description: issue.description.clone(),
                    status: Some(tracker_status.to_string()),
                    tracker_id: Some(created.id.to_string()),
                    tracker_modified_at: Some(issue.modified_at),
                    tracker_status: Some(tracker_status.to_string()),
                    repo_log_id: Some(issue.id.clone()),
                    repo_log_modified_at: Some(issue.modified_at),
                    repo_log_status: Some(issue.status.clone()),
                    ..Default::default()
                },
            )
            .map_err(|e| ActivityError::Transient(anyhow::anyhow!(e)))?;
        return Ok(vec![ItemOutcome::CreatedInTracker]);
    }

    let mut outcomes = Vec::with_capacity(canonicals.len());
    for canonical in canonicals {
        outcomes.push(process_labelled(engine, store, event, issue, &tracker_status, canonical).await?);
    }
    Ok(outcomes)
}

async fn process_labelled(
    engine: &SyncEngine,
    store: &Store,
    event: &RepoLogChangeEvent,
    issue: &RepoLogIssue,
    tracker_status: &vs_core::TrackerStatus,
    canonical: CanonicalId,
) -> Result<ItemOutcome, ActivityError> {
    let existing = store.get_state(&canonical);
    if existing.is_none() {
        store
            .upsert(
                canonical,
                event.project.clone(),
                issue.title.clone(),
                SyncStateUpdate {
                    title: Some(issue.title.clone()),
                    description: issue.description.clone(),
                    status: Some(tracker_status.to_string()),
                    repo_log_id: Some(issue.id.clone()),
                    repo_log_modified_at: Some(issue.modified_at),
                    repo_log_status: Some(issue.status.clone()),
                    ..Default::default()
                },
            )
            .map_err(|e| ActivityError::Transient(anyhow::anyhow!(e)))?;
        return Ok(ItemOutcome::BaselineRecorded);
    }
    let row = existing.expect("checked above");

    let changed = row.title != issue.title
        || row.description.as_deref() != issue.description.as_deref()
        || row.repo_log_status.as_deref() != Some(issue.status.as_str());
    if !changed {
        return Ok(ItemOutcome::Unchanged);
    }

    if !passes_rank_guard(&row.status, &tracker_status.to_string()) {
        return Ok(ItemOutcome::SkippedRankGuard);
    }

    let item = WorkItem {
        id: canonical.clone(),
        title: issue.title.clone(),
        description: issue.description.clone(),
        status: tracker_status.to_string(),
        priority: Priority::default(),
        parent: None,
        mirrors: MirrorIds {
            tracker_id: Some(canonical.to_string()),
            repo_log_id: Some(issue.id.clone()),
            docs_task_id: row.docs_id.clone(),
        },
        timestamps: vs_core::MirrorTimestamps {
            repo_log_modified_at: Some(issue.modified_at),
            ..Default::default()
        },
    };
    let input = BidirectionalSyncInput {
        source: SourceSystem::RepoLog,
        item,
        context: SyncContext { project: event.project.clone(), repo_path: Some(event.repo_path.clone()) },
        linked_ids: MirrorIds {
            tracker_id: Some(canonical.to_string()),
            repo_log_id: Some(issue.id.clone()),
            docs_task_id: row.docs_id.clone(),
        },
    };
    match engine.sync_one(input).await? {
        SyncOutcome::Synced { .. } => Ok(ItemOutcome::Synced),
        SyncOutcome::Skipped { .. } => Ok(ItemOutcome::SkippedRankGuard),
    }
}

#[cfg(test)]
#[path = "repo_log_watcher_tests.rs"]
mod tests;
