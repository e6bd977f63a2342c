// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Tracker Webhook ingester (§4.4): a mixed change batch, filtered to
//! issue-class changes, de-duplicated by `(identifier || id)` keeping the
//! newest `modifiedOn`, each surviving change spawned as an independent
//! single-item sync child.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use vs_adapters::RepoLogAdapter;
use vs_core::{
    ActivityError, CanonicalId, Change, IssueChange, MirrorIds, Priority, ProjectCode,
    SourceSystem, WorkItem,
};

use crate::runtime::{spawn_child, CancelSignal};
use crate::sync_engine::{BidirectionalSyncInput, SyncContext, SyncEngine, SyncOutcome};

use super::WEBHOOK_ITEM_SLEEP_MS;

/// `{type, changes[{id, class, modifiedOn?, data{...}}], timestamp}` (§6).
/// `changes` is pre-decoded to the tagged [`Change`] variant (§9 Design
/// Notes: "model as a tagged variant ... drop OtherChange early").
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub changes: Vec<Change>,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookIngestOutcome {
    pub synced: u64,
    pub skipped: u64,
    pub errors: u64,
    /// Count of duplicate entries collapsed by the de-dup step (§8
    /// scenario 5: 5 changes for one identifier -> 1 child spawned).
    pub deduplicated: u64,
}

/// De-duplicate by `(identifier || id)`, keeping the entry with the
/// greatest `modifiedOn` (§4.4). Entries with no `modifiedOn` are treated
/// as rank `0` so a later-arriving timestamped entry always wins.
fn dedup(issue_changes: Vec<IssueChange>) -> (Vec<IssueChange>, u64) {
    let mut by_key: HashMap<String, IssueChange> = HashMap::new();
    let mut dropped = 0u64;
    for change in issue_changes {
        let key = change.dedup_key().to_string();
        match by_key.get(&key) {
            Some(existing) if existing.modified_on.unwrap_or(0) >= change.modified_on.unwrap_or(0) => {
                dropped += 1;
            }
            _ => {
                if by_key.insert(key, change).is_some() {
                    dropped += 1;
                }
            }
        }
    }
    (by_key.into_values().collect(), dropped)
}

fn project_prefix_of(change: &IssueChange) -> Option<ProjectCode> {
    let raw = change.identifier.as_deref().unwrap_or(&change.id);
    CanonicalId::parse(raw).ok().and_then(|id| ProjectCode::new(id.project_prefix()).ok())
}

fn work_item_from_change(change: &IssueChange, canonical: &CanonicalId) -> WorkItem {
    let title = change.data.get("title").and_then(|v| v.as_str()).unwrap_or("").to_string();
    let status = change.data.get("status").and_then(|v| v.as_str()).unwrap_or("Backlog").to_string();
    WorkItem {
        id: canonical.clone(),
        title,
        description: None,
        status,
        priority: Priority::default(),
        parent: None,
        mirrors: MirrorIds { tracker_id: Some(canonical.to_string()), repo_log_id: None, docs_task_id: None },
        timestamps: vs_core::MirrorTimestamps {
            tracker_modified_at: change.modified_on,
            ..Default::default()
        },
    }
}

/// Ingest one webhook batch (§4.4 "Tracker Webhook ingester").
pub async fn ingest_webhook(
    engine: Arc<SyncEngine>,
    repo_log: &Arc<dyn RepoLogAdapter>,
    event: WebhookEvent,
    cancel: &CancelSignal,
) -> Result<WebhookIngestOutcome, ActivityError> {
    let issue_changes: Vec<IssueChange> = event
        .changes
        .into_iter()
        .filter_map(|c| match c {
            Change::Issue(issue) => Some(issue),
            Change::Other => None,
        })
        .collect();

    let (survivors, deduplicated) = dedup(issue_changes);
    let mut outcome = WebhookIngestOutcome { deduplicated, ..Default::default() };

    for change in survivors {
        if cancel.is_cancelled() {
            break;
        }

        let raw_id = change.identifier.clone().unwrap_or_else(|| change.id.clone());
        let Ok(canonical) = CanonicalId::parse(&raw_id) else {
            outcome.skipped += 1;
            tokio::time::sleep(std::time::Duration::from_millis(WEBHOOK_ITEM_SLEEP_MS)).await;
            continue;
        };

        let Some(project) = project_prefix_of(&change) else {
            outcome.skipped += 1;
            tokio::time::sleep(std::time::Duration::from_millis(WEBHOOK_ITEM_SLEEP_MS)).await;
            continue;
        };

        // Non-fatal on failure: proceed without RepoLog (§4.4).
        let repo_path = repo_log.resolve_repo_path(&project).await.unwrap_or(None);

        let item = work_item_from_change(&change, &canonical);
        let input = BidirectionalSyncInput {
            source: SourceSystem::Tracker,
            item,
            context: SyncContext { project, repo_path },
            linked_ids: MirrorIds { tracker_id: Some(canonical.to_string()), repo_log_id: None, docs_task_id: None },
        };

        let engine = engine.clone();
        let handle = spawn_child(async move { engine.sync_one(input).await });
        match handle.await {
            Ok(Ok(SyncOutcome::Synced { .. })) => outcome.synced += 1,
            Ok(Ok(SyncOutcome::Skipped { .. })) => outcome.skipped += 1,
            Ok(Err(err)) => {
                tracing::warn!(id = %raw_id, error = %err, "webhook child sync failed");
                outcome.errors += 1;
            }
            Err(join_err) => {
                tracing::warn!(id = %raw_id, error = %join_err, "webhook child panicked");
                outcome.errors += 1;
            }
        }

        tokio::time::sleep(std::time::Duration::from_millis(WEBHOOK_ITEM_SLEEP_MS)).await;
    }

    Ok(outcome)
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
