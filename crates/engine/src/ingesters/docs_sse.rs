// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Docs-like SSE ingester (§4.4): a batch of changed task ids, each
//! fetched and spawned as an independent single-item sync child run.

use std::sync::Arc;

use vs_adapters::DocsAdapter;
use vs_core::{
    parse_tracker_reference, ActivityError, CanonicalId, DocsStatus, MirrorIds, Priority,
    ProjectCode, SourceSystem, WorkItem,
};

use crate::runtime::{spawn_child, CancelSignal};
use crate::sync_engine::{BidirectionalSyncInput, SyncContext, SyncEngine, SyncOutcome};

use super::DOCS_SSE_ITEM_SLEEP_MS;

/// `{vibeProjectId, trackerProject?, changedTaskIds[], timestamp}` (§6).
#[derive(Debug, Clone)]
pub struct DocsSseEvent {
    pub vibe_project_id: String,
    pub tracker_project: Option<ProjectCode>,
    pub changed_task_ids: Vec<String>,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocsSseOutcome {
    pub synced: u64,
    pub skipped: u64,
    pub errors: u64,
}

/// Ingest one SSE batch. Per §3 ("items created in non-Tracker systems are
/// not indexed until a Tracker identifier exists for them"), a task whose
/// description carries no `Tracker Issue: PROJ-N` reference — and whose
/// event carries no `trackerProject` to fall back on scoping it under — is
/// counted `skipped`, not synced; DESIGN.md records this as the resolution
/// of the otherwise-unspecified "what canonical id does a Docs-only task
/// get" question.
pub async fn ingest_docs_sse(
    engine: Arc<SyncEngine>,
    docs: &Arc<dyn DocsAdapter>,
    event: DocsSseEvent,
    cancel: &CancelSignal,
) -> Result<DocsSseOutcome, ActivityError> {
    let mut outcome = DocsSseOutcome::default();

    for task_id in &event.changed_task_ids {
        if cancel.is_cancelled() {
            break;
        }

        let task = match docs.get_task(task_id).await {
            Ok(t) => t,
            Err(err) => {
                tracing::warn!(task_id, error = %err, "docs SSE ingest: get_task failed");
                outcome.errors += 1;
                tokio::time::sleep(std::time::Duration::from_millis(DOCS_SSE_ITEM_SLEEP_MS)).await;
                continue;
            }
        };

        let canonical = task.description.as_deref().and_then(parse_tracker_reference).and_then(|s| CanonicalId::parse(&s).ok());

        let Some(canonical) = canonical else {
            outcome.skipped += 1;
            tokio::time::sleep(std::time::Duration::from_millis(DOCS_SSE_ITEM_SLEEP_MS)).await;
            continue;
        };

        let project = event.tracker_project.clone().unwrap_or_else(|| {
            ProjectCode::new(canonical.project_prefix()).unwrap_or_else(|_| {
                ProjectCode::new("UNKNOWN").expect("UNKNOWN is a valid project code")
            })
        });

        let status = DocsStatus::parse_wire(&task.status).map(|s| s.to_tracker()).unwrap_or(vs_core::TrackerStatus::Todo);

        let item = WorkItem {
            id: canonical.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            status: status.to_string(),
            priority: Priority::default(),
            parent: None,
            mirrors: MirrorIds {
                tracker_id: Some(canonical.to_string()),
                repo_log_id: None,
                docs_task_id: Some(task.id.clone()),
            },
            timestamps: vs_core::MirrorTimestamps {
                docs_modified_at: Some(task.modified_at),
                ..Default::default()
            },
        };
        let input = BidirectionalSyncInput {
            source: SourceSystem::Docs,
            item,
            context: SyncContext { project, repo_path: None },
            linked_ids: MirrorIds {
                tracker_id: Some(canonical.to_string()),
                repo_log_id: None,
                docs_task_id: Some(task.id.clone()),
            },
        };

        let engine = engine.clone();
        let handle = spawn_child(async move { engine.sync_one(input).await });
        match handle.await {
            Ok(Ok(SyncOutcome::Synced { .. })) => outcome.synced += 1,
            Ok(Ok(SyncOutcome::Skipped { .. })) => outcome.skipped += 1,
            Ok(Err(err)) => {
                tracing::warn!(task_id, error = %err, "docs SSE child sync failed");
                outcome.errors += 1;
            }
            Err(join_err) => {
                tracing::warn!(task_id, error = %join_err, "docs SSE child panicked");
                outcome.errors += 1;
            }
        }

        tokio::time::sleep(std::time::Duration::from_millis(DOCS_SSE_ITEM_SLEEP_MS)).await;
    }

    Ok(outcome)
}

#[cfg(test)]
#[path = "docs_sse_tests.rs"]
mod tests;
