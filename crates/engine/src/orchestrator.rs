// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Full Orchestrator (C7, §4.6): fetches every known project, spawns a
//! Project-Sync child per project, and continue-as-news across a bounded
//! number of projects per run — with a circuit breaker over repeatedly
//! failing projects and a published progress query.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use vs_adapters::MemorySinkAdapter;
use vs_core::{ActivityError, OrchestratorMetrics, Project, ProjectCode};

use crate::project_sync::{run_project_sync_from, ProjectSyncCursor, ProjectSyncDeps, ProjectSyncResult};
use crate::runtime::{drive_to_completion, run_activity, spawn_child, CancelSignal, QueryHandle, WorkflowOutcome};

/// Projects synced per continue-as-new generation (§4.6).
pub const MAX_PROJECTS_PER_CONTINUATION: usize = 3;
/// Circuit breaker threshold: a project is skipped once its tracked
/// failure count reaches this (§4.6).
pub const CIRCUIT_BREAKER_THRESHOLD: u32 = 3;
/// Pacing sleep between projects (§5).
pub const PROJECT_SLEEP_MS: u64 = 500;

/// A snapshot of a single project's outcome within one orchestrator run,
/// recorded whether the child actually ran or the breaker skipped it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRunOutcome {
    pub project: ProjectCode,
    pub skipped_by_breaker: bool,
    pub failed: bool,
    pub result: Option<ProjectSyncResult>,
}

/// The orchestrator's continuation input (§4.6: "continue-as-new carrying
/// accumulated results, errors, original start time, and failure map").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorCursor {
    pub projects: Vec<ProjectCode>,
    pub cursor: usize,
    pub project_failures: HashMap<ProjectCode, u32>,
    pub started_at_ms: u64,
    pub accumulated: Vec<ProjectRunOutcome>,
    pub cancelled: bool,
}

impl OrchestratorCursor {
    pub fn new(projects: Vec<ProjectCode>, started_at_ms: u64) -> Self {
        Self {
            projects,
            cursor: 0,
            project_failures: HashMap::new(),
            started_at_ms,
            accumulated: Vec::new(),
            cancelled: false,
        }
    }
}

/// A published progress snapshot (§4.6 "Progress query").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorProgress {
    pub status: &'static str,
    pub current_project: Option<ProjectCode>,
    pub projects_total: usize,
    pub projects_completed: usize,
    pub issues_synced: u64,
    pub errors: u64,
    pub started_at_ms: u64,
    pub elapsed_ms: u64,
}

/// The final result of a full orchestrator run, used to build the metrics
/// point emitted on completion (§4.6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorResult {
    pub outcomes: Vec<ProjectRunOutcome>,
    pub metrics: OrchestratorMetrics,
}

/// Everything a run of the orchestrator needs: the per-project sync
/// dependency bundle builder, plus an optional metrics sink.
pub struct OrchestratorDeps {
    pub tracker: Arc<dyn vs_adapters::TrackerAdapter>,
    pub repo_log: Arc<dyn vs_adapters::RepoLogAdapter>,
    pub docs: Arc<dyn vs_adapters::DocsAdapter>,
    pub store: Arc<vs_store::Store>,
    pub metrics_sink: Option<Arc<dyn MemorySinkAdapter>>,
}

impl OrchestratorDeps {
    fn project_sync_deps(&self) -> ProjectSyncDeps {
        let engine = Arc::new(crate::sync_engine::SyncEngine::new(
            self.tracker.clone(),
            self.repo_log.clone(),
            self.docs.clone(),
            self.store.clone(),
        ));
        ProjectSyncDeps {
            tracker: self.tracker.clone(),
            repo_log: self.repo_log.clone(),
            docs: self.docs.clone(),
            store: self.store.clone(),
            engine,
        }
    }
}

/// Fetch every known project, optionally filtered to `filter_project`.
async fn fetch_projects(
    deps: &OrchestratorDeps,
    filter_project: Option<&ProjectCode>,
) -> Result<Vec<Project>, ActivityError> {
    let all = run_activity(&vs_core::RetryPolicy::default(), || {
        let tracker = deps.tracker.clone();
        async move { tracker.list_projects().await }
    })
    .await?;
    Ok(match filter_project {
        Some(p) => all.into_iter().filter(|proj| &proj.identifier == p).collect(),
        None => all,
    })
}

/// Run the orchestrator once over every known project (§4.6), optionally
/// filtered to a single project, publishing progress through `query` as it
/// goes and honoring `cancel` at project boundaries.
pub async fn run_orchestrator(
    deps: &OrchestratorDeps,
    filter_project: Option<ProjectCode>,
    started_at_ms: u64,
    query: &QueryHandle<OrchestratorProgress>,
    cancel: &CancelSignal,
) -> Result<OrchestratorResult, ActivityError> {
    let projects = fetch_projects(deps, filter_project.as_ref()).await?;
    let project_codes: Vec<ProjectCode> = projects.into_iter().map(|p| p.identifier).collect();
    let cursor = OrchestratorCursor::new(project_codes, started_at_ms);
    run_orchestrator_from(deps, cursor, started_at_ms, query, cancel).await
}

pub async fn run_orchestrator_from(
    deps: &OrchestratorDeps,
    cursor: OrchestratorCursor,
    now_ms: u64,
    query: &QueryHandle<OrchestratorProgress>,
    cancel: &CancelSignal,
) -> Result<OrchestratorResult, ActivityError> {
    let total = cursor.projects.len();
    let started_at_ms = cursor.started_at_ms;
    let result = drive_to_completion(cursor, |cursor| step(cursor, deps, now_ms, total, query, cancel)).await?;

    let mut metrics = OrchestratorMetrics::default();
    metrics.duration_ms = now_ms.saturating_sub(started_at_ms);
    for outcome in &result {
        metrics.projects_processed += 1;
        if let Some(r) = &outcome.result {
            metrics.issues_synced += r.items_synced();
            metrics.errors += r.errors;
        }
        if outcome.failed {
            metrics.errors += 1;
        }
    }

    if let Some(sink) = &deps.metrics_sink {
        let payload = serde_json::to_string(&metrics).unwrap_or_default();
        if let Err(err) = sink.update_block("orchestrator", "last_run_metrics", &payload).await {
            tracing::warn!(error = %err, "failed to emit orchestrator metrics");
        }
    }

    Ok(OrchestratorResult { outcomes: result, metrics })
}

async fn step(
    mut cursor: OrchestratorCursor,
    deps: &OrchestratorDeps,
    now_ms: u64,
    total: usize,
    query: &QueryHandle<OrchestratorProgress>,
    cancel: &CancelSignal,
) -> Result<WorkflowOutcome<OrchestratorCursor, Vec<ProjectRunOutcome>>, ActivityError> {
    let mut projects_this_generation = 0;

    while cursor.cursor < cursor.projects.len() {
        if cancel.is_cancelled() {
            cursor.cancelled = true;
            return Ok(WorkflowOutcome::Done(cursor.accumulated));
        }

        let project = cursor.projects[cursor.cursor].clone();
        publish_progress(query, &cursor, total, Some(project.clone()), now_ms);

        let failures = cursor.project_failures.get(&project).copied().unwrap_or(0);
        if failures >= CIRCUIT_BREAKER_THRESHOLD {
            cursor.accumulated.push(ProjectRunOutcome {
                project,
                skipped_by_breaker: true,
                failed: false,
                result: None,
            });
        } else {
            let project_sync_deps = deps.project_sync_deps();
            let project_for_child = project.clone();
            let cancel_child = cancel.clone();
            let handle = spawn_child(async move {
                run_project_sync_from(ProjectSyncCursor::new(project_for_child), &project_sync_deps, &cancel_child).await
            });

            match handle.await {
                Ok(Ok(result)) => {
                    cursor.project_failures.insert(project.clone(), 0);
                    let failed = !result.success;
                    if failed {
                        *cursor.project_failures.entry(project.clone()).or_insert(0) += 1;
                    }
                    cursor.accumulated.push(ProjectRunOutcome {
                        project,
                        skipped_by_breaker: false,
                        failed,
                        result: Some(result),
                    });
                }
                Ok(Err(err)) => {
                    tracing::warn!(?project, error = %err, "project-sync child failed");
                    *cursor.project_failures.entry(project.clone()).or_insert(0) += 1;
                    cursor.accumulated.push(ProjectRunOutcome {
                        project,
                        skipped_by_breaker: false,
                        failed: true,
                        result: None,
                    });
                }
                Err(join_err) => {
                    tracing::warn!(?project, error = %join_err, "project-sync child panicked");
                    *cursor.project_failures.entry(project.clone()).or_insert(0) += 1;
                    cursor.accumulated.push(ProjectRunOutcome {
                        project,
                        skipped_by_breaker: false,
                        failed: true,
                        result: None,
                    });
                }
            }
        }

        cursor.cursor += 1;
        projects_this_generation += 1;
        publish_progress(query, &cursor, total, None, now_ms);

        if projects_this_generation >= MAX_PROJECTS_PER_CONTINUATION && cursor.cursor < cursor.projects.len() {
            return Ok(WorkflowOutcome::ContinueAsNew(cursor));
        }

        tokio::time::sleep(Duration::from_millis(PROJECT_SLEEP_MS)).await;
    }

    Ok(WorkflowOutcome::Done(cursor.accumulated))
}

fn publish_progress(
    query: &QueryHandle<OrchestratorProgress>,
    cursor: &OrchestratorCursor,
    total: usize,
    current_project: Option<ProjectCode>,
    now_ms: u64,
) {
    query.publish(OrchestratorProgress {
        status: if cursor.cursor >= cursor.projects.len() { "done" } else { "running" },
        current_project,
        projects_total: total,
        projects_completed: cursor.cursor,
        issues_synced: cursor.accumulated.iter().filter_map(|o| o.result.as_ref()).map(|r| r.items_synced()).sum(),
        errors: cursor.accumulated.iter().filter_map(|o| o.result.as_ref()).map(|r| r.errors).sum(),
        started_at_ms: cursor.started_at_ms,
        elapsed_ms: now_ms.saturating_sub(cursor.started_at_ms),
    });
}

/// The scheduled wrapper (§4.6 "Scheduled wrapper"): runs the orchestrator
/// on a fixed interval, for `max_iterations` runs (`None` = forever). A
/// single failed iteration is logged and does not break the loop.
pub async fn run_scheduled(
    deps: &OrchestratorDeps,
    filter_project: Option<ProjectCode>,
    interval: Duration,
    max_iterations: Option<u64>,
    now_ms: impl Fn() -> u64,
    query: &QueryHandle<OrchestratorProgress>,
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

        match run_orchestrator(deps, filter_project.clone(), now_ms(), query, cancel).await {
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, "scheduled orchestrator iteration failed"),
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
#[path = "orchestrator_tests.rs"]
mod tests;
