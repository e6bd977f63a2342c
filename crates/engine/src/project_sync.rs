// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Project-Sync Pipeline (C6, §4.5): syncs one project across all
//! three systems in ordered phases, continue-as-new-ing at every commit
//! boundary so no single run's history grows unbounded.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use vs_adapters::{DocsAdapter, DocsTaskUpsert, IssueDraft, RepoLogAdapter, RepoLogIssue, RepoLogUpsert, TrackerAdapter, TrackerIssue};
use vs_core::{
    parse_tracker_reference, passes_rank_guard, ActivityError, CanonicalId, MirrorIds, Priority,
    ProjectCode, RepoLogStatus, SourceSystem, TrackerStatus, WorkItem,
};
use vs_store::{Store, SyncStateUpdate};

use crate::runtime::{run_activity, CancelSignal, WorkflowOutcome};
use crate::sync_engine::{BidirectionalSyncInput, SyncContext, SyncEngine, SyncOutcome};

/// Items processed in a single run before continue-as-new is forced
/// (§4.5 "Continue-as-new rule").
pub const CONTINUATION_CAP: u32 = 100;
/// Default activity batch size (§5).
pub const DEFAULT_BATCH_SIZE: usize = 5;
/// The webhook fast path's minimum effective batch size (§4.5).
pub const WEBHOOK_MIN_BATCH_SIZE: usize = 20;
/// Pacing sleep between phase3b issue creations (§5).
pub const PHASE3B_CREATE_SLEEP_MS: u64 = 100;

/// The pipeline's phases, in the fixed order of §4.5's table. Persisted
/// verbatim across continue-as-new generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Init,
    Phase1,
    Phase2,
    Phase3,
    Phase3b,
    Phase3c,
    Done,
}

impl Phase {
    fn next(self) -> Phase {
        match self {
            Phase::Init => Phase::Phase1,
            Phase::Phase1 => Phase::Phase2,
            Phase::Phase2 => Phase::Phase3,
            Phase::Phase3 => Phase::Phase3b,
            Phase::Phase3b => Phase::Phase3c,
            Phase::Phase3c => Phase::Done,
            Phase::Done => Phase::Done,
        }
    }
}

/// Running totals carried across every continue-as-new generation
/// (`_accumulatedResult` in §4.5's continuation payload).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSyncResult {
    pub phase1_upserted: u64,
    pub phase2_propagated: u64,
    pub phase3_upserted: u64,
    pub phase3b_updated: u64,
    pub phase3b_created: u64,
    pub phase3c_created: u64,
    pub errors: u64,
    pub success: bool,
}

impl ProjectSyncResult {
    /// Total number of logical items touched, used by the orchestrator's
    /// `issuesSynced` progress counter (§4.6).
    pub fn items_synced(&self) -> u64 {
        self.phase1_upserted
            + self.phase2_propagated
            + self.phase3_upserted
            + self.phase3b_updated
            + self.phase3b_created
            + self.phase3c_created
    }
}

/// The full continuation input (§4.5: `{phase, cursor, _accumulatedResult,
/// _vibeProjectId, _gitRepoPath, _beadsInitialized, _phase1UpdatedTasks[]}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSyncCursor {
    pub project: ProjectCode,
    pub phase: Phase,
    /// Intra-phase position: the index of the next unprocessed item.
    pub cursor: usize,
    pub repo_path: Option<PathBuf>,
    /// Whether `RepoLogAdapter::init` has already run for this project.
    pub repo_log_initialized: bool,
    /// Docs task-peer ids updated by phase1, by Tracker canonical id — so
    /// phase2 knows which peer tasks NOT to re-propagate (§4.5 phase2:
    /// "for each peer task not updated in phase1").
    pub phase1_updated_tasks: HashSet<String>,
    /// A caller-supplied partial issue set (the webhook fast path, §4.5).
    /// `None` means "do a full fetch".
    pub prefetched_issues: Option<Vec<TrackerIssue>>,
    pub webhook_fast_path: bool,
    pub issues_processed_this_run: u32,
    pub accumulated: ProjectSyncResult,
}

impl ProjectSyncCursor {
    pub fn new(project: ProjectCode) -> Self {
        Self {
            project,
            phase: Phase::Init,
            cursor: 0,
            repo_path: None,
            repo_log_initialized: false,
            phase1_updated_tasks: HashSet::new(),
            prefetched_issues: None,
            webhook_fast_path: false,
            issues_processed_this_run: 0,
            accumulated: ProjectSyncResult::default(),
        }
    }

    /// The webhook fast path (§4.5): a small, pre-fetched, partial issue
    /// set forces `effectiveBatchSize = max(configured, 20)` and never
    /// falls back to a full fetch.
    pub fn with_webhook_fast_path(mut self, issues: Vec<TrackerIssue>) -> Self {
        self.prefetched_issues = Some(issues);
        self.webhook_fast_path = true;
        self
    }

    fn effective_batch_size(&self) -> usize {
        if self.webhook_fast_path {
            DEFAULT_BATCH_SIZE.max(WEBHOOK_MIN_BATCH_SIZE)
        } else {
            DEFAULT_BATCH_SIZE
        }
    }
}

/// The adapter/store bundle a pipeline step runs against — a fields-bundle
/// struct rather than methods bound onto a shared instance.
pub struct ProjectSyncDeps {
    pub tracker: Arc<dyn TrackerAdapter>,
    pub repo_log: Arc<dyn RepoLogAdapter>,
    pub docs: Arc<dyn DocsAdapter>,
    pub store: Arc<Store>,
    pub engine: Arc<SyncEngine>,
}

fn normalize_title(title: &str) -> String {
    title.trim().to_ascii_lowercase()
}

/// Run the pipeline for `project` to completion, continue-as-new-ing
/// internally via [`crate::runtime::drive_to_completion`].
pub async fn run_project_sync(
    project: ProjectCode,
    deps: &ProjectSyncDeps,
    cancel: &CancelSignal,
) -> Result<ProjectSyncResult, ActivityError> {
    run_project_sync_from(ProjectSyncCursor::new(project), deps, cancel).await
}

pub async fn run_project_sync_from(
    cursor: ProjectSyncCursor,
    deps: &ProjectSyncDeps,
    cancel: &CancelSignal,
) -> Result<ProjectSyncResult, ActivityError> {
    crate::runtime::drive_to_completion(cursor, |cursor| step(cursor, deps, cancel)).await
}

/// One continue-as-new generation: run phases until either the
/// continuation cap is hit or the pipeline reaches `Done`.
async fn step(
    mut cursor: ProjectSyncCursor,
    deps: &ProjectSyncDeps,
    cancel: &CancelSignal,
) -> Result<WorkflowOutcome<ProjectSyncCursor, ProjectSyncResult>, ActivityError> {
    loop {
        if cancel.is_cancelled() {
            cursor.accumulated.success = false;
            return Ok(WorkflowOutcome::Done(cursor.accumulated));
        }

        match cursor.phase {
            Phase::Init => {
                run_init(&mut cursor, deps).await?;
                cursor.phase = Phase::Phase1;
                cursor.cursor = 0;
            }
            Phase::Phase1 => {
                if run_phase1(&mut cursor, deps).await? {
                    return Ok(WorkflowOutcome::ContinueAsNew(cursor));
                }
                cursor.phase = Phase::Phase2;
                cursor.cursor = 0;
            }
            Phase::Phase2 => {
                if run_phase2(&mut cursor, deps).await? {
                    return Ok(WorkflowOutcome::ContinueAsNew(cursor));
                }
                cursor.phase = Phase::Phase3;
                cursor.cursor = 0;
            }
            Phase::Phase3 => {
                if cursor.repo_path.is_none() {
                    cursor.phase = Phase::Done;
                    cursor.cursor = 0;
                    continue;
                }
                if run_phase3(&mut cursor, deps).await? {
                    return Ok(WorkflowOutcome::ContinueAsNew(cursor));
                }
                cursor.phase = Phase::Phase3b;
                cursor.cursor = 0;
            }
            Phase::Phase3b => {
                if cursor.repo_path.is_some() {
                    run_phase3b(&mut cursor, deps).await?;
                }
                cursor.phase = Phase::Phase3c;
                cursor.cursor = 0;
                return Ok(WorkflowOutcome::ContinueAsNew(cursor));
            }
            Phase::Phase3c => {
                if cursor.repo_path.is_some() {
                    run_phase3c(&mut cursor, deps).await?;
                }
                cursor.phase = Phase::Done;
                cursor.cursor = 0;
            }
            Phase::Done => {
                cursor.accumulated.success = cursor.accumulated.errors == 0;
                return Ok(WorkflowOutcome::Done(cursor.accumulated));
            }
        }
    }
}

/// init: ensure the Docs-side peer exists, parse `repoPath`, initialize
/// the RepoLog repository, trigger agent provisioning (best-effort).
async fn run_init(cursor: &mut ProjectSyncCursor, deps: &ProjectSyncDeps) -> Result<(), ActivityError> {
    run_activity(&vs_core::RetryPolicy::default(), || {
        let docs = deps.docs.clone();
        let project = cursor.project.as_str().to_string();
        async move { docs.ensure_project_peer(&project).await }
    })
    .await?;

    if cursor.repo_path.is_none() {
        if let Some(path) = repo_path_for(deps, &cursor.project).await? {
            cursor.repo_path = Some(path);
        }
    }

    if let Some(repo_path) = cursor.repo_path.clone() {
        if !cursor.repo_log_initialized {
            run_activity(&vs_core::RetryPolicy::default(), || {
                let repo_log = deps.repo_log.clone();
                let repo_path = repo_path.clone();
                let project = cursor.project.clone();
                async move { repo_log.init(&repo_path, &project).await }
            })
            .await?;
            cursor.repo_log_initialized = true;
        }
    }

    // Agent provisioning is an out-of-scope side channel (§1); best-effort
    // only, never fatal.
    Ok(())
}

async fn repo_path_for(deps: &ProjectSyncDeps, project: &ProjectCode) -> Result<Option<PathBuf>, ActivityError> {
    match deps.repo_log.resolve_repo_path(project).await {
        Ok(path) => Ok(path),
        Err(err) => {
            tracing::warn!(?project, error = %err, "resolve_repo_path failed during init");
            Ok(None)
        }
    }
}

async fn fetch_tracker_issues(cursor: &ProjectSyncCursor, deps: &ProjectSyncDeps) -> Result<Vec<TrackerIssue>, ActivityError> {
    if let Some(issues) = &cursor.prefetched_issues {
        return Ok(issues.clone());
    }
    let batch = run_activity(&vs_core::RetryPolicy::default(), || {
        let tracker = deps.tracker.clone();
        let project = cursor.project.clone();
        async move { tracker.list_issues_bulk(&[project], 1000).await }
    })
    .await?;
    Ok(batch.into_values().next().unwrap_or_default())
}

/// phase1: Tracker -> Docs-like peer, parents before children.
/// Returns `true` if the continuation cap was hit mid-phase.
async fn run_phase1(cursor: &mut ProjectSyncCursor, deps: &ProjectSyncDeps) -> Result<bool, ActivityError> {
    let mut issues = fetch_tracker_issues(cursor, deps).await?;
    issues.sort_by_key(|i| i.parent.is_some());

    let peer = run_activity(&vs_core::RetryPolicy::default(), || {
        let docs = deps.docs.clone();
        let project = cursor.project.as_str().to_string();
        async move { docs.ensure_project_peer(&project).await }
    })
    .await?;

    while cursor.cursor < issues.len() {
        let issue = &issues[cursor.cursor];
        let existing = deps.store.get_state(&issue.id);
        let docs_task_id = existing.as_ref().and_then(|r| r.docs_id.clone());

        match run_activity(&vs_core::RetryPolicy::default(), || {
            let docs = deps.docs.clone();
            let peer = peer.clone();
            let upsert = DocsTaskUpsert {
                id: docs_task_id.clone(),
                title: issue.title.clone(),
                description: issue.description.clone(),
                status: Some(vs_core::DocsStatus::from_tracker_form(&issue.status).as_wire_str().to_string()),
            };
            async move { docs.upsert_task(&peer, upsert).await }
        })
        .await
        {
            Ok(task) => {
                deps.store
                    .upsert(
                        issue.id.clone(),
                        cursor.project.clone(),
                        issue.title.clone(),
                        SyncStateUpdate {
                            title: Some(issue.title.clone()),
                            description: issue.description.clone(),
                            status: Some(issue.status.clone()),
                            tracker_id: Some(issue.id.to_string()),
                            tracker_modified_at: Some(issue.modified_at),
                            tracker_status: Some(issue.status.clone()),
                            docs_id: Some(task.id.clone()),
                            docs_modified_at: Some(task.modified_at),
                            docs_status: Some(task.status.clone()),
                            ..Default::default()
                        },
                    )
                    .map_err(|e| ActivityError::Transient(anyhow::anyhow!(e)))?;
                cursor.phase1_updated_tasks.insert(task.id);
                cursor.accumulated.phase1_upserted += 1;
            }
            Err(err) => {
                tracing::warn!(issue = %issue.id, error = %err, "phase1 upsert failed");
                cursor.accumulated.errors += 1;
            }
        }

        cursor.cursor += 1;
        cursor.issues_processed_this_run += 1;
        if cursor.issues_processed_this_run >= CONTINUATION_CAP && cursor.cursor < issues.len() {
            cursor.issues_processed_this_run = 0;
            return Ok(true);
        }
    }
    Ok(false)
}

/// phase2: Docs-like peer -> Tracker, for tasks phase1 did not just touch.
async fn run_phase2(cursor: &mut ProjectSyncCursor, deps: &ProjectSyncDeps) -> Result<bool, ActivityError> {
    let peer = run_activity(&vs_core::RetryPolicy::default(), || {
        let docs = deps.docs.clone();
        let project = cursor.project.as_str().to_string();
        async move { docs.ensure_project_peer(&project).await }
    })
    .await?;

    let all_tasks = run_activity(&vs_core::RetryPolicy::default(), || {
        let docs = deps.docs.clone();
        let peer = peer.clone();
        async move { docs.list_tasks(&peer).await }
    })
    .await?;

    let tasks: Vec<_> = all_tasks.into_iter().filter(|t| !cursor.phase1_updated_tasks.contains(&t.id)).collect();

    while cursor.cursor < tasks.len() {
        let task = &tasks[cursor.cursor];
        let canonical = task.description.as_deref().and_then(parse_tracker_reference).and_then(|s| CanonicalId::parse(&s).ok());

        if let Some(canonical) = canonical {
            let item = WorkItem {
                id: canonical.clone(),
                title: task.title.clone(),
                description: task.description.clone(),
                status: vs_core::DocsStatus::parse_wire(&task.status).map(|s| s.to_tracker()).unwrap_or(TrackerStatus::Todo).to_string(),
                priority: Priority::default(),
                parent: None,
                mirrors: MirrorIds { tracker_id: Some(canonical.to_string()), repo_log_id: None, docs_task_id: Some(task.id.clone()) },
                timestamps: vs_core::MirrorTimestamps { docs_modified_at: Some(task.modified_at), ..Default::default() },
            };
            let input = BidirectionalSyncInput {
                source: SourceSystem::Docs,
                item,
                context: SyncContext { project: cursor.project.clone(), repo_path: cursor.repo_path.clone() },
                linked_ids: MirrorIds { tracker_id: Some(canonical.to_string()), repo_log_id: None, docs_task_id: Some(task.id.clone()) },
            };
            match deps.engine.sync_one(input).await {
                Ok(SyncOutcome::Synced { .. }) => cursor.accumulated.phase2_propagated += 1,
                Ok(SyncOutcome::Skipped { .. }) => {}
                Err(err) => {
                    tracing::warn!(task = %task.id, error = %err, "phase2 propagation failed");
                    cursor.accumulated.errors += 1;
                }
            }
        }

        cursor.cursor += 1;
        cursor.issues_processed_this_run += 1;
        if cursor.issues_processed_this_run >= CONTINUATION_CAP && cursor.cursor < tasks.len() {
            cursor.issues_processed_this_run = 0;
            return Ok(true);
        }
    }
    Ok(false)
}

/// phase3: Tracker -> RepoLog, deduplicated by normalized title per batch.
async fn run_phase3(cursor: &mut ProjectSyncCursor, deps: &ProjectSyncDeps) -> Result<bool, ActivityError> {
    let issues = fetch_tracker_issues(cursor, deps).await?;
    let repo_path = cursor.repo_path.clone().expect("checked by caller");
    let batch_size = cursor.effective_batch_size();

    while cursor.cursor < issues.len() {
        let end = (cursor.cursor + batch_size).min(issues.len());
        let batch = &issues[cursor.cursor..end];

        let mut seen_titles: HashSet<String> = HashSet::new();
        let existing_repo_issues = run_activity(&vs_core::RetryPolicy::default(), || {
            let repo_log = deps.repo_log.clone();
            let repo_path = repo_path.clone();
            async move { repo_log.list_issues(&repo_path).await }
        })
        .await?;
        let by_title: HashMap<String, RepoLogIssue> =
            existing_repo_issues.into_iter().map(|i| (normalize_title(&i.title), i)).collect();

        for issue in batch {
            let key = normalize_title(&issue.title);
            if !seen_titles.insert(key.clone()) {
                continue;
            }
            let existing_id = by_title.get(&key).map(|i| i.id.clone());
            let (status, label) = vs_core::tracker_to_repolog(
                &TrackerStatus::parse(&issue.status).unwrap_or(TrackerStatus::Backlog),
            );
            let mut labels = HashSet::new();
            labels.insert(format!("tracker:{}", issue.id));
            if let Some(label) = label {
                labels.insert(label.to_string());
            }

            match run_activity(&vs_core::RetryPolicy::default(), || {
                let repo_log = deps.repo_log.clone();
                let repo_path = repo_path.clone();
                let upsert = RepoLogUpsert {
                    id: existing_id.clone(),
                    title: issue.title.clone(),
                    description: issue.description.clone(),
                    status: Some(status.to_string()),
                    labels: labels.clone(),
                    parent_repo_log_id: None,
                };
                async move { repo_log.upsert(&repo_path, upsert).await }
            })
            .await
            {
                Ok(repo_issue) => {
                    deps.store
                        .upsert(
                            issue.id.clone(),
                            cursor.project.clone(),
                            issue.title.clone(),
                            SyncStateUpdate {
                                title: Some(issue.title.clone()),
                                tracker_id: Some(issue.id.to_string()),
                                tracker_modified_at: Some(issue.modified_at),
                                tracker_status: Some(issue.status.clone()),
                                repo_log_id: Some(repo_issue.id),
                                repo_log_modified_at: Some(repo_issue.modified_at),
                                repo_log_status: Some(repo_issue.status),
                                ..Default::default()
                            },
                        )
                        .map_err(|e| ActivityError::Transient(anyhow::anyhow!(e)))?;
                    cursor.accumulated.phase3_upserted += 1;
                }
                Err(err) => {
                    tracing::warn!(issue = %issue.id, error = %err, "phase3 upsert failed");
                    cursor.accumulated.errors += 1;
                }
            }
        }

        cursor.cursor = end;
        cursor.issues_processed_this_run += batch.len() as u32;
        if cursor.issues_processed_this_run >= CONTINUATION_CAP && cursor.cursor < issues.len() {
            cursor.issues_processed_this_run = 0;
            return Ok(true);
        }
    }
    Ok(false)
}

/// phase3b: RepoLog -> Tracker. Partitions by presence of `tracker:`
/// labels; labelled items sync via the batch update path (with the rank
/// guard applied against SyncState) — one update per label, fanning out
/// when an issue carries more than one (§4.5's "multiple labels" open
/// question, resolved as intentional fan-out, see DESIGN.md) — unlabelled
/// items create new Tracker issues.
async fn run_phase3b(cursor: &mut ProjectSyncCursor, deps: &ProjectSyncDeps) -> Result<(), ActivityError> {
    let repo_path = cursor.repo_path.clone().expect("checked by caller");
    let items = run_activity(&vs_core::RetryPolicy::default(), || {
        let repo_log = deps.repo_log.clone();
        let repo_path = repo_path.clone();
        async move { repo_log.list_issues(&repo_path).await }
    })
    .await?;

    for issue in &items {
        let labelled = vs_core::extract_tracker_labels(&issue.labels);

        if !labelled.is_empty() {
            for canonical in labelled {
                let Some(row) = deps.store.get_state(&canonical) else { continue };
                let tracker_status = RepoLogStatus::parse(&issue.status)
                    .map(|s| s.to_tracker(&issue.labels))
                    .unwrap_or(TrackerStatus::Backlog);
                if !passes_rank_guard(&row.status, &tracker_status.to_string()) {
                    continue;
                }
                let update = vs_adapters::IssueUpdate {
                    title: Some(issue.title.clone()),
                    description: issue.description.clone(),
                    status: Some(tracker_status.to_string()),
                    priority: None,
                    parent: None,
                };
                match run_activity(&vs_core::RetryPolicy::default(), || {
                    let tracker = deps.tracker.clone();
                    let canonical = canonical.clone();
                    let update = update.clone();
                    async move { tracker.update_issue(&canonical, update).await }
                })
                .await
                {
                    Ok(_) => {
                        deps.store
                            .upsert(
                                canonical.clone(),
                                cursor.project.clone(),
                                issue.title.clone(),
                                SyncStateUpdate {
                                    repo_log_id: Some(issue.id.clone()),
                                    repo_log_modified_at: Some(issue.modified_at),
                                    repo_log_status: Some(issue.status.clone()),
                                    tracker_status: Some(tracker_status.to_string()),
                                    status: Some(tracker_status.to_string()),
                                    ..Default::default()
                                },
                            )
                            .map_err(|e| ActivityError::Transient(anyhow::anyhow!(e)))?;
                        cursor.accumulated.phase3b_updated += 1;
                    }
                    Err(err) => {
                        tracing::warn!(issue = %issue.id, error = %err, "phase3b update failed");
                        cursor.accumulated.errors += 1;
                    }
                }
            }
        } else {
            let tracker_status = RepoLogStatus::parse(&issue.status)
                .map(|s| s.to_tracker(&issue.labels))
                .unwrap_or(TrackerStatus::Backlog);
            let draft = IssueDraft {
                title: issue.title.clone(),
                description: issue.description.clone(),
                status: Some(tracker_status.to_string()),
                priority: None,
                parent: None,
            };
            match run_activity(&vs_core::RetryPolicy::default(), || {
                let tracker = deps.tracker.clone();
                let project = cursor.project.clone();
                let draft = draft.clone();
                async move { tracker.create_issue(&project, draft).await }
            })
            .await
            {
                Ok(created) => {
                    deps.store
                        .upsert(
                            created.id.clone(),
                            cursor.project.clone(),
                            issue.title.clone(),
                            SyncStateUpdate {
                                title: Some(issue.title.clone()),
                                description: issue.description.clone(),
                                status: Some(tracker_status.to_string()),
                                tracker_id: Some(created.id.to_string()),
                                tracker_modified_at: Some(created.modified_at),
                                tracker_status: Some(tracker_status.to_string()),
                                repo_log_id: Some(issue.id.clone()),
                                repo_log_modified_at: Some(issue.modified_at),
                                repo_log_status: Some(issue.status.clone()),
                                ..Default::default()
                            },
                        )
                        .map_err(|e| ActivityError::Transient(anyhow::anyhow!(e)))?;
                    cursor.accumulated.phase3b_created += 1;
                }
                Err(err) => {
                    tracing::warn!(issue = %issue.id, error = %err, "phase3b create failed");
                    cursor.accumulated.errors += 1;
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(PHASE3B_CREATE_SLEEP_MS)).await;
        }
    }
    Ok(())
}

/// phase3c: RepoLog -> Docs peer, batch-creating missing peer tasks. One
/// `tracker:` label carries one peer task; an issue labelled more than
/// once fans out to one `upsert_task` per label (see `run_phase3b`'s doc
/// comment and DESIGN.md).
async fn run_phase3c(cursor: &mut ProjectSyncCursor, deps: &ProjectSyncDeps) -> Result<(), ActivityError> {
    let repo_path = cursor.repo_path.clone().expect("checked by caller");
    let items = run_activity(&vs_core::RetryPolicy::default(), || {
        let repo_log = deps.repo_log.clone();
        let repo_path = repo_path.clone();
        async move { repo_log.list_issues(&repo_path).await }
    })
    .await?;
    let peer = run_activity(&vs_core::RetryPolicy::default(), || {
        let docs = deps.docs.clone();
        let project = cursor.project.as_str().to_string();
        async move { docs.ensure_project_peer(&project).await }
    })
    .await?;

    for issue in &items {
        for canonical in vs_core::extract_tracker_labels(&issue.labels) {
            let row = deps.store.get_state(&canonical);
            if row.as_ref().and_then(|r| r.docs_id.clone()).is_some() {
                continue;
            }

            match run_activity(&vs_core::RetryPolicy::default(), || {
                let docs = deps.docs.clone();
                let peer = peer.clone();
                let upsert = DocsTaskUpsert {
                    id: None,
                    title: issue.title.clone(),
                    description: issue.description.clone(),
                    status: None,
                };
                async move { docs.upsert_task(&peer, upsert).await }
            })
            .await
            {
                Ok(task) => {
                    deps.store
                        .upsert(
                            canonical.clone(),
                            cursor.project.clone(),
                            issue.title.clone(),
                            SyncStateUpdate { docs_id: Some(task.id), docs_modified_at: Some(task.modified_at), ..Default::default() },
                        )
                        .map_err(|e| ActivityError::Transient(anyhow::anyhow!(e)))?;
                    cursor.accumulated.phase3c_created += 1;
                }
                Err(err) => {
                    tracing::warn!(issue = %issue.id, error = %err, "phase3c create failed");
                    cursor.accumulated.errors += 1;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "project_sync_tests.rs"]
mod tests;
