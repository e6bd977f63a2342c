// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Bidirectional Sync Engine (C4, §4.3): the single-item state machine
//! every other component (C5 ingesters, C6 pipeline) drives. Given a
//! change from one source system, detects conflict via stored + live
//! timestamps, selects a winner, propagates to the other two systems, and
//! persists the new SyncState row.
//!
//! Callers are expected to have already translated `item.status` into
//! Tracker's canonical vocabulary via the mapper (C1) — and, where §4.1's
//! rank guard applies, to have checked it — before calling [`SyncEngine::sync_one`].
//! This mirrors the source ingesters' own sequencing ("extract label...
//! apply the rank guard... propagate via the single-item engine", §4.4):
//! status translation is the caller's job, conflict/propagation/persistence
//! is this engine's.

use std::path::PathBuf;
use std::sync::Arc;

use vs_adapters::{DocsAdapter, DocsTaskUpsert, IssueUpdate, RepoLogAdapter, RepoLogUpsert, TrackerAdapter};
use vs_core::{
    parse_tracker_reference, ActivityError, CanonicalId, DocsStatus, MirrorIds, ProjectCode,
    RetryPolicy, SourceSystem, WorkItem,
};
use vs_store::{Store, SyncStateUpdate};

use crate::conflict::{decide, fast_path_source_wins, ConflictDecision};
use crate::runtime::run_activity;

/// Context a single-item sync is invoked with (§4.3 `BidirectionalSyncInput.context`).
#[derive(Debug, Clone)]
pub struct SyncContext {
    pub project: ProjectCode,
    pub repo_path: Option<PathBuf>,
}

/// Input to [`SyncEngine::sync_one`] (§4.3 `BidirectionalSyncInput`).
#[derive(Debug, Clone)]
pub struct BidirectionalSyncInput {
    pub source: SourceSystem,
    pub item: WorkItem,
    pub context: SyncContext,
    pub linked_ids: MirrorIds,
}

/// Per-target propagation result (§4.3 step 5, §7 "Error semantics":
/// adapter failures are recorded per target and do not poison the
/// others). `None` means that target was not in scope for this source's
/// routing table; `Some(Err(_))` means the push was attempted and failed.
#[derive(Debug, Clone, Default)]
pub struct PropagationResult {
    pub tracker: Option<Result<(), String>>,
    pub repo_log: Option<Result<(), String>>,
    pub docs: Option<Result<(), String>>,
}

impl PropagationResult {
    pub fn error_count(&self) -> usize {
        [&self.tracker, &self.repo_log, &self.docs]
            .into_iter()
            .filter(|r| matches!(r, Some(Err(_))))
            .count()
    }
}

/// The outcome of a single-item sync (§4.3 state machine).
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// The conflict check found another system strictly newer; the
    /// incoming change was dropped (§4.3: "record winner, return success").
    Skipped { winner: SourceSystem, winner_timestamp: u64 },
    Synced { propagation: PropagationResult },
}

/// The Bidirectional Sync Engine (C4): an I/O shell around the pure
/// decision function in [`crate::conflict`].
pub struct SyncEngine {
    tracker: Arc<dyn TrackerAdapter>,
    repo_log: Arc<dyn RepoLogAdapter>,
    docs: Arc<dyn DocsAdapter>,
    store: Arc<Store>,
    retry_policy: RetryPolicy,
}

impl SyncEngine {
    pub fn new(
        tracker: Arc<dyn TrackerAdapter>,
        repo_log: Arc<dyn RepoLogAdapter>,
        docs: Arc<dyn DocsAdapter>,
        store: Arc<Store>,
    ) -> Self {
        Self { tracker, repo_log, docs, store, retry_policy: RetryPolicy::default() }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Run the full §4.3 state machine for one item.
    pub async fn sync_one(&self, input: BidirectionalSyncInput) -> Result<SyncOutcome, ActivityError> {
        let canonical_id = resolve_canonical_id(&input);
        let source_ts = source_timestamp(&input.item, input.source);

        // Step 1: short-circuit if nothing to contradict.
        if !has_counterpart(input.source, &input.linked_ids) {
            return self.propagate_and_persist(canonical_id, input).await;
        }

        // Step 2: fast path against stored timestamps.
        let stored = self.store.get_timestamps(&canonical_id);
        let other_stored: Vec<Option<u64>> = other_systems(input.source)
            .into_iter()
            .filter(|s| linked_id_for(*s, &input.linked_ids).is_some())
            .map(|s| stored.as_ref().and_then(|t| timestamp_for(s, t)))
            .collect();
        if fast_path_source_wins(source_ts, &other_stored) {
            return self.propagate_and_persist(canonical_id, input).await;
        }

        // Step 3: slow path — live probes of every non-source linked system.
        let mut live = Vec::new();
        for system in other_systems(input.source) {
            let Some(id) = linked_id_for(system, &input.linked_ids) else { continue };
            match self.fetch_live_timestamp(system, &id, &input.context).await {
                Ok(ts) => live.push((system, ts)),
                // "If any adapter errors, proceed as sourceWins" (§4.3 step 3,
                // §9 Design Notes: availability over strict correctness).
                Err(err) => {
                    tracing::warn!(?system, error = %err, "conflict probe failed, assuming source wins");
                    return self.propagate_and_persist(canonical_id, input).await;
                }
            }
        }

        // Step 4: decide.
        match decide(input.source, source_ts, &live) {
            ConflictDecision::SourceWins => self.propagate_and_persist(canonical_id, input).await,
            ConflictDecision::Conflict { winner, winner_timestamp } => {
                Ok(SyncOutcome::Skipped { winner, winner_timestamp })
            }
        }
    }

    async fn fetch_live_timestamp(
        &self,
        system: SourceSystem,
        id: &str,
        context: &SyncContext,
    ) -> Result<u64, ActivityError> {
        match system {
            SourceSystem::Tracker => {
                let canonical = CanonicalId::parse(id)
                    .map_err(|e| ActivityError::Validation(e.to_string()))?;
                run_activity(&self.retry_policy, || {
                    let tracker = self.tracker.clone();
                    let canonical = canonical.clone();
                    async move { tracker.get_issue(&canonical).await.map(|i| i.modified_at) }
                })
                .await
            }
            SourceSystem::RepoLog => {
                let repo_path = context
                    .repo_path
                    .clone()
                    .ok_or_else(|| ActivityError::NotFound("repoPath not set".into()))?;
                run_activity(&self.retry_policy, || {
                    let repo_log = self.repo_log.clone();
                    let repo_path = repo_path.clone();
                    let id = id.to_string();
                    async move { repo_log.get_issue(&id, &repo_path).await.map(|i| i.modified_at) }
                })
                .await
            }
            SourceSystem::Docs => {
                run_activity(&self.retry_policy, || {
                    let docs = self.docs.clone();
                    let id = id.to_string();
                    async move { docs.get_task(&id).await.map(|t| t.modified_at) }
                })
                .await
            }
        }
    }

    /// Steps 5-7: propagate to the routed targets, commit RepoLog if
    /// touched, and persist the new SyncState row.
    async fn propagate_and_persist(
        &self,
        canonical_id: CanonicalId,
        input: BidirectionalSyncInput,
    ) -> Result<SyncOutcome, ActivityError> {
        let BidirectionalSyncInput { source, item, context, linked_ids } = input;
        let mut propagation = PropagationResult::default();
        let mut repo_log_touched = false;

        match source {
            SourceSystem::Tracker => {
                propagation.docs = Some(self.push_to_docs(&linked_ids, &item, &context).await);
                if context.repo_path.is_some() {
                    let result = self.push_to_repo_log(&linked_ids, &item, &context).await;
                    repo_log_touched = result.is_ok();
                    propagation.repo_log = Some(result);
                }
            }
            SourceSystem::RepoLog => {
                if linked_ids.tracker_id.is_some() {
                    propagation.tracker = Some(self.push_to_tracker(&linked_ids, &item).await);
                }
                if linked_ids.docs_task_id.is_some() {
                    propagation.docs = Some(self.push_to_docs(&linked_ids, &item, &context).await);
                }
            }
            SourceSystem::Docs => {
                if linked_ids.tracker_id.is_some() {
                    propagation.tracker = Some(self.push_to_tracker(&linked_ids, &item).await);
                }
                if context.repo_path.is_some() {
                    let result = self.push_to_repo_log(&linked_ids, &item, &context).await;
                    repo_log_touched = result.is_ok();
                    propagation.repo_log = Some(result);
                }
            }
        }

        if repo_log_touched {
            if let Some(repo_path) = context.repo_path.clone() {
                let message = format!("Sync from {source}: {}", item.title);
                let commit = run_activity(&self.retry_policy, || {
                    let repo_log = self.repo_log.clone();
                    let repo_path = repo_path.clone();
                    let message = message.clone();
                    async move { repo_log.commit(&repo_path, &message).await }
                })
                .await;
                // §7: commit failure is logged but does not undo in-system writes.
                if let Err(err) = commit {
                    tracing::warn!(error = %err, "RepoLog commit failed after sync");
                }
            }
        }

        let persistence_id = resolve_persistence_id(source, &item, &linked_ids).unwrap_or(canonical_id);
        let update = build_update(source, &item, &linked_ids);
        self.store
            .upsert(persistence_id, context.project, item.title.clone(), update)
            .map_err(|e| ActivityError::Transient(anyhow::anyhow!(e)))?;

        Ok(SyncOutcome::Synced { propagation })
    }

    async fn push_to_tracker(&self, linked_ids: &MirrorIds, item: &WorkItem) -> Result<(), String> {
        let Some(tracker_id) = &linked_ids.tracker_id else {
            return Err("no linked tracker id".to_string());
        };
        let id = CanonicalId::parse(tracker_id).map_err(|e| e.to_string())?;
        run_activity(&self.retry_policy, || {
            let tracker = self.tracker.clone();
            let id = id.clone();
            let update = IssueUpdate {
                title: Some(item.title.clone()),
                description: item.description.clone(),
                status: Some(item.status.clone()),
                priority: Some(item.priority),
                parent: item.parent.clone(),
            };
            async move { tracker.update_issue(&id, update).await }
        })
        .await
        .map(|_| ())
        .map_err(|e| e.to_string())
    }

    async fn push_to_repo_log(
        &self,
        linked_ids: &MirrorIds,
        item: &WorkItem,
        context: &SyncContext,
    ) -> Result<(), String> {
        let Some(repo_path) = context.repo_path.clone() else {
            return Err("no repoPath".to_string());
        };
        let (status, label) = vs_core::tracker_to_repolog(
            &vs_core::TrackerStatus::parse(&item.status).unwrap_or(vs_core::TrackerStatus::Backlog),
        );
        let mut labels = std::collections::HashSet::new();
        if let Some(label) = label {
            labels.insert(label.to_string());
        }
        run_activity(&self.retry_policy, || {
            let repo_log = self.repo_log.clone();
            let repo_path = repo_path.clone();
            let upsert = RepoLogUpsert {
                id: linked_ids.repo_log_id.clone(),
                title: item.title.clone(),
                description: item.description.clone(),
                status: Some(status.to_string()),
                labels: labels.clone(),
                parent_repo_log_id: None,
            };
            async move { repo_log.upsert(&repo_path, upsert).await }
        })
        .await
        .map(|_| ())
        .map_err(|e| e.to_string())
    }

    async fn push_to_docs(
        &self,
        linked_ids: &MirrorIds,
        item: &WorkItem,
        context: &SyncContext,
    ) -> Result<(), String> {
        let peer = run_activity(&self.retry_policy, || {
            let docs = self.docs.clone();
            let project = context.project.as_str().to_string();
            async move { docs.ensure_project_peer(&project).await }
        })
        .await
        .map_err(|e| e.to_string())?;

        let status = DocsStatus::from_tracker_form(&item.status).as_wire_str().to_string();
        run_activity(&self.retry_policy, || {
            let docs = self.docs.clone();
            let peer = peer.clone();
            let upsert = DocsTaskUpsert {
                id: linked_ids.docs_task_id.clone(),
                title: item.title.clone(),
                description: item.description.clone(),
                status: Some(status.clone()),
            };
            async move { docs.upsert_task(&peer, upsert).await }
        })
        .await
        .map(|_| ())
        .map_err(|e| e.to_string())
    }
}

/// `canonicalId := linkedIds.trackerId || item.id` (§4.3 step 2).
fn resolve_canonical_id(input: &BidirectionalSyncInput) -> CanonicalId {
    input
        .linked_ids
        .tracker_id
        .as_deref()
        .and_then(|s| CanonicalId::parse(s).ok())
        .unwrap_or_else(|| input.item.id.clone())
}

/// §4.3 step 7's fallback chain, minus "the sync result's Tracker id" —
/// that tier only applies when propagation itself creates a Tracker issue,
/// which never happens in the single-item engine (Tracker is only ever
/// updated, never created, by [`SyncEngine::push_to_tracker`]; issue
/// creation is the Project-Sync Pipeline's job, C6 phase3b). Decision
/// recorded in DESIGN.md.
fn resolve_persistence_id(
    source: SourceSystem,
    item: &WorkItem,
    linked_ids: &MirrorIds,
) -> Option<CanonicalId> {
    match source {
        SourceSystem::Tracker => Some(item.id.clone()),
        _ => linked_ids
            .tracker_id
            .as_deref()
            .and_then(|s| CanonicalId::parse(s).ok())
            .or_else(|| {
                item.description
                    .as_deref()
                    .and_then(parse_tracker_reference)
                    .and_then(|s| CanonicalId::parse(&s).ok())
            }),
    }
}

fn build_update(source: SourceSystem, item: &WorkItem, linked_ids: &MirrorIds) -> SyncStateUpdate {
    let mut update = SyncStateUpdate {
        title: Some(item.title.clone()),
        description: item.description.clone(),
        status: Some(item.status.clone()),
        priority: Some(item.priority.to_string()),
        parent_canonical: item.parent.clone(),
        tracker_id: linked_ids.tracker_id.clone(),
        repo_log_id: linked_ids.repo_log_id.clone(),
        docs_id: linked_ids.docs_task_id.clone(),
        ..Default::default()
    };
    let ts = source_timestamp(item, source);
    match source {
        SourceSystem::Tracker => {
            update.tracker_modified_at = Some(ts);
            update.tracker_status = Some(item.status.clone());
            if update.tracker_id.is_none() {
                update.tracker_id = Some(item.id.to_string());
            }
        }
        SourceSystem::RepoLog => {
            update.repo_log_modified_at = Some(ts);
            update.repo_log_status = Some(item.status.clone());
        }
        SourceSystem::Docs => {
            update.docs_modified_at = Some(ts);
            update.docs_status = Some(item.status.clone());
        }
    }
    update
}

fn source_timestamp(item: &WorkItem, source: SourceSystem) -> u64 {
    match source {
        SourceSystem::Tracker => item.timestamps.tracker_modified_at,
        SourceSystem::RepoLog => item.timestamps.repo_log_modified_at,
        SourceSystem::Docs => item.timestamps.docs_modified_at,
    }
    .unwrap_or(0)
}

fn has_counterpart(source: SourceSystem, linked_ids: &MirrorIds) -> bool {
    other_systems(source).into_iter().any(|s| linked_id_for(s, linked_ids).is_some())
}

fn other_systems(source: SourceSystem) -> Vec<SourceSystem> {
    [SourceSystem::Tracker, SourceSystem::RepoLog, SourceSystem::Docs]
        .into_iter()
        .filter(|s| *s != source)
        .collect()
}

fn linked_id_for(system: SourceSystem, linked_ids: &MirrorIds) -> Option<String> {
    match system {
        SourceSystem::Tracker => linked_ids.tracker_id.clone(),
        SourceSystem::RepoLog => linked_ids.repo_log_id.clone(),
        SourceSystem::Docs => linked_ids.docs_task_id.clone(),
    }
}

fn timestamp_for(system: SourceSystem, timestamps: &vs_store::SystemTimestamps) -> Option<u64> {
    match system {
        SourceSystem::Tracker => timestamps.tracker,
        SourceSystem::RepoLog => timestamps.repo_log,
        SourceSystem::Docs => timestamps.docs,
    }
}

#[cfg(test)]
#[path = "sync_engine_tests.rs"]
mod tests;
