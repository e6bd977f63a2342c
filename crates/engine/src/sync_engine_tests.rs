// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::tempdir;
use vs_adapters::fakes::{FakeDocsAdapter, FakeRepoLogAdapter, FakeTrackerAdapter};
use vs_adapters::{RepoLogIssue, TrackerIssue};
use vs_core::{ActivityError, CanonicalId, MirrorIds, Priority, ProjectCode, SourceSystem, WorkItem};
use vs_store::Store;

use super::{BidirectionalSyncInput, SyncContext, SyncEngine, SyncOutcome};

fn open_store() -> (Arc<Store>, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let store = Store::open(&dir.path().join("wal.log"), &dir.path().join("snapshot")).unwrap();
    (Arc::new(store), dir)
}

fn engine(
    tracker: Arc<FakeTrackerAdapter>,
    repo_log: Arc<FakeRepoLogAdapter>,
    docs: Arc<FakeDocsAdapter>,
    store: Arc<Store>,
) -> SyncEngine {
    SyncEngine::new(tracker, repo_log, docs, store)
}

fn acme() -> ProjectCode {
    ProjectCode::new("ACME").unwrap()
}

#[tokio::test]
async fn tracker_source_with_no_counterpart_propagates_without_probing() {
    let tracker = Arc::new(FakeTrackerAdapter::new());
    let repo_log = Arc::new(FakeRepoLogAdapter::new());
    let docs = Arc::new(FakeDocsAdapter::new());
    let (store, _dir) = open_store();
    let engine = engine(tracker, repo_log, docs.clone(), store.clone());

    let id = CanonicalId::new(&acme(), 1);
    let mut item = WorkItem::new(id.clone(), "Fix login bug", "Todo");
    item.timestamps.tracker_modified_at = Some(100_000);

    let input = BidirectionalSyncInput {
        source: SourceSystem::Tracker,
        item,
        context: SyncContext { project: acme(), repo_path: None },
        linked_ids: MirrorIds::default(),
    };

    let outcome = engine.sync_one(input).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Synced { .. }));

    let row = store.get_state(&id).unwrap();
    assert_eq!(row.status, "Todo");
    assert_eq!(row.tracker_modified_at, Some(100_000));
    // Always pushed to Docs per the Tracker routing rule.
    assert!(docs.tasks.lock().values().any(|t| t.title == "Fix login bug"));
}

#[tokio::test]
async fn fast_path_skips_live_probe_when_other_stored_timestamp_is_old_enough() {
    let tracker = Arc::new(FakeTrackerAdapter::new());
    let repo_log = Arc::new(FakeRepoLogAdapter::new());
    let docs = Arc::new(FakeDocsAdapter::new());
    let (store, _dir) = open_store();

    let id = CanonicalId::new(&acme(), 2);
    store
        .upsert(
            id.clone(),
            acme(),
            "Old title",
            vs_store::SyncStateUpdate {
                docs_id: Some("task-1".to_string()),
                docs_modified_at: Some(100_000),
                ..Default::default()
            },
        )
        .unwrap();

    // If the engine took the slow path it would call docs.get_task, which
    // is scripted to fail — proving the fast path really was taken.
    docs.fail_once("get_task", ActivityError::Transient(anyhow::anyhow!("should not be called")));

    let engine = engine(tracker, repo_log, docs, store.clone());
    let mut item = WorkItem::new(id.clone(), "New title", "InProgress");
    item.timestamps.tracker_modified_at = Some(101_500);

    let input = BidirectionalSyncInput {
        source: SourceSystem::Tracker,
        item,
        context: SyncContext { project: acme(), repo_path: None },
        linked_ids: MirrorIds { tracker_id: None, repo_log_id: None, docs_task_id: Some("task-1".to_string()) },
    };

    let outcome = engine.sync_one(input).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Synced { .. }));
    assert_eq!(store.get_state(&id).unwrap().title, "New title");
}

#[tokio::test]
async fn slow_path_conflict_drops_the_incoming_change() {
    let tracker = Arc::new(FakeTrackerAdapter::new());
    let repo_log = Arc::new(FakeRepoLogAdapter::new());
    let docs = Arc::new(FakeDocsAdapter::new());
    docs.seed_task(
        "peer-ACME",
        vs_adapters::DocsTask {
            id: "task-1".to_string(),
            title: "Docs-side edit".to_string(),
            description: None,
            status: "inprogress".to_string(),
            modified_at: 105_000,
        },
    );
    let (store, _dir) = open_store();

    // Stored docs timestamp is close enough that the fast path cannot
    // short-circuit, forcing a live probe.
    let id = CanonicalId::new(&acme(), 3);
    store
        .upsert(
            id.clone(),
            acme(),
            "Title",
            vs_store::SyncStateUpdate {
                docs_id: Some("task-1".to_string()),
                docs_modified_at: Some(100_600),
                ..Default::default()
            },
        )
        .unwrap();

    let engine = engine(tracker, repo_log, docs, store.clone());
    let mut item = WorkItem::new(id.clone(), "Tracker-side edit", "Todo");
    item.timestamps.tracker_modified_at = Some(100_500);

    let input = BidirectionalSyncInput {
        source: SourceSystem::Tracker,
        item,
        context: SyncContext { project: acme(), repo_path: None },
        linked_ids: MirrorIds { tracker_id: None, repo_log_id: None, docs_task_id: Some("task-1".to_string()) },
    };

    let outcome = engine.sync_one(input).await.unwrap();
    match outcome {
        SyncOutcome::Skipped { winner, winner_timestamp } => {
            assert_eq!(winner, SourceSystem::Docs);
            assert_eq!(winner_timestamp, 105_000);
        }
        SyncOutcome::Synced { .. } => panic!("expected a conflict"),
    }
    // Dropped: the stored row is untouched.
    assert_eq!(store.get_state(&id).unwrap().title, "Title");
}

#[tokio::test]
async fn adapter_error_during_live_probe_treats_source_as_winner() {
    let tracker = Arc::new(FakeTrackerAdapter::new());
    let repo_log = Arc::new(FakeRepoLogAdapter::new());
    let docs = Arc::new(FakeDocsAdapter::new());
    // Every attempt fails, so run_activity exhausts retries and the engine
    // falls back to sourceWins rather than blocking sync forever.
    for _ in 0..5 {
        docs.fail_once("get_task", ActivityError::Transient(anyhow::anyhow!("boom")));
    }
    let (store, _dir) = open_store();

    let id = CanonicalId::new(&acme(), 4);
    store
        .upsert(
            id.clone(),
            acme(),
            "Title",
            vs_store::SyncStateUpdate {
                docs_id: Some("task-1".to_string()),
                docs_modified_at: Some(100_600),
                ..Default::default()
            },
        )
        .unwrap();

    let engine = engine(tracker, repo_log, docs, store.clone())
        .with_retry_policy(vs_core::RetryPolicy {
            initial_interval: std::time::Duration::from_millis(1),
            backoff_coefficient: 1.0,
            max_interval: std::time::Duration::from_millis(1),
            max_attempts: 2,
        });
    let mut item = WorkItem::new(id.clone(), "Tracker-side edit", "Todo");
    item.timestamps.tracker_modified_at = Some(100_500);

    let input = BidirectionalSyncInput {
        source: SourceSystem::Tracker,
        item,
        context: SyncContext { project: acme(), repo_path: None },
        linked_ids: MirrorIds { tracker_id: None, repo_log_id: None, docs_task_id: Some("task-1".to_string()) },
    };

    let outcome = engine.sync_one(input).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Synced { .. }));
}

#[tokio::test]
async fn repo_log_source_pushes_to_tracker_without_committing_back_to_repo_log() {
    let tracker = Arc::new(FakeTrackerAdapter::new());
    let id = CanonicalId::new(&acme(), 5);
    tracker.seed_issue(TrackerIssue {
        id: id.clone(),
        title: "Old".to_string(),
        description: None,
        status: "Todo".to_string(),
        priority: Priority::Medium,
        parent: None,
        modified_at: 0,
    });
    let repo_log = Arc::new(FakeRepoLogAdapter::new());
    let repo_path = PathBuf::from("/repos/acme");
    repo_log.seed_issue(
        &repo_path,
        RepoLogIssue {
            id: "42".to_string(),
            title: "From RepoLog".to_string(),
            description: None,
            status: "in_progress".to_string(),
            labels: Default::default(),
            modified_at: 200_000,
            parent_repo_log_id: None,
        },
    );
    let docs = Arc::new(FakeDocsAdapter::new());
    let (store, _dir) = open_store();

    let engine = engine(tracker.clone(), repo_log.clone(), docs, store.clone());
    let mut item = WorkItem::new(id.clone(), "From RepoLog", "InProgress");
    item.timestamps.repo_log_modified_at = Some(200_000);

    let input = BidirectionalSyncInput {
        source: SourceSystem::RepoLog,
        item,
        context: SyncContext { project: acme(), repo_path: Some(repo_path.clone()) },
        linked_ids: MirrorIds {
            tracker_id: Some(id.to_string()),
            repo_log_id: Some("42".to_string()),
            docs_task_id: None,
        },
    };

    let outcome = engine.sync_one(input).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Synced { .. }));
    assert_eq!(tracker.issues.lock().get(&id).unwrap().title, "From RepoLog");
    // RepoLog is the source, not a propagation target — nothing is written
    // back to it, so no commit happens.
    assert!(repo_log.commits.lock().is_empty());
}

#[tokio::test]
async fn docs_source_with_no_repo_path_does_not_push_to_repo_log() {
    let tracker = Arc::new(FakeTrackerAdapter::new());
    let id = CanonicalId::new(&acme(), 6);
    tracker.seed_issue(TrackerIssue {
        id: id.clone(),
        title: "Old".to_string(),
        description: None,
        status: "Todo".to_string(),
        priority: Priority::Medium,
        parent: None,
        modified_at: 0,
    });
    let repo_log = Arc::new(FakeRepoLogAdapter::new());
    let docs = Arc::new(FakeDocsAdapter::new());
    let (store, _dir) = open_store();

    let engine = engine(tracker.clone(), repo_log.clone(), docs, store.clone());
    let mut item = WorkItem::new(id.clone(), "From Docs", "Done");
    item.timestamps.docs_modified_at = Some(300_000);

    let input = BidirectionalSyncInput {
        source: SourceSystem::Docs,
        item,
        context: SyncContext { project: acme(), repo_path: None },
        linked_ids: MirrorIds {
            tracker_id: Some(id.to_string()),
            repo_log_id: None,
            docs_task_id: Some("task-9".to_string()),
        },
    };

    let outcome = engine.sync_one(input).await.unwrap();
    match outcome {
        SyncOutcome::Synced { propagation } => {
            assert!(propagation.tracker.unwrap().is_ok());
            assert!(propagation.repo_log.is_none());
        }
        SyncOutcome::Skipped { .. } => panic!("expected source to win"),
    }
    assert!(repo_log.commits.lock().is_empty());
}

#[tokio::test]
async fn persistence_falls_back_to_description_marker_when_no_linked_tracker_id() {
    let tracker = Arc::new(FakeTrackerAdapter::new());
    let repo_log = Arc::new(FakeRepoLogAdapter::new());
    let docs = Arc::new(FakeDocsAdapter::new());
    let (store, _dir) = open_store();

    let engine = engine(tracker, repo_log.clone(), docs, store.clone());
    let mut item = WorkItem::new(
        CanonicalId::new(&acme(), 999),
        "Untracked item",
        "Backlog",
    );
    item.description = Some("See Tracker Issue: ACME-7 for history".to_string());
    item.timestamps.repo_log_modified_at = Some(50_000);

    let input = BidirectionalSyncInput {
        source: SourceSystem::RepoLog,
        item,
        context: SyncContext { project: acme(), repo_path: None },
        linked_ids: MirrorIds::default(),
    };

    engine.sync_one(input).await.unwrap();
    let persisted = store.get_state(&CanonicalId::new(&acme(), 7)).unwrap();
    assert_eq!(persisted.title, "Untracked item");
}
