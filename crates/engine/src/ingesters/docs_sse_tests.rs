use std::sync::Arc;

use tempfile::tempdir;
use vs_adapters::fakes::{FakeDocsAdapter, FakeRepoLogAdapter, FakeTrackerAdapter};
use vs_adapters::DocsTask;
use vs_core::ProjectCode;
use vs_store::Store;

use super::*;
use crate::sync_engine::SyncEngine;

fn acme() -> ProjectCode {
    ProjectCode::new("ACME").unwrap()
}

fn open_store() -> (Arc<Store>, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let store = Store::open(&dir.path().join("wal.log"), &dir.path().join("snapshot")).unwrap();
    (Arc::new(store), dir)
}

#[tokio::test]
async fn task_with_tracker_reference_syncs() {
    let tracker = Arc::new(FakeTrackerAdapter::new());
    let repo_log = Arc::new(FakeRepoLogAdapter::new());
    let docs = Arc::new(FakeDocsAdapter::new());
    let (store, _dir) = open_store();
    docs.seed_task(
        "peer-ACME",
        DocsTask {
            id: "task-1".into(),
            title: "Fix login bug".into(),
            description: Some("Tracker Issue: ACME-9".into()),
            status: "inprogress".into(),
            modified_at: 500,
        },
    );

    let engine = Arc::new(SyncEngine::new(tracker.clone(), repo_log, docs.clone(), store.clone()));
    let docs_dyn: Arc<dyn vs_adapters::DocsAdapter> = docs.clone();
    let event = DocsSseEvent {
        vibe_project_id: "vibe-1".into(),
        tracker_project: Some(acme()),
        changed_task_ids: vec!["task-1".into()],
        timestamp: 0,
    };

    let outcome = ingest_docs_sse(engine, &docs_dyn, event, &CancelSignal::new()).await.unwrap();
    assert_eq!(outcome.synced, 1);
    let id = vs_core::CanonicalId::parse("ACME-9").unwrap();
    let row = store.get_state(&id).unwrap();
    assert_eq!(row.docs_id.as_deref(), Some("task-1"));
}

#[tokio::test]
async fn task_without_tracker_reference_is_skipped() {
    let tracker = Arc::new(FakeTrackerAdapter::new());
    let repo_log = Arc::new(FakeRepoLogAdapter::new());
    let docs = Arc::new(FakeDocsAdapter::new());
    let (store, _dir) = open_store();
    docs.seed_task(
        "peer-ACME",
        DocsTask {
            id: "task-2".into(),
            title: "Untracked task".into(),
            description: None,
            status: "todo".into(),
            modified_at: 500,
        },
    );

    let engine = Arc::new(SyncEngine::new(tracker, repo_log, docs.clone(), store.clone()));
    let docs_dyn: Arc<dyn vs_adapters::DocsAdapter> = docs.clone();
    let event = DocsSseEvent {
        vibe_project_id: "vibe-1".into(),
        tracker_project: Some(acme()),
        changed_task_ids: vec!["task-2".into()],
        timestamp: 0,
    };

    let outcome = ingest_docs_sse(engine, &docs_dyn, event, &CancelSignal::new()).await.unwrap();
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.synced, 0);
}
