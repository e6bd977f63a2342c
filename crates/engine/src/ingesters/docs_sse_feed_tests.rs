use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event as SseEvent, Sse};
use axum::routing::get;
use axum::Router;
use futures::stream;
use tempfile::tempdir;
use vs_adapters::fakes::{FakeDocsAdapter, FakeRepoLogAdapter, FakeTrackerAdapter};
use vs_adapters::DocsTask;
use vs_core::CanonicalId;
use vs_store::Store;

use super::*;
use crate::sync_engine::SyncEngine;

async fn one_event_feed() -> Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>> {
    let payload = serde_json::json!({
        "vibeProjectId": "vibe-1",
        "trackerProject": "ACME",
        "changedTaskIds": ["task-1"],
        "timestamp": 500,
    })
    .to_string();
    Sse::new(stream::iter(vec![Ok(SseEvent::default().data(payload))]))
}

#[tokio::test]
async fn feed_ingests_one_message_from_a_live_sse_endpoint() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/events", get(one_event_feed));
    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let tracker = Arc::new(FakeTrackerAdapter::new());
    let repo_log = Arc::new(FakeRepoLogAdapter::new());
    let docs = Arc::new(FakeDocsAdapter::new());
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
    let dir = tempdir().unwrap();
    let store = Arc::new(Store::open(&dir.path().join("wal.log"), &dir.path().join("snapshot")).unwrap());
    let engine = Arc::new(SyncEngine::new(tracker, repo_log, docs.clone(), store.clone()));
    let docs_dyn: Arc<dyn vs_adapters::DocsAdapter> = docs;

    let cancel = CancelSignal::new();
    let url = format!("http://{addr}/events");
    let feed_cancel = cancel.clone();
    let feed = tokio::spawn(async move {
        run_docs_sse_feed(&url, engine, &docs_dyn, &feed_cancel).await;
    });

    let id = CanonicalId::parse("ACME-9").unwrap();
    for _ in 0..50 {
        if store.get_state(&id).is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), feed).await.unwrap().unwrap();
    server.abort();

    let row = store.get_state(&id).expect("the SSE message should have driven a sync");
    assert_eq!(row.docs_id.as_deref(), Some("task-1"));
}
