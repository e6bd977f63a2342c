use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::tempdir;
use vs_adapters::fakes::{FakeDocsAdapter, FakeRepoLogAdapter, FakeTrackerAdapter};
use vs_core::CanonicalId;
use vs_store::Store;

use super::*;
use crate::sync_engine::SyncEngine;

#[tokio::test]
async fn posted_webhook_batch_drives_a_sync() {
    let tracker = Arc::new(FakeTrackerAdapter::new());
    let repo_log = Arc::new(FakeRepoLogAdapter::new());
    let docs = Arc::new(FakeDocsAdapter::new());
    let dir = tempdir().unwrap();
    let store = Arc::new(Store::open(&dir.path().join("wal.log"), &dir.path().join("snapshot")).unwrap());
    let engine = Arc::new(SyncEngine::new(tracker, repo_log.clone(), docs, store.clone()));
    let repo_log_dyn: Arc<dyn vs_adapters::RepoLogAdapter> = repo_log;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state =
        WebhookState { engine, repo_log: repo_log_dyn, cancel: CancelSignal::new() };
    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, webhook_router(state)).await;
    });

    let body = json!({
        "changes": [{
            "id": "ACME-11",
            "class": "issue",
            "modifiedOn": 42,
            "data": { "identifier": "ACME-11", "title": "Fix login bug", "status": "Todo" },
        }],
        "timestamp": 42,
    });
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/webhooks/tracker"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let outcome: WebhookIngestOutcome = response.json().await.unwrap();
    assert_eq!(outcome.synced + outcome.skipped, 1);

    server.abort();

    let id = CanonicalId::parse("ACME-11").unwrap();
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            if store.get_state(&id).is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("sync should have written SyncState for ACME-11");
}
