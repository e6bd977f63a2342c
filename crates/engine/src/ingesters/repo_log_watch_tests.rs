use std::time::Duration;

use tempfile::tempdir;
use vs_core::ProjectCode;

use super::*;

fn acme() -> ProjectCode {
    ProjectCode::new("ACME").unwrap()
}

#[tokio::test]
async fn file_write_under_watched_path_yields_a_change_event() {
    let dir = tempdir().unwrap();
    let (_watcher, mut events) = watch_repo_log(acme(), dir.path().to_path_buf()).unwrap();

    // Give the watcher's background thread time to register before we write.
    tokio::time::sleep(Duration::from_millis(100)).await;
    std::fs::write(dir.path().join("issue-1.md"), "status: open").unwrap();

    let batch = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("watcher should deliver a batch before the timeout")
        .expect("channel should not be closed");

    assert_eq!(batch.project, acme());
    assert_eq!(batch.repo_path, dir.path());
}

#[tokio::test]
async fn dropping_the_watcher_stops_delivery() {
    let dir = tempdir().unwrap();
    let (watcher, mut events) = watch_repo_log(acme(), dir.path().to_path_buf()).unwrap();
    drop(watcher);

    std::fs::write(dir.path().join("issue-1.md"), "status: open").unwrap();
    let result = tokio::time::timeout(Duration::from_millis(500), events.recv()).await;
    assert!(result.is_err(), "no batch should arrive once the watcher is dropped");
}
