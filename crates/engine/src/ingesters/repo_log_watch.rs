// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem front end for the RepoLog File Watcher (§4.4, §6): turns raw
//! `notify` events under a project's `repoPath` into the debounced
//! [`RepoLogChangeEvent`] batches [`super::ingest_repo_log_changes`] expects.

use std::path::PathBuf;
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use vs_core::{Clock, ProjectCode, SystemClock};

use super::RepoLogChangeEvent;

/// Coalescing window: a burst of filesystem events collapses into one
/// change batch rather than one per touched file.
const DEBOUNCE_MS: u64 = 250;

/// Watch `repo_path` for changes and deliver a coalesced
/// [`RepoLogChangeEvent`] on the returned receiver each time the tree
/// settles. The returned watcher must be kept alive for as long as the
/// receiver is read; dropping it stops delivery.
pub fn watch_repo_log(
    project: ProjectCode,
    repo_path: PathBuf,
) -> notify::Result<(RecommendedWatcher, mpsc::Receiver<RepoLogChangeEvent>)> {
    let (raw_tx, mut raw_rx) = mpsc::channel::<()>(1);

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let Ok(event) = res else { return };
        if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)) {
            let _ = raw_tx.blocking_send(());
        }
    })?;
    watcher.watch(&repo_path, RecursiveMode::Recursive)?;

    let (event_tx, event_rx) = mpsc::channel::<RepoLogChangeEvent>(8);
    let watched_path = repo_path.clone();
    tokio::spawn(async move {
        while raw_rx.recv().await.is_some() {
            tokio::time::sleep(Duration::from_millis(DEBOUNCE_MS)).await;
            while raw_rx.try_recv().is_ok() {}

            let batch = RepoLogChangeEvent {
                project: project.clone(),
                repo_path: watched_path.clone(),
                changed_files: Vec::new(),
                timestamp: SystemClock.epoch_ms(),
            };
            if event_tx.send(batch).await.is_err() {
                break;
            }
        }
    });

    Ok((watcher, event_rx))
}

#[cfg(test)]
#[path = "repo_log_watch_tests.rs"]
mod tests;
