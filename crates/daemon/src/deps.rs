// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the dependency bundles C7/C8 need out of the daemon's store and
//! adapters. Concrete Tracker/RepoLog/Docs integrations are collaborators
//! outside this repository's scope (§1); the daemon wires the in-memory
//! `Fake*` adapters from vs-adapters so every operation is exercisable
//! end-to-end without a real external system.

use std::sync::Arc;

use vs_adapters::{FakeDocsAdapter, FakeMemorySinkAdapter, FakeRepoLogAdapter, FakeTrackerAdapter};
use vs_engine::{OrchestratorDeps, ReconcilerDeps};
use vs_store::Store;

/// The daemon's fixed set of collaborators, built once at startup and
/// shared (via `Arc`) across every run.
pub struct Collaborators {
    pub tracker: Arc<FakeTrackerAdapter>,
    pub repo_log: Arc<FakeRepoLogAdapter>,
    pub docs: Arc<FakeDocsAdapter>,
    pub metrics_sink: Arc<FakeMemorySinkAdapter>,
    pub store: Arc<Store>,
}

impl Collaborators {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            tracker: Arc::new(FakeTrackerAdapter::new()),
            repo_log: Arc::new(FakeRepoLogAdapter::new()),
            docs: Arc::new(FakeDocsAdapter::new()),
            metrics_sink: Arc::new(FakeMemorySinkAdapter::new()),
            store,
        }
    }

    pub fn orchestrator_deps(&self) -> OrchestratorDeps {
        OrchestratorDeps {
            tracker: self.tracker.clone(),
            repo_log: self.repo_log.clone(),
            docs: self.docs.clone(),
            store: self.store.clone(),
            metrics_sink: Some(self.metrics_sink.clone()),
        }
    }

    pub fn reconciler_deps(&self) -> ReconcilerDeps {
        ReconcilerDeps { repo_log: self.repo_log.clone(), store: self.store.clone() }
    }
}
