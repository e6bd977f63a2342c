// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vs-engine: the orchestration layer — the durable runtime core (A1) every
//! workflow is built on, and the components that drive it (C4-C9).

pub mod runtime;

pub mod conflict;
pub mod docs_mirror;
pub mod ingesters;
pub mod orchestrator;
pub mod project_sync;
pub mod reconciler;
pub mod sync_engine;

pub use sync_engine::{BidirectionalSyncInput, PropagationResult, SyncContext, SyncEngine, SyncOutcome};
pub use docs_mirror::{
    DocsMirror, DocsMirrorConfig, ImportOutcome, ReconcileResult as DocsReconcileResult,
    ScanClassification, SkipReason as DocsSkipReason, DEFAULT_ECHO_LOOP_WINDOW_MS,
};
pub use ingesters::{
    ingest_docs_sse, ingest_repo_log_changes, ingest_webhook, run_docs_sse_feed, serve_webhook,
    watch_repo_log, webhook_router, DocsSseEvent, DocsSseOutcome, RepoLogChangeEvent,
    RepoLogIngestOutcome, WebhookEvent, WebhookIngestOutcome, WebhookState,
};
pub use orchestrator::{
    run_orchestrator, run_orchestrator_from, run_scheduled as run_orchestrator_scheduled,
    OrchestratorCursor, OrchestratorDeps, OrchestratorProgress, OrchestratorResult,
    ProjectRunOutcome, CIRCUIT_BREAKER_THRESHOLD, MAX_PROJECTS_PER_CONTINUATION, PROJECT_SLEEP_MS,
};
pub use project_sync::{
    run_project_sync, run_project_sync_from, Phase, ProjectSyncCursor, ProjectSyncDeps,
    ProjectSyncResult, CONTINUATION_CAP, DEFAULT_BATCH_SIZE, WEBHOOK_MIN_BATCH_SIZE,
};
pub use reconciler::{
    run_reconciler, run_reconciler_over_projects, run_scheduled as run_reconciler_scheduled,
    ReconcileAction, ReconcilerDeps, ReconcilerInput, ReconcilerResult,
};
