// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event Ingesters (C5, §4.4): three independent pipelines that turn a raw
//! external notification into a de-duplicated set of single-item sync
//! invocations. Each one is a thin loop over the Durable Runtime Core's
//! child-workflow spawner (§4.0) driving [`crate::sync_engine::SyncEngine`].

mod docs_sse;
mod docs_sse_feed;
mod repo_log_watch;
mod repo_log_watcher;
mod webhook;
mod webhook_server;

pub use docs_sse::{ingest_docs_sse, DocsSseEvent, DocsSseOutcome};
pub use docs_sse_feed::run_docs_sse_feed;
pub use repo_log_watch::watch_repo_log;
pub use repo_log_watcher::{ingest_repo_log_changes, RepoLogChangeEvent, RepoLogIngestOutcome};
pub use webhook::{ingest_webhook, WebhookEvent, WebhookIngestOutcome};
pub use webhook_server::{serve_webhook, webhook_router, WebhookState};

/// Pacing between items, per §5 "Suspension points".
pub(crate) const REPO_LOG_ITEM_SLEEP_MS: u64 = 200;
pub(crate) const DOCS_SSE_ITEM_SLEEP_MS: u64 = 200;
pub(crate) const WEBHOOK_ITEM_SLEEP_MS: u64 = 500;
