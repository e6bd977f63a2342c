// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SSE client front end for the Docs-like ingester (§4.4, §6): consumes a
//! `text/event-stream` of Docs change notifications and feeds each one to
//! [`super::ingest_docs_sse`].

use std::sync::Arc;

use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use serde::Deserialize;
use vs_adapters::DocsAdapter;
use vs_core::ProjectCode;

use crate::runtime::CancelSignal;
use crate::sync_engine::SyncEngine;

use super::{ingest_docs_sse, DocsSseEvent};

/// Wire shape of one SSE message's `data` field (§6).
#[derive(Debug, Deserialize)]
struct RawDocsSseEvent {
    #[serde(rename = "vibeProjectId")]
    vibe_project_id: String,
    #[serde(rename = "trackerProject")]
    tracker_project: Option<String>,
    #[serde(rename = "changedTaskIds")]
    changed_task_ids: Vec<String>,
    timestamp: u64,
}

impl RawDocsSseEvent {
    fn into_event(self) -> DocsSseEvent {
        DocsSseEvent {
            vibe_project_id: self.vibe_project_id,
            tracker_project: self.tracker_project.and_then(|p| ProjectCode::new(p).ok()),
            changed_task_ids: self.changed_task_ids,
            timestamp: self.timestamp,
        }
    }
}

/// Run the SSE feed until `cancel` fires or the stream ends permanently.
/// `reqwest_eventsource` retries the connection itself on a dropped
/// stream; a message that doesn't parse as [`RawDocsSseEvent`] is logged
/// and skipped rather than tearing down the connection.
pub async fn run_docs_sse_feed(
    url: &str,
    engine: Arc<SyncEngine>,
    docs: &Arc<dyn DocsAdapter>,
    cancel: &CancelSignal,
) {
    let request = reqwest::Client::new().get(url);
    let mut source = match EventSource::new(request) {
        Ok(source) => source,
        Err(err) => {
            tracing::warn!(url, error = %err, "docs SSE feed: failed to open connection");
            return;
        }
    };

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            next = source.next() => next,
        };
        let Some(event) = next else { break };

        match event {
            Ok(Event::Open) => {}
            Ok(Event::Message(message)) => {
                let raw: RawDocsSseEvent = match serde_json::from_str(&message.data) {
                    Ok(raw) => raw,
                    Err(err) => {
                        tracing::warn!(error = %err, "docs SSE feed: unparseable message, skipping");
                        continue;
                    }
                };
                let outcome = ingest_docs_sse(engine.clone(), docs, raw.into_event(), cancel).await;
                if let Err(err) = outcome {
                    tracing::warn!(error = %err, "docs SSE feed: ingest failed");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "docs SSE feed: stream error");
            }
        }
    }

    source.close();
}

#[cfg(test)]
#[path = "docs_sse_feed_tests.rs"]
mod tests;
