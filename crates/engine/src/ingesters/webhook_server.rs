// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP front end for the Tracker Webhook ingester (§4.4, §6): an `axum`
//! route that decodes the wire payload's duck-typed `{class, data}` shape
//! into [`vs_core::Change`]'s tagged variant before handing off to
//! [`super::ingest_webhook`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use vs_adapters::RepoLogAdapter;
use vs_core::{Change, IssueChange};

use crate::runtime::CancelSignal;
use crate::sync_engine::SyncEngine;

use super::{ingest_webhook, WebhookEvent, WebhookIngestOutcome};

/// Wire shape of one entry in a webhook batch: `class` names the kind of
/// change and `identifier` (when present) lives nested under `data`,
/// neither of which lines up with [`Change`]'s `kind`-tagged, top-level
/// `identifier` shape — this is the translation boundary §9 Design Notes
/// calls for instead of deriving `Deserialize` directly on `Change`.
#[derive(Debug, Deserialize)]
struct RawChange {
    id: String,
    class: String,
    #[serde(rename = "modifiedOn", default)]
    modified_on: Option<u64>,
    #[serde(default)]
    data: Value,
}

impl RawChange {
    fn into_change(self) -> Change {
        if self.class != "issue" {
            return Change::Other;
        }
        let identifier = self.data.get("identifier").and_then(Value::as_str).map(String::from);
        Change::Issue(IssueChange { id: self.id, identifier, modified_on: self.modified_on, data: self.data })
    }
}

#[derive(Debug, Deserialize)]
struct RawWebhookPayload {
    changes: Vec<RawChange>,
    timestamp: u64,
}

#[derive(Clone)]
pub struct WebhookState {
    pub engine: Arc<SyncEngine>,
    pub repo_log: Arc<dyn RepoLogAdapter>,
    pub cancel: CancelSignal,
}

pub fn webhook_router(state: WebhookState) -> Router {
    Router::new().route("/webhooks/tracker", post(handle_webhook)).with_state(state)
}

async fn handle_webhook(
    State(state): State<WebhookState>,
    Json(payload): Json<RawWebhookPayload>,
) -> (StatusCode, Json<WebhookIngestOutcome>) {
    let event = WebhookEvent {
        changes: payload.changes.into_iter().map(RawChange::into_change).collect(),
        timestamp: payload.timestamp,
    };
    match ingest_webhook(state.engine.clone(), &state.repo_log, event, &state.cancel).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)),
        Err(err) => {
            tracing::warn!(error = %err, "webhook ingest failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(WebhookIngestOutcome::default()))
        }
    }
}

/// Bind and serve the webhook route until the process is torn down.
pub async fn serve_webhook(addr: SocketAddr, state: WebhookState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "webhook ingester listening");
    axum::serve(listener, webhook_router(state)).await
}

#[cfg(test)]
#[path = "webhook_server_tests.rs"]
mod tests;
