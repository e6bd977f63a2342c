// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request dispatch: maps each [`vs_wire::Request`] onto the engine's
//! orchestrator/reconciler entry points and the run-state bookkeeping in
//! [`crate::run_state`].

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use vs_core::{Clock, RunId, SystemClock};
use vs_engine::{run_orchestrator, run_reconciler_over_projects, ReconcileAction};
use vs_wire::{ErrorKind, Query, Request, Response, RunKind, RunOutcome};

use crate::deps::Collaborators;
use crate::env::PROTOCOL_VERSION;
use crate::run_state::{RunState, ScheduledHandle};

/// Everything a single request handler needs.
pub struct DispatchCtx {
    pub collaborators: Arc<Collaborators>,
    pub run_state: Arc<RunState>,
    pub start_time: Instant,
}

pub async fn handle_request(request: Request, ctx: &DispatchCtx) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version } => {
            debug!(client_version = %version, "hello handshake");
            Response::Hello { version: PROTOCOL_VERSION.to_string() }
        }

        Request::SyncFull { project } => spawn_full_sync(ctx, project),

        Request::SyncReconcile { project, dry_run, hard_delete } => {
            spawn_reconcile(ctx, project, dry_run, hard_delete)
        }

        Request::ScheduledStart { interval_secs } => start_scheduled(ctx, interval_secs),
        Request::ScheduledStop => {
            ctx.run_state.stop_scheduled();
            Response::Ack
        }
        Request::ScheduledRestart { interval_secs } => {
            ctx.run_state.stop_scheduled();
            start_scheduled(ctx, interval_secs)
        }

        Request::Query(query) => handle_query(ctx, query),

        Request::Cancel { run_id } => {
            if ctx.run_state.cancel(&run_id) {
                Response::Ack
            } else {
                Response::Error { kind: ErrorKind::NotFound, message: format!("no in-flight run {run_id}") }
            }
        }

        Request::AgentsProvision { project } => {
            // Best-effort side channel (§1, §4.10): out of scope to actually
            // provision anything here, so this always acknowledges.
            info!(?project, "agents provision requested (no-op: out of scope)");
            Response::Ack
        }

        Request::Shutdown => Response::ShuttingDown,
    }
}

fn handle_query(ctx: &DispatchCtx, query: Query) -> Response {
    match query {
        Query::Progress => Response::Progress(ctx.run_state.progress_snapshot()),
        Query::ListRuns { filter } => Response::Runs { runs: ctx.run_state.list_runs(filter) },
        Query::ScheduledStatus => Response::ScheduledStatus(ctx.run_state.scheduled_status()),
        Query::DaemonStatus => Response::DaemonStatus {
            uptime_secs: ctx.start_time.elapsed().as_secs(),
            pid: std::process::id(),
            version: PROTOCOL_VERSION.to_string(),
        },
    }
}

fn spawn_full_sync(ctx: &DispatchCtx, project: Option<vs_core::ProjectCode>) -> Response {
    let run_id = RunId::new().to_string();
    let started_at_ms = SystemClock.epoch_ms();
    let cancel = ctx.run_state.begin_run(run_id.clone(), RunKind::Full, project.clone(), started_at_ms);

    let collaborators = ctx.collaborators.clone();
    let run_state = ctx.run_state.clone();
    let run_id_for_task = run_id.clone();
    tokio::spawn(async move {
        let deps = collaborators.orchestrator_deps();
        let query = run_state.progress_handle();
        let outcome = run_orchestrator(&deps, project, started_at_ms, query, &cancel).await;
        let finished_at_ms = SystemClock.epoch_ms();
        match outcome {
            Ok(_) if cancel.is_cancelled() => {
                run_state.finish_run(&run_id_for_task, RunOutcome::Cancelled, finished_at_ms);
            }
            Ok(_) => {
                run_state.finish_run(&run_id_for_task, RunOutcome::Succeeded, finished_at_ms);
            }
            Err(err) => {
                warn!(run_id = %run_id_for_task, error = %err, "full sync run failed");
                run_state.finish_run(&run_id_for_task, RunOutcome::Failed { error: err.to_string() }, finished_at_ms);
            }
        }
    });

    Response::Started { run_id }
}

fn spawn_reconcile(
    ctx: &DispatchCtx,
    project: Option<vs_core::ProjectCode>,
    dry_run: bool,
    hard_delete: bool,
) -> Response {
    let Some(project) = project else {
        return Response::Error {
            kind: ErrorKind::Validation,
            message: "sync reconcile requires --project (no all-project enumeration in the store)".to_string(),
        };
    };

    let run_id = RunId::new().to_string();
    let started_at_ms = SystemClock.epoch_ms();
    let cancel = ctx.run_state.begin_run(run_id.clone(), RunKind::Reconcile, Some(project.clone()), started_at_ms);
    let action = if hard_delete { ReconcileAction::HardDelete } else { ReconcileAction::MarkDeleted };

    let collaborators = ctx.collaborators.clone();
    let run_state = ctx.run_state.clone();
    let run_id_for_task = run_id.clone();
    tokio::spawn(async move {
        let deps = collaborators.reconciler_deps();
        let outcome = run_reconciler_over_projects(&deps, &[project], action, dry_run, &cancel).await;
        let finished_at_ms = SystemClock.epoch_ms();
        match outcome {
            Ok(_) if cancel.is_cancelled() => {
                run_state.finish_run(&run_id_for_task, RunOutcome::Cancelled, finished_at_ms);
            }
            Ok(result) => {
                info!(
                    run_id = %run_id_for_task,
                    checked = result.checked,
                    stale = result.stale.len(),
                    "reconcile run complete"
                );
                run_state.finish_run(&run_id_for_task, RunOutcome::Succeeded, finished_at_ms);
            }
            Err(err) => {
                warn!(run_id = %run_id_for_task, error = %err, "reconcile run failed");
                run_state.finish_run(&run_id_for_task, RunOutcome::Failed { error: err.to_string() }, finished_at_ms);
            }
        }
    });

    Response::Started { run_id }
}

fn start_scheduled(ctx: &DispatchCtx, interval_secs: u64) -> Response {
    if ctx.run_state.is_scheduled_running() {
        return Response::Error {
            kind: ErrorKind::Validation,
            message: "scheduled sync is already running; stop it first".to_string(),
        };
    }

    let cancel = vs_engine::runtime::CancelSignal::new();
    let collaborators = ctx.collaborators.clone();
    let run_state = ctx.run_state.clone();
    let cancel_for_task = cancel.clone();
    let task = tokio::spawn(async move {
        let deps = collaborators.orchestrator_deps();
        let query = run_state.progress_handle();
        vs_engine::run_orchestrator_scheduled(
            &deps,
            None,
            std::time::Duration::from_secs(interval_secs),
            None,
            || SystemClock.epoch_ms(),
            query,
            &cancel_for_task,
        )
        .await;
    });

    ctx.run_state.set_scheduled(ScheduledHandle {
        interval_secs,
        cancel,
        task,
        iterations_completed: 0,
    });
    Response::Ack
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
