// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vsync sync` — the Full Orchestrator (C7) and Reconciler (C8) surface,
//! plus the scheduled wrapper around C7 and progress/history queries
//! (§4.6, §4.7, §6).

use std::str::FromStr;

use clap::{Args, Subcommand};
use vs_core::ProjectCode;
use vs_wire::{RunListFilter, RunOutcome, RunSummary};

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, handle_list, OutputFormat};
use crate::table::{Column, Table};

#[derive(Subcommand)]
pub enum SyncCommand {
    /// Trigger the Full Orchestrator (C7) now.
    Full {
        /// Restrict to a single project code (e.g. ACME). Default: all projects.
        #[arg(long)]
        project: Option<String>,
    },
    /// Run the Reconciler (C8) over a project's SyncState rows.
    Reconcile {
        /// Project code to reconcile (required — the store has no
        /// all-project enumeration, §4.2).
        #[arg(long)]
        project: String,
        /// Report what would change without writing anything.
        #[arg(long)]
        dry_run: bool,
        /// Hard-delete stale rows instead of marking them deleted.
        #[arg(long)]
        hard_delete: bool,
    },
    /// Current progress of the in-flight (or last) full orchestrator run.
    Progress,
    /// List recent or failed runs.
    List {
        #[command(subcommand)]
        filter: ListFilter,
    },
    /// Send the cancel signal to an in-flight run.
    Cancel {
        /// Run id (as printed by `sync full`/`sync reconcile`/`sync list`).
        run_id: String,
    },
    /// Manage the periodic scheduled wrapper around the Full Orchestrator.
    Scheduled {
        #[command(subcommand)]
        command: ScheduledCommand,
    },
}

#[derive(Subcommand)]
pub enum ListFilter {
    /// Most recent runs regardless of outcome.
    Recent,
    /// Only runs that failed.
    Failed,
}

#[derive(Subcommand)]
pub enum ScheduledCommand {
    /// Start the scheduled wrapper with the given interval.
    Start(IntervalArgs),
    /// Stop the scheduled wrapper.
    Stop,
    /// Stop then start the scheduled wrapper with a new interval.
    Restart(IntervalArgs),
    /// Report whether the scheduled wrapper is running and its progress.
    Status,
}

#[derive(Args)]
pub struct IntervalArgs {
    /// Interval between orchestrator runs, in seconds.
    #[arg(long, default_value_t = 300)]
    interval_secs: u64,
}

pub async fn run(command: SyncCommand, format: OutputFormat) -> Result<(), ExitError> {
    let client = connect()?;
    match command {
        SyncCommand::Full { project } => full(&client, project).await,
        SyncCommand::Reconcile { project, dry_run, hard_delete } => {
            reconcile(&client, project, dry_run, hard_delete).await
        }
        SyncCommand::Progress => progress(&client, format).await,
        SyncCommand::List { filter } => list(&client, filter, format).await,
        SyncCommand::Cancel { run_id } => cancel(&client, run_id).await,
        SyncCommand::Scheduled { command } => scheduled(&client, command, format).await,
    }
}

fn connect() -> Result<DaemonClient, ExitError> {
    DaemonClient::connect_or_start().map_err(|e| ExitError::new(e.exit_code(), e.to_string()))
}

fn parse_project(project: Option<String>) -> Result<Option<ProjectCode>, ExitError> {
    project.map(|s| ProjectCode::from_str(&s)).transpose().map_err(|e| ExitError::new(2, e.to_string()))
}

async fn full(client: &DaemonClient, project: Option<String>) -> Result<(), ExitError> {
    let project = parse_project(project)?;
    let run_id = client.sync_full(project).await.map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
    println!("{} {}", crate::color::header("started"), run_id);
    Ok(())
}

async fn reconcile(
    client: &DaemonClient,
    project: String,
    dry_run: bool,
    hard_delete: bool,
) -> Result<(), ExitError> {
    let project = ProjectCode::from_str(&project).map_err(|e| ExitError::new(2, e.to_string()))?;
    let run_id = client
        .sync_reconcile(Some(project), dry_run, hard_delete)
        .await
        .map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
    println!("{} {}", crate::color::header("started"), run_id);
    Ok(())
}

async fn progress(client: &DaemonClient, format: OutputFormat) -> Result<(), ExitError> {
    let snapshot = client.progress().await.map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
    format_or_json(format, &snapshot, || {
        println!(
            "{}: {}/{} projects, {} issues synced, {} errors ({})",
            snapshot.status,
            snapshot.projects_completed,
            snapshot.projects_total,
            snapshot.issues_synced,
            snapshot.errors,
            crate::output::format_elapsed(snapshot.elapsed_ms / 1000),
        );
        if let Some(project) = &snapshot.current_project {
            println!("current project: {project}");
        }
    })
    .map_err(|e| ExitError::new(1, e.to_string()))
}

async fn list(client: &DaemonClient, filter: ListFilter, format: OutputFormat) -> Result<(), ExitError> {
    let wire_filter = match filter {
        ListFilter::Recent => RunListFilter::Recent,
        ListFilter::Failed => RunListFilter::Failed,
    };
    let runs = client.list_runs(wire_filter).await.map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
    handle_list(format, &runs, "no runs", render_runs_table).map_err(|e| ExitError::new(1, e.to_string()))
}

fn render_runs_table(runs: &[RunSummary], out: &mut dyn std::io::Write) {
    let mut table = Table::new(vec![
        Column::muted("RUN ID"),
        Column::left("KIND"),
        Column::left("PROJECT"),
        Column::left("OUTCOME"),
        Column::muted("STARTED"),
    ]);
    for run in runs {
        let project = run.project.as_ref().map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
        let outcome = match &run.outcome {
            RunOutcome::Running => "running".to_string(),
            RunOutcome::Succeeded => "succeeded".to_string(),
            RunOutcome::Failed { error } => format!("failed: {error}"),
            RunOutcome::Cancelled => "cancelled".to_string(),
        };
        table.row(vec![
            run.run_id.clone(),
            format!("{:?}", run.kind).to_lowercase(),
            project,
            outcome,
            crate::output::format_time_ago(run.started_at_ms),
        ]);
    }
    table.render(out);
}

async fn cancel(client: &DaemonClient, run_id: String) -> Result<(), ExitError> {
    client.cancel(&run_id).await.map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
    println!("{} {}", crate::color::muted("cancelled"), run_id);
    Ok(())
}

async fn scheduled(client: &DaemonClient, command: ScheduledCommand, format: OutputFormat) -> Result<(), ExitError> {
    match command {
        ScheduledCommand::Start(args) => {
            client.scheduled_start(args.interval_secs).await.map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
            println!("{}", crate::color::header("scheduled sync started"));
            Ok(())
        }
        ScheduledCommand::Stop => {
            client.scheduled_stop().await.map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
            println!("{}", crate::color::muted("scheduled sync stopped"));
            Ok(())
        }
        ScheduledCommand::Restart(args) => {
            client.scheduled_restart(args.interval_secs).await.map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
            println!("{}", crate::color::header("scheduled sync restarted"));
            Ok(())
        }
        ScheduledCommand::Status => {
            let status =
                client.scheduled_status().await.map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
            format_or_json(format, &status, || {
                if status.running {
                    println!(
                        "running, interval={}s, iterations={}",
                        status.interval_secs.unwrap_or(0),
                        status.iterations_completed,
                    );
                } else {
                    println!("not running");
                }
            })
            .map_err(|e| ExitError::new(1, e.to_string()))
        }
    }
}
