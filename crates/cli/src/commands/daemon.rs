// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vsync daemon` — lifecycle management for `vsyncd`.

use clap::Subcommand;
use serde::Serialize;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start `vsyncd` if it isn't already running.
    Start,
    /// Request a graceful shutdown of `vsyncd`.
    Stop,
    /// Stop then start `vsyncd`.
    Restart,
    /// Report whether `vsyncd` is reachable, and its uptime/version.
    Status,
}

#[derive(Serialize)]
struct StatusReport {
    running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    uptime_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

pub async fn run(command: DaemonCommand, format: OutputFormat) -> Result<(), ExitError> {
    match command {
        DaemonCommand::Start => start(format).await,
        DaemonCommand::Stop => stop().await,
        DaemonCommand::Restart => {
            stop().await.ok();
            start(format).await
        }
        DaemonCommand::Status => status(format).await,
    }
}

async fn start(format: OutputFormat) -> Result<(), ExitError> {
    if DaemonClient::connect().is_ok() {
        return status(format).await;
    }
    crate::daemon_process::spawn_and_wait().map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
    status(format).await
}

async fn stop() -> Result<(), ExitError> {
    let client = DaemonClient::connect().map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
    client.shutdown().await.map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
    println!("{}", crate::color::muted("daemon shutting down"));
    Ok(())
}

async fn status(format: OutputFormat) -> Result<(), ExitError> {
    let report = match DaemonClient::connect() {
        Ok(client) => {
            let (uptime_secs, pid, version) =
                client.daemon_status().await.map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
            StatusReport { running: true, uptime_secs: Some(uptime_secs), pid: Some(pid), version: Some(version) }
        }
        Err(_) => StatusReport { running: false, uptime_secs: None, pid: None, version: None },
    };

    format_or_json(format, &report, || {
        if report.running {
            println!(
                "{} pid={} version={} uptime={}",
                crate::color::header("running"),
                report.pid.unwrap_or(0),
                report.version.as_deref().unwrap_or("?"),
                crate::output::format_elapsed(report.uptime_secs.unwrap_or(0)),
            );
        } else {
            println!("{}", crate::color::muted("not running"));
        }
    })
    .map_err(|e| ExitError::new(1, e.to_string()))
}
