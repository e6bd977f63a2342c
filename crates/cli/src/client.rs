// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-socket client for the `vsyncd` daemon (A5, §6): connect, send one
//! length-prefixed request, read the matching response.

use std::fmt;
use std::path::PathBuf;

use tokio::net::UnixStream;
use vs_daemon::{env, lifecycle::Config};
use vs_wire::{read_framed, write_framed, ErrorKind, ProtocolError, Query, Request, Response};

#[derive(Debug)]
pub enum ClientError {
    NotRunning,
    Protocol(ProtocolError),
    Remote { kind: ErrorKind, message: String },
    Unexpected(String),
}

impl ClientError {
    pub fn is_not_running(&self) -> bool {
        matches!(self, ClientError::NotRunning)
    }

    /// Process exit code for this error (§6): `1` runtime unreachable, `2`
    /// not-found, `3` cancelled.
    pub fn exit_code(&self) -> i32 {
        match self {
            ClientError::NotRunning => 1,
            ClientError::Remote { kind: ErrorKind::NotFound, .. } => 2,
            ClientError::Remote { kind: ErrorKind::Cancelled, .. } => 3,
            ClientError::Remote { .. } | ClientError::Protocol(_) | ClientError::Unexpected(_) => 1,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::NotRunning => write!(f, "daemon is not running"),
            ClientError::Protocol(e) => write!(f, "protocol error: {e}"),
            ClientError::Remote { message, .. } => write!(f, "{message}"),
            ClientError::Unexpected(s) => write!(f, "{s}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ProtocolError> for ClientError {
    fn from(e: ProtocolError) -> Self {
        match e {
            ProtocolError::ConnectionClosed => ClientError::NotRunning,
            other => ClientError::Protocol(other),
        }
    }
}

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Connect to an already-running daemon. Fails fast — no spawn, no
    /// retry loop. Use [`Self::connect_or_start`] for commands that should
    /// boot the daemon on demand.
    pub fn connect() -> Result<Self, ClientError> {
        let config = Config::load().map_err(|e| ClientError::Unexpected(e.to_string()))?;
        if !config.socket_path.exists() {
            return Err(ClientError::NotRunning);
        }
        Ok(Self { socket_path: config.socket_path })
    }

    /// Connect, spawning and waiting for the daemon to come up if it isn't
    /// already running.
    pub fn connect_or_start() -> Result<Self, ClientError> {
        if let Ok(client) = Self::connect() {
            return Ok(client);
        }
        crate::daemon_process::spawn_and_wait()?;
        Self::connect()
    }

    async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let connect = tokio::time::timeout(env::ipc_timeout(), UnixStream::connect(&self.socket_path));
        let mut stream = connect.await.map_err(|_| ClientError::NotRunning)?.map_err(|_| ClientError::NotRunning)?;

        write_framed(&mut stream, request).await?;
        let response: Response =
            tokio::time::timeout(env::ipc_timeout(), read_framed(&mut stream)).await.map_err(|_| ClientError::NotRunning)??;

        match response {
            Response::Error { kind, message } => Err(ClientError::Remote { kind, message }),
            other => Ok(other),
        }
    }

    fn reject<T>(other: Response) -> Result<T, ClientError> {
        Err(ClientError::Unexpected(format!("unexpected response: {other:?}")))
    }

    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello { version: env!("CARGO_PKG_VERSION").to_string() };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Self::reject(other),
        }
    }

    pub async fn daemon_status(&self) -> Result<(u64, u32, String), ClientError> {
        match self.send(&Request::Query(Query::DaemonStatus)).await? {
            Response::DaemonStatus { uptime_secs, pid, version } => Ok((uptime_secs, pid, version)),
            other => Self::reject(other),
        }
    }

    pub async fn sync_full(&self, project: Option<vs_core::ProjectCode>) -> Result<String, ClientError> {
        match self.send(&Request::SyncFull { project }).await? {
            Response::Started { run_id } => Ok(run_id),
            other => Self::reject(other),
        }
    }

    pub async fn sync_reconcile(
        &self,
        project: Option<vs_core::ProjectCode>,
        dry_run: bool,
        hard_delete: bool,
    ) -> Result<String, ClientError> {
        match self.send(&Request::SyncReconcile { project, dry_run, hard_delete }).await? {
            Response::Started { run_id } => Ok(run_id),
            other => Self::reject(other),
        }
    }

    pub async fn scheduled_start(&self, interval_secs: u64) -> Result<(), ClientError> {
        match self.send(&Request::ScheduledStart { interval_secs }).await? {
            Response::Ack => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn scheduled_stop(&self) -> Result<(), ClientError> {
        match self.send(&Request::ScheduledStop).await? {
            Response::Ack => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn scheduled_restart(&self, interval_secs: u64) -> Result<(), ClientError> {
        match self.send(&Request::ScheduledRestart { interval_secs }).await? {
            Response::Ack => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn scheduled_status(&self) -> Result<vs_wire::ScheduledStatus, ClientError> {
        match self.send(&Request::Query(Query::ScheduledStatus)).await? {
            Response::ScheduledStatus(status) => Ok(status),
            other => Self::reject(other),
        }
    }

    pub async fn progress(&self) -> Result<vs_wire::ProgressSnapshot, ClientError> {
        match self.send(&Request::Query(Query::Progress)).await? {
            Response::Progress(snapshot) => Ok(snapshot),
            other => Self::reject(other),
        }
    }

    pub async fn list_runs(
        &self,
        filter: vs_wire::RunListFilter,
    ) -> Result<Vec<vs_wire::RunSummary>, ClientError> {
        match self.send(&Request::Query(Query::ListRuns { filter })).await? {
            Response::Runs { runs } => Ok(runs),
            other => Self::reject(other),
        }
    }

    pub async fn cancel(&self, run_id: &str) -> Result<(), ClientError> {
        match self.send(&Request::Cancel { run_id: run_id.to_string() }).await? {
            Response::Ack => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn agents_provision(&self, project: Option<vs_core::ProjectCode>) -> Result<(), ClientError> {
        match self.send(&Request::AgentsProvision { project }).await? {
            Response::Ack => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::ShuttingDown => Ok(()),
            other => Self::reject(other),
        }
    }
}
