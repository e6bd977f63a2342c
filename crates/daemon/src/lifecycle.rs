// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: config resolution, lock acquisition, socket bind, and
//! the SyncState store open/replay (§4.2's WAL+snapshot substrate).

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use fs2::FileExt;
use std::io::Write as _;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::info;
use vs_store::Store;

use crate::run_state::RunState;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine state directory")]
    NoStateDir,
    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),
    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),
    #[error("store error: {0}")]
    Store(#[from] vs_store::StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Daemon configuration: every path the daemon reads from or writes to,
/// all rooted under [`crate::env::state_dir`].
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub version_path: PathBuf,
    pub log_path: PathBuf,
    pub wal_path: PathBuf,
    pub snapshot_path: PathBuf,
}

impl Config {
    /// Load configuration for the user-level daemon: one daemon instance
    /// per user, serving every project.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = crate::env::state_dir()?;
        Ok(Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join("daemon.log"),
            wal_path: state_dir.join("wal").join("sync_state.wal"),
            snapshot_path: state_dir.join("snapshot.bin"),
            state_dir,
        })
    }
}

/// Live daemon state held across the lifetime of one run.
pub struct DaemonState {
    pub config: Config,
    #[allow(dead_code)] // held only to keep the exclusive file lock alive
    lock_file: File,
    pub store: Arc<Store>,
    pub run_state: Arc<RunState>,
    pub start_time: Instant,
}

pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: UnixListener,
}

/// Start the daemon: acquire the lock, open the store, bind the socket.
/// Cleans up partial state on any failure except a lock conflict (those
/// files belong to the already-running daemon).
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Acquire the lock before touching anything else to avoid races
    // between two daemons starting concurrently.
    let lock_file =
        std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    if let Some(parent) = config.wal_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&config.version_path, crate::env::PROTOCOL_VERSION)?;

    let store = Arc::new(Store::open(&config.wal_path, &config.snapshot_path)?);
    info!(wal = %config.wal_path.display(), "sync state store opened");

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!("daemon started");

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            store,
            run_state: Arc::new(RunState::new()),
            start_time: Instant::now(),
        },
        listener,
    })
}

impl DaemonState {
    /// Remove the socket/version/lock files on graceful shutdown. The
    /// lock itself is released when `lock_file` drops.
    pub fn shutdown(&self) {
        if self.config.socket_path.exists() {
            let _ = std::fs::remove_file(&self.config.socket_path);
        }
        if self.config.version_path.exists() {
            let _ = std::fs::remove_file(&self.config.version_path);
        }
        if self.config.lock_path.exists() {
            let _ = std::fs::remove_file(&self.config.lock_path);
        }
        info!("daemon shutdown complete");
    }
}

fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.version_path.exists() {
        let _ = std::fs::remove_file(&config.version_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
