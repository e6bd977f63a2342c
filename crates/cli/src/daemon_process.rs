// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawns `vsyncd` as a detached background process and waits for its
//! socket to come up, surfacing the daemon's own startup log on failure.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use vs_daemon::lifecycle::Config;

use crate::client::ClientError;

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Spawn `vsyncd` detached from this process and block until its socket
/// accepts connections (or the startup log reports a failure).
pub fn spawn_and_wait() -> Result<(), ClientError> {
    let config = Config::load().map_err(|e| ClientError::Unexpected(e.to_string()))?;
    std::fs::create_dir_all(&config.state_dir).map_err(|e| ClientError::Unexpected(e.to_string()))?;

    let vsyncd_path = find_vsyncd_binary();
    Command::new(&vsyncd_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ClientError::Unexpected(format!("failed to spawn {}: {e}", vsyncd_path.display())))?;

    wait_for_socket(&config)
}

fn wait_for_socket(config: &Config) -> Result<(), ClientError> {
    let deadline = Instant::now() + STARTUP_TIMEOUT;
    while Instant::now() < deadline {
        if config.socket_path.exists() && std::os::unix::net::UnixStream::connect(&config.socket_path).is_ok() {
            return Ok(());
        }
        if let Some(err) = read_startup_error(&config.log_path) {
            return Err(ClientError::Unexpected(format!("daemon failed to start: {err}")));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    Err(ClientError::Unexpected("timed out waiting for daemon to start".to_string()))
}

fn read_startup_error(log_path: &std::path::Path) -> Option<String> {
    let content = std::fs::read_to_string(log_path).ok()?;
    parse_startup_error(&content)
}

/// Scan a daemon log for the most recent `--- vsyncd: starting (pid: N) ---`
/// marker and, if that startup attempt failed, return the `ERROR` line
/// that followed it.
pub fn parse_startup_error(log: &str) -> Option<String> {
    let last_marker = log.match_indices("--- vsyncd: starting").map(|(idx, _)| idx).last()?;
    log[last_marker..]
        .lines()
        .find_map(|line| line.strip_prefix("ERROR Failed to start daemon: "))
        .map(str::to_string)
}

fn find_vsyncd_binary() -> PathBuf {
    if let Some(dir) = std::env::current_exe().ok().and_then(|exe| exe.parent().map(|p| p.to_path_buf())) {
        let sibling = dir.join("vsyncd");
        if sibling.exists() {
            return sibling;
        }
    }
    PathBuf::from("vsyncd")
}

#[cfg(test)]
#[path = "daemon_process_tests.rs"]
mod tests;
