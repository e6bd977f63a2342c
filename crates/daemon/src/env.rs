// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate (A2, §6).

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Protocol version exposed in the `Hello` handshake and `daemon status`.
pub const PROTOCOL_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

/// Default Unix-socket task-queue name a real workflow-runtime backend
/// would listen on (§6 `RUNTIME_TASK_QUEUE`). Unused by this in-process
/// runtime core directly, but threaded through so a future out-of-process
/// backend slots in without a config shape change.
pub const DEFAULT_TASK_QUEUE: &str = "vibesync-queue";

/// Resolve state directory: `VSYNC_STATE_DIR` > `XDG_STATE_HOME/vsync` >
/// `~/.local/state/vsync`.
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("VSYNC_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("vsync"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/vsync"))
}

/// `RUNTIME_ADDRESS` (§6): address of the external workflow-runtime
/// backend this in-process core stands in for. Only consulted for
/// display/diagnostics today.
pub fn runtime_address() -> String {
    std::env::var("RUNTIME_ADDRESS").unwrap_or_else(|_| "localhost:7233".to_string())
}

/// `RUNTIME_TASK_QUEUE` (§6).
pub fn runtime_task_queue() -> String {
    std::env::var("RUNTIME_TASK_QUEUE").unwrap_or_else(|_| DEFAULT_TASK_QUEUE.to_string())
}

/// `USE_TEMPORAL_SYNC` feature flag (§6) — reserved for a future
/// out-of-process runtime backend; the in-process core is always used
/// when unset.
pub fn use_temporal_sync() -> bool {
    std::env::var("USE_TEMPORAL_SYNC").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// IPC round-trip timeout for the CLI client.
pub fn ipc_timeout() -> Duration {
    std::env::var("VSYNC_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Interval for the scheduled full-sync wrapper (§4.6), overridable so
/// operators aren't stuck with a multi-minute default in tests.
pub fn scheduled_interval() -> Duration {
    std::env::var("VSYNC_SCHEDULED_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(300))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
