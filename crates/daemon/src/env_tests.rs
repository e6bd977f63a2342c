// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn clear_env() {
    for var in [
        "VSYNC_STATE_DIR",
        "XDG_STATE_HOME",
        "RUNTIME_ADDRESS",
        "RUNTIME_TASK_QUEUE",
        "USE_TEMPORAL_SYNC",
        "VSYNC_IPC_TIMEOUT_MS",
        "VSYNC_SCHEDULED_INTERVAL_SECS",
    ] {
        std::env::remove_var(var);
    }
}

#[test]
#[serial(env)]
fn state_dir_prefers_vsync_state_dir() {
    clear_env();
    std::env::set_var("VSYNC_STATE_DIR", "/tmp/vsync-explicit");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/vsync-explicit"));
    clear_env();
}

#[test]
#[serial(env)]
fn state_dir_falls_back_to_xdg_state_home() {
    clear_env();
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/xdg/vsync"));
    clear_env();
}

#[test]
#[serial(env)]
fn runtime_address_defaults_to_localhost() {
    clear_env();
    assert_eq!(runtime_address(), "localhost:7233");
}

#[test]
#[serial(env)]
fn runtime_task_queue_defaults() {
    clear_env();
    assert_eq!(runtime_task_queue(), DEFAULT_TASK_QUEUE);
}

#[test]
#[serial(env)]
fn use_temporal_sync_parses_truthy_values() {
    clear_env();
    assert!(!use_temporal_sync());
    std::env::set_var("USE_TEMPORAL_SYNC", "1");
    assert!(use_temporal_sync());
    std::env::set_var("USE_TEMPORAL_SYNC", "true");
    assert!(use_temporal_sync());
    clear_env();
}

#[test]
#[serial(env)]
fn ipc_timeout_defaults_to_five_seconds() {
    clear_env();
    assert_eq!(ipc_timeout(), Duration::from_secs(5));
}
