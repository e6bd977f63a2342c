//! `vsyncd` process lifecycle: start/stop/restart/status and the state
//! files it creates (§4.1, §6).

use crate::prelude::*;

#[test]
fn daemon_status_reports_not_running_before_start() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "status"]).passes().stdout_has("not running");
}

#[test]
fn daemon_start_reports_running() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes().stdout_has("running");
}

#[test]
fn daemon_status_shows_running_after_start() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes();
    temp.vsync().args(&["daemon", "status"]).passes().stdout_has("running");
}

#[test]
fn daemon_status_shows_pid_and_version() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes();
    temp.vsync()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("pid=")
        .stdout_has("version=");
}

#[test]
fn daemon_status_json_reports_pid() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes();
    let stdout = temp.vsync().args(&["--output", "json", "daemon", "status"]).passes().stdout();
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("status is valid JSON");
    assert_eq!(value["running"], serde_json::Value::Bool(true));
    assert!(value["pid"].as_u64().is_some(), "expected a numeric pid, got {value}");
}

#[test]
fn daemon_stop_reports_shutting_down() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes();
    temp.vsync().args(&["daemon", "stop"]).passes().stdout_has("shutting down");
}

#[test]
fn daemon_status_reports_not_running_after_stop() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes();
    temp.vsync().args(&["daemon", "stop"]).passes();

    let stopped = wait_for(SPEC_WAIT_MAX_MS, || {
        !temp.vsync().args(&["daemon", "status"]).passes().stdout().contains("pid=")
    });
    assert!(stopped, "daemon should report not running shortly after stop");
}

#[test]
fn daemon_restart_comes_back_up() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes();
    temp.vsync().args(&["daemon", "restart"]).passes().stdout_has("running");
}

#[test]
fn daemon_creates_pid_socket_and_version_files() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || temp.state_path().join("daemon.pid").exists()), "pid file");
    assert!(wait_for(SPEC_WAIT_MAX_MS, || temp.state_path().join("daemon.sock").exists()), "socket file");
    assert!(wait_for(SPEC_WAIT_MAX_MS, || temp.state_path().join("daemon.version").exists()), "version file");
}

#[test]
fn daemon_removes_socket_and_version_on_graceful_stop() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes();
    temp.vsync().args(&["daemon", "stop"]).passes();

    let cleaned = wait_for(SPEC_WAIT_MAX_MS, || {
        !temp.state_path().join("daemon.sock").exists() && !temp.state_path().join("daemon.version").exists()
    });
    assert!(cleaned, "socket and version files should be removed on graceful stop");
}

#[test]
fn second_start_while_running_reuses_the_existing_daemon() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes();
    let first_pid = {
        let stdout = temp.vsync().args(&["--output", "json", "daemon", "status"]).passes().stdout();
        let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
        value["pid"].as_u64().expect("pid present")
    };

    temp.vsync().args(&["daemon", "start"]).passes();
    let second_pid = {
        let stdout = temp.vsync().args(&["--output", "json", "daemon", "status"]).passes().stdout();
        let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
        value["pid"].as_u64().expect("pid present")
    };

    assert_eq!(first_pid, second_pid, "starting twice must not spawn a second daemon");
}

#[test]
fn vsyncd_refuses_to_start_twice_against_the_same_state_dir() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes();

    let output = std::process::Command::new(vsyncd_binary())
        .env("VSYNC_STATE_DIR", temp.state_path())
        .output()
        .expect("run vsyncd directly");
    assert!(!output.status.success(), "a second vsyncd against the same state dir must fail");

    // The running daemon must be undisturbed by the failed second start.
    temp.vsync().args(&["daemon", "status"]).passes().stdout_has("running");
    assert!(temp.state_path().join("daemon.sock").exists(), "socket must survive a failed second start");
}
