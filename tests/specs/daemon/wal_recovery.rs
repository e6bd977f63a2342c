//! Crash recovery: WAL replay, snapshot migration, and corrupt-state
//! error handling (§4.1, §4.2's WAL+snapshot substrate).

use std::io::Write as _;

use crate::prelude::*;

#[test]
fn daemon_recovers_after_sigkill() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes();

    let killed = temp.daemon_kill();
    assert!(killed, "should be able to kill the daemon");

    let dead = wait_for(SPEC_WAIT_MAX_MS, || {
        let output = temp.vsync().args(&["daemon", "status"]).command().output().expect("run vsync");
        !String::from_utf8_lossy(&output.stdout).contains("running")
    });
    assert!(dead, "daemon should be dead after SIGKILL");

    // Restart should recover cleanly: lock is gone with the dead process,
    // store opens via WAL replay from the last snapshot (§4.2).
    temp.vsync().args(&["daemon", "start"]).passes().stdout_has("running");
    temp.vsync().args(&["daemon", "status"]).passes().stdout_has("running");
}

#[test]
fn daemon_start_fails_clearly_on_snapshot_from_a_future_version() {
    let temp = Project::empty();
    std::fs::create_dir_all(temp.state_path()).unwrap();

    // CURRENT_SNAPSHOT_VERSION is 1; a v99 snapshot has no migration path.
    let snapshot_json = r#"{"v":99,"seq":0,"state":{"rows":{},"pages":{},"last_export_at":{}},"created_at":"2026-01-01T00:00:00Z"}"#;
    let snapshot_path = temp.state_path().join("snapshot.bin");
    let file = std::fs::File::create(&snapshot_path).unwrap();
    let mut encoder = zstd::stream::Encoder::new(file, 3).unwrap();
    encoder.write_all(snapshot_json.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let vsyncd = vsyncd_binary();
    let output = std::process::Command::new(&vsyncd)
        .env("VSYNC_STATE_DIR", temp.state_path())
        .output()
        .expect("run vsyncd directly");
    assert!(!output.status.success(), "vsyncd should refuse to start on a too-new snapshot");

    let recovered = wait_for(SPEC_WAIT_MAX_MS, || {
        temp.daemon_log().contains("snapshot version 99 is newer than supported version 1")
    });
    assert!(recovered, "daemon log should report the migration error, got:\n{}", temp.daemon_log());

    // A failed startup must not leave a lock/socket behind for the next attempt.
    assert!(!temp.state_path().join("daemon.sock").exists(), "socket must not survive a failed startup");
}

#[test]
fn daemon_start_fails_clearly_on_corrupt_snapshot() {
    let temp = Project::empty();
    std::fs::create_dir_all(temp.state_path()).unwrap();

    // Valid zstd magic bytes, garbage payload.
    let snapshot_path = temp.state_path().join("snapshot.bin");
    let mut file = std::fs::File::create(&snapshot_path).unwrap();
    file.write_all(b"\x28\xb5\x2f\xfd\x00\x00CORRUPT").unwrap();
    file.sync_all().unwrap();

    let vsyncd = vsyncd_binary();
    let output = std::process::Command::new(&vsyncd)
        .env("VSYNC_STATE_DIR", temp.state_path())
        .output()
        .expect("run vsyncd directly");
    assert!(!output.status.success(), "vsyncd should refuse to start on a corrupt snapshot");
}

#[test]
fn daemon_recovers_when_interrupted_snapshot_tmp_file_is_present() {
    let temp = Project::empty();
    temp.vsync().args(&["daemon", "start"]).passes();
    temp.vsync().args(&["daemon", "stop"]).passes();

    let stopped = wait_for(SPEC_WAIT_MAX_MS, || !temp.state_path().join("daemon.sock").exists());
    assert!(stopped, "daemon should stop cleanly before the crash simulation");

    // Simulate a crash mid-checkpoint: the atomic save writes to
    // `snapshot.tmp` before renaming it into place (§4.2's Checkpointer).
    let tmp_path = temp.state_path().join("snapshot.tmp");
    std::fs::write(&tmp_path, b"INCOMPLETE").unwrap();

    temp.vsync().args(&["daemon", "start"]).passes().stdout_has("running");
    temp.vsync().args(&["daemon", "status"]).passes().stdout_has("running");
}
