//! `vsync` help and version output (§6 "CLI / operational surface").

use crate::prelude::*;

#[test]
fn vsync_no_args_shows_usage_and_exits_nonzero() {
    cli().fails().stderr_has("Usage:");
}

#[test]
fn vsync_help_shows_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn vsync_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}

#[test]
fn vsync_daemon_help_shows_subcommands() {
    cli()
        .args(&["daemon", "--help"])
        .passes()
        .stdout_has("start")
        .stdout_has("stop")
        .stdout_has("restart")
        .stdout_has("status");
}

#[test]
fn vsync_sync_help_shows_subcommands() {
    cli()
        .args(&["sync", "--help"])
        .passes()
        .stdout_has("full")
        .stdout_has("reconcile")
        .stdout_has("progress")
        .stdout_has("list")
        .stdout_has("cancel")
        .stdout_has("scheduled");
}

#[test]
fn vsync_sync_reconcile_help_shows_flags() {
    cli()
        .args(&["sync", "reconcile", "--help"])
        .passes()
        .stdout_has("--project")
        .stdout_has("--dry-run")
        .stdout_has("--hard-delete");
}

#[test]
fn vsync_sync_scheduled_help_shows_subcommands() {
    cli()
        .args(&["sync", "scheduled", "--help"])
        .passes()
        .stdout_has("start")
        .stdout_has("stop")
        .stdout_has("restart")
        .stdout_has("status");
}

#[test]
fn vsync_agents_help_shows_project_flag() {
    cli().args(&["agents", "--help"]).passes().stdout_has("--project");
}

#[test]
fn vsync_sync_reconcile_without_project_fails() {
    let temp = Project::empty();
    temp.vsync().args(&["sync", "reconcile"]).fails().stderr_has("--project");
}
