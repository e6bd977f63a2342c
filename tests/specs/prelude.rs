//! Shared harness for the integration spec suite.
//!
//! Every spec runs `vsync`/`vsyncd` as real subprocesses against an
//! isolated [`Project`]: its own `VSYNC_STATE_DIR` (daemon lock, socket,
//! log, WAL, snapshot) and its own working directory for RepoLog/Docs
//! fixtures, so concurrent tests never share a socket or a lock file.
//!
//! The daemon wires only the in-memory `Fake*` adapters (§1 non-goal:
//! real Tracker/RepoLog/Docs integrations are out of scope), so these
//! specs exercise the daemon lifecycle, the IPC protocol, and the CLI
//! surface rather than end-to-end sync semantics — that's covered by the
//! engine crate's own `#[tokio::test]` suite.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use tempfile::TempDir;

/// Longest we'll poll for an async condition (daemon startup, run
/// completion, process death, ...) before giving up.
pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

/// Poll `predicate` until it returns `true` or `max_ms` elapses. Returns
/// whether it ever became true.
pub fn wait_for(max_ms: u64, mut predicate: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    loop {
        if predicate() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
}

/// An isolated project: a working directory for fixtures plus a private
/// `VSYNC_STATE_DIR` for the daemon this project's specs spin up.
pub struct Project {
    _root: TempDir,
    path: PathBuf,
    state_path: PathBuf,
}

impl Project {
    /// A fresh project with no fixtures and no daemon running.
    pub fn empty() -> Self {
        let root = tempfile::tempdir().expect("create temp project dir");
        let path = root.path().join("work");
        let state_path = root.path().join("state");
        std::fs::create_dir_all(&path).expect("create project working dir");
        std::fs::create_dir_all(&state_path).expect("create project state dir");
        Self { _root: root, path, state_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Write `contents` to `relative` under the working directory,
    /// creating parent directories as needed. Returns the absolute path.
    pub fn file(&self, relative: &str, contents: &str) -> PathBuf {
        let full = self.path.join(relative);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("create fixture parent dir");
        }
        std::fs::write(&full, contents).expect("write fixture file");
        full
    }

    /// `git init` the working directory (a RepoLog mirror fixture, §C6,
    /// is a real checkout on disk).
    pub fn git_init(&self) {
        let status = Command::new("git")
            .arg("init")
            .arg("-q")
            .current_dir(&self.path)
            .status()
            .expect("run git init");
        assert!(status.success(), "git init failed");
    }

    /// A `vsync` invocation bound to this project's working directory and
    /// state directory.
    pub fn vsync(&self) -> CliRun {
        cli().pwd(&self.path).env("VSYNC_STATE_DIR", &self.state_path)
    }

    /// Contents of `daemon.log`, or empty string before the daemon has
    /// written one.
    pub fn daemon_log(&self) -> String {
        std::fs::read_to_string(self.state_path.join("daemon.log")).unwrap_or_default()
    }

    /// `SIGKILL` the daemon recorded in `daemon.pid` (crash simulation —
    /// no graceful shutdown, no socket/lock cleanup). Returns `false` if
    /// no pid file exists yet.
    pub fn daemon_kill(&self) -> bool {
        let Ok(contents) = std::fs::read_to_string(self.state_path.join("daemon.pid")) else {
            return false;
        };
        let Ok(pid) = contents.trim().parse::<i32>() else {
            return false;
        };
        nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), nix::sys::signal::Signal::SIGKILL).is_ok()
    }
}

/// Path to the `vsyncd` binary built alongside this test binary.
pub fn vsyncd_binary() -> PathBuf {
    assert_cmd::cargo::cargo_bin("vsyncd")
}

/// Start building a bare `vsync` invocation with no project binding.
/// Most specs should go through [`Project::vsync`] instead, which pins
/// `VSYNC_STATE_DIR` and the working directory.
pub fn cli() -> CliRun {
    CliRun { command: Command::new(assert_cmd::cargo::cargo_bin("vsync")) }
}

/// A `vsync` invocation under construction.
pub struct CliRun {
    command: Command,
}

impl CliRun {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.command.args(args);
        self
    }

    pub fn pwd(mut self, dir: &Path) -> Self {
        self.command.current_dir(dir);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.command.env(key, value);
        self
    }

    /// Hand back the underlying [`Command`] for callers that need the raw
    /// exit status instead of panicking on an unexpected one (e.g.
    /// probing a daemon mid-crash, where the socket may already be gone).
    pub fn command(self) -> Command {
        self.command
    }

    fn run(mut self) -> Output {
        self.command.stdin(Stdio::null()).output().expect("run vsync")
    }

    /// Run and assert a zero exit code.
    pub fn passes(self) -> Assert {
        let output = self.run();
        assert!(
            output.status.success(),
            "expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        Assert { output }
    }

    /// Run and assert a nonzero exit code.
    pub fn fails(self) -> Assert {
        let output = self.run();
        assert!(
            !output.status.success(),
            "expected failure, got success\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout),
        );
        Assert { output }
    }
}

/// A completed invocation's captured output, with chainable assertions.
pub struct Assert {
    output: Output,
}

impl Assert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).to_string()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).to_string()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout().contains(needle), "expected stdout to contain {needle:?}, got:\n{}", self.stdout());
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr().contains(needle), "expected stderr to contain {needle:?}, got:\n{}", self.stderr());
        self
    }

    pub fn stderr_lacks(self, needle: &str) -> Self {
        assert!(!self.stderr().contains(needle), "expected stderr to NOT contain {needle:?}, got:\n{}", self.stderr());
        self
    }
}
