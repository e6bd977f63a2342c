// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vsyncd`: hosts the Durable Runtime Core and serves `vsync` over a
//! Unix socket (§6).

use std::io::Write as _;
use std::sync::Arc;

use tokio::sync::Notify;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vs_daemon::deps::Collaborators;
use vs_daemon::dispatch::DispatchCtx;
use vs_daemon::lifecycle::{startup, Config};
use vs_daemon::listener::Listener;
use vs_daemon::run_state::RunState;

/// Appended to `daemon.log` before anything else so `vsync`'s
/// `connect_or_start` can scan for this run's outcome even if the daemon
/// dies before `tracing` is initialized.
fn log_startup_marker(config: &Config) -> std::io::Result<()> {
    let mut f = std::fs::OpenOptions::new().create(true).append(true).open(&config.log_path)?;
    writeln!(f, "--- vsyncd: starting (pid: {}) ---\n", std::process::id())
}

fn log_startup_error(config: &Config, message: &str) {
    if let Ok(mut f) = std::fs::OpenOptions::new().create(true).append(true).open(&config.log_path) {
        let _ = writeln!(f, "ERROR Failed to start daemon: {message}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    std::fs::create_dir_all(&config.state_dir)?;
    log_startup_marker(&config)?;

    let file_appender = tracing_appender::rolling::never(&config.state_dir, "daemon.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let result = match startup(&config).await {
        Ok(result) => result,
        Err(err) => {
            log_startup_error(&config, &err.to_string());
            return Err(err.into());
        }
    };
    info!(socket = %config.socket_path.display(), "daemon ready");
    println!("READY");

    let ctx = Arc::new(DispatchCtx {
        collaborators: Arc::new(Collaborators::new(result.daemon.store.clone())),
        run_state: result.daemon.run_state.clone(),
        start_time: result.daemon.start_time,
    });
    let shutdown = Arc::new(Notify::new());
    let listener = Listener::new(result.listener, ctx, Arc::clone(&shutdown));

    tokio::select! {
        _ = listener.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("received ctrl-c, shutting down");
        }
    }

    result.daemon.shutdown();
    Ok(())
}
