// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vsync`: the CLI client for `vsyncd` (§6 "CLI / operational surface").
//!
//! Every subcommand maps directly onto a [`vs_wire::Request`] variant and
//! exits with the process code the corresponding [`client::ClientError`]
//! carries: `0` success, `1` runtime unreachable, `2` not-found, `3`
//! cancelled.

mod client;
mod color;
mod commands;
mod daemon_process;
mod exit_error;
mod output;
mod table;

use clap::{Parser, Subcommand};

use commands::agents::ProvisionArgs;
use commands::daemon::DaemonCommand;
use commands::sync::SyncCommand;
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "vsync", version, about = "Keep Tracker, RepoLog, and Docs in eventual agreement.")]
#[command(styles = color::styles())]
struct Cli {
    /// Render structured output as JSON instead of text.
    #[arg(long, global = true, value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// `vsyncd` process lifecycle.
    Daemon {
        #[command(subcommand)]
        command: DaemonCommand,
    },
    /// Trigger and inspect sync runs (Full Orchestrator, Reconciler, scheduler).
    Sync {
        #[command(subcommand)]
        command: SyncCommand,
    },
    /// Trigger the best-effort agent-provisioning side channel.
    Agents {
        #[command(flatten)]
        args: ProvisionArgs,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Daemon { command } => commands::daemon::run(command, cli.output).await,
        Command::Sync { command } => commands::sync::run(command, cli.output).await,
        Command::Agents { args } => commands::agents::provision(args).await,
    };

    if let Err(ExitError { code, message }) = result {
        if !message.is_empty() {
            eprintln!("error: {message}");
        }
        std::process::exit(code);
    }
}
