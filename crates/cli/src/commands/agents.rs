// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vsync agents provision` — best-effort trigger of the out-of-scope
//! agent-provisioning side channel (§1, §4.10).

use std::str::FromStr;

use clap::Args;
use vs_core::ProjectCode;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;

#[derive(Args)]
pub struct ProvisionArgs {
    /// Restrict provisioning to a single project code. Default: all projects.
    #[arg(long)]
    project: Option<String>,
}

pub async fn provision(args: ProvisionArgs) -> Result<(), ExitError> {
    let project = args
        .project
        .map(|s| ProjectCode::from_str(&s))
        .transpose()
        .map_err(|e| ExitError::new(2, e.to_string()))?;
    let client = DaemonClient::connect_or_start().map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
    client.agents_provision(project).await.map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
    println!("{}", crate::color::muted("agent provisioning requested"));
    Ok(())
}
