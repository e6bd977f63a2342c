// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between the `vsync` CLI and the daemon (A5, §6).
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload, identical
//! framing to a Unix-socket request/response protocol.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod framing;
mod query;
mod request;
mod response;
mod status;

pub use framing::{decode, encode, read_framed, read_message, write_framed, write_message, ProtocolError};
pub use query::{Query, RunListFilter};
pub use request::Request;
pub use response::{ErrorKind, Response};
pub use status::{ProgressSnapshot, RunKind, RunOutcome, RunSummary, ScheduledStatus};
