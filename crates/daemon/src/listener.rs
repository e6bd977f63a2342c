// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-socket accept loop: one spawned task per connection, each handling
//! exactly one request/response round trip before closing (§6's IPC model
//! is request-response, not a persistent session).

use std::sync::Arc;

use tokio::net::UnixListener;
use tokio::sync::Notify;
use tracing::{debug, error, info};
use vs_wire::{read_framed, write_framed, ProtocolError, Request, Response};

use crate::dispatch::{handle_request, DispatchCtx};

pub struct Listener {
    socket: UnixListener,
    ctx: Arc<DispatchCtx>,
    shutdown: Arc<Notify>,
}

impl Listener {
    pub fn new(socket: UnixListener, ctx: Arc<DispatchCtx>, shutdown: Arc<Notify>) -> Self {
        Self { socket, ctx, shutdown }
    }

    /// Accept connections until a `Shutdown` request is handled, at which
    /// point the caller is notified via `shutdown` and this loop returns.
    pub async fn run(self) {
        loop {
            tokio::select! {
                accepted = self.socket.accept() => {
                    match accepted {
                        Ok((stream, _addr)) => {
                            let ctx = Arc::clone(&self.ctx);
                            let shutdown = Arc::clone(&self.shutdown);
                            tokio::spawn(async move {
                                if let Err(err) = handle_connection(stream, &ctx, &shutdown).await {
                                    log_connection_error(err);
                                }
                            });
                        }
                        Err(err) => error!(error = %err, "accept failed"),
                    }
                }
                _ = self.shutdown.notified() => {
                    info!("listener shutting down");
                    return;
                }
            }
        }
    }
}

async fn handle_connection(
    mut stream: tokio::net::UnixStream,
    ctx: &DispatchCtx,
    shutdown: &Notify,
) -> Result<(), ProtocolError> {
    let request: Request = read_framed(&mut stream).await?;
    let is_shutdown = matches!(request, Request::Shutdown);

    if matches!(request, Request::Query(_)) {
        debug!(?request, "received query");
    } else {
        info!(?request, "received request");
    }

    let response: Response = handle_request(request, ctx).await;
    write_framed(&mut stream, &response).await?;

    if is_shutdown {
        shutdown.notify_waiters();
    }
    Ok(())
}

fn log_connection_error(err: ProtocolError) {
    match err {
        ProtocolError::ConnectionClosed => debug!("client disconnected"),
        other => error!(error = %other, "connection error"),
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
