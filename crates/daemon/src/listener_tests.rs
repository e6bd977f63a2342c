// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::tempdir;
use tokio::net::{UnixListener, UnixStream};
use vs_store::Store;
use vs_wire::{read_framed, write_framed, Request, Response};

use super::*;
use crate::deps::Collaborators;
use crate::run_state::RunState;

fn test_ctx(dir: &std::path::Path) -> Arc<DispatchCtx> {
    let store = Arc::new(Store::open(&dir.join("test.wal"), &dir.join("snap.bin")).unwrap());
    Arc::new(DispatchCtx {
        collaborators: Arc::new(Collaborators::new(store)),
        run_state: Arc::new(RunState::new()),
        start_time: Instant::now(),
    })
}

#[tokio::test]
async fn ping_over_socket_round_trips_pong() {
    let dir = tempdir().unwrap();
    let socket_path = dir.path().join("daemon.sock");
    let socket = UnixListener::bind(&socket_path).unwrap();
    let ctx = test_ctx(dir.path());
    let shutdown = Arc::new(Notify::new());

    let listener = Listener::new(socket, ctx, shutdown);
    tokio::spawn(listener.run());

    let mut client = UnixStream::connect(&socket_path).await.unwrap();
    write_framed(&mut client, &Request::Ping).await.unwrap();
    let response: Response = read_framed(&mut client).await.unwrap();
    assert!(matches!(response, Response::Pong));
}

#[tokio::test]
async fn shutdown_request_stops_the_accept_loop() {
    let dir = tempdir().unwrap();
    let socket_path = dir.path().join("daemon.sock");
    let socket = UnixListener::bind(&socket_path).unwrap();
    let ctx = test_ctx(dir.path());
    let shutdown = Arc::new(Notify::new());

    let listener = Listener::new(socket, ctx, shutdown);
    let task = tokio::spawn(listener.run());

    let mut client = UnixStream::connect(&socket_path).await.unwrap();
    write_framed(&mut client, &Request::Shutdown).await.unwrap();
    let response: Response = read_framed(&mut client).await.unwrap();
    assert!(matches!(response, Response::ShuttingDown));

    tokio::time::timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
}
