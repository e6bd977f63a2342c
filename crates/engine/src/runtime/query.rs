// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query channel (§5, §4.6 "Progress query"): a workflow publishes a
//! snapshot of its current state; any number of readers (the CLI's
//! `sync progress` command, a status query) can poll it without blocking
//! the workflow loop. Backed by `tokio::sync::watch`, keeping the mutation
//! and read/query paths separate rather than sharing one channel.

use tokio::sync::watch;

/// A published, pollable snapshot of a running workflow's state.
/// `T` is typically a progress struct (§4.6: `{status, currentProject,
/// projectsTotal, ...}`).
pub struct QueryHandle<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> QueryHandle<T> {
    pub fn new(initial: T) -> (Self, watch::Receiver<T>) {
        let (tx, rx) = watch::channel(initial);
        (Self { tx }, rx)
    }

    /// Publish a new snapshot. Never blocks; readers observe it on their
    /// next poll.
    pub fn publish(&self, value: T) {
        let _ = self.tx.send(value);
    }

    pub fn current(&self) -> T {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_observes_published_value() {
        let (handle, rx) = QueryHandle::new(0u32);
        handle.publish(42);
        assert_eq!(*rx.borrow(), 42);
        assert_eq!(handle.current(), 42);
    }
}
