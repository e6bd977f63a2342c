// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child-workflow spawning (§4.6, §4.4): the Full Orchestrator (C7) spawns
//! a Project-Sync child per project; the ingesters (C5) spawn a
//! single-item sync child per event. Simulated as a `tokio::task` the
//! parent can await, standing in for a real cluster's child workflow.

use tokio::task::JoinHandle;
use vs_core::ActivityError;

/// Spawn `fut` as an independent child workflow run. The returned handle
/// is awaited by the parent to get the child's result, matching how C7
/// waits on each project's Project-Sync child before advancing its
/// per-project bookkeeping.
pub fn spawn_child<T>(
    fut: impl std::future::Future<Output = Result<T, ActivityError>> + Send + 'static,
) -> JoinHandle<Result<T, ActivityError>>
where
    T: Send + 'static,
{
    tokio::spawn(fut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn child_result_is_awaitable() {
        let handle = spawn_child(async { Ok::<_, ActivityError>(5) });
        assert_eq!(handle.await.unwrap().unwrap(), 5);
    }

    #[tokio::test]
    async fn child_error_propagates() {
        let handle =
            spawn_child(async { Err::<u32, _>(ActivityError::NotFound("x".into())) });
        assert!(handle.await.unwrap().is_err());
    }
}
