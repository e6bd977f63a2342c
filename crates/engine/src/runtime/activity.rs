// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `run_activity`: the retry shell every adapter call runs through (§5, §7).
//!
//! Bounded exponential backoff (2s initial, 2x coefficient, 60s cap, 5 max
//! attempts by default — [`vs_core::RetryPolicy::default`]); non-retryable
//! [`ActivityError`] kinds (`Validation`/`NotFound`/`Conflict`) surface on
//! the first attempt.

use vs_core::{ActivityError, RetryPolicy};

/// Call `op` up to `policy.max_attempts` times, sleeping the policy's
/// backoff delay between attempts, stopping immediately on a
/// non-retryable [`ActivityError`]. `op` is a factory so each attempt gets
/// its own future (a `Future` cannot be polled twice after failing).
pub async fn run_activity<T, Fut, F>(policy: &RetryPolicy, mut op: F) -> Result<T, ActivityError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, ActivityError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < policy.max_attempts => {
                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(attempt, ?delay, error = %err, "activity failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
