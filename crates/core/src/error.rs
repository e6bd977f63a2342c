// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity error classification and retry policy (A1/A3, §4.0 and §7).

use std::time::Duration;

/// The outcome of an activity call, classified so `run_activity` knows
/// whether to retry. `ContinueAsNew` is not an error at all — it is the
/// typed control-flow signal workflows return instead of throwing (§9
/// Design Notes: "exceptions for continue-as-new").
#[derive(Debug, thiserror::Error)]
pub enum ActivityError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("transient failure: {0}")]
    Transient(#[source] anyhow::Error),
}

impl ActivityError {
    /// Whether `run_activity` should retry this failure. Only `Transient`
    /// is retryable; `Validation`/`NotFound`/`Conflict` are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ActivityError::Transient(_))
    }
}

/// Exponential backoff parameters for [`crate::error::ActivityError::Transient`]
/// retries, per §5: 2s initial, 2x coefficient, 60s cap, 5 attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub backoff_coefficient: f64,
    pub max_interval: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(2),
            backoff_coefficient: 2.0,
            max_interval: Duration::from_secs(60),
            max_attempts: 5,
        }
    }
}

impl RetryPolicy {
    /// The delay before the `attempt`-th retry (1-indexed: the delay
    /// before the second call overall), capped at `max_interval`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_coefficient.powi(attempt.saturating_sub(1) as i32);
        let millis = (self.initial_interval.as_millis() as f64) * factor;
        let capped = millis.min(self.max_interval.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
