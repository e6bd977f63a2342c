// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooperative cancellation signal (§5 "Cancellation"): checked at project
//! boundaries (C7), item boundaries (C5), and batch boundaries (C6/C8).
//! Thin wrapper over `tokio_util::sync::CancellationToken` so call sites
//! read in this crate's own vocabulary rather than the token's.

use tokio_util::sync::CancellationToken;

/// A cancel signal a caller can flip (`cancel()`) and a workflow loop can
/// poll (`is_cancelled()`) at its documented boundaries. Cloning shares
/// the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(CancellationToken);

impl CancelSignal {
    pub fn new() -> Self {
        Self(CancellationToken::new())
    }

    /// Flip the signal. Idempotent.
    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Resolve once cancelled; used to race against an in-flight adapter
    /// call for cooperative cancellation of a suspension point.
    pub async fn cancelled(&self) {
        self.0.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled_and_flips_once() {
        let signal = CancelSignal::new();
        assert!(!signal.is_cancelled());
        signal.cancel();
        assert!(signal.is_cancelled());
    }

    #[test]
    fn clone_shares_state() {
        let signal = CancelSignal::new();
        let clone = signal.clone();
        clone.cancel();
        assert!(signal.is_cancelled());
    }
}
