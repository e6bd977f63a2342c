// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Bidirectional Sync Engine's (C4) pure conflict decision (§4.3 steps
//! 2 and 4), separated from the I/O shell in [`crate::sync_engine`] so it
//! is unit-testable without adapters or a store.

use vs_core::SourceSystem;

/// The engine's only numeric knob (§4.3 step 4): an explicit constant
/// rather than a magic number scattered through the decision logic.
pub const CONFLICT_THRESHOLD_MS: u64 = 1000;

/// The conflict check's outcome (§4.3 step 4 / state machine in §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDecision {
    SourceWins,
    /// The incoming change is dropped; `winner`/`winner_timestamp` are
    /// returned for observability only (§4.3 step 4).
    Conflict { winner: SourceSystem, winner_timestamp: u64 },
}

/// Fast path (§4.3 step 2, §8 invariant 4): true if every entry in
/// `other_stored_timestamps` is at least [`CONFLICT_THRESHOLD_MS`] older
/// than `source_modified_at`. An absent stored timestamp (the other
/// system has never been synced) does not block the fast path — there is
/// nothing to contradict.
pub fn fast_path_source_wins(
    source_modified_at: u64,
    other_stored_timestamps: &[Option<u64>],
) -> bool {
    other_stored_timestamps.iter().all(|ts| match ts {
        None => true,
        Some(t) => source_modified_at.saturating_sub(*t) >= CONFLICT_THRESHOLD_MS,
    })
}

/// The slow-path decision (§4.3 step 4): sort all collected `(system,
/// timestamp)` pairs — including the source's own — descending by
/// timestamp. If the source is on top, it wins. Otherwise, a delta over
/// [`CONFLICT_THRESHOLD_MS`] is a conflict with the top entry as winner;
/// within the threshold the source still wins (first-come semantics).
pub fn decide(
    source: SourceSystem,
    source_modified_at: u64,
    live_timestamps: &[(SourceSystem, u64)],
) -> ConflictDecision {
    let mut all: Vec<(SourceSystem, u64)> = live_timestamps.to_vec();
    all.push((source, source_modified_at));
    all.sort_by(|a, b| b.1.cmp(&a.1));

    // Safe: `all` always has at least the source's own entry.
    let (top_system, top_ts) = all[0];
    if top_system == source {
        return ConflictDecision::SourceWins;
    }
    let delta = top_ts.saturating_sub(source_modified_at);
    if delta > CONFLICT_THRESHOLD_MS {
        ConflictDecision::Conflict { winner: top_system, winner_timestamp: top_ts }
    } else {
        ConflictDecision::SourceWins
    }
}

#[cfg(test)]
#[path = "conflict_tests.rs"]
mod tests;
