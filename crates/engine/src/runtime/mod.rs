// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable Runtime Core (A1, §4.0): the in-process stand-in for
//! the external workflow-runtime engine assumed by §5. Provides the
//! primitives every workflow in this crate (C4-C9) is built from:
//! retryable activities, a typed continue-as-new control-flow value,
//! child-workflow spawning, and signal/query channels.
//!
//! This is deliberately not a general-purpose cluster scheduler (§1 is
//! explicit that the runtime engine's distributed-systems internals are
//! out of scope) — it is the minimal single-process durable-execution
//! layer that satisfies §5's contract: suspension points with retry,
//! cooperative cancellation, and continue-as-new history truncation.

mod activity;
mod cancel;
mod child;
mod query;

pub use activity::run_activity;
pub use cancel::CancelSignal;
pub use child::spawn_child;
pub use query::QueryHandle;

use vs_core::ActivityError;

/// The outcome of one generation of a workflow loop: either it ran to
/// completion with `Output`, or it must be re-entered with a fresh `Input`
/// — a tail-call-return primitive standing in for the source's
/// exception-based continue-as-new. Workflow driver loops match on this
/// directly; there is no string-matching or exception type to misclassify
/// (§9 Design Notes, §7 "continue-as-new is not an error").
#[derive(Debug, Clone)]
pub enum WorkflowOutcome<Input, Output> {
    ContinueAsNew(Input),
    Done(Output),
}

/// Drive a workflow loop function to completion, re-entering it with each
/// `ContinueAsNew` input until it returns `Done`. Mirrors what a real
/// workflow-runtime worker does when a workflow function returns the
/// continue-as-new control value: start a fresh run, same workflow id,
/// truncated history.
///
/// `step` takes ownership of the current input and asynchronously
/// produces the next [`WorkflowOutcome`]. Errors propagate unchanged —
/// the driver does not retry at this level (retries belong inside
/// [`run_activity`] at the activity boundary).
pub async fn drive_to_completion<Input, Output, Fut, F>(
    mut input: Input,
    mut step: F,
) -> Result<Output, ActivityError>
where
    F: FnMut(Input) -> Fut,
    Fut: std::future::Future<Output = Result<WorkflowOutcome<Input, Output>, ActivityError>>,
{
    loop {
        match step(input).await? {
            WorkflowOutcome::ContinueAsNew(next) => input = next,
            WorkflowOutcome::Done(output) => return Ok(output),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
