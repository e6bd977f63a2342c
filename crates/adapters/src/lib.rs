// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vs-adapters: the external capability interfaces (C3, §6). The core
//! depends only on these traits — concrete Tracker/RepoLog/Docs/Memory
//! implementations are collaborators outside this repository's scope (§1).
//!
//! Every method returns [`vs_core::ActivityError`] directly so call sites
//! get §7's retryable/non-retryable classification for free, with no
//! adapter-specific error type to convert at the boundary.

pub mod docs;
pub mod memory;
pub mod repo_log;
pub mod tracker;

#[cfg(any(test, feature = "test-support"))]
pub mod fakes;

pub use docs::{
    DocsAdapter, DocsBook, DocsBookContents, DocsChapterSummary, DocsPage, DocsPageDraft,
    DocsPageUpdate, DocsTask, DocsTaskUpsert,
};
pub use memory::MemorySinkAdapter;
pub use repo_log::{RepoLogAdapter, RepoLogIssue, RepoLogUpsert};
pub use tracker::{IssueDraft, IssueUpdate, TrackerAdapter, TrackerIssue};

#[cfg(any(test, feature = "test-support"))]
pub use fakes::{FakeDocsAdapter, FakeMemorySinkAdapter, FakeRepoLogAdapter, FakeTrackerAdapter};
