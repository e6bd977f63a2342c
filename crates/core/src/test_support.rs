// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::canonical_id::CanonicalId;
use crate::change::IssueChange;
use crate::priority::Priority;
use crate::project::{Project, ProjectCode};
use crate::status::TrackerStatus;
use crate::workitem::WorkItem;
use serde_json::Value;

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core domain types.
pub mod strategies {
    use crate::priority::Priority;
    use crate::status::TrackerStatus;
    use proptest::prelude::*;

    pub fn arb_tracker_status() -> impl Strategy<Value = TrackerStatus> {
        prop_oneof![
            Just(TrackerStatus::Backlog),
            Just(TrackerStatus::Todo),
            Just(TrackerStatus::InProgress),
            Just(TrackerStatus::InReview),
            Just(TrackerStatus::Done),
            Just(TrackerStatus::Cancelled),
        ]
    }

    pub fn arb_priority() -> impl Strategy<Value = Priority> {
        prop_oneof![
            Just(Priority::Urgent),
            Just(Priority::High),
            Just(Priority::Medium),
            Just(Priority::Low),
            Just(Priority::None),
        ]
    }
}

// ── Fixture factory functions ───────────────────────────────────────────

pub fn project(code: &str, name: &str) -> Project {
    Project::new(ProjectCode::new(code).expect("test project code"), name)
}

pub fn project_with_repo_path(code: &str, name: &str, repo_path: &str) -> Project {
    Project::from_description(
        ProjectCode::new(code).expect("test project code"),
        name,
        Some(format!("Filesystem: {repo_path}")),
    )
}

pub fn work_item(canonical_id: &str, title: &str, status: TrackerStatus) -> WorkItem {
    WorkItem::new(CanonicalId::parse(canonical_id).expect("test canonical id"), title, status.to_string())
}

pub fn work_item_with_priority(
    canonical_id: &str,
    title: &str,
    status: TrackerStatus,
    priority: Priority,
) -> WorkItem {
    let mut item = work_item(canonical_id, title, status);
    item.priority = priority;
    item
}

pub fn issue_change(id: &str, identifier: &str, modified_on: u64) -> IssueChange {
    IssueChange {
        id: id.to_string(),
        identifier: Some(identifier.to_string()),
        modified_on: Some(modified_on),
        data: Value::Null,
    }
}
