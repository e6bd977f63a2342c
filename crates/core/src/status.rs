// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status & priority mapper (C1): pure translation between the three
//! systems' status/priority vocabularies, plus the totally-ordered status
//! *rank* used for regression guards (§4.1).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tracker's canonical status vocabulary. Every status is normalized to
/// this form internally before being re-projected to RepoLog or Docs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackerStatus {
    Backlog,
    Todo,
    InProgress,
    InReview,
    Done,
    Cancelled,
}

crate::simple_display! {
    TrackerStatus {
        Backlog => "Backlog",
        Todo => "Todo",
        InProgress => "In Progress",
        InReview => "In Review",
        Done => "Done",
        Cancelled => "Cancelled",
    }
}

impl TrackerStatus {
    /// Totally-ordered rank used by the regression guard (§4.1). Unknown
    /// statuses use rank `-1` and bypass the guard (see §9 Open Questions —
    /// DESIGN.md records the decision to keep that behavior rather than
    /// reject unknown statuses).
    pub fn rank(&self) -> i8 {
        match self {
            TrackerStatus::Backlog => 0,
            TrackerStatus::Todo => 1,
            TrackerStatus::InProgress => 2,
            TrackerStatus::InReview => 3,
            TrackerStatus::Done | TrackerStatus::Cancelled => 4,
        }
    }

    /// Parse a free-form Tracker status string, case-insensitively.
    /// Returns `None` (rank `-1` territory) for anything unrecognized.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_ascii_lowercase();
        Some(match lower.as_str() {
            "backlog" => TrackerStatus::Backlog,
            "todo" => TrackerStatus::Todo,
            "in progress" => TrackerStatus::InProgress,
            "in review" => TrackerStatus::InReview,
            "done" => TrackerStatus::Done,
            "cancelled" | "canceled" => TrackerStatus::Cancelled,
            _ => return None,
        })
    }
}

/// Rank of an arbitrary status string as stored in SyncState: known Tracker
/// statuses get their rank, everything else is `-1` (bypasses the guard).
pub fn rank_of(status: &str) -> i8 {
    TrackerStatus::parse(status).map(|s| s.rank()).unwrap_or(-1)
}

/// RepoLog's raw status vocabulary (before label disambiguation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoLogStatus {
    Open,
    InProgress,
    Blocked,
    Deferred,
    Closed,
}

impl RepoLogStatus {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "open" => RepoLogStatus::Open,
            "in_progress" => RepoLogStatus::InProgress,
            "blocked" => RepoLogStatus::Blocked,
            "deferred" => RepoLogStatus::Deferred,
            "closed" => RepoLogStatus::Closed,
            _ => return None,
        })
    }

    /// Map a RepoLog status + its label set to the Tracker vocabulary,
    /// per the disambiguation rules in §4.1.
    pub fn to_tracker(self, labels: &HashSet<String>) -> TrackerStatus {
        match self {
            RepoLogStatus::Open => {
                if labels.contains("tracker:Todo") {
                    TrackerStatus::Todo
                } else {
                    TrackerStatus::Backlog
                }
            }
            RepoLogStatus::InProgress => {
                if labels.contains("tracker:In Review") {
                    TrackerStatus::InReview
                } else {
                    TrackerStatus::InProgress
                }
            }
            RepoLogStatus::Blocked => TrackerStatus::InProgress,
            RepoLogStatus::Deferred => TrackerStatus::Backlog,
            RepoLogStatus::Closed => {
                if labels.contains("tracker:Canceled") || labels.contains("tracker:Cancelled") {
                    TrackerStatus::Cancelled
                } else {
                    TrackerStatus::Done
                }
            }
        }
    }
}

/// Map a Tracker status back to a RepoLog status string plus the label
/// that should accompany it (so a later round-trip recovers the exact
/// Tracker status via [`RepoLogStatus::to_tracker`]).
pub fn tracker_to_repolog(status: &TrackerStatus) -> (&'static str, Option<&'static str>) {
    match status {
        TrackerStatus::Backlog => ("open", None),
        TrackerStatus::Todo => ("open", Some("tracker:Todo")),
        TrackerStatus::InProgress => ("in_progress", None),
        TrackerStatus::InReview => ("in_progress", Some("tracker:In Review")),
        TrackerStatus::Done => ("closed", None),
        TrackerStatus::Cancelled => ("closed", Some("tracker:Canceled")),
    }
}

/// Docs' status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocsStatus {
    Todo,
    InProgress,
    InReview,
    Done,
    Cancelled,
}

impl DocsStatus {
    /// Map a Tracker status to the Docs vocabulary by case-insensitive
    /// substring match on the Tracker form, per §4.1's rule table.
    pub fn from_tracker_form(tracker_form: &str) -> Self {
        let lower = tracker_form.to_ascii_lowercase();
        if lower.contains("cancel") {
            DocsStatus::Cancelled
        } else if lower.contains("done") || lower.contains("completed") {
            DocsStatus::Done
        } else if lower.contains("review") {
            DocsStatus::InReview
        } else if lower.contains("progress") {
            DocsStatus::InProgress
        } else {
            DocsStatus::Todo
        }
    }

    pub fn as_wire_str(self) -> &'static str {
        match self {
            DocsStatus::Todo => "todo",
            DocsStatus::InProgress => "inprogress",
            DocsStatus::InReview => "inreview",
            DocsStatus::Done => "done",
            DocsStatus::Cancelled => "cancelled",
        }
    }

    /// Parse Docs' own wire vocabulary back into [`DocsStatus`] (the
    /// inverse of [`DocsStatus::as_wire_str`]), used by callers that read a
    /// Docs task/page status rather than derive one from a Tracker form.
    pub fn parse_wire(s: &str) -> Option<Self> {
        Some(match s.to_ascii_lowercase().as_str() {
            "todo" => DocsStatus::Todo,
            "inprogress" => DocsStatus::InProgress,
            "inreview" => DocsStatus::InReview,
            "done" => DocsStatus::Done,
            "cancelled" | "canceled" => DocsStatus::Cancelled,
            _ => return None,
        })
    }

    pub fn to_tracker(self) -> TrackerStatus {
        match self {
            DocsStatus::Todo => TrackerStatus::Todo,
            DocsStatus::InProgress => TrackerStatus::InProgress,
            DocsStatus::InReview => TrackerStatus::InReview,
            DocsStatus::Done => TrackerStatus::Done,
            DocsStatus::Cancelled => TrackerStatus::Cancelled,
        }
    }
}

/// Rank guard (§4.1, invariant 3 in §8): never propagate a status whose
/// target rank is strictly less than the currently stored rank. Unknown
/// statuses (rank -1) bypass the guard.
pub fn passes_rank_guard(current_status: &str, incoming_status: &str) -> bool {
    let current = rank_of(current_status);
    let incoming = rank_of(incoming_status);
    if incoming < 0 {
        return true;
    }
    incoming >= current
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
