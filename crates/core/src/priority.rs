// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Priority mapper (C1): Tracker/RepoLog priority vocabularies collapse to
//! a single rank scale, `Urgent`/`Critical` highest, default `Medium` (§4.1).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
    None,
}

crate::simple_display! {
    Priority {
        Urgent => "Urgent",
        High => "High",
        Medium => "Medium",
        Low => "Low",
        None => "None",
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    /// Numeric rank, lower is more urgent. Matches the mapping table in §4.1:
    /// `Urgent`/`Critical` -> 0, `High` -> 1, `Medium` -> 2, `Low` -> 3,
    /// `No priority`/`None`/`Minimal` -> 4.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Urgent => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
            Priority::None => 4,
        }
    }

    /// Parse a free-form priority label from either system, case
    /// insensitively. Anything unrecognized falls back to [`Priority::default`].
    pub fn parse(s: &str) -> Self {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "urgent" | "critical" => Priority::Urgent,
            "high" => Priority::High,
            "medium" | "normal" => Priority::Medium,
            "low" => Priority::Low,
            "no priority" | "none" | "minimal" => Priority::None,
            _ => Priority::default(),
        }
    }
}

#[cfg(test)]
#[path = "priority_tests.rs"]
mod tests;
