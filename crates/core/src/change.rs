// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Tracker webhook's change payload, modeled as a tagged variant rather
//! than the duck-typed shape the webhook actually sends (§9 Design Notes).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single entry from a Tracker webhook batch. Anything that isn't an
/// issue-class change decodes as [`Change::Other`] and is dropped before
/// it reaches the ingester's de-dup step.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind")]
pub enum Change {
    #[serde(rename = "issue")]
    Issue(IssueChange),
    #[serde(other, rename = "other")]
    Other,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IssueChange {
    pub id: String,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub modified_on: Option<u64>,
    #[serde(default)]
    pub data: Value,
}

impl IssueChange {
    /// The key used for webhook de-duplication: `identifier` if known,
    /// else the raw `id` (§4.4).
    pub fn dedup_key(&self) -> &str {
        self.identifier.as_deref().unwrap_or(&self.id)
    }
}

/// Extract the Tracker id a change should be persisted against, per the
/// fallback chain in §4.3 step 7: source's own Tracker id, else the linked
/// id, else one parsed out of the item description.
///
/// Recognizes `"Synced from Tracker: PROJ-N"` and `"Tracker Issue: PROJ-N"`,
/// in that priority order, first match anywhere in the text wins.
pub fn parse_tracker_reference(description: &str) -> Option<String> {
    const MARKERS: &[&str] = &["Synced from Tracker:", "Tracker Issue:"];
    for marker in MARKERS {
        if let Some(idx) = description.find(marker) {
            let rest = &description[idx + marker.len()..];
            let token = rest.split_whitespace().next()?;
            let token = token.trim_end_matches([',', ';', '.']);
            if crate::canonical_id::CanonicalId::parse(token).is_ok() {
                return Some(token.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "change_tests.rs"]
mod tests;
