// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical identifier: the Tracker-style `PROJ-N` primary key of SyncState.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::project::ProjectCode;

/// A stable `PROJ-N` identifier, the primary key of every SyncState row.
///
/// `PROJ` is an uppercase project code and `N` a positive integer. Items
/// created in non-Tracker systems are not indexed until a canonical id
/// exists for them (§3).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalId(String);

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CanonicalIdError {
    #[error("canonical id {0:?} is missing a `-` separator")]
    MissingSeparator(String),
    #[error("canonical id {0:?} has a non-uppercase or empty project prefix")]
    InvalidPrefix(String),
    #[error("canonical id {0:?} has a non-numeric or non-positive suffix")]
    InvalidNumber(String),
}

impl CanonicalId {
    /// Build a canonical id from a known-good project code and issue number.
    /// Does not validate `number > 0`; callers constructing from trusted
    /// adapter data may pass through whatever the tracker returns.
    pub fn new(project: &ProjectCode, number: u64) -> Self {
        Self(format!("{}-{}", project.as_str(), number))
    }

    pub fn parse(s: impl AsRef<str>) -> Result<Self, CanonicalIdError> {
        let s = s.as_ref();
        let (prefix, suffix) = s
            .rsplit_once('-')
            .ok_or_else(|| CanonicalIdError::MissingSeparator(s.to_string()))?;
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return Err(CanonicalIdError::InvalidPrefix(s.to_string()));
        }
        match suffix.parse::<u64>() {
            Ok(0) | Err(_) => return Err(CanonicalIdError::InvalidNumber(s.to_string())),
            Ok(_) => {}
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `PROJ` prefix of this id, used to enforce "every SyncState row
    /// belongs to exactly one project; `canonicalId.prefix == project`" (§3).
    pub fn project_prefix(&self) -> &str {
        self.0.rsplit_once('-').map(|(p, _)| p).unwrap_or(&self.0)
    }
}

/// Extract every `tracker:PROJ-N` label from a label set (§4.5 phase3b,
/// phase3c; §4.4 RepoLog File Watcher). An issue carrying more than one
/// such label fans out to one update per label rather than only the
/// first match — see DESIGN.md's "Multiple `tracker:` labels" entry.
pub fn extract_tracker_labels<'a>(labels: impl IntoIterator<Item = &'a String>) -> Vec<CanonicalId> {
    labels
        .into_iter()
        .filter_map(|l| l.strip_prefix("tracker:").and_then(|rest| CanonicalId::parse(rest).ok()))
        .collect()
}

impl FromStr for CanonicalId {
    type Err = CanonicalIdError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CanonicalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "canonical_id_tests.rs"]
mod tests;
