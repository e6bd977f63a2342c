// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project entity and `repoPath` extraction from a free-text description.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefixes recognized when extracting a filesystem path from a project
/// description, in priority order (first match wins). See §3.
const REPO_PATH_PREFIXES: &[&str] = &["Filesystem:", "Path:", "Directory:", "Location:"];

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ProjectCodeError {
    #[error("project code must be non-empty and uppercase ascii/digits: {0:?}")]
    Invalid(String),
}

/// An uppercase project code, e.g. `ACME`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectCode(String);

impl ProjectCode {
    pub fn new(s: impl AsRef<str>) -> Result<Self, ProjectCodeError> {
        let s = s.as_ref();
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
            return Err(ProjectCodeError::Invalid(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProjectCode {
    type Err = ProjectCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A project as known to the sync orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub identifier: ProjectCode,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<PathBuf>,
}

impl Project {
    pub fn new(identifier: ProjectCode, name: impl Into<String>) -> Self {
        Self { identifier, name: name.into(), description: None, repo_path: None }
    }

    /// Build a project, deriving `repo_path` from `description` per
    /// [`parse_repo_path`].
    pub fn from_description(
        identifier: ProjectCode,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        let repo_path = description.as_deref().and_then(parse_repo_path);
        Self { identifier, name: name.into(), description, repo_path }
    }
}

/// Extract an absolute filesystem path from a project description.
///
/// Recognizes `Filesystem:`, `Path:`, `Directory:`, `Location:` prefixes
/// (first match wins, case-sensitive, prefix may appear anywhere in the
/// text). The matched value is trimmed and stripped of trailing
/// `,`, `;`, `.`, and must begin with `/` to be accepted.
pub fn parse_repo_path(description: &str) -> Option<PathBuf> {
    for prefix in REPO_PATH_PREFIXES {
        if let Some(idx) = description.find(prefix) {
            let rest = &description[idx + prefix.len()..];
            let value = rest.lines().next().unwrap_or(rest).trim();
            let value = value.trim_end_matches([',', ';', '.']);
            if value.starts_with('/') {
                return Some(PathBuf::from(value));
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
