// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot schema migrations.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MigrationError {
    #[error("snapshot version {0} is newer than supported version {1}")]
    TooNew(u32, u32),
    #[error("no migration path from version {0} to {1}")]
    NoPath(u32, u32),
}

/// A single version-to-version snapshot transform.
pub trait Migration {
    fn source_version(&self) -> u32;
    fn target_version(&self) -> u32;
    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError>;
}

/// Ordered set of registered migrations, applied as a chain.
#[derive(Default)]
pub struct MigrationRegistry {
    pub(crate) migrations: Vec<Box<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self { migrations: Vec::new() }
    }

    /// Migrate a raw snapshot JSON value to `target_version`.
    ///
    /// A snapshot whose `v` field already equals `target_version` is
    /// returned unchanged. A snapshot newer than `target_version` is an
    /// error — this binary does not know how to read the future.
    pub fn migrate_to(&self, mut snapshot: Value, target_version: u32) -> Result<Value, MigrationError> {
        let current = snapshot.get("v").and_then(Value::as_u64).unwrap_or(0) as u32;

        if current == target_version {
            return Ok(snapshot);
        }
        if current > target_version {
            return Err(MigrationError::TooNew(current, target_version));
        }

        let mut version = current;
        loop {
            if version == target_version {
                break;
            }
            let step = self
                .migrations
                .iter()
                .find(|m| m.source_version() == version)
                .ok_or(MigrationError::NoPath(current, target_version))?;
            step.migrate(&mut snapshot)?;
            version = step.target_version();
            if let Some(obj) = snapshot.as_object_mut() {
                obj.insert("v".to_string(), Value::from(version));
            }
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
