// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! zstd-compressed snapshot persistence for crash recovery.
//!
//! Snapshots store the complete [`MaterializedSyncState`] at a point in
//! time, identified by the WAL sequence number it was taken at. Recovery
//! loads the snapshot and replays WAL entries after that sequence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::migration::{MigrationError, MigrationRegistry};
use crate::state::MaterializedSyncState;

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

const ZSTD_LEVEL: i32 = 3;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "v")]
    pub version: u32,
    pub seq: u64,
    pub state: MaterializedSyncState,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(seq: u64, state: MaterializedSyncState) -> Self {
        Self { version: CURRENT_SNAPSHOT_VERSION, seq, state, created_at: Utc::now() }
    }
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`. The
/// oldest backup is removed when the limit is reached.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

/// Writes and reads zstd-compressed [`Snapshot`]s at a fixed path.
pub struct Checkpointer {
    path: PathBuf,
}

impl Checkpointer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let json = serde_json::to_vec(snapshot)?;
        let tmp_path = self.path.with_extension("tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut encoder = zstd::stream::write::Encoder::new(BufWriter::new(file), ZSTD_LEVEL)?;
            encoder.write_all(&json)?;
            encoder.finish()?.flush()?;
        }
        if self.path.exists() {
            let bak = rotate_bak_path(&self.path);
            fs::rename(&self.path, bak)?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    pub fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        load_snapshot(&self.path)
    }
}

/// Load and decompress the snapshot at `path`, migrating it to
/// [`CURRENT_SNAPSHOT_VERSION`] if it was written by an older build.
/// Returns `Ok(None)` if no snapshot exists yet (first run).
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(path)?;
    let mut decoder = zstd::stream::read::Decoder::new(BufReader::new(file))?;
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw)?;

    let value: serde_json::Value = serde_json::from_slice(&raw)?;
    let migrated = MigrationRegistry::new().migrate_to(value, CURRENT_SNAPSHOT_VERSION)?;
    let snapshot: Snapshot = serde_json::from_value(migrated)?;
    Ok(Some(snapshot))
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
