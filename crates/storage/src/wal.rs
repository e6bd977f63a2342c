// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log of [`SyncOp`] entries (§3 [EXPANDED]).
//!
//! One JSON line per entry. `processed_seq` tracks how far the in-memory
//! `MaterializedSyncState` has consumed the log; `write_seq` tracks how far
//! entries have been appended. On crash recovery the daemon replays every
//! entry with `seq > processed_seq` from the last snapshot.

use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

use crate::state::SyncOp;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One WAL line: a sequence number plus the operation it records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub op: SyncOp,
}

const FLUSH_ITEM_THRESHOLD: usize = 100;

/// Append-only log backing the SyncState store.
pub struct Wal {
    path: PathBuf,
    file: File,
    buffered: Vec<WalEntry>,
    write_seq: u64,
    processed_seq: u64,
    last_flush: Instant,
}

impl Wal {
    /// Open (creating if absent) the WAL at `path`, starting replay
    /// bookkeeping at `processed_seq` (typically the seq recorded in the
    /// last snapshot). Corrupt trailing lines are rotated to `.bak` and the
    /// valid prefix is kept, rather than failing startup.
    pub fn open(path: &Path, processed_seq: u64) -> Result<Self, WalError> {
        let mut write_seq = 0u64;
        let mut corrupt = false;

        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let mut valid_lines = Vec::new();
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<WalEntry>(&line) {
                    Ok(entry) => {
                        write_seq = write_seq.max(entry.seq);
                        valid_lines.push(line);
                    }
                    Err(_) => {
                        corrupt = true;
                        break;
                    }
                }
            }
            if corrupt {
                let bak = crate::snapshot::rotate_bak_path(path);
                fs::rename(path, &bak)?;
                let mut clean = File::create(path)?;
                for line in &valid_lines {
                    writeln!(clean, "{line}")?;
                }
                clean.flush()?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            buffered: Vec::new(),
            write_seq,
            processed_seq,
            last_flush: Instant::now(),
        })
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    /// Append `op`, returning its assigned sequence number. Buffered until
    /// [`Wal::flush`] is called or [`Wal::needs_flush`] triggers one.
    pub fn append(&mut self, op: &SyncOp) -> Result<u64, WalError> {
        self.write_seq += 1;
        let entry = WalEntry { seq: self.write_seq, op: op.clone() };
        self.buffered.push(entry);
        Ok(self.write_seq)
    }

    pub fn flush(&mut self) -> Result<(), WalError> {
        for entry in self.buffered.drain(..) {
            let line = serde_json::to_string(&entry)?;
            writeln!(self.file, "{line}")?;
        }
        self.file.flush()?;
        self.last_flush = Instant::now();
        Ok(())
    }

    /// Whether enough unflushed entries have accumulated (or enough time
    /// has passed) that the caller should flush.
    pub fn needs_flush(&self) -> bool {
        self.buffered.len() >= FLUSH_ITEM_THRESHOLD
            || (!self.buffered.is_empty() && self.last_flush.elapsed().as_secs() >= 5)
    }

    /// The next unprocessed entry, advancing `processed_seq` as entries are
    /// consumed in order. Returns entries strictly after `processed_seq`,
    /// oldest first.
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry>, WalError> {
        let entries = self.entries_after(self.processed_seq)?;
        Ok(entries.into_iter().next())
    }

    pub fn mark_processed(&mut self, seq: u64) {
        self.processed_seq = self.processed_seq.max(seq);
    }

    /// All persisted entries with `seq > after`, in order.
    pub fn entries_after(&self, after: u64) -> Result<Vec<WalEntry>, WalError> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut out = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: WalEntry = serde_json::from_str(&line)?;
            if entry.seq > after {
                out.push(entry);
            }
        }
        Ok(out)
    }

    /// Rewrite the WAL file keeping only entries with `seq >= keep_from`,
    /// called after a snapshot makes earlier entries redundant.
    pub fn truncate_before(&mut self, keep_from: u64) -> Result<(), WalError> {
        self.flush()?;
        let kept = self.entries_after(keep_from.saturating_sub(1))?;
        let mut file = File::create(&self.path)?;
        for entry in &kept {
            writeln!(file, "{}", serde_json::to_string(entry)?)?;
        }
        file.flush()?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
