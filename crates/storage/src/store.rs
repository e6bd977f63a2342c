// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The SyncState Store (C2, §4.2): WAL-backed, snapshot-checkpointed,
//! conflict-key-on-canonical-id persistence for [`SyncStateRow`]s and
//! [`DocsPageRow`]s.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::RwLock;
use vs_core::{CanonicalId, ProjectCode};

use crate::snapshot::{Checkpointer, Snapshot};
use crate::state::{DocsPageRow, MaterializedSyncState, SyncOp, SyncStateRow, SyncStateUpdate};
use crate::wal::{Wal, WalError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Wal(#[from] WalError),
    #[error(transparent)]
    Snapshot(#[from] crate::snapshot::SnapshotError),
}

/// Per-system timestamps, the hot path for the engine's conflict check
/// fast path (§4.2, §4.3 step 2).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemTimestamps {
    pub tracker: Option<u64>,
    pub repo_log: Option<u64>,
    pub docs: Option<u64>,
}

/// Scope of a [`Store::mark_deleted`] call — currently always whole-row;
/// kept as an explicit type so a future per-system deletion scope doesn't
/// require touching every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScope {
    Row,
}

/// The durable SyncState + DocsPage store.
///
/// Single-writer-per-process: internally synchronized with an `RwLock` so
/// readers (conflict check, reconciler, queries) never block each other,
/// but writes are serialized, matching §4.2's "readers never block
/// writers" guarantee under a single-process daemon.
pub struct Store {
    wal: RwLock<Wal>,
    state: RwLock<MaterializedSyncState>,
    checkpointer: Checkpointer,
}

impl Store {
    /// Open the store at `wal_path`/`snapshot_path`, replaying the WAL on
    /// top of the last snapshot (or from scratch if none exists).
    pub fn open(wal_path: &Path, snapshot_path: &Path) -> Result<Self, StoreError> {
        let checkpointer = Checkpointer::new(snapshot_path);
        let (mut state, processed_seq) = match checkpointer.load()? {
            Some(Snapshot { state, seq, .. }) => (state, seq),
            None => (MaterializedSyncState::default(), 0),
        };

        let mut wal = Wal::open(wal_path, processed_seq)?;
        while let Some(entry) = wal.next_unprocessed()? {
            state.apply(&entry.op);
            wal.mark_processed(entry.seq);
        }

        Ok(Self { wal: RwLock::new(wal), state: RwLock::new(state), checkpointer })
    }

    fn append_and_apply(&self, op: SyncOp) -> Result<(), StoreError> {
        let mut wal = self.wal.write();
        let seq = wal.append(&op)?;
        wal.flush()?;
        wal.mark_processed(seq);
        drop(wal);
        self.state.write().apply(&op);
        Ok(())
    }

    /// `Upsert(row)`: merge-by-canonical-id, atomic per row (§4.2).
    pub fn upsert(
        &self,
        canonical_id: CanonicalId,
        project: ProjectCode,
        title: impl Into<String>,
        update: SyncStateUpdate,
    ) -> Result<(), StoreError> {
        self.append_and_apply(SyncOp::UpsertRow { canonical_id, project, title: title.into(), update })
    }

    /// `UpsertBatch(rows)`: single WAL transaction, all-or-nothing.
    pub fn upsert_batch(
        &self,
        rows: Vec<(CanonicalId, ProjectCode, String, SyncStateUpdate)>,
    ) -> Result<(), StoreError> {
        let ops: Vec<SyncOp> = rows
            .into_iter()
            .map(|(canonical_id, project, title, update)| SyncOp::UpsertRow { canonical_id, project, title, update })
            .collect();

        let mut wal = self.wal.write();
        let mut seqs = Vec::with_capacity(ops.len());
        for op in &ops {
            seqs.push(wal.append(op)?);
        }
        wal.flush()?;
        for seq in seqs {
            wal.mark_processed(seq);
        }
        drop(wal);

        let mut state = self.state.write();
        for op in &ops {
            state.apply(op);
        }
        Ok(())
    }

    /// `GetTimestamps(canonicalId)` — hot path for conflict check.
    pub fn get_timestamps(&self, canonical_id: &CanonicalId) -> Option<SystemTimestamps> {
        let state = self.state.read();
        state.rows.get(canonical_id).map(|row| SystemTimestamps {
            tracker: row.tracker_modified_at,
            repo_log: row.repo_log_modified_at,
            docs: row.docs_modified_at,
        })
    }

    /// `GetState(canonicalId) -> row|nil`.
    pub fn get_state(&self, canonical_id: &CanonicalId) -> Option<SyncStateRow> {
        self.state.read().rows.get(canonical_id).cloned()
    }

    /// `GetStateBatch(canonicalIds) -> map`.
    pub fn get_state_batch(&self, canonical_ids: &[CanonicalId]) -> HashMap<CanonicalId, SyncStateRow> {
        let state = self.state.read();
        canonical_ids
            .iter()
            .filter_map(|id| state.rows.get(id).map(|row| (id.clone(), row.clone())))
            .collect()
    }

    /// `ListByProject(project) -> iterator`, materialized eagerly since the
    /// underlying map requires the read lock to be held only transiently.
    pub fn list_by_project(&self, project: &ProjectCode) -> Vec<SyncStateRow> {
        self.state.read().rows.values().filter(|row| &row.project == project).cloned().collect()
    }

    /// `MarkDeleted(canonicalId, scope)`.
    pub fn mark_deleted(&self, canonical_id: CanonicalId, _scope: DeleteScope) -> Result<(), StoreError> {
        self.append_and_apply(SyncOp::MarkDeleted { canonical_id })
    }

    /// `HardDelete(canonicalId)`.
    pub fn hard_delete(&self, canonical_id: CanonicalId) -> Result<(), StoreError> {
        self.append_and_apply(SyncOp::HardDelete { canonical_id })
    }

    /// `UpsertPage`.
    pub fn upsert_page(&self, page: DocsPageRow) -> Result<(), StoreError> {
        self.append_and_apply(SyncOp::UpsertPage(page))
    }

    /// `GetPageByPath`.
    pub fn get_page_by_path(&self, project: &ProjectCode, local_relative_path: &str) -> Option<DocsPageRow> {
        self.state
            .read()
            .pages
            .get(local_relative_path)
            .filter(|page| &page.project == project)
            .cloned()
    }

    /// `GetPagesByProject`.
    pub fn get_pages_by_project(&self, project: &ProjectCode) -> Vec<DocsPageRow> {
        self.state.read().pages.values().filter(|page| &page.project == project).cloned().collect()
    }

    /// `SetLastExport(project, t)`.
    pub fn set_last_export(&self, project: ProjectCode, at_ms: u64) -> Result<(), StoreError> {
        self.append_and_apply(SyncOp::SetLastExport { project, at_ms })
    }

    pub fn last_export_at(&self, project: &ProjectCode) -> Option<u64> {
        self.state.read().last_export_at.get(project).copied()
    }

    /// Take a fresh snapshot of the current materialized state at the
    /// WAL's current processed sequence, then truncate the WAL to entries
    /// after that point.
    pub fn checkpoint(&self) -> Result<(), StoreError> {
        let state = self.state.read().clone();
        let seq = self.wal.read().processed_seq();
        self.checkpointer.save(&Snapshot::new(seq, state))?;
        self.wal.write().truncate_before(seq + 1)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
