// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! vs-store: the durable SyncState Store (C2) — WAL + zstd snapshot
//! persistence, and the conflict-key-on-canonical-id store operations the
//! Bidirectional Sync Engine and Reconciler read and write through.

mod migration;
mod snapshot;
mod state;
mod store;
mod wal;

pub use snapshot::{load_snapshot, Checkpointer, Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::{
    DocsPageRow, DocsPageSyncStatus, MaterializedSyncState, SyncDirection, SyncOp, SyncStateRow,
    SyncStateUpdate,
};
pub use store::{DeleteScope, Store, StoreError, SystemTimestamps};
pub use wal::{Wal, WalEntry, WalError};
