// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `MemorySinkAdapter` (C3, §6): best-effort write sink for the memory-store
//! agent service. Callers swallow errors (§1: out of scope beyond its
//! contract shape) rather than treat them as workflow failures.

use async_trait::async_trait;
use vs_core::ActivityError;

#[async_trait]
pub trait MemorySinkAdapter: Send + Sync + 'static {
    async fn update_block(
        &self,
        agent_id: &str,
        label: &str,
        value: &str,
    ) -> Result<(), ActivityError>;
}
