// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `DocsAdapter` (C3, §6): the documentation platform. Two facets share one
//! trait, matching §6's "DocsAdapter (pages & books)" framing: the
//! page/book methods §6 names drive the Docs Mirror Engine (C9), and the
//! task methods (an extension grounded in §4.5's "Docs-like peer" —
//! DESIGN.md records the decision) drive the Project-Sync Pipeline's
//! phase1/phase2.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vs_core::ActivityError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsBook {
    pub id: String,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsChapterSummary {
    pub id: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsBookContents {
    pub chapters: Vec<DocsChapterSummary>,
    pub page_ids: Vec<String>,
}

/// A Docs page, as used by the mirror engine (C9). `content` is the raw
/// markdown body; `modified_at` drives collision resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsPage {
    pub id: String,
    pub book_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    pub name: String,
    pub content: String,
    pub modified_at: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocsPageDraft {
    pub book_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocsPageUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A task on the Docs-task peer (§4.5 phase1/phase2), keyed by the
/// platform's own task id, distinct from a [`DocsPage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsTask {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
    pub modified_at: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocsTaskUpsert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Read/write capability for the documentation platform (§6).
#[async_trait]
pub trait DocsAdapter: Send + Sync + 'static {
    async fn list_books(&self) -> Result<Vec<DocsBook>, ActivityError>;
    async fn get_book_contents(&self, book_id: &str) -> Result<DocsBookContents, ActivityError>;
    async fn get_page(&self, page_id: &str) -> Result<DocsPage, ActivityError>;
    async fn create_page(&self, draft: DocsPageDraft) -> Result<DocsPage, ActivityError>;
    async fn update_page(
        &self,
        page_id: &str,
        update: DocsPageUpdate,
    ) -> Result<DocsPage, ActivityError>;
    async fn export_page_markdown(&self, page_id: &str) -> Result<String, ActivityError>;
    async fn create_chapter(&self, book_id: &str, name: &str) -> Result<String, ActivityError>;

    /// Ensure a project's task-peer book exists, returning its id (§4.5 init phase).
    async fn ensure_project_peer(&self, project: &str) -> Result<String, ActivityError>;
    async fn list_tasks(&self, peer_book_id: &str) -> Result<Vec<DocsTask>, ActivityError>;
    async fn get_task(&self, task_id: &str) -> Result<DocsTask, ActivityError>;
    async fn upsert_task(
        &self,
        peer_book_id: &str,
        task: DocsTaskUpsert,
    ) -> Result<DocsTask, ActivityError>;
}
