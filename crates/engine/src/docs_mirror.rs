// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Docs Mirror Engine (C9, §4.8): bidirectional sync between a local
//! markdown directory tree and one Docs "book", keyed by per-page SHA-256
//! content hashing, with echo-loop suppression and Docs-wins collision
//! resolution.
//!
//! Grounded in §9's "replace prototype/mixin composition" note: every
//! operation here is a method on [`DocsMirror`], a single struct bundling
//! its fields (`docs`, `store`, `cfg`) rather than loose functions bound
//! onto an instance at runtime.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use vs_adapters::docs::{DocsAdapter, DocsBook, DocsPage, DocsPageDraft, DocsPageUpdate};
use vs_core::{ActivityError, ProjectCode, RetryPolicy};
use vs_store::{DocsPageRow, DocsPageSyncStatus, Store, SyncDirection};

use crate::runtime::run_activity;

/// Echo-loop guard window (§4.8, §9 Open Question: "a heuristic ... Expose
/// as configuration").
pub const DEFAULT_ECHO_LOOP_WINDOW_MS: u64 = 60_000;

#[derive(Debug, Clone)]
pub struct DocsMirrorConfig {
    /// Subdirectory name the book lives under within a project (§4.8
    /// layout: `{project}/{docsSubdir}/{bookSlug}/...`).
    pub docs_subdir: String,
    pub echo_loop_window_ms: u64,
}

impl Default for DocsMirrorConfig {
    fn default() -> Self {
        Self { docs_subdir: "docs".to_string(), echo_loop_window_ms: DEFAULT_ECHO_LOOP_WINDOW_MS }
    }
}

/// Why a single-file import was skipped rather than applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EchoLoopWindow,
    NoTitleHeading,
}

/// Outcome of importing one local file (local edit -> Docs, §4.8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    NoChange,
    Skipped(SkipReason),
    Created { canonical_page_id: String },
    Updated { canonical_page_id: String },
}

/// One entry of a directory import scan (§4.8 "Directory import scan").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanClassification {
    Create,
    Update,
    Skip(SkipReason),
}

#[derive(Debug, Clone, Default)]
pub struct ReconcileResult {
    pub exported: u64,
    pub imported: u64,
    pub conflicts: u64,
    pub created_remote: u64,
    pub deleted_local: u64,
    pub warnings: Vec<String>,
}

/// The fields bundle every Docs Mirror operation shares (§9's
/// mixin-composition fix).
pub struct DocsMirror {
    pub docs: Arc<dyn DocsAdapter>,
    pub store: Arc<Store>,
    pub cfg: DocsMirrorConfig,
}

fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn render(page: &DocsPage) -> String {
    format!("# {}\n\n{}", page.name, page.content)
}

/// Split raw markdown into `(title, body)`. The title is the first
/// non-blank line if it is a top-level (single `#`) heading; otherwise
/// there is no title and the whole text is body (§4.8 "require a top-level
/// `# Title` as the first H1").
fn parse_markdown(content: &str) -> (Option<String>, String) {
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(rest) = line.trim_start().strip_prefix("# ") {
            let title = rest.trim().to_string();
            if title.is_empty() {
                return (None, content.to_string());
            }
            let body: String = content
                .lines()
                .skip(idx + 1)
                .skip_while(|l| l.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            return (Some(title), body);
        }
        break;
    }
    (None, content.to_string())
}

fn slugify(name: &str) -> String {
    let mut out = String::new();
    let mut last_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}

/// Relative path of `file` under `book_root`, using `/` separators.
fn relative_of(book_root: &Path, file: &Path) -> String {
    file.strip_prefix(book_root)
        .unwrap_or(file)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

impl DocsMirror {
    pub fn new(docs: Arc<dyn DocsAdapter>, store: Arc<Store>, cfg: DocsMirrorConfig) -> Self {
        Self { docs, store, cfg }
    }

    /// Local book directory for `project`/`book`: `{project_root}/{docsSubdir}/{bookSlug}`.
    pub fn book_root(&self, project_root: &Path, book: &DocsBook) -> PathBuf {
        project_root.join(&self.cfg.docs_subdir).join(&book.slug)
    }

    /// `*.md` files under `book_root`, ignoring dot-directories (§4.8
    /// "Directory import scan").
    pub fn scan_book_dir(&self, book_root: &Path) -> Vec<PathBuf> {
        WalkDir::new(book_root)
            .into_iter()
            .filter_entry(|entry| {
                !entry
                    .file_name()
                    .to_str()
                    .map(|name| name.starts_with('.'))
                    .unwrap_or(false)
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.path().extension().and_then(|e| e.to_str()) == Some("md"))
            .map(|entry| entry.path().to_path_buf())
            .collect()
    }

    /// Classify a file for the directory import scan without applying it.
    pub fn classify(&self, project: &ProjectCode, book_root: &Path, file: &Path, now_ms: u64) -> ScanClassification {
        let relative = relative_of(book_root, file);
        let content = match std::fs::read_to_string(file) {
            Ok(c) => c,
            Err(_) => return ScanClassification::Skip(SkipReason::NoTitleHeading),
        };
        let hash = content_hash(content.as_bytes());

        match self.store.get_page_by_path(project, &relative) {
            Some(row) => {
                if let Some(last_export) = row.last_export_at {
                    if now_ms.saturating_sub(last_export) < self.cfg.echo_loop_window_ms {
                        return ScanClassification::Skip(SkipReason::EchoLoopWindow);
                    }
                }
                if row.content_hash == hash {
                    return ScanClassification::Skip(SkipReason::EchoLoopWindow);
                }
                ScanClassification::Update
            }
            None => match parse_markdown(&content).0 {
                Some(_) => ScanClassification::Create,
                None => ScanClassification::Skip(SkipReason::NoTitleHeading),
            },
        }
    }

    /// Resolve (creating if necessary) the chapter id for `file`'s parent
    /// directory relative to `book_root`. `None` when the file sits
    /// directly in the book root (§4.8 "Auto-creates chapters").
    async fn chapter_for(
        &self,
        book: &DocsBook,
        book_root: &Path,
        file: &Path,
        cache: &mut HashMap<String, String>,
    ) -> Result<Option<String>, ActivityError> {
        let relative = file.strip_prefix(book_root).unwrap_or(file);
        let mut components = relative.components();
        let first = components.next();
        let has_more = components.next().is_some();
        if !has_more {
            return Ok(None);
        }
        let slug = match first {
            Some(c) => c.as_os_str().to_string_lossy().into_owned(),
            None => return Ok(None),
        };
        if let Some(id) = cache.get(&slug) {
            return Ok(Some(id.clone()));
        }
        let book_id = book.id.clone();
        let slug_for_call = slug.clone();
        let id = run_activity(&RetryPolicy::default(), || {
            let docs = self.docs.clone();
            let book_id = book_id.clone();
            let slug_for_call = slug_for_call.clone();
            async move { docs.create_chapter(&book_id, &slug_for_call).await }
        })
        .await?;
        cache.insert(slug, id.clone());
        Ok(Some(id))
    }

    /// Import one local file: create-or-update its Docs page (§4.8
    /// "Single-file import").
    pub async fn import_file(
        &self,
        project: &ProjectCode,
        book: &DocsBook,
        book_root: &Path,
        file: &Path,
        now_ms: u64,
        chapter_cache: &mut HashMap<String, String>,
    ) -> Result<ImportOutcome, ActivityError> {
        let relative = relative_of(book_root, file);
        let content = std::fs::read_to_string(file)
            .map_err(|e| ActivityError::Transient(anyhow::anyhow!("reading {}: {e}", file.display())))?;
        let hash = content_hash(content.as_bytes());

        if let Some(existing) = self.store.get_page_by_path(project, &relative) {
            if let Some(last_export) = existing.last_export_at {
                if now_ms.saturating_sub(last_export) < self.cfg.echo_loop_window_ms {
                    return Ok(ImportOutcome::Skipped(SkipReason::EchoLoopWindow));
                }
            }
            if existing.content_hash == hash {
                return Ok(ImportOutcome::NoChange);
            }

            let (title, body) = parse_markdown(&content);
            let page_id = existing.canonical_page_id.clone();
            let update = DocsPageUpdate { name: title, content: Some(body) };
            let page = run_activity(&RetryPolicy::default(), || {
                let docs = self.docs.clone();
                let page_id = page_id.clone();
                let update = update.clone();
                async move { docs.update_page(&page_id, update).await }
            })
            .await?;

            let remote_hash = content_hash(render(&page).as_bytes());
            let row = DocsPageRow {
                content_hash: hash,
                remote_content_hash: Some(remote_hash),
                local_modified_at: Some(now_ms),
                remote_modified_at: Some(page.modified_at),
                last_import_at: Some(now_ms),
                sync_direction: SyncDirection::Import,
                sync_status: DocsPageSyncStatus::Synced,
                ..existing
            };
            self.store.upsert_page(row).map_err(|e| ActivityError::Transient(anyhow::anyhow!(e)))?;
            return Ok(ImportOutcome::Updated { canonical_page_id: page.id });
        }

        let (title, body) = match parse_markdown(&content) {
            (Some(title), body) => (title, body),
            (None, _) => return Ok(ImportOutcome::Skipped(SkipReason::NoTitleHeading)),
        };

        let chapter_id = self.chapter_for(book, book_root, file, chapter_cache).await?;
        let draft = DocsPageDraft { book_id: book.id.clone(), chapter_id: chapter_id.clone(), name: title, content: body };
        let page = run_activity(&RetryPolicy::default(), || {
            let docs = self.docs.clone();
            let draft = draft.clone();
            async move { docs.create_page(draft).await }
        })
        .await?;

        let remote_hash = content_hash(render(&page).as_bytes());
        let row = DocsPageRow {
            canonical_page_id: page.id.clone(),
            book_slug: book.slug.clone(),
            chapter_id,
            project: project.clone(),
            local_relative_path: relative,
            content_hash: hash,
            remote_content_hash: Some(remote_hash),
            local_modified_at: Some(now_ms),
            remote_modified_at: Some(page.modified_at),
            last_export_at: None,
            last_import_at: Some(now_ms),
            sync_direction: SyncDirection::Import,
            sync_status: DocsPageSyncStatus::Synced,
        };
        self.store.upsert_page(row).map_err(|e| ActivityError::Transient(anyhow::anyhow!(e)))?;
        Ok(ImportOutcome::Created { canonical_page_id: page.id })
    }

    /// Import every changed/new file under `book_root` (§4.8 "Directory
    /// import scan").
    pub async fn import_directory(
        &self,
        project: &ProjectCode,
        book: &DocsBook,
        book_root: &Path,
        now_ms: u64,
    ) -> Result<Vec<(PathBuf, ImportOutcome)>, ActivityError> {
        let mut chapter_cache = HashMap::new();
        let mut results = Vec::new();
        for file in self.scan_book_dir(book_root) {
            let outcome = self.import_file(project, book, book_root, &file, now_ms, &mut chapter_cache).await?;
            results.push((file, outcome));
        }
        Ok(results)
    }

    /// Write `page`'s content to its local file, creating or updating the
    /// SyncState row with `last_export_at = now_ms` (arms the echo-loop
    /// guard for the next import pass).
    async fn export_page_to_local(
        &self,
        project: &ProjectCode,
        book: &DocsBook,
        book_root: &Path,
        page: &DocsPage,
        existing: Option<&DocsPageRow>,
        now_ms: u64,
    ) -> Result<(), ActivityError> {
        // A brand-new remote page has no chapter-slug directory to place
        // into (the adapter only hands back a chapter *id*, not its
        // slug); it lands flat in the book root, like an unchaptered page.
        let relative = match existing {
            Some(row) => row.local_relative_path.clone(),
            None => format!("{}.md", slugify(&page.name)),
        };
        let local_path = book_root.join(&relative);
        if let Some(parent) = local_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ActivityError::Transient(anyhow::anyhow!("creating {}: {e}", parent.display())))?;
        }
        let rendered = render(page);
        std::fs::write(&local_path, &rendered)
            .map_err(|e| ActivityError::Transient(anyhow::anyhow!("writing {}: {e}", local_path.display())))?;

        let hash = content_hash(rendered.as_bytes());
        let row = DocsPageRow {
            canonical_page_id: page.id.clone(),
            book_slug: book.slug.clone(),
            chapter_id: page.chapter_id.clone(),
            project: project.clone(),
            local_relative_path: relative,
            content_hash: hash.clone(),
            remote_content_hash: Some(hash),
            local_modified_at: Some(now_ms),
            remote_modified_at: Some(page.modified_at),
            last_export_at: Some(now_ms),
            last_import_at: existing.and_then(|r| r.last_import_at),
            sync_direction: SyncDirection::Export,
            sync_status: DocsPageSyncStatus::Synced,
        };
        self.store.upsert_page(row).map_err(|e| ActivityError::Transient(anyhow::anyhow!(e)))?;
        Ok(())
    }

    /// One bidirectional reconcile pass (§4.8 "Bidirectional reconcile"):
    /// visits every remote page, every tracked-but-vanished page, and
    /// every untracked local file, applying the classification rules and
    /// Docs-wins collision resolution.
    pub async fn reconcile(
        &self,
        project: &ProjectCode,
        book: &DocsBook,
        book_root: &Path,
        now_ms: u64,
    ) -> Result<ReconcileResult, ActivityError> {
        let mut result = ReconcileResult::default();

        let contents = run_activity(&RetryPolicy::default(), || {
            let docs = self.docs.clone();
            let book_id = book.id.clone();
            async move { docs.get_book_contents(&book_id).await }
        })
        .await?;

        let mut remote_ids = std::collections::HashSet::new();
        let mut touched_paths = std::collections::HashSet::new();

        for page_id in &contents.page_ids {
            let page = run_activity(&RetryPolicy::default(), || {
                let docs = self.docs.clone();
                let page_id = page_id.clone();
                async move { docs.get_page(&page_id).await }
            })
            .await?;
            remote_ids.insert(page.id.clone());

            let existing = self
                .store
                .get_pages_by_project(project)
                .into_iter()
                .find(|row| row.canonical_page_id == page.id);

            match &existing {
                None => {
                    self.export_page_to_local(project, book, book_root, &page, None, now_ms).await?;
                    result.exported += 1;
                }
                Some(row) => {
                    touched_paths.insert(row.local_relative_path.clone());
                    let local_path = book_root.join(&row.local_relative_path);
                    let remote_hash = content_hash(render(&page).as_bytes());
                    let remote_changed = row.remote_content_hash.as_deref() != Some(remote_hash.as_str());

                    if !local_path.exists() {
                        if remote_changed {
                            self.export_page_to_local(project, book, book_root, &page, Some(row), now_ms).await?;
                            result.exported += 1;
                        } else {
                            result.warnings.push(format!(
                                "local file {} deleted but remote page unchanged; leaving remote untouched",
                                row.local_relative_path
                            ));
                        }
                        continue;
                    }

                    let local_content = std::fs::read_to_string(&local_path).map_err(|e| {
                        ActivityError::Transient(anyhow::anyhow!("reading {}: {e}", local_path.display()))
                    })?;
                    let local_hash = content_hash(local_content.as_bytes());
                    let local_changed = local_hash != row.content_hash;

                    match (remote_changed, local_changed) {
                        (true, false) => {
                            self.export_page_to_local(project, book, book_root, &page, Some(row), now_ms).await?;
                            result.exported += 1;
                        }
                        (false, true) => {
                            let (title, body) = parse_markdown(&local_content);
                            let update = DocsPageUpdate { name: title, content: Some(body) };
                            let page_id = page.id.clone();
                            let updated = run_activity(&RetryPolicy::default(), || {
                                let docs = self.docs.clone();
                                let page_id = page_id.clone();
                                let update = update.clone();
                                async move { docs.update_page(&page_id, update).await }
                            })
                            .await?;
                            let remote_hash = content_hash(render(&updated).as_bytes());
                            let updated_row = DocsPageRow {
                                content_hash: local_hash,
                                remote_content_hash: Some(remote_hash),
                                local_modified_at: Some(now_ms),
                                remote_modified_at: Some(updated.modified_at),
                                last_import_at: Some(now_ms),
                                sync_direction: SyncDirection::Import,
                                sync_status: DocsPageSyncStatus::Synced,
                                ..row.clone()
                            };
                            self.store.upsert_page(updated_row).map_err(|e| ActivityError::Transient(anyhow::anyhow!(e)))?;
                            result.imported += 1;
                        }
                        (true, true) => {
                            // Both changed: Docs wins (§4.8, §8 scenario 6).
                            self.export_page_to_local(project, book, book_root, &page, Some(row), now_ms).await?;
                            result.conflicts += 1;
                        }
                        (false, false) => {}
                    }
                }
            }
        }

        for row in self.store.get_pages_by_project(project) {
            if row.sync_status == DocsPageSyncStatus::DeletedRemote {
                continue;
            }
            if remote_ids.contains(&row.canonical_page_id) {
                continue;
            }
            let local_path = book_root.join(&row.local_relative_path);
            let _ = std::fs::remove_file(&local_path);
            let row = DocsPageRow { sync_status: DocsPageSyncStatus::DeletedRemote, ..row };
            self.store.upsert_page(row).map_err(|e| ActivityError::Transient(anyhow::anyhow!(e)))?;
            result.deleted_local += 1;
        }

        let tracked_paths: std::collections::HashSet<String> =
            self.store.get_pages_by_project(project).into_iter().map(|r| r.local_relative_path).collect();
        let mut chapter_cache = HashMap::new();
        for file in self.scan_book_dir(book_root) {
            let relative = relative_of(book_root, &file);
            if tracked_paths.contains(&relative) {
                continue;
            }
            match self.import_file(project, book, book_root, &file, now_ms, &mut chapter_cache).await? {
                ImportOutcome::Created { .. } => result.created_remote += 1,
                _ => {}
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
#[path = "docs_mirror_tests.rs"]
mod tests;
