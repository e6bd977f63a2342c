// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fakes for every adapter trait, gated behind `test-support`.
//! Each fake supports scripted failures so callers can exercise §7's
//! retryable/non-retryable propagation without a real network boundary.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use vs_core::{ActivityError, CanonicalId, Project, ProjectCode};

use crate::docs::{
    DocsAdapter, DocsBook, DocsBookContents, DocsPage, DocsPageDraft, DocsPageUpdate, DocsTask,
    DocsTaskUpsert,
};
use crate::memory::MemorySinkAdapter;
use crate::repo_log::{RepoLogAdapter, RepoLogIssue, RepoLogUpsert};
use crate::tracker::{IssueDraft, IssueUpdate, TrackerAdapter, TrackerIssue};

#[cfg(test)]
#[path = "fakes_tests.rs"]
mod tests;

/// A queued failure a fake returns once, then falls through to normal
/// behavior. `None` in the queue means "succeed".
type FailureQueue = Mutex<HashMap<String, Vec<Option<ActivityError>>>>;

fn next_failure(queue: &FailureQueue, key: &str) -> Option<ActivityError> {
    let mut queue = queue.lock();
    let entry = queue.get_mut(key)?;
    if entry.is_empty() {
        return None;
    }
    entry.remove(0)
}

// ── TrackerAdapter ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeTrackerAdapter {
    pub projects: Mutex<Vec<Project>>,
    pub issues: Mutex<HashMap<CanonicalId, TrackerIssue>>,
    pub next_number: Mutex<HashMap<ProjectCode, u64>>,
    failures: FailureQueue,
}

impl FakeTrackerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_project(&self, project: Project) {
        self.projects.lock().push(project);
    }

    pub fn seed_issue(&self, issue: TrackerIssue) {
        self.issues.lock().insert(issue.id.clone(), issue);
    }

    /// Queue `op` (e.g. `"get_issue"`) to fail once with `err`.
    pub fn fail_once(&self, op: &str, err: ActivityError) {
        self.failures.lock().entry(op.to_string()).or_default().push(Some(err));
    }
}

#[async_trait]
impl TrackerAdapter for FakeTrackerAdapter {
    async fn list_projects(&self) -> Result<Vec<Project>, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "list_projects") {
            return Err(e);
        }
        Ok(self.projects.lock().clone())
    }

    async fn list_issues_bulk(
        &self,
        projects: &[ProjectCode],
        limit: usize,
    ) -> Result<HashMap<ProjectCode, Vec<TrackerIssue>>, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "list_issues_bulk") {
            return Err(e);
        }
        let issues = self.issues.lock();
        let mut out = HashMap::new();
        for project in projects {
            let mut items: Vec<TrackerIssue> = issues
                .values()
                .filter(|i| i.id.project_prefix() == project.as_str())
                .cloned()
                .collect();
            items.truncate(limit);
            out.insert(project.clone(), items);
        }
        Ok(out)
    }

    async fn get_issue(&self, id: &CanonicalId) -> Result<TrackerIssue, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "get_issue") {
            return Err(e);
        }
        self.issues
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| ActivityError::NotFound(id.to_string()))
    }

    async fn create_issue(
        &self,
        project: &ProjectCode,
        draft: IssueDraft,
    ) -> Result<TrackerIssue, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "create_issue") {
            return Err(e);
        }
        let mut counters = self.next_number.lock();
        let n = counters.entry(project.clone()).or_insert(1);
        let id = CanonicalId::new(project, *n);
        *n += 1;
        drop(counters);

        let issue = TrackerIssue {
            id: id.clone(),
            title: draft.title,
            description: draft.description,
            status: draft.status.unwrap_or_else(|| "Backlog".to_string()),
            priority: draft.priority.unwrap_or_default(),
            parent: draft.parent,
            modified_at: 0,
        };
        self.issues.lock().insert(id, issue.clone());
        Ok(issue)
    }

    async fn update_issue(
        &self,
        id: &CanonicalId,
        update: IssueUpdate,
    ) -> Result<TrackerIssue, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "update_issue") {
            return Err(e);
        }
        let mut issues = self.issues.lock();
        let issue = issues.get_mut(id).ok_or_else(|| ActivityError::NotFound(id.to_string()))?;
        if let Some(v) = update.title {
            issue.title = v;
        }
        if let Some(v) = update.description {
            issue.description = Some(v);
        }
        if let Some(v) = update.status {
            issue.status = v;
        }
        if let Some(v) = update.priority {
            issue.priority = v;
        }
        if let Some(v) = update.parent {
            issue.parent = Some(v);
        }
        Ok(issue.clone())
    }
}

// ── RepoLogAdapter ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeRepoLogAdapter {
    pub issues: Mutex<HashMap<PathBuf, Vec<RepoLogIssue>>>,
    pub repo_paths: Mutex<HashMap<ProjectCode, PathBuf>>,
    pub commits: Mutex<Vec<(PathBuf, String)>>,
    next_id: Mutex<u64>,
    failures: FailureQueue,
}

impl FakeRepoLogAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_issue(&self, repo_path: &Path, issue: RepoLogIssue) {
        self.issues.lock().entry(repo_path.to_path_buf()).or_default().push(issue);
    }

    pub fn seed_repo_path(&self, project: ProjectCode, path: PathBuf) {
        self.repo_paths.lock().insert(project, path);
    }

    pub fn fail_once(&self, op: &str, err: ActivityError) {
        self.failures.lock().entry(op.to_string()).or_default().push(Some(err));
    }
}

#[async_trait]
impl RepoLogAdapter for FakeRepoLogAdapter {
    async fn init(&self, repo_path: &Path, _project: &ProjectCode) -> Result<(), ActivityError> {
        if let Some(e) = next_failure(&self.failures, "init") {
            return Err(e);
        }
        self.issues.lock().entry(repo_path.to_path_buf()).or_default();
        Ok(())
    }

    async fn list_issues(&self, repo_path: &Path) -> Result<Vec<RepoLogIssue>, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "list_issues") {
            return Err(e);
        }
        Ok(self.issues.lock().get(repo_path).cloned().unwrap_or_default())
    }

    async fn get_issue(&self, id: &str, repo_path: &Path) -> Result<RepoLogIssue, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "get_issue") {
            return Err(e);
        }
        self.issues
            .lock()
            .get(repo_path)
            .and_then(|items| items.iter().find(|i| i.id == id).cloned())
            .ok_or_else(|| ActivityError::NotFound(id.to_string()))
    }

    async fn upsert(
        &self,
        repo_path: &Path,
        issue: RepoLogUpsert,
    ) -> Result<RepoLogIssue, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "upsert") {
            return Err(e);
        }
        let mut all = self.issues.lock();
        let items = all.entry(repo_path.to_path_buf()).or_default();

        if let Some(id) = &issue.id {
            if let Some(existing) = items.iter_mut().find(|i| &i.id == id) {
                existing.title = issue.title;
                if issue.description.is_some() {
                    existing.description = issue.description;
                }
                if let Some(status) = issue.status {
                    existing.status = status;
                }
                existing.labels = issue.labels;
                if issue.parent_repo_log_id.is_some() {
                    existing.parent_repo_log_id = issue.parent_repo_log_id;
                }
                return Ok(existing.clone());
            }
        }

        let mut next_id = self.next_id.lock();
        *next_id += 1;
        let created = RepoLogIssue {
            id: issue.id.unwrap_or_else(|| format!("issue-{}", *next_id)),
            title: issue.title,
            description: issue.description,
            status: issue.status.unwrap_or_else(|| "open".to_string()),
            labels: issue.labels,
            modified_at: 0,
            parent_repo_log_id: issue.parent_repo_log_id,
        };
        items.push(created.clone());
        Ok(created)
    }

    async fn commit(&self, repo_path: &Path, message: &str) -> Result<(), ActivityError> {
        if let Some(e) = next_failure(&self.failures, "commit") {
            return Err(e);
        }
        self.commits.lock().push((repo_path.to_path_buf(), message.to_string()));
        Ok(())
    }

    async fn resolve_repo_path(
        &self,
        project: &ProjectCode,
    ) -> Result<Option<PathBuf>, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "resolve_repo_path") {
            return Err(e);
        }
        Ok(self.repo_paths.lock().get(project).cloned())
    }
}

// ── DocsAdapter ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeDocsAdapter {
    pub books: Mutex<Vec<DocsBook>>,
    pub pages: Mutex<HashMap<String, DocsPage>>,
    pub tasks: Mutex<HashMap<String, DocsTask>>,
    pub peer_books: Mutex<HashMap<String, String>>,
    next_page: Mutex<u64>,
    next_task: Mutex<u64>,
    failures: FailureQueue,
}

impl FakeDocsAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_page(&self, page: DocsPage) {
        self.pages.lock().insert(page.id.clone(), page);
    }

    pub fn seed_task(&self, peer_book_id: &str, task: DocsTask) {
        self.tasks.lock().insert(task.id.clone(), task);
        self.peer_books.lock().entry(peer_book_id.to_string()).or_insert_with(|| peer_book_id.to_string());
    }

    pub fn fail_once(&self, op: &str, err: ActivityError) {
        self.failures.lock().entry(op.to_string()).or_default().push(Some(err));
    }
}

#[async_trait]
impl DocsAdapter for FakeDocsAdapter {
    async fn list_books(&self) -> Result<Vec<DocsBook>, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "list_books") {
            return Err(e);
        }
        Ok(self.books.lock().clone())
    }

    async fn get_book_contents(&self, book_id: &str) -> Result<DocsBookContents, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "get_book_contents") {
            return Err(e);
        }
        let page_ids = self
            .pages
            .lock()
            .values()
            .filter(|p| p.book_id == book_id)
            .map(|p| p.id.clone())
            .collect();
        Ok(DocsBookContents { chapters: Vec::new(), page_ids })
    }

    async fn get_page(&self, page_id: &str) -> Result<DocsPage, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "get_page") {
            return Err(e);
        }
        self.pages
            .lock()
            .get(page_id)
            .cloned()
            .ok_or_else(|| ActivityError::NotFound(page_id.to_string()))
    }

    async fn create_page(&self, draft: DocsPageDraft) -> Result<DocsPage, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "create_page") {
            return Err(e);
        }
        let mut next = self.next_page.lock();
        *next += 1;
        let page = DocsPage {
            id: format!("page-{}", *next),
            book_id: draft.book_id,
            chapter_id: draft.chapter_id,
            name: draft.name,
            content: draft.content,
            modified_at: 0,
        };
        self.pages.lock().insert(page.id.clone(), page.clone());
        Ok(page)
    }

    async fn update_page(
        &self,
        page_id: &str,
        update: DocsPageUpdate,
    ) -> Result<DocsPage, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "update_page") {
            return Err(e);
        }
        let mut pages = self.pages.lock();
        let page =
            pages.get_mut(page_id).ok_or_else(|| ActivityError::NotFound(page_id.to_string()))?;
        if let Some(v) = update.name {
            page.name = v;
        }
        if let Some(v) = update.content {
            page.content = v;
        }
        page.modified_at += 1;
        Ok(page.clone())
    }

    async fn export_page_markdown(&self, page_id: &str) -> Result<String, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "export_page_markdown") {
            return Err(e);
        }
        let pages = self.pages.lock();
        let page =
            pages.get(page_id).ok_or_else(|| ActivityError::NotFound(page_id.to_string()))?;
        Ok(format!("# {}\n\n{}", page.name, page.content))
    }

    async fn create_chapter(&self, _book_id: &str, name: &str) -> Result<String, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "create_chapter") {
            return Err(e);
        }
        Ok(format!("chapter-{name}"))
    }

    async fn ensure_project_peer(&self, project: &str) -> Result<String, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "ensure_project_peer") {
            return Err(e);
        }
        let mut peers = self.peer_books.lock();
        Ok(peers.entry(project.to_string()).or_insert_with(|| format!("peer-{project}")).clone())
    }

    async fn list_tasks(&self, peer_book_id: &str) -> Result<Vec<DocsTask>, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "list_tasks") {
            return Err(e);
        }
        let _ = peer_book_id;
        Ok(self.tasks.lock().values().cloned().collect())
    }

    async fn get_task(&self, task_id: &str) -> Result<DocsTask, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "get_task") {
            return Err(e);
        }
        self.tasks
            .lock()
            .get(task_id)
            .cloned()
            .ok_or_else(|| ActivityError::NotFound(task_id.to_string()))
    }

    async fn upsert_task(
        &self,
        peer_book_id: &str,
        task: DocsTaskUpsert,
    ) -> Result<DocsTask, ActivityError> {
        if let Some(e) = next_failure(&self.failures, "upsert_task") {
            return Err(e);
        }
        let mut tasks = self.tasks.lock();
        if let Some(id) = &task.id {
            if let Some(existing) = tasks.get_mut(id) {
                existing.title = task.title;
                if task.description.is_some() {
                    existing.description = task.description;
                }
                if let Some(status) = task.status {
                    existing.status = status;
                }
                existing.modified_at += 1;
                return Ok(existing.clone());
            }
        }
        let mut next = self.next_task.lock();
        *next += 1;
        let created = DocsTask {
            id: task.id.unwrap_or_else(|| format!("task-{}", *next)),
            title: task.title,
            description: task.description,
            status: task.status.unwrap_or_else(|| "todo".to_string()),
            modified_at: 0,
        };
        self.peer_books.lock().entry(peer_book_id.to_string()).or_insert_with(|| peer_book_id.to_string());
        tasks.insert(created.id.clone(), created.clone());
        Ok(created)
    }
}

// ── MemorySinkAdapter ────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeMemorySinkAdapter {
    pub blocks: Mutex<HashMap<(String, String), String>>,
    failures: FailureQueue,
}

impl FakeMemorySinkAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_once(&self, err: ActivityError) {
        self.failures.lock().entry("update_block".to_string()).or_default().push(Some(err));
    }
}

#[async_trait]
impl MemorySinkAdapter for FakeMemorySinkAdapter {
    async fn update_block(
        &self,
        agent_id: &str,
        label: &str,
        value: &str,
    ) -> Result<(), ActivityError> {
        if let Some(e) = next_failure(&self.failures, "update_block") {
            return Err(e);
        }
        self.blocks.lock().insert((agent_id.to_string(), label.to_string()), value.to_string());
        Ok(())
    }
}
