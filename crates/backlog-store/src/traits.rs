//! Collaborator traits
//!
//! The pipeline talks to persistence and authorization only through these
//! traits. Inserts are batched: one call per phase, all-or-nothing, and the
//! returned records are in the same order as the input.

use crate::error::StoreResult;
use async_trait::async_trait;
use backlog_model::{
    EpicId, EpicRecord, IssueId, IssueRecord, NewEpic, NewIssue, NewProject, NewSprint,
    ProjectId, ProjectRecord, SprintId, SprintRecord, UserId,
};

/// Persistence of backlog entities
#[async_trait]
pub trait BacklogStore: Send + Sync {
    // ========================================================================
    // INSERTS
    // ========================================================================

    /// Insert a project; its code must be unused.
    async fn insert_project(&self, project: NewProject) -> StoreResult<ProjectRecord>;

    /// Insert sprints in one batch.
    async fn insert_sprints(&self, sprints: Vec<NewSprint>) -> StoreResult<Vec<SprintRecord>>;

    /// Insert epics in one batch.
    async fn insert_epics(&self, epics: Vec<NewEpic>) -> StoreResult<Vec<EpicRecord>>;

    /// Insert stories or tasks in one batch.
    async fn insert_issues(&self, issues: Vec<NewIssue>) -> StoreResult<Vec<IssueRecord>>;

    // ========================================================================
    // DELETES (compensation)
    // ========================================================================

    /// Delete a project row. Returns whether it existed.
    async fn delete_project(&self, id: ProjectId) -> StoreResult<bool>;

    /// Delete sprints by id. Returns the number removed.
    async fn delete_sprints(&self, ids: &[SprintId]) -> StoreResult<usize>;

    /// Delete epics by id. Returns the number removed.
    async fn delete_epics(&self, ids: &[EpicId]) -> StoreResult<usize>;

    /// Delete issues by id. Returns the number removed.
    async fn delete_issues(&self, ids: &[IssueId]) -> StoreResult<usize>;

    // ========================================================================
    // READS
    // ========================================================================

    /// Get a project by id.
    async fn project(&self, id: ProjectId) -> StoreResult<Option<ProjectRecord>>;

    /// Whether a project already uses `code`.
    async fn project_code_exists(&self, code: &str) -> StoreResult<bool>;

    /// Sprints of a project, in schedule order.
    async fn sprints_for_project(&self, id: ProjectId) -> StoreResult<Vec<SprintRecord>>;

    /// Epics of a project, in insertion order.
    async fn epics_for_project(&self, id: ProjectId) -> StoreResult<Vec<EpicRecord>>;

    /// Stories and tasks of a project, in insertion order.
    async fn issues_for_project(&self, id: ProjectId) -> StoreResult<Vec<IssueRecord>>;
}

/// Outcome of a permission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDecision {
    pub can_create: bool,
    /// Why creation was refused
    pub reason: Option<String>,
}

impl PermissionDecision {
    /// Creation allowed
    #[inline]
    #[must_use]
    pub fn allow() -> Self {
        Self {
            can_create: true,
            reason: None,
        }
    }

    /// Creation refused
    #[inline]
    #[must_use]
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            can_create: false,
            reason: Some(reason.into()),
        }
    }
}

/// Decides whether a user may create projects
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    /// Check project creation rights of `user`
    async fn can_create_project(&self, user: UserId) -> StoreResult<PermissionDecision>;
}
