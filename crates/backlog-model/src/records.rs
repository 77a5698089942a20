//! Persistence records
//!
//! `New*` types are what the pipeline asks the store to insert; `*Record`
//! types are what the store returns: the generated id, a creation
//! timestamp, and the inserted fields echoed back.

use crate::enums::{EpicHealth, EpicPriority, IssuePriority, IssueType, SprintStatus, WorkStatus};
use crate::ids::{EpicId, IssueId, ProjectId, SprintId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Project to insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    /// Short unique code, e.g. "CRM"
    pub code: String,
    pub description: Option<String>,
    pub owner_id: UserId,
}

/// Persisted project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub project: NewProject,
}

/// Sprint to insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSprint {
    pub project_id: ProjectId,
    /// Key of the epic this sprint was generated for
    pub epic_key: String,
    /// 1-based position in the schedule
    pub sequence: u32,
    pub name: String,
    pub goal: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Estimated capacity in story points
    pub capacity: u32,
    pub status: SprintStatus,
}

/// Persisted sprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintRecord {
    pub id: SprintId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub sprint: NewSprint,
}

/// Epic to insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEpic {
    pub project_id: ProjectId,
    /// Document-local key
    pub key: String,
    pub title: String,
    pub objective: String,
    pub priority: EpicPriority,
    pub estimated_weeks: u32,
    pub sprint_id: Option<SprintId>,
    pub health: EpicHealth,
    pub status: WorkStatus,
}

/// Persisted epic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpicRecord {
    pub id: EpicId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub epic: NewEpic,
}

/// Issue (story or task) to insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIssue {
    pub project_id: ProjectId,
    /// Document-local key
    pub key: String,
    pub issue_type: IssueType,
    pub title: String,
    pub description: Option<String>,
    pub epic_id: Option<EpicId>,
    /// Parent story, tasks only
    pub parent_id: Option<IssueId>,
    pub sprint_id: Option<SprintId>,
    pub priority: IssuePriority,
    pub story_points: u32,
    pub labels: Vec<String>,
    pub acceptance_criteria: Vec<String>,
    pub definition_of_done: Vec<String>,
    pub assignee_id: Option<UserId>,
    pub reporter_id: UserId,
    pub status: WorkStatus,
}

/// Persisted issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub id: IssueId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub issue: NewIssue,
}

impl IssueRecord {
    /// True for story rows of the shared issue table
    #[inline]
    #[must_use]
    pub fn is_story(&self) -> bool {
        self.issue.issue_type == IssueType::Story
    }

    /// True for task rows of the shared issue table
    #[inline]
    #[must_use]
    pub fn is_task(&self) -> bool {
        self.issue.issue_type == IssueType::Task
    }
}
