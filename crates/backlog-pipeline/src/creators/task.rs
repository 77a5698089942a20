//! Task creation
//!
//! Parent resolution prefers the story: a task with a story key hangs from
//! that story, belongs to the story's epic and inherits its sprint, falling
//! back to the epic's sprint when the story has none. A task with only an
//! epic key belongs to the epic directly.

use crate::assignment::AssignmentPolicy;
use crate::creators::{expect_count, reject_unresolved};
use crate::error::PipelineError;
use crate::lookup::{EpicIndex, StoryIndex};
use backlog_model::{
    Feedback, IssueId, IssuePriority, IssueType, NewIssue, ProjectId, TaskImport, TaskKind,
    UserId, WorkStatus,
};
use backlog_store::BacklogStore;

/// Output of the task creator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TasksCreated {
    pub ids: Vec<IssueId>,
}

/// Who a batch of tasks is created for
#[derive(Debug, Clone, Copy)]
pub struct TaskOwners {
    pub reporter: UserId,
    /// Assignee requested for the import
    pub requested_assignee: Option<UserId>,
}

/// Builds and persists task records
pub struct TaskCreator<'a> {
    store: &'a dyn BacklogStore,
    policy: &'a dyn AssignmentPolicy,
}

impl<'a> TaskCreator<'a> {
    /// Create creator
    #[must_use]
    pub fn new(store: &'a dyn BacklogStore, policy: &'a dyn AssignmentPolicy) -> Self {
        Self { store, policy }
    }

    /// Records for validated tasks; every story and epic key must resolve
    pub fn build(
        &self,
        project_id: ProjectId,
        tasks: &[TaskImport],
        epics: &EpicIndex,
        stories: &StoryIndex,
        owners: TaskOwners,
        feedback: &mut Feedback,
    ) -> Result<Vec<NewIssue>, PipelineError> {
        let assignee = self.policy.assignee(owners.requested_assignee);
        let mut unresolved = Vec::new();
        let mut records = Vec::with_capacity(tasks.len());

        for task in tasks {
            let key = task.id.trim();

            let epic = match task.epic_key() {
                Some(epic_key) => match epics.get(epic_key) {
                    Some(epic) => Some(epic),
                    None => {
                        unresolved.push(PipelineError::unresolved(key, "la épica", epic_key));
                        continue;
                    }
                },
                None => None,
            };

            let (parent_id, epic_id, sprint_id) = match task.story_key() {
                Some(story_key) => {
                    let Some(story) = stories.get(story_key) else {
                        unresolved.push(PipelineError::unresolved(key, "la historia", story_key));
                        continue;
                    };
                    if let (Some(own), Some(story_epic)) = (epic, story.epic_id) {
                        if own.id != story_epic {
                            feedback.suggestion(format!(
                                "{key}: la épica indicada no coincide con la de su historia {story_key}; se usa la de la historia"
                            ));
                        }
                    }
                    (
                        Some(story.id),
                        story.epic_id.or(epic.map(|e| e.id)),
                        story.sprint_id.or(epic.and_then(|e| e.sprint_id)),
                    )
                }
                None => match epic {
                    Some(epic) => (None, Some(epic.id), epic.sprint_id),
                    None => {
                        unresolved.push(PipelineError::Validation(format!(
                            "{key}: debe referenciar una historia o una épica"
                        )));
                        continue;
                    }
                },
            };

            let kind = task.kind();
            records.push(NewIssue {
                project_id,
                key: key.to_string(),
                issue_type: IssueType::Task,
                title: task.title.trim().to_string(),
                description: task
                    .description
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
                epic_id,
                parent_id,
                sprint_id,
                priority: kind.map_or(IssuePriority::Medium, TaskKind::default_priority),
                story_points: 1,
                labels: task_labels(task, kind),
                acceptance_criteria: Vec::new(),
                definition_of_done: Vec::new(),
                assignee_id: Some(assignee),
                reporter_id: owners.reporter,
                status: WorkStatus::Todo,
            });
        }

        reject_unresolved(unresolved)?;
        Ok(records)
    }

    /// Build and insert in one batch
    pub async fn create(
        &self,
        project_id: ProjectId,
        tasks: &[TaskImport],
        epics: &EpicIndex,
        stories: &StoryIndex,
        owners: TaskOwners,
        feedback: &mut Feedback,
    ) -> Result<TasksCreated, PipelineError> {
        let records = self.build(project_id, tasks, epics, stories, owners, feedback)?;
        if records.is_empty() {
            return Ok(TasksCreated::default());
        }

        let expected = records.len();
        let inserted = self.store.insert_issues(records).await?;
        expect_count(expected, inserted.len())?;

        tracing::info!(%project_id, tasks = inserted.len(), "tasks created");
        Ok(TasksCreated {
            ids: inserted.iter().map(|r| r.id).collect(),
        })
    }
}

/// Analyzer labels, trimmed and deduplicated, plus the type tag
fn task_labels(task: &TaskImport, kind: Option<TaskKind>) -> Vec<String> {
    let mut labels: Vec<String> = Vec::with_capacity(task.labels.len() + 1);
    let type_tag = kind.map(|k| k.as_str().to_lowercase());
    for label in task
        .labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .chain(type_tag)
    {
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}
