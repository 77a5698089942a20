//! Compensation of partially completed imports
//!
//! Every successful write registers the step that undoes it. When a later
//! phase fails, the log is replayed newest first so children are deleted
//! before their parents. The project step runs last and also removes any
//! row still attached to the project, which covers writes that committed
//! without their ids being recorded (a short batch, a store timeout).

use backlog_model::{EpicId, IssueId, ProjectId, SprintId};
use backlog_store::{BacklogStore, StoreResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// COMPENSATION STEPS
// ============================================================================

/// Undo step for one successful write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Compensation {
    /// Delete the project created by the import
    Project { id: ProjectId },
    /// Delete a batch of sprints
    Sprints { ids: Vec<SprintId> },
    /// Delete a batch of epics
    Epics { ids: Vec<EpicId> },
    /// Delete a batch of stories or tasks
    Issues { ids: Vec<IssueId> },
}

impl Compensation {
    /// Short label for logs and reports
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Project { id } => format!("proyecto {id}"),
            Self::Sprints { ids } => format!("{} sprints", ids.len()),
            Self::Epics { ids } => format!("{} épicas", ids.len()),
            Self::Issues { ids } => format!("{} incidencias", ids.len()),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Project { .. } => false,
            Self::Sprints { ids } => ids.is_empty(),
            Self::Epics { ids } => ids.is_empty(),
            Self::Issues { ids } => ids.is_empty(),
        }
    }

    async fn undo(&self, store: &dyn BacklogStore) -> Result<(), String> {
        let outcome = match self {
            Self::Project { id } => delete_project_tree(store, *id).await,
            Self::Sprints { ids } => store.delete_sprints(ids).await,
            Self::Epics { ids } => store.delete_epics(ids).await,
            Self::Issues { ids } => store.delete_issues(ids).await,
        };
        match outcome {
            Ok(deleted) => {
                tracing::debug!(step = %self.label(), deleted, "compensation step done");
                Ok(())
            }
            Err(err) => Err(err.to_string()),
        }
    }
}

/// Delete a project and every sprint, epic and issue that still points at it
async fn delete_project_tree(store: &dyn BacklogStore, id: ProjectId) -> StoreResult<usize> {
    let issues: Vec<IssueId> = store
        .issues_for_project(id)
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();
    let epics: Vec<EpicId> = store
        .epics_for_project(id)
        .await?
        .into_iter()
        .map(|e| e.id)
        .collect();
    let sprints: Vec<SprintId> = store
        .sprints_for_project(id)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    let mut deleted = 0;
    if !issues.is_empty() {
        deleted += store.delete_issues(&issues).await?;
    }
    if !epics.is_empty() {
        deleted += store.delete_epics(&epics).await?;
    }
    if !sprints.is_empty() {
        deleted += store.delete_sprints(&sprints).await?;
    }
    if deleted > 0 {
        tracing::warn!(project_id = %id, deleted, "removed rows missing from the compensation log");
    }
    Ok(deleted + usize::from(store.delete_project(id).await?))
}

// ============================================================================
// LOG
// ============================================================================

/// Outcome of replaying a compensation log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompensationReport {
    /// Steps that were undone, in execution order
    pub undone: Vec<String>,
    /// Steps that could not be undone, with the store error
    pub failures: Vec<String>,
}

impl CompensationReport {
    /// True when every step was undone
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ordered record of the writes of one import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompensationLog {
    steps: Vec<Compensation>,
}

impl CompensationLog {
    /// Create empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the undo step of a write; empty batches are ignored
    pub fn record(&mut self, step: Compensation) {
        if !step.is_empty() {
            self.steps.push(step);
        }
    }

    /// Recorded steps, oldest first
    #[must_use]
    pub fn steps(&self) -> &[Compensation] {
        &self.steps
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Undo every step, newest first
    ///
    /// A failing step does not stop the replay; it is reported and the
    /// remaining steps still run.
    pub async fn run(self, store: &dyn BacklogStore) -> CompensationReport {
        let mut report = CompensationReport::default();
        for step in self.steps.into_iter().rev() {
            match step.undo(store).await {
                Ok(()) => report.undone.push(step.label()),
                Err(err) => {
                    tracing::warn!(step = %step.label(), error = %err, "compensation step failed");
                    report.failures.push(format!("{}: {err}", step.label()));
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use backlog_model::{
        EpicBasicInfo, EpicPriority, EpicRecord, IssueRecord, NewEpic, NewIssue, NewProject,
        NewSprint, ProjectRecord, SprintRecord, UserId,
    };
    use backlog_scheduler::{SchedulerConfig, SprintPlanner};
    use chrono::NaiveDate;
    use backlog_store::{MemoryStore, StoreError, StoreResult, Table};
    use parking_lot::Mutex;

    /// Records delete calls and fails sprint deletes
    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl BacklogStore for RecordingStore {
        async fn insert_project(&self, _: NewProject) -> StoreResult<ProjectRecord> {
            Err(StoreError::Unavailable("read only".to_string()))
        }
        async fn insert_sprints(&self, _: Vec<NewSprint>) -> StoreResult<Vec<SprintRecord>> {
            Err(StoreError::Unavailable("read only".to_string()))
        }
        async fn insert_epics(&self, _: Vec<NewEpic>) -> StoreResult<Vec<EpicRecord>> {
            Err(StoreError::Unavailable("read only".to_string()))
        }
        async fn insert_issues(&self, _: Vec<NewIssue>) -> StoreResult<Vec<IssueRecord>> {
            Err(StoreError::Unavailable("read only".to_string()))
        }
        async fn delete_project(&self, _: ProjectId) -> StoreResult<bool> {
            self.calls.lock().push("project");
            Ok(true)
        }
        async fn delete_sprints(&self, _: &[SprintId]) -> StoreResult<usize> {
            self.calls.lock().push("sprints");
            Err(StoreError::Rejected {
                table: Table::Sprints,
                reason: "bloqueado".to_string(),
            })
        }
        async fn delete_epics(&self, ids: &[EpicId]) -> StoreResult<usize> {
            self.calls.lock().push("epics");
            Ok(ids.len())
        }
        async fn delete_issues(&self, ids: &[IssueId]) -> StoreResult<usize> {
            self.calls.lock().push("issues");
            Ok(ids.len())
        }
        async fn project(&self, _: ProjectId) -> StoreResult<Option<ProjectRecord>> {
            Ok(None)
        }
        async fn project_code_exists(&self, _: &str) -> StoreResult<bool> {
            Ok(false)
        }
        async fn sprints_for_project(&self, _: ProjectId) -> StoreResult<Vec<SprintRecord>> {
            Ok(Vec::new())
        }
        async fn epics_for_project(&self, _: ProjectId) -> StoreResult<Vec<EpicRecord>> {
            Ok(Vec::new())
        }
        async fn issues_for_project(&self, _: ProjectId) -> StoreResult<Vec<IssueRecord>> {
            Ok(Vec::new())
        }
    }

    fn full_log() -> CompensationLog {
        let mut log = CompensationLog::new();
        log.record(Compensation::Project { id: ProjectId::new() });
        log.record(Compensation::Sprints {
            ids: vec![SprintId::new()],
        });
        log.record(Compensation::Epics {
            ids: vec![EpicId::new()],
        });
        log.record(Compensation::Issues {
            ids: vec![IssueId::new(), IssueId::new()],
        });
        log
    }

    #[test]
    fn empty_batches_are_not_recorded() {
        let mut log = CompensationLog::new();
        log.record(Compensation::Issues { ids: Vec::new() });
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn replays_newest_first_and_continues_past_failures() {
        let store = RecordingStore::default();
        let report = full_log().run(&store).await;

        assert_eq!(
            *store.calls.lock(),
            vec!["issues", "epics", "sprints", "project"]
        );
        assert_eq!(report.undone.len(), 3);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].contains("bloqueado"));
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn project_delete_frees_code() {
        let store = MemoryStore::new();
        let project = store
            .insert_project(NewProject {
                name: "Tienda".to_string(),
                code: "TIE".to_string(),
                description: None,
                owner_id: UserId::new(),
            })
            .await
            .unwrap();

        let mut log = CompensationLog::new();
        log.record(Compensation::Project { id: project.id });
        let report = log.run(&store).await;

        assert!(report.is_complete());
        assert!(!store.project_code_exists("TIE").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn project_step_removes_unrecorded_rows() {
        let store = MemoryStore::new();
        let project = store
            .insert_project(NewProject {
                name: "Tienda".to_string(),
                code: "TIE".to_string(),
                description: None,
                owner_id: UserId::new(),
            })
            .await
            .unwrap();
        let planned = SprintPlanner::with_config(
            SchedulerConfig::new().with_start_date(NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()),
        )
        .plan(
            &[EpicBasicInfo::new("EP-01", "Pagos", 2, EpicPriority::Alta)],
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        )
        .unwrap();
        let sprints = store
            .insert_sprints(planned.iter().map(|p| p.to_new_sprint(project.id)).collect())
            .await
            .unwrap();

        // only the project was logged; the sprint insert was never recorded
        let mut log = CompensationLog::new();
        log.record(Compensation::Project { id: project.id });
        let report = log.run(&store).await;

        assert!(report.is_complete());
        assert_eq!(sprints.len(), 1);
        assert_eq!(store.len(Table::Sprints), 0);
        assert!(store.is_empty());
    }
}
