//! Time budgets for collaborator calls
//!
//! [`TimedStore`] wraps any [`BacklogStore`] and bounds each call with
//! `tokio::time::timeout`; an expired call surfaces as
//! [`StoreError::Unavailable`]. Analyzer calls are bounded with
//! [`with_timeout`].

use crate::error::PipelineError;
use async_trait::async_trait;
use backlog_model::{
    EpicId, EpicRecord, IssueId, IssueRecord, NewEpic, NewIssue, NewProject, NewSprint,
    ProjectId, ProjectRecord, SprintId, SprintRecord,
};
use backlog_store::{BacklogStore, StoreError, StoreResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Await `fut`, failing with [`PipelineError::Timeout`] once `limit` elapses
pub async fn with_timeout<T, E, F>(
    operation: &'static str,
    limit: Option<Duration>,
    fut: F,
) -> Result<T, PipelineError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<PipelineError>,
{
    match limit {
        None => fut.await.map_err(Into::into),
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => {
                tracing::warn!(operation, limit_secs = limit.as_secs(), "collaborator call timed out");
                Err(PipelineError::Timeout {
                    operation,
                    duration_secs: limit.as_secs(),
                })
            }
        },
    }
}

/// Store decorator enforcing a per-call time budget
#[derive(Clone)]
pub struct TimedStore {
    inner: Arc<dyn BacklogStore>,
    limit: Option<Duration>,
}

impl std::fmt::Debug for TimedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedStore")
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl TimedStore {
    /// Wrap `inner`; `None` disables the budget
    #[must_use]
    pub fn new(inner: Arc<dyn BacklogStore>, limit: Option<Duration>) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>> + Send,
    {
        match self.limit {
            None => fut.await,
            Some(limit) => tokio::time::timeout(limit, fut).await.unwrap_or_else(|_| {
                tracing::warn!(operation, limit_secs = limit.as_secs(), "store call timed out");
                Err(StoreError::Unavailable(format!(
                    "{operation} superó el tiempo límite de {}s",
                    limit.as_secs()
                )))
            }),
        }
    }
}

#[async_trait]
impl BacklogStore for TimedStore {
    async fn insert_project(&self, project: NewProject) -> StoreResult<ProjectRecord> {
        self.bounded("insert_project", self.inner.insert_project(project))
            .await
    }

    async fn insert_sprints(&self, sprints: Vec<NewSprint>) -> StoreResult<Vec<SprintRecord>> {
        self.bounded("insert_sprints", self.inner.insert_sprints(sprints))
            .await
    }

    async fn insert_epics(&self, epics: Vec<NewEpic>) -> StoreResult<Vec<EpicRecord>> {
        self.bounded("insert_epics", self.inner.insert_epics(epics)).await
    }

    async fn insert_issues(&self, issues: Vec<NewIssue>) -> StoreResult<Vec<IssueRecord>> {
        self.bounded("insert_issues", self.inner.insert_issues(issues))
            .await
    }

    async fn delete_project(&self, id: ProjectId) -> StoreResult<bool> {
        self.bounded("delete_project", self.inner.delete_project(id)).await
    }

    async fn delete_sprints(&self, ids: &[SprintId]) -> StoreResult<usize> {
        self.bounded("delete_sprints", self.inner.delete_sprints(ids)).await
    }

    async fn delete_epics(&self, ids: &[EpicId]) -> StoreResult<usize> {
        self.bounded("delete_epics", self.inner.delete_epics(ids)).await
    }

    async fn delete_issues(&self, ids: &[IssueId]) -> StoreResult<usize> {
        self.bounded("delete_issues", self.inner.delete_issues(ids)).await
    }

    async fn project(&self, id: ProjectId) -> StoreResult<Option<ProjectRecord>> {
        self.bounded("project", self.inner.project(id)).await
    }

    async fn project_code_exists(&self, code: &str) -> StoreResult<bool> {
        self.bounded("project_code_exists", self.inner.project_code_exists(code))
            .await
    }

    async fn sprints_for_project(&self, id: ProjectId) -> StoreResult<Vec<SprintRecord>> {
        self.bounded("sprints_for_project", self.inner.sprints_for_project(id))
            .await
    }

    async fn epics_for_project(&self, id: ProjectId) -> StoreResult<Vec<EpicRecord>> {
        self.bounded("epics_for_project", self.inner.epics_for_project(id))
            .await
    }

    async fn issues_for_project(&self, id: ProjectId) -> StoreResult<Vec<IssueRecord>> {
        self.bounded("issues_for_project", self.inner.issues_for_project(id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;
    use backlog_store::MemoryStore;

    #[tokio::test(start_paused = true)]
    async fn slow_future_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, AnalyzerError>(())
        };
        let err = with_timeout("analyze_project", Some(Duration::from_secs(5)), slow)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Timeout {
                operation: "analyze_project",
                duration_secs: 5
            }
        ));
    }

    #[tokio::test]
    async fn unbounded_call_passes_through() {
        let result = with_timeout("noop", None, async { Ok::<_, AnalyzerError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn timed_store_delegates() {
        let store = TimedStore::new(Arc::new(MemoryStore::new()), Some(Duration::from_secs(5)));
        assert!(!store.project_code_exists("CRM").await.unwrap());
        assert!(store.project(ProjectId::new()).await.unwrap().is_none());
    }
}
