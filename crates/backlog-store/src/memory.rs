//! In-memory backlog store
//!
//! Tables are `DashMap`s keyed by record id. Batch inserts are checked in
//! full before anything is written, so a rejected batch leaves no rows
//! behind. Foreign keys (project, epic, parent story, sprint) are enforced
//! the way a relational backend would.
//!
//! Failures can be injected per table to exercise the pipeline's error and
//! compensation paths.

use crate::error::{StoreError, StoreResult, Table};
use crate::traits::BacklogStore;
use async_trait::async_trait;
use backlog_model::{
    EpicId, EpicRecord, IssueId, IssueRecord, NewEpic, NewIssue, NewProject, NewSprint,
    ProjectId, ProjectRecord, SprintId, SprintRecord,
};
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stored row with its insertion sequence number
#[derive(Debug, Clone)]
struct Row<T> {
    seq: u64,
    record: T,
}

/// Thread-safe in-memory [`BacklogStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: DashMap<ProjectId, Row<ProjectRecord>>,
    /// Upper-cased project code -> owner
    codes: DashMap<String, ProjectId>,
    sprints: DashMap<SprintId, Row<SprintRecord>>,
    epics: DashMap<EpicId, Row<EpicRecord>>,
    issues: DashMap<IssueId, Row<IssueRecord>>,
    /// Injected insert failures
    failures: DashMap<Table, String>,
    sequence: AtomicU64,
    /// Serializes batch writes so checks and inserts are atomic
    write_lock: Mutex<()>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every insert into `table` fail with `reason`
    pub fn fail_on(&self, table: Table, reason: impl Into<String>) {
        self.failures.insert(table, reason.into());
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        self.failures.clear();
    }

    /// Number of rows in `table`
    #[must_use]
    pub fn len(&self, table: Table) -> usize {
        match table {
            Table::Projects => self.projects.len(),
            Table::Sprints => self.sprints.len(),
            Table::Epics => self.epics.len(),
            Table::Issues => self.issues.len(),
        }
    }

    /// True if every table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Table::ALL.iter().all(|table| self.len(*table) == 0)
    }

    fn next_seq(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    fn check_injected(&self, table: Table) -> StoreResult<()> {
        match self.failures.get(&table) {
            Some(reason) => {
                tracing::warn!(%table, reason = %*reason, "injected store failure");
                Err(StoreError::Rejected {
                    table,
                    reason: reason.clone(),
                })
            }
            None => Ok(()),
        }
    }

    fn require<K, V>(
        map: &DashMap<K, V>,
        key: &K,
        table: Table,
        target: Table,
    ) -> StoreResult<()>
    where
        K: Eq + Hash + std::fmt::Display,
    {
        if map.contains_key(key) {
            Ok(())
        } else {
            Err(StoreError::MissingReference {
                table,
                target,
                id: key.to_string(),
            })
        }
    }

    fn insert_project_sync(&self, project: NewProject) -> StoreResult<ProjectRecord> {
        let _guard = self.write_lock.lock();
        self.check_injected(Table::Projects)?;
        let id = ProjectId::new();
        match self.codes.entry(project.code.to_uppercase()) {
            Entry::Occupied(_) => return Err(StoreError::DuplicateProjectCode(project.code)),
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }
        let record = ProjectRecord {
            id,
            created_at: Utc::now(),
            project,
        };
        self.projects.insert(
            id,
            Row {
                seq: self.next_seq(),
                record: record.clone(),
            },
        );
        Ok(record)
    }

    fn insert_sprints_sync(&self, sprints: Vec<NewSprint>) -> StoreResult<Vec<SprintRecord>> {
        let _guard = self.write_lock.lock();
        self.check_injected(Table::Sprints)?;
        for sprint in &sprints {
            Self::require(&self.projects, &sprint.project_id, Table::Sprints, Table::Projects)?;
        }
        let now = Utc::now();
        Ok(sprints
            .into_iter()
            .map(|sprint| {
                let record = SprintRecord {
                    id: SprintId::new(),
                    created_at: now,
                    sprint,
                };
                self.sprints.insert(
                    record.id,
                    Row {
                        seq: self.next_seq(),
                        record: record.clone(),
                    },
                );
                record
            })
            .collect())
    }

    fn insert_epics_sync(&self, epics: Vec<NewEpic>) -> StoreResult<Vec<EpicRecord>> {
        let _guard = self.write_lock.lock();
        self.check_injected(Table::Epics)?;
        for epic in &epics {
            Self::require(&self.projects, &epic.project_id, Table::Epics, Table::Projects)?;
            if let Some(sprint_id) = &epic.sprint_id {
                Self::require(&self.sprints, sprint_id, Table::Epics, Table::Sprints)?;
            }
        }
        let now = Utc::now();
        Ok(epics
            .into_iter()
            .map(|epic| {
                let record = EpicRecord {
                    id: EpicId::new(),
                    created_at: now,
                    epic,
                };
                self.epics.insert(
                    record.id,
                    Row {
                        seq: self.next_seq(),
                        record: record.clone(),
                    },
                );
                record
            })
            .collect())
    }

    fn insert_issues_sync(&self, issues: Vec<NewIssue>) -> StoreResult<Vec<IssueRecord>> {
        let _guard = self.write_lock.lock();
        self.check_injected(Table::Issues)?;
        for issue in &issues {
            Self::require(&self.projects, &issue.project_id, Table::Issues, Table::Projects)?;
            if let Some(epic_id) = &issue.epic_id {
                Self::require(&self.epics, epic_id, Table::Issues, Table::Epics)?;
            }
            if let Some(parent_id) = &issue.parent_id {
                Self::require(&self.issues, parent_id, Table::Issues, Table::Issues)?;
            }
            if let Some(sprint_id) = &issue.sprint_id {
                Self::require(&self.sprints, sprint_id, Table::Issues, Table::Sprints)?;
            }
        }
        let now = Utc::now();
        Ok(issues
            .into_iter()
            .map(|issue| {
                let record = IssueRecord {
                    id: IssueId::new(),
                    created_at: now,
                    issue,
                };
                self.issues.insert(
                    record.id,
                    Row {
                        seq: self.next_seq(),
                        record: record.clone(),
                    },
                );
                record
            })
            .collect())
    }

    fn delete_all<K, V>(map: &DashMap<K, V>, ids: &[K]) -> usize
    where
        K: Eq + Hash,
    {
        ids.iter().filter(|id| map.remove(*id).is_some()).count()
    }

    fn collect_sorted<K, T, F>(map: &DashMap<K, Row<T>>, keep: F) -> Vec<T>
    where
        K: Eq + Hash,
        T: Clone,
        F: Fn(&T) -> bool,
    {
        let mut rows: Vec<(u64, T)> = map
            .iter()
            .filter(|row| keep(&row.record))
            .map(|row| (row.seq, row.record.clone()))
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, record)| record).collect()
    }
}

#[async_trait]
impl BacklogStore for MemoryStore {
    async fn insert_project(&self, project: NewProject) -> StoreResult<ProjectRecord> {
        let record = self.insert_project_sync(project)?;
        tracing::debug!(project_id = %record.id, code = %record.project.code, "project inserted");
        Ok(record)
    }

    async fn insert_sprints(&self, sprints: Vec<NewSprint>) -> StoreResult<Vec<SprintRecord>> {
        let records = self.insert_sprints_sync(sprints)?;
        tracing::debug!(count = records.len(), "sprints inserted");
        Ok(records)
    }

    async fn insert_epics(&self, epics: Vec<NewEpic>) -> StoreResult<Vec<EpicRecord>> {
        let records = self.insert_epics_sync(epics)?;
        tracing::debug!(count = records.len(), "epics inserted");
        Ok(records)
    }

    async fn insert_issues(&self, issues: Vec<NewIssue>) -> StoreResult<Vec<IssueRecord>> {
        let records = self.insert_issues_sync(issues)?;
        tracing::debug!(count = records.len(), "issues inserted");
        Ok(records)
    }

    async fn delete_project(&self, id: ProjectId) -> StoreResult<bool> {
        let _guard = self.write_lock.lock();
        match self.projects.remove(&id) {
            Some((_, row)) => {
                self.codes.remove(&row.record.project.code.to_uppercase());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_sprints(&self, ids: &[SprintId]) -> StoreResult<usize> {
        Ok(Self::delete_all(&self.sprints, ids))
    }

    async fn delete_epics(&self, ids: &[EpicId]) -> StoreResult<usize> {
        Ok(Self::delete_all(&self.epics, ids))
    }

    async fn delete_issues(&self, ids: &[IssueId]) -> StoreResult<usize> {
        Ok(Self::delete_all(&self.issues, ids))
    }

    async fn project(&self, id: ProjectId) -> StoreResult<Option<ProjectRecord>> {
        Ok(self.projects.get(&id).map(|row| row.record.clone()))
    }

    async fn project_code_exists(&self, code: &str) -> StoreResult<bool> {
        Ok(self.codes.contains_key(&code.to_uppercase()))
    }

    async fn sprints_for_project(&self, id: ProjectId) -> StoreResult<Vec<SprintRecord>> {
        let mut sprints = Self::collect_sorted(&self.sprints, |s| s.sprint.project_id == id);
        sprints.sort_by_key(|s| s.sprint.sequence);
        Ok(sprints)
    }

    async fn epics_for_project(&self, id: ProjectId) -> StoreResult<Vec<EpicRecord>> {
        Ok(Self::collect_sorted(&self.epics, |e| e.epic.project_id == id))
    }

    async fn issues_for_project(&self, id: ProjectId) -> StoreResult<Vec<IssueRecord>> {
        Ok(Self::collect_sorted(&self.issues, |i| i.issue.project_id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backlog_model::{
        EpicHealth, EpicPriority, IssuePriority, IssueType, SprintStatus, UserId, WorkStatus,
    };
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn new_project(code: &str) -> NewProject {
        NewProject {
            name: format!("Proyecto {code}"),
            code: code.to_string(),
            description: None,
            owner_id: UserId::new(),
        }
    }

    fn new_sprint(project_id: ProjectId, sequence: u32) -> NewSprint {
        NewSprint {
            project_id,
            epic_key: format!("EP-{sequence}"),
            sequence,
            name: format!("Sprint {sequence}: Módulo"),
            goal: "Completar desarrollo de: Módulo".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 10, 26).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 11, 6).unwrap(),
            capacity: 40,
            status: SprintStatus::Planned,
        }
    }

    fn new_epic(project_id: ProjectId, sprint_id: Option<SprintId>) -> NewEpic {
        NewEpic {
            project_id,
            key: "EP-1".to_string(),
            title: "Módulo".to_string(),
            objective: "Completar desarrollo de: Módulo".to_string(),
            priority: EpicPriority::Media,
            estimated_weeks: 2,
            sprint_id,
            health: EpicHealth::OnTrack,
            status: WorkStatus::Todo,
        }
    }

    fn new_issue(project_id: ProjectId, epic_id: Option<EpicId>) -> NewIssue {
        NewIssue {
            project_id,
            key: "US-1".to_string(),
            issue_type: IssueType::Story,
            title: "Historia".to_string(),
            description: None,
            epic_id,
            parent_id: None,
            sprint_id: None,
            priority: IssuePriority::Medium,
            story_points: 3,
            labels: Vec::new(),
            acceptance_criteria: Vec::new(),
            definition_of_done: Vec::new(),
            assignee_id: None,
            reporter_id: UserId::new(),
            status: WorkStatus::Todo,
        }
    }

    #[tokio::test]
    async fn project_codes_are_unique_case_insensitively() {
        let store = MemoryStore::new();
        store.insert_project(new_project("CRM")).await.unwrap();

        assert!(store.project_code_exists("crm").await.unwrap());
        let err = store.insert_project(new_project("crm")).await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateProjectCode("crm".to_string()));
        assert_eq!(store.len(Table::Projects), 1);
    }

    #[test]
    fn concurrent_inserts_claim_a_code_once() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.insert_project_sync(new_project("CRM")).is_ok())
            })
            .collect();

        let claimed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(claimed, 1);
        assert_eq!(store.len(Table::Projects), 1);
    }

    #[tokio::test]
    async fn batch_returns_records_in_input_order() {
        let store = MemoryStore::new();
        let project = store.insert_project(new_project("ERP")).await.unwrap();
        let sprints = store
            .insert_sprints(vec![new_sprint(project.id, 1), new_sprint(project.id, 2)])
            .await
            .unwrap();

        assert_eq!(sprints[0].sprint.sequence, 1);
        assert_eq!(sprints[1].sprint.sequence, 2);
        let listed = store.sprints_for_project(project.id).await.unwrap();
        assert_eq!(listed, sprints);
    }

    #[tokio::test]
    async fn missing_reference_rejects_whole_batch() {
        let store = MemoryStore::new();
        let project = store.insert_project(new_project("ERP")).await.unwrap();
        let batch = vec![
            new_issue(project.id, None),
            new_issue(project.id, Some(EpicId::new())),
        ];

        let err = store.insert_issues(batch).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingReference {
                table: Table::Issues,
                target: Table::Epics,
                ..
            }
        ));
        assert_eq!(store.len(Table::Issues), 0);
    }

    #[tokio::test]
    async fn injected_failure_rejects_inserts() {
        let store = MemoryStore::new();
        let project = store.insert_project(new_project("ERP")).await.unwrap();
        store.fail_on(Table::Epics, "disco lleno");

        let err = store
            .insert_epics(vec![new_epic(project.id, None)])
            .await
            .unwrap_err();
        assert_eq!(err.table(), Some(Table::Epics));
        assert_eq!(store.len(Table::Epics), 0);

        store.clear_failures();
        assert!(store.insert_epics(vec![new_epic(project.id, None)]).await.is_ok());
    }

    #[tokio::test]
    async fn deletes_free_rows_and_codes() {
        let store = MemoryStore::new();
        let project = store.insert_project(new_project("OPS")).await.unwrap();
        let sprints = store
            .insert_sprints(vec![new_sprint(project.id, 1)])
            .await
            .unwrap();
        let epics = store
            .insert_epics(vec![new_epic(project.id, Some(sprints[0].id))])
            .await
            .unwrap();
        let issues = store
            .insert_issues(vec![new_issue(project.id, Some(epics[0].id))])
            .await
            .unwrap();

        assert_eq!(store.delete_issues(&[issues[0].id]).await.unwrap(), 1);
        assert_eq!(store.delete_epics(&[epics[0].id]).await.unwrap(), 1);
        assert_eq!(store.delete_sprints(&[sprints[0].id]).await.unwrap(), 1);
        assert!(store.delete_project(project.id).await.unwrap());
        assert!(!store.delete_project(project.id).await.unwrap());

        assert!(store.is_empty());
        assert!(!store.project_code_exists("OPS").await.unwrap());
    }

    #[tokio::test]
    async fn reads_are_scoped_to_project() {
        let store = MemoryStore::new();
        let a = store.insert_project(new_project("AAA")).await.unwrap();
        let b = store.insert_project(new_project("BBB")).await.unwrap();
        store.insert_epics(vec![new_epic(a.id, None)]).await.unwrap();

        assert_eq!(store.epics_for_project(a.id).await.unwrap().len(), 1);
        assert!(store.epics_for_project(b.id).await.unwrap().is_empty());
        assert_eq!(store.project(b.id).await.unwrap().map(|p| p.id), Some(b.id));
    }
}
