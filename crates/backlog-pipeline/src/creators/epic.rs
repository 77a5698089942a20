//! Epic creation

use crate::creators::{expect_count, reject_unresolved};
use crate::error::PipelineError;
use crate::lookup::{EpicIndex, SprintIndex};
use backlog_model::{
    Completion, EpicBasicInfo, EpicHealth, EpicPriority, Feedback, NewEpic, ProjectId,
    WorkStatus,
};
use backlog_scheduler::clean_title;
use backlog_store::BacklogStore;

/// Output of the epic creator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpicsCreated {
    pub index: EpicIndex,
}

/// Builds and persists epic records
pub struct EpicCreator<'a> {
    store: &'a dyn BacklogStore,
}

impl<'a> EpicCreator<'a> {
    /// Create creator
    #[must_use]
    pub fn new(store: &'a dyn BacklogStore) -> Self {
        Self { store }
    }

    /// Records for validated epics, each attached to its sprint
    pub fn build(
        project_id: ProjectId,
        epics: &[EpicBasicInfo],
        sprints: &SprintIndex,
        feedback: &mut Feedback,
    ) -> Result<Vec<NewEpic>, PipelineError> {
        let mut unresolved = Vec::new();
        let mut records = Vec::with_capacity(epics.len());

        for epic in epics {
            let key = epic.id.trim();
            let Some(sprint_id) = sprints.get(key) else {
                unresolved.push(PipelineError::unresolved(key, "el sprint de la épica", key));
                continue;
            };

            let objective = match epic.objective_text() {
                Some(objective) => objective.to_string(),
                None => {
                    let generated = default_objective(&epic.title);
                    feedback.complete(Completion::new(
                        key,
                        "objective",
                        generated.as_str(),
                        "la épica no tenía objetivo",
                    ));
                    generated
                }
            };

            records.push(NewEpic {
                project_id,
                key: key.to_string(),
                title: epic.title.trim().to_string(),
                objective,
                priority: epic.priority_level().unwrap_or(EpicPriority::Pendiente),
                estimated_weeks: u32::try_from(epic.estimated_weeks).unwrap_or(0),
                sprint_id: Some(sprint_id),
                health: EpicHealth::OnTrack,
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
        epics: &[EpicBasicInfo],
        sprints: &SprintIndex,
        feedback: &mut Feedback,
    ) -> Result<EpicsCreated, PipelineError> {
        let records = Self::build(project_id, epics, sprints, feedback)?;
        if records.is_empty() {
            return Ok(EpicsCreated::default());
        }

        let expected = records.len();
        let inserted = self.store.insert_epics(records).await?;
        expect_count(expected, inserted.len())?;

        tracing::info!(%project_id, epics = inserted.len(), "epics created");
        Ok(EpicsCreated {
            index: EpicIndex::from_records(&inserted),
        })
    }
}

/// Objective generated from the cleaned epic title
#[must_use]
pub fn default_objective(title: &str) -> String {
    format!(
        "Implementar y entregar las funcionalidades de {}",
        clean_title(title)
    )
}
