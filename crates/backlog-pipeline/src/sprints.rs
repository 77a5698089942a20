//! Sprint generation: plan, persist, map back

use crate::creators::expect_count;
use crate::error::PipelineError;
use crate::lookup::SprintIndex;
use backlog_model::{
    Completion, EpicBasicInfo, Feedback, ProjectId, SprintCreationResult, SprintId, SprintMapping,
};
use backlog_scheduler::SprintPlanner;
use backlog_store::BacklogStore;
use chrono::NaiveDate;

/// Output of the sprint generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintsCreated {
    pub result: SprintCreationResult,
    pub index: SprintIndex,
}

impl SprintsCreated {
    /// Ids of the persisted sprints, in schedule order
    #[must_use]
    pub fn ids(&self) -> Vec<SprintId> {
        self.result.sprints.iter().map(|m| m.sprint_id).collect()
    }
}

/// Persists one sprint per epic
pub struct SprintGenerator<'a> {
    store: &'a dyn BacklogStore,
    planner: &'a SprintPlanner,
}

impl<'a> SprintGenerator<'a> {
    /// Create generator
    #[must_use]
    pub fn new(store: &'a dyn BacklogStore, planner: &'a SprintPlanner) -> Self {
        Self { store, planner }
    }

    /// Plan sprints for `epics` starting after `today` and insert them in one batch
    ///
    /// The store returns records in request order, so the n-th record is
    /// the sprint of the n-th planned epic.
    pub async fn generate(
        &self,
        project_id: ProjectId,
        epics: &[EpicBasicInfo],
        today: NaiveDate,
        feedback: &mut Feedback,
    ) -> Result<SprintsCreated, PipelineError> {
        let plans = self.planner.plan(epics, today)?;

        for plan in plans.iter().filter(|p| p.goal_generated) {
            feedback.complete(Completion::new(
                plan.epic_id.as_str(),
                "sprintGoal",
                plan.goal.as_str(),
                "la épica no tenía objetivo",
            ));
        }

        let records = plans.iter().map(|p| p.to_new_sprint(project_id)).collect();
        let inserted = self.store.insert_sprints(records).await?;
        expect_count(plans.len(), inserted.len())?;

        let mappings: Vec<SprintMapping> = plans
            .iter()
            .zip(&inserted)
            .map(|(plan, record)| SprintMapping {
                epic_id: plan.epic_id.clone(),
                sprint_id: record.id,
                sprint_name: record.sprint.name.clone(),
                start_date: record.sprint.start_date,
                end_date: record.sprint.end_date,
            })
            .collect();

        tracing::info!(
            %project_id,
            sprints = mappings.len(),
            first_start = ?mappings.first().map(|m| m.start_date),
            "sprints created"
        );

        Ok(SprintsCreated {
            index: SprintIndex::from_mappings(&mappings),
            result: SprintCreationResult::new(mappings),
        })
    }
}
