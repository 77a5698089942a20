//! Story creation

use crate::creators::{expect_count, reject_unresolved};
use crate::error::PipelineError;
use crate::lookup::{EpicIndex, StoryIndex};
use backlog_model::{
    Completion, Feedback, IssuePriority, IssueType, NewIssue, ProjectId, StoryImport, StorySize,
    UserId, WorkStatus,
};
use backlog_store::BacklogStore;

const BASE_DONE: [&str; 2] = [
    "Código revisado y aprobado",
    "Criterios de aceptación verificados",
];
const MEDIUM_DONE: [&str; 2] = [
    "Pruebas unitarias implementadas",
    "Documentación actualizada",
];
const LARGE_DONE: [&str; 2] = [
    "Pruebas de integración completadas",
    "Validado por el responsable de producto",
];

/// Definition of done for a story of `points`: 2 items, 4 from 5 points, 6 from 8
#[must_use]
pub fn definition_of_done(points: u32) -> Vec<String> {
    let mut items: Vec<&str> = BASE_DONE.to_vec();
    if points >= 5 {
        items.extend(MEDIUM_DONE);
    }
    if points >= 8 {
        items.extend(LARGE_DONE);
    }
    items.into_iter().map(str::to_string).collect()
}

/// Output of the story creator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoriesCreated {
    pub index: StoryIndex,
}

/// Builds and persists story records
pub struct StoryCreator<'a> {
    store: &'a dyn BacklogStore,
}

impl<'a> StoryCreator<'a> {
    /// Create creator
    #[must_use]
    pub fn new(store: &'a dyn BacklogStore) -> Self {
        Self { store }
    }

    /// Records for validated stories; every epic key must resolve
    pub fn build(
        project_id: ProjectId,
        stories: &[StoryImport],
        epics: &EpicIndex,
        reporter: UserId,
        feedback: &mut Feedback,
    ) -> Result<Vec<NewIssue>, PipelineError> {
        let mut unresolved = Vec::new();
        let mut records = Vec::with_capacity(stories.len());

        for story in stories {
            let key = story.id.trim();
            let Some(epic) = epics.get(&story.epic_id) else {
                unresolved.push(PipelineError::unresolved(
                    key,
                    "la épica",
                    story.epic_id.trim(),
                ));
                continue;
            };

            let points = story.points().unwrap_or(1);
            let mut labels = vec![StorySize::from_story_points(points).as_str().to_string()];
            if let Some(persona) = story.persona.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
                labels.push(format!("persona:{persona}"));
            }

            let mut criteria: Vec<String> = story
                .acceptance_criteria
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
            if criteria.is_empty() {
                let generated = format!(
                    "La funcionalidad \"{}\" se comporta según lo descrito",
                    story.title.trim()
                );
                feedback.complete(Completion::new(
                    key,
                    "acceptanceCriteria",
                    generated.as_str(),
                    "la historia no tenía criterios de aceptación",
                ));
                criteria.push(generated);
            }

            records.push(NewIssue {
                project_id,
                key: key.to_string(),
                issue_type: IssueType::Story,
                title: story.title.trim().to_string(),
                description: Some(story.description.trim().to_string()),
                epic_id: Some(epic.id),
                parent_id: None,
                sprint_id: epic.sprint_id,
                priority: IssuePriority::from_story_points(points),
                story_points: points,
                labels,
                acceptance_criteria: criteria,
                definition_of_done: definition_of_done(points),
                assignee_id: None,
                reporter_id: reporter,
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
        stories: &[StoryImport],
        epics: &EpicIndex,
        reporter: UserId,
        feedback: &mut Feedback,
    ) -> Result<StoriesCreated, PipelineError> {
        let records = Self::build(project_id, stories, epics, reporter, feedback)?;
        if records.is_empty() {
            return Ok(StoriesCreated::default());
        }

        let expected = records.len();
        let inserted = self.store.insert_issues(records).await?;
        expect_count(expected, inserted.len())?;

        tracing::info!(%project_id, stories = inserted.len(), "stories created");
        Ok(StoriesCreated {
            index: StoryIndex::from_records(&inserted),
        })
    }
}
