//! Candidate data produced by the document analyzer
//!
//! These are the shapes the extraction service hands back. Fields that the
//! validators check (priority, task type, numeric estimates) stay raw so a
//! single bad value is reported against its record instead of failing the
//! whole response at deserialization time.

use crate::enums::{EpicPriority, TaskKind};
use serde::{Deserialize, Serialize};

/// Project-level metadata extracted from the document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectMetadata {
    /// Project name
    pub name: String,
    /// Suggested short code (e.g. "CRM")
    #[serde(alias = "code")]
    pub code_hint: Option<String>,
    /// Free-form description
    pub description: Option<String>,
}

impl ProjectMetadata {
    /// Create metadata with just a name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// With code hint
    #[inline]
    #[must_use]
    pub fn with_code_hint(mut self, code: impl Into<String>) -> Self {
        self.code_hint = Some(code.into());
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Basic information about an epic, enough to plan its sprint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EpicBasicInfo {
    /// Document-local key, e.g. "EP-01"
    pub id: String,
    /// Title
    pub title: String,
    /// Business objective
    pub objective: Option<String>,
    /// Estimated duration in weeks, valid range 1..=12
    pub estimated_weeks: i64,
    /// Raw priority label, see [`EpicPriority`]
    pub priority: String,
}

impl EpicBasicInfo {
    /// Create a new epic candidate
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        estimated_weeks: i64,
        priority: EpicPriority,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            objective: None,
            estimated_weeks,
            priority: priority.as_str().to_string(),
        }
    }

    /// With objective
    #[inline]
    #[must_use]
    pub fn with_objective(mut self, objective: impl Into<String>) -> Self {
        self.objective = Some(objective.into());
        self
    }

    /// With a raw priority label (may be outside the known set)
    #[inline]
    #[must_use]
    pub fn with_raw_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    /// Parsed priority, `None` when the label is unknown
    #[inline]
    #[must_use]
    pub fn priority_level(&self) -> Option<EpicPriority> {
        EpicPriority::parse(&self.priority)
    }

    /// Objective if present and not blank
    #[must_use]
    pub fn objective_text(&self) -> Option<&str> {
        self.objective
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Project analysis: the first analyzer pass over the document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectAnalysis {
    /// Project metadata
    pub project_metadata: ProjectMetadata,
    /// Epics in document order
    pub epics: Vec<EpicBasicInfo>,
}

impl ProjectAnalysis {
    /// Create analysis
    #[inline]
    #[must_use]
    pub fn new(project_metadata: ProjectMetadata, epics: Vec<EpicBasicInfo>) -> Self {
        Self {
            project_metadata,
            epics,
        }
    }
}

/// User story candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryImport {
    /// Document-local key, e.g. "US-01"
    pub id: String,
    /// Key of the owning epic
    pub epic_id: String,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Estimate, valid range 1..=21
    pub story_points: i64,
    /// Acceptance criteria
    pub acceptance_criteria: Vec<String>,
    /// Target persona
    pub persona: Option<String>,
}

impl StoryImport {
    /// Create a new story candidate
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        epic_id: impl Into<String>,
        title: impl Into<String>,
        story_points: i64,
    ) -> Self {
        let title = title.into();
        Self {
            id: id.into(),
            epic_id: epic_id.into(),
            description: format!("Como usuario quiero {}", title.to_lowercase()),
            title,
            story_points,
            acceptance_criteria: Vec::new(),
            persona: None,
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With acceptance criterion
    #[inline]
    #[must_use]
    pub fn with_criterion(mut self, criterion: impl Into<String>) -> Self {
        self.acceptance_criteria.push(criterion.into());
        self
    }

    /// With persona
    #[inline]
    #[must_use]
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    /// Estimate as an unsigned value, `None` when negative or too large
    #[inline]
    #[must_use]
    pub fn points(&self) -> Option<u32> {
        u32::try_from(self.story_points).ok()
    }
}

/// Technical task candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskImport {
    /// Document-local key, e.g. "T-01"
    pub id: String,
    /// Key of the parent story
    pub story_id: Option<String>,
    /// Key of the parent epic
    pub epic_id: Option<String>,
    /// Title
    pub title: String,
    /// Description
    pub description: Option<String>,
    /// Raw type label, see [`TaskKind`]
    #[serde(rename = "type")]
    pub task_type: String,
    /// Free labels
    pub labels: Vec<String>,
}

impl TaskImport {
    /// Create a new task candidate without a parent
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            task_type: kind.as_str().to_string(),
            ..Self::default()
        }
    }

    /// Attach to a story
    #[inline]
    #[must_use]
    pub fn for_story(mut self, story_id: impl Into<String>) -> Self {
        self.story_id = Some(story_id.into());
        self
    }

    /// Attach to an epic
    #[inline]
    #[must_use]
    pub fn for_epic(mut self, epic_id: impl Into<String>) -> Self {
        self.epic_id = Some(epic_id.into());
        self
    }

    /// With a raw type label (may be outside the known set)
    #[inline]
    #[must_use]
    pub fn with_raw_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = task_type.into();
        self
    }

    /// With label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Parsed type, `None` when unknown
    #[inline]
    #[must_use]
    pub fn kind(&self) -> Option<TaskKind> {
        TaskKind::parse(&self.task_type)
    }

    /// Story key if present and not blank
    #[must_use]
    pub fn story_key(&self) -> Option<&str> {
        non_blank(self.story_id.as_deref())
    }

    /// Epic key if present and not blank
    #[must_use]
    pub fn epic_key(&self) -> Option<&str> {
        non_blank(self.epic_id.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Second analyzer pass: stories and tasks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetailedContent {
    /// Story candidates
    pub stories: Vec<StoryImport>,
    /// Task candidates
    pub tasks: Vec<TaskImport>,
}

impl DetailedContent {
    /// Create detailed content
    #[inline]
    #[must_use]
    pub fn new(stories: Vec<StoryImport>, tasks: Vec<TaskImport>) -> Self {
        Self { stories, tasks }
    }

    /// True when neither stories nor tasks were extracted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty() && self.tasks.is_empty()
    }
}
