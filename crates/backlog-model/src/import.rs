//! Import request and the consolidated import result

use crate::feedback::Feedback;
use crate::ids::{ProjectId, SprintId, UserId};
use crate::phase::{PhaseName, PhaseReport};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Input of one import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    /// Raw specification document
    pub document: String,
    /// User creating the project
    pub uploader_id: UserId,
    /// Requested assignee for generated tasks
    #[serde(default)]
    pub assignee_id: Option<UserId>,
}

impl ImportRequest {
    /// Create request
    #[inline]
    #[must_use]
    pub fn new(document: impl Into<String>, uploader_id: UserId) -> Self {
        Self {
            document: document.into(),
            uploader_id,
            assignee_id: None,
        }
    }

    /// With requested assignee
    #[inline]
    #[must_use]
    pub fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }
}

/// Output of the project creation phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreated {
    pub project_id: ProjectId,
    pub project_code: String,
    pub project_name: String,
}

/// Link between an epic key and the sprint generated for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintMapping {
    pub epic_id: String,
    pub sprint_id: SprintId,
    pub sprint_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Output of the sprint creation phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintCreationResult {
    /// One mapping per epic, in schedule order
    pub sprints: Vec<SprintMapping>,
    pub total_sprints: usize,
}

impl SprintCreationResult {
    /// Build from mappings
    #[must_use]
    pub fn new(sprints: Vec<SprintMapping>) -> Self {
        let total_sprints = sprints.len();
        Self {
            sprints,
            total_sprints,
        }
    }
}

/// Record counts of a successful import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub project_name: String,
    pub project_code: String,
    pub sprints: usize,
    pub epics: usize,
    pub stories: usize,
    pub tasks: usize,
}

/// Terminal artifact of an import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullImportResult {
    pub success: bool,
    /// Set as soon as the project was created, even when a later phase failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ImportSummary>,
    pub phases: BTreeMap<PhaseName, PhaseReport>,
    pub feedback: Feedback,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_phase: Option<PhaseName>,
    /// True when records created before the failure were deleted again
    #[serde(default)]
    pub rolled_back: bool,
}

impl FullImportResult {
    /// Report of a phase, if it ran
    #[inline]
    #[must_use]
    pub fn phase(&self, phase: PhaseName) -> Option<&PhaseReport> {
        self.phases.get(&phase)
    }

    /// Phases that ran, in execution order
    #[must_use]
    pub fn phases_run(&self) -> Vec<PhaseName> {
        self.phases.keys().copied().collect()
    }
}
