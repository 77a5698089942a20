//! Pipeline phases and their uniform result shape

use crate::feedback::{Feedback, FeedbackItem, FeedbackKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight ordered phases of an import
///
/// The derived ordering is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PhaseName {
    ProjectAnalysis,
    PermissionCheck,
    ProjectCreation,
    SprintCreation,
    DetailedProcessing,
    EpicProcessing,
    StoryProcessing,
    TaskProcessing,
}

impl PhaseName {
    /// All phases in execution order
    pub const ORDER: [PhaseName; 8] = [
        PhaseName::ProjectAnalysis,
        PhaseName::PermissionCheck,
        PhaseName::ProjectCreation,
        PhaseName::SprintCreation,
        PhaseName::DetailedProcessing,
        PhaseName::EpicProcessing,
        PhaseName::StoryProcessing,
        PhaseName::TaskProcessing,
    ];

    /// Stable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProjectAnalysis => "ProjectAnalysis",
            Self::PermissionCheck => "PermissionCheck",
            Self::ProjectCreation => "ProjectCreation",
            Self::SprintCreation => "SprintCreation",
            Self::DetailedProcessing => "DetailedProcessing",
            Self::EpicProcessing => "EpicProcessing",
            Self::StoryProcessing => "StoryProcessing",
            Self::TaskProcessing => "TaskProcessing",
        }
    }
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a phase failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseFailure {
    pub kind: FeedbackKind,
    pub message: String,
}

impl PhaseFailure {
    /// Blocking failure
    #[inline]
    #[must_use]
    pub fn critical(message: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Critical,
            message: message.into(),
        }
    }

    /// Failure caused by invalid records
    #[inline]
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Validation,
            message: message.into(),
        }
    }
}

impl fmt::Display for PhaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of one phase
///
/// Phases never propagate faults past their boundary; they convert them
/// into a failed `PhaseResult` whose feedback carries the error.
#[derive(Debug, Clone)]
pub struct PhaseResult<T> {
    pub phase: PhaseName,
    pub outcome: Result<T, PhaseFailure>,
    pub feedback: Feedback,
}

impl<T> PhaseResult<T> {
    /// Successful phase
    #[must_use]
    pub fn success(phase: PhaseName, data: T, feedback: Feedback) -> Self {
        Self {
            phase,
            outcome: Ok(data),
            feedback,
        }
    }

    /// Failed phase; the failure is also recorded as an error in the feedback
    #[must_use]
    pub fn failure(phase: PhaseName, failure: PhaseFailure, mut feedback: Feedback) -> Self {
        let item = FeedbackItem::new(failure.kind, failure.message.clone());
        if !feedback.errors.contains(&item) {
            feedback.errors.push(item);
        }
        Self {
            phase,
            outcome: Err(failure),
            feedback,
        }
    }

    /// Whether the phase succeeded
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Phase output, if any
    #[inline]
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    /// Failure, if any
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&PhaseFailure> {
        self.outcome.as_ref().err()
    }

    /// Split into the typed outcome and the type-erased report
    #[must_use]
    pub fn into_report(self, elapsed_ms: u64) -> (Result<T, PhaseFailure>, PhaseReport) {
        let mut feedback = self.feedback;
        feedback.tag_phase(self.phase);
        let report = PhaseReport {
            success: self.outcome.is_ok(),
            error: self.outcome.as_ref().err().map(|e| e.message.clone()),
            feedback,
            elapsed_ms,
        };
        (self.outcome, report)
    }
}

/// Per-phase entry of the final import result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub feedback: Feedback,
    pub elapsed_ms: u64,
}
