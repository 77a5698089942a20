//! Feedback accumulated while an import runs
//!
//! Every phase reports errors, warnings and completions. Errors and
//! warnings are classified with a [`FeedbackKind`]; completions record
//! values the pipeline generated on the caller's behalf.

use crate::phase::PhaseName;
use serde::{Deserialize, Serialize};

/// Classification of a feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackKind {
    /// Blocks the whole import
    Critical,
    /// Rejects a record
    Validation,
    /// Informational, never blocking
    Suggestion,
}

/// A single error or warning
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    pub kind: FeedbackKind,
    /// Phase that produced the item, filled in by the orchestrator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<PhaseName>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl FeedbackItem {
    /// Create item
    #[inline]
    #[must_use]
    pub fn new(kind: FeedbackKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            phase: None,
            message: message.into(),
            suggestion: None,
        }
    }

    /// With suggestion
    #[inline]
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// A value generated on the caller's behalf
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    /// Document-local key of the entity that received the value
    pub entity: String,
    pub field: String,
    pub value: String,
    pub reason: String,
}

impl Completion {
    /// Create completion
    #[inline]
    #[must_use]
    pub fn new(
        entity: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Errors, warnings and completions of one phase or of a whole import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub errors: Vec<FeedbackItem>,
    pub warnings: Vec<FeedbackItem>,
    pub completions: Vec<Completion>,
}

impl Feedback {
    /// Empty feedback
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a blocking error
    pub fn critical(&mut self, message: impl Into<String>) -> &mut Self {
        self.errors
            .push(FeedbackItem::new(FeedbackKind::Critical, message));
        self
    }

    /// Record an error of the given kind
    pub fn error(&mut self, kind: FeedbackKind, message: impl Into<String>) -> &mut Self {
        self.errors.push(FeedbackItem::new(kind, message));
        self
    }

    /// Record a rejected record that did not block the phase
    pub fn rejected(&mut self, message: impl Into<String>) -> &mut Self {
        self.warnings
            .push(FeedbackItem::new(FeedbackKind::Validation, message));
        self
    }

    /// Record an informational warning
    pub fn suggestion(&mut self, message: impl Into<String>) -> &mut Self {
        self.warnings
            .push(FeedbackItem::new(FeedbackKind::Suggestion, message));
        self
    }

    /// Record a generated value
    pub fn complete(&mut self, completion: Completion) -> &mut Self {
        self.completions.push(completion);
        self
    }

    /// Tag every item that has no phase yet
    pub fn tag_phase(&mut self, phase: PhaseName) {
        for item in self.errors.iter_mut().chain(self.warnings.iter_mut()) {
            item.phase.get_or_insert(phase);
        }
    }

    /// Merge another feedback into this one, skipping items already present
    pub fn merge(&mut self, other: Feedback) {
        merge_unique(&mut self.errors, other.errors);
        merge_unique(&mut self.warnings, other.warnings);
        merge_unique(&mut self.completions, other.completions);
    }

    /// True when at least one error was recorded
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// True when at least one critical error was recorded
    #[must_use]
    pub fn has_critical(&self) -> bool {
        self.errors.iter().any(|e| e.kind == FeedbackKind::Critical)
    }

    /// True when nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty() && self.completions.is_empty()
    }
}

fn merge_unique<T: PartialEq>(into: &mut Vec<T>, items: Vec<T>) {
    for item in items {
        if !into.contains(&item) {
            into.push(item);
        }
    }
}
