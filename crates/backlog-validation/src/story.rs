//! Story validation
//!
//! Only checks that a story names an epic. Whether that epic was actually
//! created is checked later, when the story is persisted.

use crate::limits::ValidationLimits;
use crate::report::{check_text, run_batch, RecordRules, ValidationReport};
use backlog_model::StoryImport;

/// Validates story candidates
#[derive(Debug, Clone, Default)]
pub struct StoryValidator {
    limits: ValidationLimits,
}

impl StoryValidator {
    /// Create validator with default limits
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create validator with custom limits
    #[inline]
    #[must_use]
    pub fn with_limits(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    /// Validate a batch of stories; an empty batch is valid
    #[must_use]
    pub fn validate(&self, stories: &[StoryImport]) -> ValidationReport<StoryImport> {
        run_batch(self, stories)
    }
}

impl RecordRules<StoryImport> for StoryValidator {
    const ENTITY_PLURAL: &'static str = "historias";

    fn key(item: &StoryImport) -> &str {
        &item.id
    }

    fn check(&self, story: &StoryImport) -> Vec<String> {
        let mut reasons = Vec::new();
        check_text(&mut reasons, "el id", &story.id, self.limits.max_id_len);
        check_text(&mut reasons, "el título", &story.title, self.limits.max_title_len);
        check_text(
            &mut reasons,
            "la descripción",
            &story.description,
            self.limits.max_description_len,
        );

        if !self.limits.story_points().contains(&story.story_points) {
            reasons.push(format!(
                "los story points deben estar entre {} y {} (valor: {})",
                self.limits.min_story_points, self.limits.max_story_points, story.story_points
            ));
        }

        if story.epic_id.trim().is_empty() {
            reasons.push("falta el epicId".to_string());
        }

        reasons
    }
}
