//! Task validation

use crate::limits::ValidationLimits;
use crate::report::{check_text, run_batch, RecordRules, ValidationReport};
use backlog_model::TaskImport;

/// Validates task candidates
///
/// A task must name a story or an epic (or both); which one becomes the
/// parent is decided when the task is created.
#[derive(Debug, Clone, Default)]
pub struct TaskValidator {
    limits: ValidationLimits,
}

impl TaskValidator {
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

    /// Validate a batch of tasks; an empty batch is valid
    #[must_use]
    pub fn validate(&self, tasks: &[TaskImport]) -> ValidationReport<TaskImport> {
        run_batch(self, tasks)
    }
}

impl RecordRules<TaskImport> for TaskValidator {
    const ENTITY_PLURAL: &'static str = "tareas";

    fn key(item: &TaskImport) -> &str {
        &item.id
    }

    fn check(&self, task: &TaskImport) -> Vec<String> {
        let mut reasons = Vec::new();
        check_text(&mut reasons, "el id", &task.id, self.limits.max_id_len);
        check_text(&mut reasons, "el título", &task.title, self.limits.max_title_len);

        if task.kind().is_none() {
            reasons.push(format!(
                "tipo inválido '{}' (valores permitidos: FE, BE, OPS, DOCS, TEST)",
                task.task_type
            ));
        }

        if task.story_key().is_none() && task.epic_key().is_none() {
            reasons.push(
                "debe referenciar una historia (storyId) o una épica (epicId)".to_string(),
            );
        }

        reasons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backlog_model::TaskKind;

    #[test]
    fn task_needs_a_parent() {
        let orphan = TaskImport::new("T-1", "Configurar CI", TaskKind::Ops);
        let report = TaskValidator::new().validate(&[orphan]);
        assert!(!report.is_valid);
        assert!(report.errors[0].starts_with("T-1: "));
        assert!(report.errors[0].contains("storyId"));
    }

    #[test]
    fn either_parent_is_enough() {
        let tasks = [
            TaskImport::new("T-1", "API", TaskKind::Be).for_story("US-1"),
            TaskImport::new("T-2", "Docs", TaskKind::Docs).for_epic("EP-1"),
            TaskImport::new("T-3", "E2E", TaskKind::Test)
                .for_story("US-1")
                .for_epic("EP-1"),
        ];
        let report = TaskValidator::new().validate(&tasks);
        assert!(report.is_valid, "{:?}", report.errors);
        assert_eq!(report.valid.len(), 3);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let task = TaskImport::new("T-1", "Diseño", TaskKind::Fe)
            .with_raw_type("UX")
            .for_epic("EP-1");
        let report = TaskValidator::new().validate(&[task]);
        assert!(report.errors[0].contains("tipo inválido 'UX'"));
    }

    #[test]
    fn duplicate_task_ids() {
        let tasks = [
            TaskImport::new("T-1", "A", TaskKind::Fe).for_epic("EP-1"),
            TaskImport::new("T-1", "B", TaskKind::Fe).for_epic("EP-1"),
        ];
        let report = TaskValidator::new().validate(&tasks);
        assert!(report.errors[0].contains("duplicados"));
        assert!(report.valid.is_empty());
    }
}
