//! Aggregation of phase results into the final import result

use crate::error::PipelineError;
use crate::saga::CompensationReport;
use backlog_model::{
    Feedback, FeedbackItem, FeedbackKind, FullImportResult, ImportSummary, PhaseFailure,
    PhaseName, PhaseReport, PhaseResult, ProjectId,
};
use std::collections::BTreeMap;

/// Failure of a phase caused by `err`
#[must_use]
pub fn phase_failure(err: &PipelineError) -> PhaseFailure {
    PhaseFailure {
        kind: err.kind(),
        message: err.to_string(),
    }
}

/// Collects phase reports and feedback while an import runs
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    phases: BTreeMap<PhaseName, PhaseReport>,
    feedback: Feedback,
    project_id: Option<ProjectId>,
    failed_phase: Option<PhaseName>,
}

impl ImportReport {
    /// Create empty report
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished phase and hand back its typed outcome
    ///
    /// A failed phase also adds a critical item naming it to the aggregate.
    pub fn record<T>(&mut self, result: PhaseResult<T>, elapsed_ms: u64) -> Result<T, PhaseFailure> {
        let phase = result.phase;
        let (outcome, report) = result.into_report(elapsed_ms);
        self.feedback.merge(report.feedback.clone());
        self.phases.insert(phase, report);

        if let Err(failure) = &outcome {
            let mut item = FeedbackItem::new(
                FeedbackKind::Critical,
                format!("La fase {phase} falló: {}", failure.message),
            );
            item.phase = Some(phase);
            self.feedback.merge(Feedback {
                errors: vec![item],
                ..Feedback::default()
            });
            self.failed_phase = Some(phase);
        }
        outcome
    }

    /// Remember the created project
    #[inline]
    pub fn set_project(&mut self, project_id: ProjectId) {
        self.project_id = Some(project_id);
    }

    #[inline]
    #[must_use]
    pub fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    #[inline]
    #[must_use]
    pub fn failed_phase(&self) -> Option<PhaseName> {
        self.failed_phase
    }

    /// Report the outcome of compensating a failed import
    pub fn note_compensation(&mut self, report: &CompensationReport) {
        for failure in &report.failures {
            self.feedback
                .critical(format!("No se pudo deshacer {failure}; puede requerir limpieza manual"));
        }
        if !report.undone.is_empty() {
            self.feedback.suggestion(format!(
                "Se deshicieron los registros creados: {}",
                report.undone.join(", ")
            ));
        }
    }

    /// Report a project left in place after a failure
    pub fn note_manual_cleanup(&mut self, project_id: ProjectId) {
        self.feedback.suggestion(format!(
            "El proyecto {project_id} quedó creado parcialmente y puede requerir limpieza manual"
        ));
    }

    /// Final result; `summary` is kept only when every phase succeeded
    #[must_use]
    pub fn finish(self, summary: Option<ImportSummary>, rolled_back: bool) -> FullImportResult {
        let success = self.failed_phase.is_none() && self.project_id.is_some();
        FullImportResult {
            success,
            project_id: self.project_id,
            summary: summary.filter(|_| success),
            phases: self.phases,
            feedback: self.feedback,
            failed_phase: self.failed_phase,
            rolled_back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_phase_is_named_in_a_critical_error() {
        let mut report = ImportReport::new();
        let mut fb = Feedback::new();
        fb.suggestion("sin descripción");
        report
            .record(PhaseResult::success(PhaseName::ProjectAnalysis, (), fb), 3)
            .unwrap();
        let failure = report
            .record::<()>(
                PhaseResult::failure(
                    PhaseName::PermissionCheck,
                    PhaseFailure::critical("sin permisos"),
                    Feedback::new(),
                ),
                1,
            )
            .unwrap_err();

        assert_eq!(failure.message, "sin permisos");
        let result = report.finish(None, false);
        assert!(!result.success);
        assert_eq!(result.failed_phase, Some(PhaseName::PermissionCheck));
        assert_eq!(
            result.phases_run(),
            vec![PhaseName::ProjectAnalysis, PhaseName::PermissionCheck]
        );
        assert!(result
            .feedback
            .errors
            .iter()
            .any(|e| e.kind == FeedbackKind::Critical && e.message.contains("PermissionCheck")));
        assert_eq!(result.feedback.warnings.len(), 1);
        assert_eq!(
            result.feedback.warnings[0].phase,
            Some(PhaseName::ProjectAnalysis)
        );
    }

    #[test]
    fn validation_error_maps_to_validation_failure() {
        let err = PipelineError::unresolved("US-9", "la épica", "EP-99");
        let failure = phase_failure(&err);
        assert_eq!(failure.kind, FeedbackKind::Validation);
        assert!(failure.message.contains("US-9"));
    }

    #[test]
    fn success_requires_a_project() {
        let summary = ImportSummary::default();
        assert!(!ImportReport::new().finish(Some(summary.clone()), false).success);

        let mut report = ImportReport::new();
        report.set_project(ProjectId::new());
        let result = report.finish(Some(summary), false);
        assert!(result.success);
        assert!(result.summary.is_some());
    }

    #[test]
    fn compensation_failures_are_critical() {
        let mut report = ImportReport::new();
        report.note_compensation(&CompensationReport {
            undone: vec!["2 épicas".to_string()],
            failures: vec!["3 sprints: bloqueado".to_string()],
        });
        let result = report.finish(None, false);
        assert!(result.feedback.has_critical());
        assert_eq!(result.feedback.warnings.len(), 1);
    }
}
