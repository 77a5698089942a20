//! Import pipeline orchestrator
//!
//! Sequences the eight phases of an import:
//! - Analyzes the document into a project and its epics
//! - Checks the uploader may create projects
//! - Persists project, sprints, epics, stories and tasks
//! - Aggregates feedback and, when configured, compensates partial imports

use crate::analyzer::{AnalyzerResponse, DocumentAnalyzer};
use crate::assignment::{policy_for, AssignmentPolicy};
use crate::config::PipelineConfig;
use crate::creators::{
    EpicCreator, EpicsCreated, ProjectCreator, StoriesCreated, StoryCreator, TaskCreator,
    TaskOwners, TasksCreated,
};
use crate::error::PipelineError;
use crate::report::{phase_failure, ImportReport};
use crate::saga::{Compensation, CompensationLog};
use crate::sprints::{SprintGenerator, SprintsCreated};
use crate::timed::{with_timeout, TimedStore};
use backlog_model::{
    DetailedContent, EpicBasicInfo, Feedback, FeedbackKind, FullImportResult, ImportRequest,
    ImportSummary, PhaseFailure, PhaseName, PhaseResult, ProjectAnalysis, ProjectCreated,
    ProjectId, UserId,
};
use backlog_scheduler::SprintPlanner;
use backlog_store::{BacklogStore, PermissionChecker, DENIED_MESSAGE};
use backlog_validation::{EpicValidator, StoryValidator, TaskValidator, ValidationReport};
use chrono::NaiveDate;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Message used when the analyzer fails without saying why
const ANALYSIS_FAILED: &str = "El análisis del documento falló";
const NO_DATA: &str = "El analizador no devolvió datos";
const NO_VALID_EPICS: &str = "Ninguna épica superó la validación";
const NO_STORIES: &str = "No se encontraron historias de usuario en el documento";
const NO_TASKS: &str = "No se encontraron tareas en el documento";

/// Runs imports against a set of collaborators
///
/// The pipeline holds no per-import state; independent imports may run
/// concurrently on one instance.
pub struct ImportPipeline {
    analyzer: Arc<dyn DocumentAnalyzer>,
    backend: Arc<dyn BacklogStore>,
    /// `backend` bounded by the configured store timeout
    store: TimedStore,
    permissions: Arc<dyn PermissionChecker>,
    assignment: Arc<dyn AssignmentPolicy>,
    planner: SprintPlanner,
    epic_validator: EpicValidator,
    story_validator: StoryValidator,
    task_validator: TaskValidator,
    config: PipelineConfig,
}

impl std::fmt::Debug for ImportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportPipeline")
            .field("assignment", &self.assignment)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Lookup tables and records produced by the phases that succeeded so far
struct Created {
    project: ProjectCreated,
    sprints: SprintsCreated,
    epics: EpicsCreated,
    stories: StoriesCreated,
    tasks: TasksCreated,
}

impl Created {
    fn summary(&self) -> ImportSummary {
        ImportSummary {
            project_name: self.project.project_name.clone(),
            project_code: self.project.project_code.clone(),
            sprints: self.sprints.result.total_sprints,
            epics: self.epics.index.len(),
            stories: self.stories.index.len(),
            tasks: self.tasks.ids.len(),
        }
    }
}

impl ImportPipeline {
    /// Create pipeline with default configuration
    #[must_use]
    pub fn new(
        analyzer: Arc<dyn DocumentAnalyzer>,
        store: Arc<dyn BacklogStore>,
        permissions: Arc<dyn PermissionChecker>,
    ) -> Self {
        Self::build(analyzer, store, permissions, PipelineConfig::default())
    }

    fn build(
        analyzer: Arc<dyn DocumentAnalyzer>,
        backend: Arc<dyn BacklogStore>,
        permissions: Arc<dyn PermissionChecker>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            analyzer,
            store: TimedStore::new(Arc::clone(&backend), config.store_timeout()),
            backend,
            permissions,
            assignment: policy_for(&config),
            planner: SprintPlanner::with_config(config.scheduler.clone()),
            epic_validator: EpicValidator::with_limits(config.limits.clone()),
            story_validator: StoryValidator::with_limits(config.limits.clone()),
            task_validator: TaskValidator::with_limits(config.limits.clone()),
            config,
        }
    }

    /// Replace the configuration
    ///
    /// Resets the assignment policy to the one the configuration selects;
    /// call [`with_assignment_policy`](Self::with_assignment_policy) afterwards
    /// to override it.
    #[must_use]
    pub fn with_config(self, config: PipelineConfig) -> Self {
        Self::build(self.analyzer, self.backend, self.permissions, config)
    }

    /// Use a custom assignment policy for tasks
    #[inline]
    #[must_use]
    pub fn with_assignment_policy(mut self, policy: Arc<dyn AssignmentPolicy>) -> Self {
        self.assignment = policy;
        self
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Import a specification document
    ///
    /// # Workflow
    /// 1. ProjectAnalysis: first analyzer pass
    /// 2. PermissionCheck: uploader may create projects
    /// 3. ProjectCreation: project with a unique code
    /// 4. SprintCreation: validate epics, plan and persist one sprint per epic
    /// 5. DetailedProcessing: second analyzer pass for stories and tasks
    /// 6. EpicProcessing: persist epics attached to their sprints
    /// 7. StoryProcessing: persist stories under their epics
    /// 8. TaskProcessing: persist tasks under their stories or epics
    ///
    /// The first failing phase aborts the import. Records written before
    /// the failure stay in place and are reported for manual cleanup,
    /// unless `compensate_on_failure` is set, in which case they are deleted.
    #[tracing::instrument(
        name = "import",
        skip_all,
        fields(uploader = %request.uploader_id, document_len = request.document.len())
    )]
    pub async fn process_full_import(&self, request: ImportRequest) -> FullImportResult {
        let started = Instant::now();
        let mut report = ImportReport::new();
        let mut saga = CompensationLog::new();

        let summary = self
            .run_phases(&request, &mut report, &mut saga)
            .await
            .map(|created| created.summary());

        let rolled_back = match (&summary, report.failed_phase()) {
            (Some(_), None) => false,
            _ => self.after_failure(&mut report, saga).await,
        };

        let result = report.finish(summary, rolled_back);
        if result.success {
            tracing::info!(
                project_id = ?result.project_id,
                elapsed_ms = elapsed_ms(started),
                "import completed"
            );
        } else {
            tracing::warn!(
                failed_phase = ?result.failed_phase,
                rolled_back = result.rolled_back,
                elapsed_ms = elapsed_ms(started),
                "import failed"
            );
        }
        result
    }

    /// Alias of [`process_full_import`](Self::process_full_import)
    #[inline]
    pub async fn run_import(&self, request: ImportRequest) -> FullImportResult {
        self.process_full_import(request).await
    }

    async fn run_phases(
        &self,
        request: &ImportRequest,
        report: &mut ImportReport,
        saga: &mut CompensationLog,
    ) -> Option<Created> {
        let uploader = request.uploader_id;
        let today = chrono::Local::now().date_naive();

        let analysis = step(
            report,
            PhaseName::ProjectAnalysis,
            self.analyze_project(&request.document),
        )
        .await
        .ok()?;

        step(report, PhaseName::PermissionCheck, self.check_permission(uploader))
            .await
            .ok()?;

        let project = step(
            report,
            PhaseName::ProjectCreation,
            self.create_project(&analysis, uploader),
        )
        .await
        .ok()?;
        report.set_project(project.project_id);
        saga.record(Compensation::Project {
            id: project.project_id,
        });

        let sprints = step(
            report,
            PhaseName::SprintCreation,
            self.create_sprints(project.project_id, &analysis.epics, today),
        )
        .await
        .ok()?;
        saga.record(Compensation::Sprints { ids: sprints.ids() });

        let assignee = request.assignee_id.unwrap_or(self.config.default_assignee);
        let details = step(
            report,
            PhaseName::DetailedProcessing,
            self.analyze_details(&request.document, &analysis, assignee),
        )
        .await
        .ok()?;

        let epics = step(
            report,
            PhaseName::EpicProcessing,
            self.create_epics(project.project_id, &analysis.epics, &sprints),
        )
        .await
        .ok()?;
        saga.record(Compensation::Epics {
            ids: epics.index.ids(),
        });

        let stories = step(
            report,
            PhaseName::StoryProcessing,
            self.create_stories(project.project_id, &details, &epics, uploader),
        )
        .await
        .ok()?;
        saga.record(Compensation::Issues {
            ids: stories.index.ids(),
        });

        let owners = TaskOwners {
            reporter: uploader,
            requested_assignee: request.assignee_id,
        };
        let tasks = step(
            report,
            PhaseName::TaskProcessing,
            self.create_tasks(project.project_id, &details, &epics, &stories, owners),
        )
        .await
        .ok()?;
        saga.record(Compensation::Issues {
            ids: tasks.ids.clone(),
        });

        Some(Created {
            project,
            sprints,
            epics,
            stories,
            tasks,
        })
    }

    /// Undo or report the writes of a failed import; true when rolled back
    async fn after_failure(&self, report: &mut ImportReport, saga: CompensationLog) -> bool {
        let Some(project_id) = report.project_id() else {
            return false;
        };

        if !self.config.compensate_on_failure {
            tracing::warn!(%project_id, "import failed after project creation; project may need manual cleanup");
            report.note_manual_cleanup(project_id);
            return false;
        }

        let outcome = saga.run(&self.store).await;
        report.note_compensation(&outcome);
        if outcome.is_complete() {
            tracing::info!(%project_id, steps = outcome.undone.len(), "partial import rolled back");
        } else {
            tracing::error!(
                %project_id,
                failures = outcome.failures.len(),
                "rollback incomplete; project may need manual cleanup"
            );
        }
        outcome.is_complete()
    }

    // ========================================================================
    // PHASES
    // ========================================================================

    async fn analyze_project(&self, document: &str) -> PhaseResult<ProjectAnalysis> {
        let phase = PhaseName::ProjectAnalysis;
        let response = with_timeout(
            "analyze_project",
            self.config.analyzer_timeout(),
            self.analyzer.analyze_project(document),
        )
        .await;

        match response {
            Ok(response) => accept_response(phase, response),
            Err(err) => conclude(phase, Err(err), Feedback::new()),
        }
    }

    async fn check_permission(&self, uploader: UserId) -> PhaseResult<()> {
        let phase = PhaseName::PermissionCheck;
        let decision = with_timeout(
            "can_create_project",
            self.config.store_timeout(),
            self.permissions.can_create_project(uploader),
        )
        .await;

        let outcome = decision.and_then(|decision| {
            if decision.can_create {
                Ok(())
            } else {
                let reason = decision
                    .reason
                    .unwrap_or_else(|| DENIED_MESSAGE.to_string());
                tracing::warn!(%uploader, %reason, "project creation denied");
                Err(PipelineError::PermissionDenied(reason))
            }
        });
        conclude(phase, outcome, Feedback::new())
    }

    async fn create_project(
        &self,
        analysis: &ProjectAnalysis,
        owner: UserId,
    ) -> PhaseResult<ProjectCreated> {
        let mut feedback = Feedback::new();
        let outcome = ProjectCreator::new(&self.store, self.config.project_code_max_len)
            .create(&analysis.project_metadata, owner, &mut feedback)
            .await;
        conclude(PhaseName::ProjectCreation, outcome, feedback)
    }

    async fn create_sprints(
        &self,
        project_id: ProjectId,
        epics: &[EpicBasicInfo],
        today: NaiveDate,
    ) -> PhaseResult<SprintsCreated> {
        let mut feedback = Feedback::new();
        let outcome = match self.valid_epics(epics, &mut feedback) {
            Ok(valid) => {
                SprintGenerator::new(&self.store, &self.planner)
                    .generate(project_id, &valid, today, &mut feedback)
                    .await
            }
            Err(err) => Err(err),
        };
        conclude(PhaseName::SprintCreation, outcome, feedback)
    }

    async fn analyze_details(
        &self,
        document: &str,
        analysis: &ProjectAnalysis,
        assignee: UserId,
    ) -> PhaseResult<DetailedContent> {
        let phase = PhaseName::DetailedProcessing;
        let response = with_timeout(
            "analyze_details",
            self.config.analyzer_timeout(),
            self.analyzer.analyze_details(document, analysis, assignee),
        )
        .await;

        let mut result = match response {
            Ok(response) => accept_response(phase, response),
            Err(err) => return conclude(phase, Err(err), Feedback::new()),
        };
        if let Ok(details) = &result.outcome {
            tracing::debug!(
                stories = details.stories.len(),
                tasks = details.tasks.len(),
                "details extracted"
            );
            if details.stories.is_empty() {
                result.feedback.suggestion(NO_STORIES);
            }
            if details.tasks.is_empty() {
                result.feedback.suggestion(NO_TASKS);
            }
        }
        result
    }

    async fn create_epics(
        &self,
        project_id: ProjectId,
        epics: &[EpicBasicInfo],
        sprints: &SprintsCreated,
    ) -> PhaseResult<EpicsCreated> {
        let mut feedback = Feedback::new();
        // rejections were already reported by SprintCreation
        let outcome = match self.valid_epics(epics, &mut Feedback::new()) {
            Ok(valid) => {
                EpicCreator::new(&self.store)
                    .create(project_id, &valid, &sprints.index, &mut feedback)
                    .await
            }
            Err(err) => Err(err),
        };
        conclude(PhaseName::EpicProcessing, outcome, feedback)
    }

    async fn create_stories(
        &self,
        project_id: ProjectId,
        details: &DetailedContent,
        epics: &EpicsCreated,
        reporter: UserId,
    ) -> PhaseResult<StoriesCreated> {
        let mut feedback = Feedback::new();
        let report = self.story_validator.validate(&details.stories);
        let outcome = match screen(report, &mut feedback) {
            Ok(valid) => {
                StoryCreator::new(&self.store)
                    .create(project_id, &valid, &epics.index, reporter, &mut feedback)
                    .await
            }
            Err(err) => Err(err),
        };
        conclude(PhaseName::StoryProcessing, outcome, feedback)
    }

    async fn create_tasks(
        &self,
        project_id: ProjectId,
        details: &DetailedContent,
        epics: &EpicsCreated,
        stories: &StoriesCreated,
        owners: TaskOwners,
    ) -> PhaseResult<TasksCreated> {
        let mut feedback = Feedback::new();
        let report = self.task_validator.validate(&details.tasks);
        let outcome = match screen(report, &mut feedback) {
            Ok(valid) => {
                TaskCreator::new(&self.store, self.assignment.as_ref())
                    .create(
                        project_id,
                        &valid,
                        &epics.index,
                        &stories.index,
                        owners,
                        &mut feedback,
                    )
                    .await
            }
            Err(err) => Err(err),
        };
        conclude(PhaseName::TaskProcessing, outcome, feedback)
    }

    /// Validated epics; at least one must pass
    fn valid_epics(
        &self,
        epics: &[EpicBasicInfo],
        feedback: &mut Feedback,
    ) -> Result<Vec<EpicBasicInfo>, PipelineError> {
        let valid = screen(self.epic_validator.validate(epics), feedback)?;
        if valid.is_empty() {
            return Err(PipelineError::Validation(NO_VALID_EPICS.to_string()));
        }
        Ok(valid)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Run one phase, log it and record its report
async fn step<T, F>(
    report: &mut ImportReport,
    phase: PhaseName,
    fut: F,
) -> Result<T, PhaseFailure>
where
    F: Future<Output = PhaseResult<T>>,
{
    tracing::info!(%phase, "phase started");
    let started = Instant::now();
    let result = fut.await;
    let elapsed = elapsed_ms(started);

    match result.error() {
        None => tracing::info!(%phase, elapsed_ms = elapsed, "phase finished"),
        Some(failure) => {
            tracing::error!(%phase, elapsed_ms = elapsed, error = %failure, "phase failed");
        }
    }
    report.record(result, elapsed)
}

/// Turn a phase outcome into its result
fn conclude<T>(
    phase: PhaseName,
    outcome: Result<T, PipelineError>,
    feedback: Feedback,
) -> PhaseResult<T> {
    match outcome {
        Ok(data) => PhaseResult::success(phase, data, feedback),
        Err(err) => {
            tracing::debug!(%phase, retryable = err.is_retryable(), error = %err, "phase error");
            PhaseResult::failure(phase, phase_failure(&err), feedback)
        }
    }
}

/// Accept an analyzer answer
///
/// Errors reported alongside a successful answer are kept as warnings.
fn accept_response<T>(phase: PhaseName, response: AnalyzerResponse<T>) -> PhaseResult<T> {
    let AnalyzerResponse {
        success,
        data,
        mut feedback,
    } = response;

    match (success, data) {
        (true, Some(data)) => {
            for mut item in std::mem::take(&mut feedback.errors) {
                if item.kind == FeedbackKind::Critical {
                    item.kind = FeedbackKind::Validation;
                }
                feedback.warnings.push(item);
            }
            PhaseResult::success(phase, data, feedback)
        }
        (true, None) => PhaseResult::failure(phase, PhaseFailure::critical(NO_DATA), feedback),
        (false, _) => {
            let message = feedback
                .errors
                .first()
                .map_or_else(|| ANALYSIS_FAILED.to_string(), |e| e.message.clone());
            PhaseResult::failure(phase, PhaseFailure::critical(message), feedback)
        }
    }
}

/// Valid records of a report; per-record rejections become warnings
fn screen<T>(report: ValidationReport<T>, feedback: &mut Feedback) -> Result<Vec<T>, PipelineError> {
    let ValidationReport {
        errors,
        valid,
        batch_error,
        ..
    } = report;

    if let Some(batch_error) = batch_error {
        return Err(PipelineError::Validation(batch_error));
    }
    for error in errors {
        feedback.rejected(error);
    }
    Ok(valid)
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
