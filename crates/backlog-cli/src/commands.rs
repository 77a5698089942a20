//! Subcommand implementations

use anyhow::{Context, Result};
use backlog_model::{FullImportResult, ImportRequest, SprintStatus, UserId};
use backlog_pipeline::{FixtureAnalyzer, ImportPipeline, PipelineConfig};
use backlog_scheduler::SprintPlanner;
use backlog_store::{AllowAll, MemoryStore};
use backlog_validation::{EpicValidator, StoryValidator, TaskValidator, ValidationReport};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration from `path`, or the defaults
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn load_fixture(path: &Path) -> Result<FixtureAnalyzer> {
    FixtureAnalyzer::from_path(path)
        .with_context(|| format!("failed to load fixture {}", path.display()))
}

// ============================================================================
// IMPORT
// ============================================================================

/// Arguments of `backlog import`
#[derive(Debug, Clone, Default)]
pub struct ImportArgs {
    pub fixture: PathBuf,
    pub document: Option<PathBuf>,
    pub uploader: Option<UserId>,
    pub assignee: Option<UserId>,
    pub config: Option<PathBuf>,
}

/// Run the full pipeline against a fresh in-memory store
pub async fn import(args: &ImportArgs) -> Result<FullImportResult> {
    let config = load_config(args.config.as_deref())?;
    let analyzer = load_fixture(&args.fixture)?;
    let document = match &args.document {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read document {}", path.display()))?,
        None => String::new(),
    };

    let pipeline = ImportPipeline::new(
        Arc::new(analyzer),
        Arc::new(MemoryStore::new()),
        Arc::new(AllowAll),
    )
    .with_config(config);

    let mut request = ImportRequest::new(document, args.uploader.unwrap_or_default());
    if let Some(assignee) = args.assignee {
        request = request.with_assignee(assignee);
    }

    tracing::info!(fixture = %args.fixture.display(), "starting import");
    Ok(pipeline.process_full_import(request).await)
}

// ============================================================================
// PLAN
// ============================================================================

/// One row of a printed sprint plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRow {
    pub sequence: u32,
    pub epic_id: String,
    pub name: String,
    pub goal: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weeks: u32,
    pub capacity: u32,
    pub status: SprintStatus,
}

/// Sprint plan for the valid epics of a fixture
pub fn plan(fixture: &Path, config: Option<&Path>, today: NaiveDate) -> Result<Vec<PlanRow>> {
    let config = load_config(config)?;
    let analyzer = load_fixture(fixture)?;

    let report = EpicValidator::with_limits(config.limits.clone())
        .validate(&analyzer.fixture().analysis.epics);
    if let Some(batch_error) = report.batch_error {
        anyhow::bail!(batch_error);
    }
    for error in &report.errors {
        tracing::warn!(%error, "epic skipped");
    }

    let plans = SprintPlanner::with_config(config.scheduler)
        .plan(&report.valid, today)
        .context("sprint planning failed")?;

    Ok(plans
        .into_iter()
        .map(|p| PlanRow {
            sequence: p.sequence,
            epic_id: p.epic_id,
            name: p.name,
            goal: p.goal,
            start_date: p.window.start,
            end_date: p.window.end,
            weeks: p.weeks,
            capacity: p.capacity,
            status: p.status,
        })
        .collect())
}

// ============================================================================
// VALIDATE
// ============================================================================

/// Validation outcome of one entity kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityValidation {
    pub entity: &'static str,
    pub total: usize,
    pub valid: usize,
    pub errors: Vec<String>,
}

impl EntityValidation {
    fn from_report<T>(entity: &'static str, total: usize, report: ValidationReport<T>) -> Self {
        Self {
            entity,
            total,
            valid: report.valid.len(),
            errors: report.errors,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run every validator over the candidates of a fixture
pub fn validate(fixture: &Path, config: Option<&Path>) -> Result<Vec<EntityValidation>> {
    let config = load_config(config)?;
    let analyzer = load_fixture(fixture)?;
    let document = analyzer.fixture();
    let epics = &document.analysis.epics;
    let stories = &document.details.stories;
    let tasks = &document.details.tasks;

    Ok(vec![
        EntityValidation::from_report(
            "epics",
            epics.len(),
            EpicValidator::with_limits(config.limits.clone()).validate(epics),
        ),
        EntityValidation::from_report(
            "stories",
            stories.len(),
            StoryValidator::with_limits(config.limits.clone()).validate(stories),
        ),
        EntityValidation::from_report(
            "tasks",
            tasks.len(),
            TaskValidator::with_limits(config.limits).validate(tasks),
        ),
    ])
}
