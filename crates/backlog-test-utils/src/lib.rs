//! Testing utilities for the backlog import workspace
//!
//! Shared fixtures, a scriptable analyzer and pipeline builders.

#![allow(missing_docs)]

use async_trait::async_trait;
use backlog_model::{
    DetailedContent, EpicBasicInfo, EpicId, EpicPriority, EpicRecord, IssueId, IssueRecord,
    NewEpic, NewIssue, NewProject, NewSprint, ProjectAnalysis, ProjectId, ProjectMetadata,
    ProjectRecord, SprintId, SprintRecord, StoryImport, TaskImport, TaskKind, UserId,
};
use backlog_pipeline::{
    AnalyzerError, AnalyzerResponse, DocumentAnalyzer, FixtureDocument, ImportPipeline,
    PipelineConfig,
};
use backlog_scheduler::SchedulerConfig;
use backlog_store::{AllowAll, BacklogStore, MemoryStore, PermissionChecker, StoreResult};
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Monday every test schedule starts on
pub fn test_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()
}

/// Default configuration with the schedule pinned to [`test_start`]
pub fn pinned_config() -> PipelineConfig {
    PipelineConfig::default()
        .with_scheduler(SchedulerConfig::new().with_start_date(test_start()))
}

// ============================================================================
// FIXTURES
// ============================================================================

/// One critical epic, one story, one backend task under the story
pub fn scenario_a() -> FixtureDocument {
    FixtureDocument {
        analysis: ProjectAnalysis::new(
            ProjectMetadata::new("Portal de pagos").with_code_hint("PAG"),
            vec![EpicBasicInfo::new("EP-01", "Pagos con tarjeta", 2, EpicPriority::Critica)
                .with_objective("Cobrar pedidos con tarjeta de crédito")],
        ),
        details: DetailedContent::new(
            vec![StoryImport::new("US-01", "EP-01", "Pagar un pedido", 3)
                .with_persona("Cliente")
                .with_criterion("El pago aprobado marca el pedido como pagado")],
            vec![TaskImport::new("T-01", "Integrar pasarela de pago", TaskKind::Be)
                .for_story("US-01")],
        ),
    }
}

/// A story pointing at an epic that does not exist
pub fn scenario_b() -> FixtureDocument {
    let mut fixture = scenario_a();
    fixture
        .details
        .stories
        .push(StoryImport::new("US-02", "EP-99", "Exportar facturas", 2));
    fixture
}

/// Two epics sharing one key
pub fn scenario_c() -> FixtureDocument {
    let mut fixture = scenario_a();
    fixture
        .analysis
        .epics
        .push(EpicBasicInfo::new("EP-01", "Reembolsos", 3, EpicPriority::Alta));
    fixture
}

/// Valid epics without stories or tasks
pub fn scenario_d() -> FixtureDocument {
    FixtureDocument {
        analysis: ProjectAnalysis::new(
            ProjectMetadata::new("Inventario"),
            vec![
                EpicBasicInfo::new("EP-01", "Catálogo de productos", 3, EpicPriority::Media),
                EpicBasicInfo::new("EP-02", "Control de stock", 5, EpicPriority::Alta),
            ],
        ),
        details: DetailedContent::default(),
    }
}

/// Three epics with stories and tasks hanging from stories and epics
pub fn store_backlog() -> FixtureDocument {
    FixtureDocument {
        analysis: ProjectAnalysis::new(
            ProjectMetadata::new("Tienda en línea")
                .with_description("Venta de productos por internet"),
            vec![
                EpicBasicInfo::new("EP-01", "Catálogo", 3, EpicPriority::Media),
                EpicBasicInfo::new("EP-02", "Carrito y pagos", 2, EpicPriority::Critica)
                    .with_objective("Permitir comprar en línea"),
                EpicBasicInfo::new("EP-03", "Informes", 6, EpicPriority::Baja),
            ],
        ),
        details: DetailedContent::new(
            vec![
                StoryImport::new("US-01", "EP-01", "Buscar productos", 3)
                    .with_criterion("La búsqueda devuelve productos por nombre"),
                StoryImport::new("US-02", "EP-02", "Pagar el carrito", 8)
                    .with_persona("Cliente"),
                StoryImport::new("US-03", "EP-03", "Ver ventas del mes", 5),
            ],
            vec![
                TaskImport::new("T-01", "Índice de búsqueda", TaskKind::Be).for_story("US-01"),
                TaskImport::new("T-02", "Pantalla de pago", TaskKind::Fe).for_story("US-02"),
                TaskImport::new("T-03", "Despliegue continuo", TaskKind::Ops).for_epic("EP-02"),
                TaskImport::new("T-04", "Manual de informes", TaskKind::Docs).for_epic("EP-03"),
            ],
        ),
    }
}

// ============================================================================
// SCRIPTED ANALYZER
// ============================================================================

/// How a scripted analyzer call misbehaves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    /// Answer with the fixture
    Answer,
    /// Answer `success = false` with this message
    Fail(String),
    /// Return a transport error
    Unavailable(String),
    /// Sleep before answering
    Delay(Duration),
}

/// Analyzer serving a fixture, with scriptable failures and call recording
#[derive(Debug)]
pub struct ScriptedAnalyzer {
    fixture: FixtureDocument,
    project_script: Script,
    details_script: Script,
    project_calls: AtomicUsize,
    details_calls: AtomicUsize,
    assignees: Mutex<Vec<UserId>>,
}

impl ScriptedAnalyzer {
    pub fn new(fixture: FixtureDocument) -> Self {
        Self {
            fixture,
            project_script: Script::Answer,
            details_script: Script::Answer,
            project_calls: AtomicUsize::new(0),
            details_calls: AtomicUsize::new(0),
            assignees: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_project_script(mut self, script: Script) -> Self {
        self.project_script = script;
        self
    }

    #[must_use]
    pub fn with_details_script(mut self, script: Script) -> Self {
        self.details_script = script;
        self
    }

    pub fn project_calls(&self) -> usize {
        self.project_calls.load(Ordering::SeqCst)
    }

    pub fn details_calls(&self) -> usize {
        self.details_calls.load(Ordering::SeqCst)
    }

    /// Assignees passed to `analyze_details`, in call order
    pub fn assignees(&self) -> Vec<UserId> {
        self.assignees.lock().clone()
    }

    async fn play<T>(script: &Script, data: T) -> Result<AnalyzerResponse<T>, AnalyzerError> {
        match script {
            Script::Answer => Ok(AnalyzerResponse::ok(data)),
            Script::Fail(message) => Ok(AnalyzerResponse::failed(message.clone())),
            Script::Unavailable(message) => Err(AnalyzerError::Unavailable(message.clone())),
            Script::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(AnalyzerResponse::ok(data))
            }
        }
    }
}

#[async_trait]
impl DocumentAnalyzer for ScriptedAnalyzer {
    async fn analyze_project(
        &self,
        _document: &str,
    ) -> Result<AnalyzerResponse<ProjectAnalysis>, AnalyzerError> {
        self.project_calls.fetch_add(1, Ordering::SeqCst);
        Self::play(&self.project_script, self.fixture.analysis.clone()).await
    }

    async fn analyze_details(
        &self,
        _document: &str,
        _analysis: &ProjectAnalysis,
        assignee: UserId,
    ) -> Result<AnalyzerResponse<DetailedContent>, AnalyzerError> {
        self.details_calls.fetch_add(1, Ordering::SeqCst);
        self.assignees.lock().push(assignee);
        Self::play(&self.details_script, self.fixture.details.clone()).await
    }
}

// ============================================================================
// MISBEHAVING STORE
// ============================================================================

/// [`MemoryStore`] wrapper that misreports some results
///
/// Writes always reach the inner store; only what is echoed back to the
/// caller changes.
pub struct QuirkyStore {
    inner: Arc<MemoryStore>,
    short_issue_batches: AtomicBool,
    blind_code_checks: AtomicUsize,
}

impl QuirkyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            short_issue_batches: AtomicBool::new(false),
            blind_code_checks: AtomicUsize::new(0),
        }
    }

    /// Issue inserts echo one record fewer than were written
    #[must_use]
    pub fn with_short_issue_batches(self) -> Self {
        self.short_issue_batches.store(true, Ordering::SeqCst);
        self
    }

    /// The next `n` code lookups answer "free" regardless of the store
    #[must_use]
    pub fn with_blind_code_checks(self, n: usize) -> Self {
        self.blind_code_checks.store(n, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl BacklogStore for QuirkyStore {
    async fn insert_project(&self, project: NewProject) -> StoreResult<ProjectRecord> {
        self.inner.insert_project(project).await
    }

    async fn insert_sprints(&self, sprints: Vec<NewSprint>) -> StoreResult<Vec<SprintRecord>> {
        self.inner.insert_sprints(sprints).await
    }

    async fn insert_epics(&self, epics: Vec<NewEpic>) -> StoreResult<Vec<EpicRecord>> {
        self.inner.insert_epics(epics).await
    }

    async fn insert_issues(&self, issues: Vec<NewIssue>) -> StoreResult<Vec<IssueRecord>> {
        let mut records = self.inner.insert_issues(issues).await?;
        if self.short_issue_batches.load(Ordering::SeqCst) {
            records.pop();
        }
        Ok(records)
    }

    async fn delete_project(&self, id: ProjectId) -> StoreResult<bool> {
        self.inner.delete_project(id).await
    }

    async fn delete_sprints(&self, ids: &[SprintId]) -> StoreResult<usize> {
        self.inner.delete_sprints(ids).await
    }

    async fn delete_epics(&self, ids: &[EpicId]) -> StoreResult<usize> {
        self.inner.delete_epics(ids).await
    }

    async fn delete_issues(&self, ids: &[IssueId]) -> StoreResult<usize> {
        self.inner.delete_issues(ids).await
    }

    async fn project(&self, id: ProjectId) -> StoreResult<Option<ProjectRecord>> {
        self.inner.project(id).await
    }

    async fn project_code_exists(&self, code: &str) -> StoreResult<bool> {
        let blind = self
            .blind_code_checks
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if blind {
            return Ok(false);
        }
        self.inner.project_code_exists(code).await
    }

    async fn sprints_for_project(&self, id: ProjectId) -> StoreResult<Vec<SprintRecord>> {
        self.inner.sprints_for_project(id).await
    }

    async fn epics_for_project(&self, id: ProjectId) -> StoreResult<Vec<EpicRecord>> {
        self.inner.epics_for_project(id).await
    }

    async fn issues_for_project(&self, id: ProjectId) -> StoreResult<Vec<IssueRecord>> {
        self.inner.issues_for_project(id).await
    }
}

// ============================================================================
// PIPELINE BUILDERS
// ============================================================================

/// Everything an end-to-end test inspects
pub struct Harness {
    pub pipeline: ImportPipeline,
    pub store: Arc<MemoryStore>,
    pub analyzer: Arc<ScriptedAnalyzer>,
}

/// Pipeline over a fresh in-memory store that lets everyone create projects
pub fn harness(fixture: FixtureDocument) -> Harness {
    harness_with(ScriptedAnalyzer::new(fixture), pinned_config())
}

/// Pipeline with a custom analyzer and configuration
pub fn harness_with(analyzer: ScriptedAnalyzer, config: PipelineConfig) -> Harness {
    harness_with_permissions(analyzer, config, Arc::new(AllowAll))
}

/// Pipeline with custom permissions
pub fn harness_with_permissions(
    analyzer: ScriptedAnalyzer,
    config: PipelineConfig,
    permissions: Arc<dyn PermissionChecker>,
) -> Harness {
    build_harness(analyzer, config, permissions, |store| store as Arc<dyn BacklogStore>)
}

/// Pipeline whose store is `wrap` applied to the inspected [`MemoryStore`]
pub fn harness_with_store<W>(analyzer: ScriptedAnalyzer, config: PipelineConfig, wrap: W) -> Harness
where
    W: FnOnce(Arc<MemoryStore>) -> Arc<dyn BacklogStore>,
{
    build_harness(analyzer, config, Arc::new(AllowAll), wrap)
}

fn build_harness<W>(
    analyzer: ScriptedAnalyzer,
    config: PipelineConfig,
    permissions: Arc<dyn PermissionChecker>,
    wrap: W,
) -> Harness
where
    W: FnOnce(Arc<MemoryStore>) -> Arc<dyn BacklogStore>,
{
    let store = Arc::new(MemoryStore::new());
    let analyzer = Arc::new(analyzer);
    let pipeline = ImportPipeline::new(
        Arc::clone(&analyzer) as Arc<dyn DocumentAnalyzer>,
        wrap(Arc::clone(&store)),
        permissions,
    )
    .with_config(config);

    Harness {
        pipeline,
        store,
        analyzer,
    }
}
