//! Failure handling: collaborator faults, timeouts and compensation

use backlog_model::{FeedbackKind, ImportRequest, PhaseName, UserId};
use backlog_pipeline::PipelineConfig;
use backlog_store::{BacklogStore, StaticPermissions, Table, DENIED_MESSAGE};
use backlog_test_utils::{
    harness, harness_with, harness_with_permissions, harness_with_store, pinned_config,
    scenario_a, scenario_b, store_backlog, QuirkyStore, Script, ScriptedAnalyzer,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn request() -> ImportRequest {
    ImportRequest::new("# Especificación", UserId::new())
}

fn rollback_config() -> PipelineConfig {
    pinned_config().with_compensation(true)
}

#[tokio::test]
async fn unsuccessful_analysis_stops_the_import() {
    let analyzer = ScriptedAnalyzer::new(scenario_a())
        .with_project_script(Script::Fail("El documento está vacío".to_string()));
    let h = harness_with(analyzer, pinned_config());

    let result = h.pipeline.process_full_import(request()).await;

    assert!(!result.success);
    assert_eq!(result.failed_phase, Some(PhaseName::ProjectAnalysis));
    assert_eq!(result.phases_run(), vec![PhaseName::ProjectAnalysis]);
    assert!(result.project_id.is_none());
    assert!(!result.rolled_back);
    assert_eq!(
        result.phase(PhaseName::ProjectAnalysis).unwrap().error.as_deref(),
        Some("El documento está vacío")
    );
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn unreachable_analyzer_is_critical() {
    let analyzer = ScriptedAnalyzer::new(scenario_a())
        .with_project_script(Script::Unavailable("connection refused".to_string()));
    let h = harness_with(analyzer, pinned_config());

    let result = h.pipeline.process_full_import(request()).await;

    assert_eq!(result.failed_phase, Some(PhaseName::ProjectAnalysis));
    let report = result.phase(PhaseName::ProjectAnalysis).unwrap();
    assert_eq!(report.feedback.errors[0].kind, FeedbackKind::Critical);
    assert!(report.error.as_deref().unwrap().contains("connection refused"));
    assert_eq!(h.analyzer.details_calls(), 0);
}

#[tokio::test]
async fn denied_uploader_creates_nothing() {
    let h = harness_with_permissions(
        ScriptedAnalyzer::new(scenario_a()),
        pinned_config(),
        Arc::new(StaticPermissions::new()),
    );

    let result = h.pipeline.process_full_import(request()).await;

    assert_eq!(result.failed_phase, Some(PhaseName::PermissionCheck));
    assert!(result
        .feedback
        .errors
        .iter()
        .any(|e| e.message.contains(DENIED_MESSAGE)));
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn allowed_uploader_passes_permission_check() {
    let uploader = UserId::new();
    let h = harness_with_permissions(
        ScriptedAnalyzer::new(scenario_a()),
        pinned_config(),
        Arc::new(StaticPermissions::new().with_creator(uploader)),
    );

    let result = h
        .pipeline
        .process_full_import(ImportRequest::new("# Especificación", uploader))
        .await;
    assert!(result.success);
}

#[tokio::test(start_paused = true)]
async fn slow_analyzer_times_out() {
    let analyzer = ScriptedAnalyzer::new(scenario_a())
        .with_project_script(Script::Delay(Duration::from_secs(120)));
    let config = pinned_config().with_analyzer_timeout(Duration::from_secs(30));
    let h = harness_with(analyzer, config);

    let result = h.pipeline.process_full_import(request()).await;

    assert_eq!(result.failed_phase, Some(PhaseName::ProjectAnalysis));
    let error = result
        .phase(PhaseName::ProjectAnalysis)
        .and_then(|p| p.error.clone())
        .unwrap();
    assert!(error.contains("30s"), "{error}");
}

#[tokio::test(start_paused = true)]
async fn timeout_after_project_creation_is_rolled_back() {
    let analyzer = ScriptedAnalyzer::new(scenario_a())
        .with_details_script(Script::Delay(Duration::from_secs(120)));
    let config = rollback_config().with_analyzer_timeout(Duration::from_secs(30));
    let h = harness_with(analyzer, config);

    let result = h.pipeline.process_full_import(request()).await;

    assert_eq!(result.failed_phase, Some(PhaseName::DetailedProcessing));
    assert!(result.project_id.is_some());
    assert!(result.rolled_back);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn store_rejection_rolls_back_earlier_writes() {
    let h = harness_with(ScriptedAnalyzer::new(store_backlog()), rollback_config());
    h.store.fail_on(Table::Issues, "disco lleno");

    let result = h.pipeline.process_full_import(request()).await;

    assert_eq!(result.failed_phase, Some(PhaseName::StoryProcessing));
    assert!(result.rolled_back);
    assert!(result.project_id.is_some());
    for table in Table::ALL {
        assert_eq!(h.store.len(table), 0, "{table} not empty");
    }
    assert!(result
        .feedback
        .warnings
        .iter()
        .any(|w| w.message.contains("Se deshicieron")));
}

#[tokio::test]
async fn rollback_frees_the_project_code() {
    let h = harness_with(ScriptedAnalyzer::new(scenario_b()), rollback_config());

    let failed = h.pipeline.process_full_import(request()).await;

    assert!(failed.rolled_back);
    assert!(!h.store.project_code_exists("PAG").await.unwrap());
    assert!(h.store.project(failed.project_id.unwrap()).await.unwrap().is_none());
}

#[tokio::test]
async fn default_config_keeps_the_partial_project() {
    let h = harness(scenario_b());

    let result = h.pipeline.process_full_import(request()).await;

    assert_eq!(result.failed_phase, Some(PhaseName::StoryProcessing));
    assert!(!result.rolled_back);
    let project_id = result.project_id.unwrap();
    assert!(h.store.project(project_id).await.unwrap().is_some());
    assert!(h.store.project_code_exists("PAG").await.unwrap());
    assert_eq!(h.store.len(Table::Projects), 1);
    assert_eq!(h.store.len(Table::Sprints), 1);
    assert_eq!(h.store.len(Table::Epics), 1);
    assert_eq!(h.store.len(Table::Issues), 0);
    assert!(result
        .feedback
        .warnings
        .iter()
        .any(|w| w.message.contains("limpieza manual")));
}

#[tokio::test]
async fn short_batch_is_rolled_back_without_orphans() {
    let h = harness_with_store(ScriptedAnalyzer::new(store_backlog()), rollback_config(), |store| {
        Arc::new(QuirkyStore::new(store).with_short_issue_batches()) as Arc<dyn BacklogStore>
    });

    let result = h.pipeline.process_full_import(request()).await;

    assert_eq!(result.failed_phase, Some(PhaseName::StoryProcessing));
    let error = result
        .phase(PhaseName::StoryProcessing)
        .and_then(|p| p.error.clone())
        .unwrap();
    assert!(error.contains("se esperaban 3"), "{error}");
    assert!(result.rolled_back);
    for table in Table::ALL {
        assert_eq!(h.store.len(table), 0, "{table} not empty");
    }
}

#[tokio::test]
async fn code_claimed_between_lookup_and_insert_gets_suffix() {
    let h = harness_with_store(ScriptedAnalyzer::new(scenario_a()), pinned_config(), |store| {
        Arc::new(QuirkyStore::new(store).with_blind_code_checks(2)) as Arc<dyn BacklogStore>
    });

    let first = h.pipeline.process_full_import(request()).await;
    let second = h.pipeline.process_full_import(request()).await;

    assert!(first.success && second.success, "{:?}", second.feedback.errors);
    assert_eq!(first.summary.unwrap().project_code, "PAG");
    assert_eq!(second.summary.unwrap().project_code, "PAG2");
    assert_eq!(h.store.len(Table::Projects), 2);
}
