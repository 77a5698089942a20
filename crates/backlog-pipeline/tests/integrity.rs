//! Referential integrity of imported backlogs

use backlog_model::{ImportRequest, IssuePriority, SprintStatus, UserId};
use backlog_pipeline::AssignmentMode;
use backlog_store::BacklogStore;
use backlog_test_utils::{harness, harness_with, pinned_config, store_backlog, ScriptedAnalyzer};
use chrono::{Datelike, Weekday};
use pretty_assertions::assert_eq;
use std::collections::{HashMap, HashSet};

#[tokio::test]
async fn every_reference_points_inside_the_import() {
    let h = harness(store_backlog());

    let result = h
        .pipeline
        .process_full_import(ImportRequest::new("# Tienda", UserId::new()))
        .await;
    assert!(result.success, "errors: {:?}", result.feedback.errors);
    let project_id = result.project_id.unwrap();

    let sprints = h.store.sprints_for_project(project_id).await.unwrap();
    let epics = h.store.epics_for_project(project_id).await.unwrap();
    let issues = h.store.issues_for_project(project_id).await.unwrap();

    let sprint_ids: HashSet<_> = sprints.iter().map(|s| s.id).collect();
    let epic_sprint: HashMap<_, _> = epics.iter().map(|e| (e.id, e.epic.sprint_id)).collect();
    let story_ids: HashSet<_> = issues.iter().filter(|i| i.is_story()).map(|i| i.id).collect();

    assert_eq!(sprints.len(), epics.len());
    for epic in &epics {
        assert!(sprint_ids.contains(&epic.epic.sprint_id.unwrap()));
    }
    let distinct: HashSet<_> = epics.iter().map(|e| e.epic.sprint_id).collect();
    assert_eq!(distinct.len(), epics.len());

    for issue in &issues {
        let epic_id = issue.issue.epic_id.unwrap();
        assert!(epic_sprint.contains_key(&epic_id), "{} has foreign epic", issue.issue.key);
        if let Some(parent) = issue.issue.parent_id {
            assert!(story_ids.contains(&parent), "{} has foreign parent", issue.issue.key);
        }
        assert_eq!(issue.issue.sprint_id, epic_sprint[&epic_id], "{}", issue.issue.key);
    }
}

#[tokio::test]
async fn schedule_follows_priority_and_calendar() {
    let h = harness(store_backlog());

    let result = h
        .pipeline
        .process_full_import(ImportRequest::new("# Tienda", UserId::new()))
        .await;
    let sprints = h
        .store
        .sprints_for_project(result.project_id.unwrap())
        .await
        .unwrap();

    let order: Vec<&str> = sprints.iter().map(|s| s.sprint.epic_key.as_str()).collect();
    assert_eq!(order, vec!["EP-02", "EP-01", "EP-03"]);

    let statuses: Vec<SprintStatus> = sprints.iter().map(|s| s.sprint.status).collect();
    assert_eq!(
        statuses,
        vec![
            SprintStatus::Planned,
            SprintStatus::Provisional,
            SprintStatus::Provisional
        ]
    );

    for pair in sprints.windows(2) {
        assert!(pair[0].sprint.end_date < pair[1].sprint.start_date);
    }
    for sprint in &sprints {
        assert_eq!(sprint.sprint.start_date.weekday(), Weekday::Mon);
        assert_eq!(sprint.sprint.end_date.weekday(), Weekday::Fri);
        let days = (sprint.sprint.end_date - sprint.sprint.start_date).num_days() + 1;
        assert!((12..=26).contains(&days), "{days} days");
    }
    assert_eq!(sprints[2].sprint.name, "Sprint 3: Informes");
}

#[tokio::test]
async fn tasks_resolve_parents_and_priorities() {
    let h = harness(store_backlog());

    let result = h
        .pipeline
        .process_full_import(ImportRequest::new("# Tienda", UserId::new()))
        .await;
    let issues = h
        .store
        .issues_for_project(result.project_id.unwrap())
        .await
        .unwrap();
    let by_key: HashMap<&str, _> = issues.iter().map(|i| (i.issue.key.as_str(), i)).collect();

    assert_eq!(by_key["US-02"].issue.priority, IssuePriority::High);
    assert_eq!(by_key["US-02"].issue.definition_of_done.len(), 6);
    assert_eq!(by_key["T-02"].issue.parent_id, Some(by_key["US-02"].id));
    assert_eq!(by_key["T-03"].issue.parent_id, None);
    assert_eq!(by_key["T-03"].issue.epic_id, by_key["US-02"].issue.epic_id);
    assert_eq!(by_key["T-03"].issue.priority, IssuePriority::High);
    assert_eq!(by_key["T-04"].issue.priority, IssuePriority::Low);
    assert_eq!(by_key["T-02"].issue.priority, IssuePriority::Medium);
}

#[tokio::test]
async fn requested_assignee_reaches_analyzer_and_tasks() {
    let requested = UserId::new();
    let config = pinned_config().with_assignment(AssignmentMode::RequestedOrFallback);
    let h = harness_with(ScriptedAnalyzer::new(store_backlog()), config);

    let result = h
        .pipeline
        .process_full_import(ImportRequest::new("# Tienda", UserId::new()).with_assignee(requested))
        .await;

    assert_eq!(h.analyzer.assignees(), vec![requested]);
    let issues = h
        .store
        .issues_for_project(result.project_id.unwrap())
        .await
        .unwrap();
    assert!(issues
        .iter()
        .filter(|i| i.is_task())
        .all(|t| t.issue.assignee_id == Some(requested)));
    assert!(issues
        .iter()
        .filter(|i| i.is_story())
        .all(|s| s.issue.assignee_id.is_none()));
}

#[tokio::test]
async fn independent_imports_do_not_share_state() {
    let h = harness(store_backlog());

    let (first, second) = tokio::join!(
        h.pipeline
            .process_full_import(ImportRequest::new("# Tienda", UserId::new())),
        h.pipeline
            .process_full_import(ImportRequest::new("# Tienda", UserId::new())),
    );

    assert!(first.success && second.success);
    let first_epics = h
        .store
        .epics_for_project(first.project_id.unwrap())
        .await
        .unwrap();
    let second_epics = h
        .store
        .epics_for_project(second.project_id.unwrap())
        .await
        .unwrap();
    assert_eq!(first_epics.len(), 3);
    assert_eq!(second_epics.len(), 3);
    assert!(first_epics
        .iter()
        .all(|e| second_epics.iter().all(|o| o.id != e.id)));
}
