use backlog_model::{EpicBasicInfo, EpicPriority, StoryImport, TaskImport, TaskKind};
use backlog_validation::{EpicValidator, StoryValidator, TaskValidator};
use proptest::prelude::*;

fn story_strategy() -> impl Strategy<Value = (String, String, i64, bool)> {
    (
        "[A-Za-z ]{0,12}",
        prop_oneof![Just(String::new()), Just("EP-1".to_string()), Just(" ".to_string())],
        -3i64..30,
        any::<bool>(),
    )
}

fn build_stories(raw: Vec<(String, String, i64, bool)>) -> Vec<StoryImport> {
    raw.into_iter()
        .enumerate()
        .map(|(i, (title, epic, points, blank))| {
            let story = StoryImport::new(format!("US-{i}"), epic, title, points);
            if blank {
                story.with_description("")
            } else {
                story.with_description("Como usuario quiero algo")
            }
        })
        .collect()
}

fn task_strategy() -> impl Strategy<Value = (String, Option<String>, Option<String>)> {
    (
        prop_oneof![
            Just("FE".to_string()),
            Just("BE".to_string()),
            Just("QA".to_string()),
            Just("docs".to_string())
        ],
        proptest::option::of(Just("US-1".to_string())),
        proptest::option::of(Just("EP-1".to_string())),
    )
}

proptest! {
    #[test]
    fn prop_story_errors_name_their_record(raw in proptest::collection::vec(story_strategy(), 0..12)) {
        let stories = build_stories(raw);
        let report = StoryValidator::new().validate(&stories);

        for story in &stories {
            let accepted = report.valid.iter().any(|s| s.id == story.id);
            let prefix = format!("{}: ", story.id);
            let reported = report.errors.iter().any(|e| e.starts_with(&prefix));
            prop_assert!(accepted != reported, "{} accepted={} reported={}", story.id, accepted, reported);
        }
        prop_assert_eq!(report.is_valid, report.valid.len() == stories.len());
    }

    #[test]
    fn prop_story_validation_is_idempotent(raw in proptest::collection::vec(story_strategy(), 0..12)) {
        let stories = build_stories(raw);
        let validator = StoryValidator::new();
        let first = validator.validate(&stories);
        let second = validator.validate(&first.valid);

        prop_assert!(second.is_valid);
        prop_assert!(second.errors.is_empty());
        prop_assert_eq!(second.valid, first.valid);
    }

    #[test]
    fn prop_task_errors_name_their_record(raw in proptest::collection::vec(task_strategy(), 0..12)) {
        let tasks: Vec<TaskImport> = raw
            .into_iter()
            .enumerate()
            .map(|(i, (kind, story, epic))| {
                let mut task = TaskImport::new(format!("T-{i}"), "Tarea", TaskKind::Fe).with_raw_type(kind);
                task.story_id = story;
                task.epic_id = epic;
                task
            })
            .collect();
        let report = TaskValidator::new().validate(&tasks);

        for task in &tasks {
            let accepted = report.valid.iter().any(|t| t.id == task.id);
            let prefix = format!("{}: ", task.id);
            let reported = report.errors.iter().any(|e| e.starts_with(&prefix));
            prop_assert!(accepted != reported);
        }

        let again = TaskValidator::new().validate(&report.valid);
        prop_assert!(again.is_valid);
        prop_assert_eq!(again.valid, report.valid);
    }

    #[test]
    fn prop_epic_validation_is_idempotent(weeks in proptest::collection::vec(-2i64..16, 1..10)) {
        let epics: Vec<EpicBasicInfo> = weeks
            .into_iter()
            .enumerate()
            .map(|(i, w)| EpicBasicInfo::new(format!("EP-{i}"), "Épica", w, EpicPriority::Alta))
            .collect();
        let validator = EpicValidator::new();
        let first = validator.validate(&epics);
        prop_assume!(!first.valid.is_empty());

        let second = validator.validate(&first.valid);
        prop_assert!(second.is_valid);
        prop_assert_eq!(second.valid, first.valid);
    }
}

#[test]
fn duplicate_ids_are_a_batch_error_not_a_warning() {
    let stories = vec![
        StoryImport::new("US-1", "EP-1", "Login", 3),
        StoryImport::new("US-2", "EP-1", "Logout", 3),
        StoryImport::new("US-1", "EP-1", "Login otra vez", 5),
    ];
    let report = StoryValidator::new().validate(&stories);
    assert!(!report.is_valid);
    assert!(report.valid.is_empty());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0], "IDs de historias duplicados: US-1");
}
