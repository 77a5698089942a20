//! Entity creation services
//!
//! Each creator turns validated candidates plus the lookup tables of earlier
//! phases into persistence records, filling the defaults the analyzer did
//! not supply, and stores them with a single batch insert. References that
//! cannot be resolved fail the creator before anything is written.

pub mod epic;
pub mod project;
pub mod story;
pub mod task;

pub use epic::{EpicCreator, EpicsCreated};
pub use project::{derive_project_code, ProjectCreator};
pub use story::{definition_of_done, StoryCreator, StoriesCreated};
pub use task::{TaskCreator, TaskOwners, TasksCreated};

use crate::error::PipelineError;

/// Fail with every unresolved reference at once
pub(crate) fn reject_unresolved(unresolved: Vec<PipelineError>) -> Result<(), PipelineError> {
    let mut unresolved = unresolved.into_iter();
    match unresolved.next() {
        None => Ok(()),
        Some(first) if unresolved.len() == 0 => Err(first),
        Some(first) => {
            let messages: Vec<String> = std::iter::once(first)
                .chain(unresolved)
                .map(|e| e.to_string())
                .collect();
            Err(PipelineError::Validation(messages.join("; ")))
        }
    }
}

/// Check the store echoed one record per requested row
pub(crate) fn expect_count(expected: usize, actual: usize) -> Result<(), PipelineError> {
    if expected == actual {
        Ok(())
    } else {
        Err(PipelineError::RecordCountMismatch { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backlog_model::FeedbackKind;

    #[test]
    fn single_unresolved_reference_is_kept() {
        let err = reject_unresolved(vec![PipelineError::unresolved("US-9", "la épica", "EP-99")])
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnresolvedReference { .. }));
    }

    #[test]
    fn several_unresolved_references_are_joined() {
        let err = reject_unresolved(vec![
            PipelineError::unresolved("US-8", "la épica", "EP-98"),
            PipelineError::unresolved("US-9", "la épica", "EP-99"),
        ])
        .unwrap_err();
        assert_eq!(err.kind(), FeedbackKind::Validation);
        let message = err.to_string();
        assert!(message.contains("US-8") && message.contains("US-9"));
    }

    #[test]
    fn nothing_unresolved_passes() {
        assert!(reject_unresolved(Vec::new()).is_ok());
        assert!(expect_count(2, 2).is_ok());
        assert!(matches!(
            expect_count(2, 1),
            Err(PipelineError::RecordCountMismatch { expected: 2, actual: 1 })
        ));
    }
}
