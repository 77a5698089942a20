//! Backlog Model - shared data types of the backlog import pipeline
//!
//! Defines:
//! - Candidates emitted by the document analyzer (epics, stories, tasks)
//! - Persistence records and their identifiers
//! - Phase results, feedback, and the consolidated import result
//!
//! # Example
//!
//! ```rust
//! use backlog_model::{EpicBasicInfo, EpicPriority};
//!
//! let epic = EpicBasicInfo::new("EP-01", "Autenticación", 3, EpicPriority::Alta);
//! assert_eq!(epic.priority_level(), Some(EpicPriority::Alta));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod analysis;
pub mod enums;
pub mod feedback;
pub mod ids;
pub mod import;
pub mod phase;
pub mod records;

pub use analysis::{DetailedContent, EpicBasicInfo, ProjectAnalysis, ProjectMetadata, StoryImport, TaskImport};
pub use enums::{
    EpicHealth, EpicPriority, IssuePriority, IssueType, SprintStatus, StorySize, TaskKind,
    WorkStatus,
};
pub use feedback::{Completion, Feedback, FeedbackItem, FeedbackKind};
pub use ids::{EpicId, IssueId, ProjectId, SprintId, UserId};
pub use import::{
    FullImportResult, ImportRequest, ImportSummary, ProjectCreated, SprintCreationResult,
    SprintMapping,
};
pub use phase::{PhaseFailure, PhaseName, PhaseReport, PhaseResult};
pub use records::{
    EpicRecord, IssueRecord, NewEpic, NewIssue, NewProject, NewSprint, ProjectRecord,
    SprintRecord,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
