//! Backlog Pipeline - document to backlog import
//!
//! Turns a specification document into a project backlog in eight ordered
//! phases. The orchestrator never fails: every collaborator fault becomes a
//! failed phase inside the returned [`FullImportResult`](backlog_model::FullImportResult).
//!
//! # Example
//!
//! ```rust,no_run
//! use backlog_model::{ImportRequest, UserId};
//! use backlog_pipeline::{FixtureAnalyzer, ImportPipeline};
//! use backlog_store::{AllowAll, MemoryStore};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let analyzer = FixtureAnalyzer::from_path("tienda.yaml")?;
//! let pipeline = ImportPipeline::new(
//!     Arc::new(analyzer),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(AllowAll),
//! );
//!
//! let result = pipeline
//!     .process_full_import(ImportRequest::new("# Tienda", UserId::new()))
//!     .await;
//! assert!(result.success);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod analyzer;
pub mod assignment;
pub mod config;
pub mod creators;
pub mod error;
pub mod lookup;
pub mod orchestrator;
pub mod report;
pub mod saga;
pub mod sprints;
pub mod timed;

pub use analyzer::{AnalyzerResponse, DocumentAnalyzer, FixtureAnalyzer, FixtureDocument};
pub use assignment::{policy_for, AssignmentPolicy, FixedAssignee, RequestedOrFallback};
pub use config::{AssignmentMode, PipelineConfig, FALLBACK_ASSIGNEE};
pub use creators::{
    definition_of_done, derive_project_code, EpicCreator, EpicsCreated, ProjectCreator,
    StoriesCreated, StoryCreator, TaskCreator, TaskOwners, TasksCreated,
};
pub use error::{AnalyzerError, ConfigError, PipelineError};
pub use lookup::{EpicIndex, EpicRef, SprintIndex, StoryIndex, StoryRef};
pub use orchestrator::ImportPipeline;
pub use report::{phase_failure, ImportReport};
pub use saga::{Compensation, CompensationLog, CompensationReport};
pub use sprints::{SprintGenerator, SprintsCreated};
pub use timed::{with_timeout, TimedStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
