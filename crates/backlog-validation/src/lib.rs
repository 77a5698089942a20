//! Validation for backlog candidates
//!
//! Provides validators for epics, stories and tasks extracted from a
//! specification document. Validation never mutates its input: invalid
//! records are excluded from the report's `valid` list and reported one
//! message per record (`"{id}: {reasons}"`), so a batch with a few bad
//! records can still proceed with the good ones.
//!
//! Two conditions invalidate a whole batch:
//! - duplicate document-local keys
//! - an empty epic list

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod epic;
pub mod limits;
pub mod report;
pub mod story;
pub mod task;

pub use epic::{EpicValidator, NO_EPICS_MESSAGE};
pub use limits::ValidationLimits;
pub use report::ValidationReport;
pub use story::StoryValidator;
pub use task::TaskValidator;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
