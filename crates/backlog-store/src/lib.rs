//! Backlog Store - persistence and permission collaborators
//!
//! Provides:
//! - [`BacklogStore`]: batched, insert-returning persistence of projects,
//!   sprints, epics and issues, plus deletes for compensation
//! - [`PermissionChecker`]: project creation rights
//! - [`MemoryStore`], [`AllowAll`], [`StaticPermissions`]: in-process
//!   implementations used by the CLI and the tests

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod memory;
pub mod permissions;
pub mod traits;

pub use error::{StoreError, StoreResult, Table};
pub use memory::MemoryStore;
pub use permissions::{AllowAll, StaticPermissions, DENIED_MESSAGE};
pub use traits::{BacklogStore, PermissionChecker, PermissionDecision};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
