//! Task assignment policies

use crate::config::{AssignmentMode, PipelineConfig};
use backlog_model::UserId;
use std::fmt::Debug;
use std::sync::Arc;

/// Chooses the assignee of generated tasks
pub trait AssignmentPolicy: Debug + Send + Sync {
    /// Assignee for a task, given the assignee requested for the import
    fn assignee(&self, requested: Option<UserId>) -> UserId;
}

/// Every task goes to one fixed identity, whatever was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAssignee(pub UserId);

impl AssignmentPolicy for FixedAssignee {
    fn assignee(&self, _requested: Option<UserId>) -> UserId {
        self.0
    }
}

/// The requested assignee, or a fallback identity when none was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedOrFallback {
    pub fallback: UserId,
}

impl AssignmentPolicy for RequestedOrFallback {
    fn assignee(&self, requested: Option<UserId>) -> UserId {
        requested.unwrap_or(self.fallback)
    }
}

/// Policy selected by the configuration
#[must_use]
pub fn policy_for(config: &PipelineConfig) -> Arc<dyn AssignmentPolicy> {
    match config.assignment {
        AssignmentMode::Fixed => Arc::new(FixedAssignee(config.default_assignee)),
        AssignmentMode::RequestedOrFallback => Arc::new(RequestedOrFallback {
            fallback: config.default_assignee,
        }),
    }
}
