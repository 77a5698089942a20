//! Scheduler errors

/// Errors raised while planning sprints
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// Nothing to plan
    #[error("no se pueden generar sprints sin épicas")]
    NoEpics,

    /// Configuration the planner cannot honour
    #[error("invalid scheduler configuration: {0}")]
    InvalidConfig(String),

    /// Date arithmetic left the supported calendar range
    #[error("sprint dates out of range after {0}")]
    DateOverflow(chrono::NaiveDate),
}
