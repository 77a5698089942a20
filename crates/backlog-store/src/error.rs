//! Store errors

use std::fmt;

/// Tables of the backlog store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Projects,
    Sprints,
    Epics,
    Issues,
}

impl Table {
    /// All tables, in insertion dependency order
    pub const ALL: [Table; 4] = [Table::Projects, Table::Sprints, Table::Epics, Table::Issues];

    /// Table name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Sprints => "sprints",
            Self::Epics => "epics",
            Self::Issues => "issues",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a [`crate::BacklogStore`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Project code already taken
    #[error("project code already exists: {0}")]
    DuplicateProjectCode(String),

    /// A row references a parent that does not exist
    #[error("{table}: referenced {target} {id} does not exist")]
    MissingReference {
        table: Table,
        target: Table,
        id: String,
    },

    /// The store refused the batch
    #[error("{table}: insert rejected: {reason}")]
    Rejected { table: Table, reason: String },

    /// The backend could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Table the error concerns, if any
    #[must_use]
    pub fn table(&self) -> Option<Table> {
        match self {
            Self::DuplicateProjectCode(_) => Some(Table::Projects),
            Self::MissingReference { table, .. } | Self::Rejected { table, .. } => Some(*table),
            Self::Unavailable(_) => None,
        }
    }

    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_table() {
        let err = StoreError::Rejected {
            table: Table::Issues,
            reason: "disk full".to_string(),
        };
        assert_eq!(err.to_string(), "issues: insert rejected: disk full");
        assert_eq!(err.table(), Some(Table::Issues));
        assert!(!err.is_retryable());
    }

    #[test]
    fn unavailable_is_retryable() {
        assert!(StoreError::Unavailable("timeout".to_string()).is_retryable());
    }
}
