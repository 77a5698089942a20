//! Typed lookup tables threaded between phases
//!
//! Each table maps document-local keys to the persistence ids created for
//! them. They are built once from the records a phase inserted and passed
//! read-only to the phases that need them. Keys are compared trimmed.

use backlog_model::{EpicId, EpicRecord, IssueId, IssueRecord, SprintId, SprintMapping};
use std::collections::BTreeMap;

/// Epic key -> generated sprint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SprintIndex {
    by_epic: BTreeMap<String, SprintId>,
}

impl SprintIndex {
    /// Build from the sprint creation mappings
    #[must_use]
    pub fn from_mappings(mappings: &[SprintMapping]) -> Self {
        Self {
            by_epic: mappings
                .iter()
                .map(|m| (m.epic_id.trim().to_string(), m.sprint_id))
                .collect(),
        }
    }

    /// Sprint generated for `epic_key`
    #[must_use]
    pub fn get(&self, epic_key: &str) -> Option<SprintId> {
        self.by_epic.get(epic_key.trim()).copied()
    }

    /// All sprint ids
    #[must_use]
    pub fn ids(&self) -> Vec<SprintId> {
        self.by_epic.values().copied().collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_epic.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_epic.is_empty()
    }
}

/// A created epic as later phases see it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpicRef {
    pub id: EpicId,
    pub sprint_id: Option<SprintId>,
}

/// Epic key -> created epic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpicIndex {
    by_key: BTreeMap<String, EpicRef>,
}

impl EpicIndex {
    /// Build from inserted epic records
    #[must_use]
    pub fn from_records(records: &[EpicRecord]) -> Self {
        Self {
            by_key: records
                .iter()
                .map(|r| {
                    (
                        r.epic.key.trim().to_string(),
                        EpicRef {
                            id: r.id,
                            sprint_id: r.epic.sprint_id,
                        },
                    )
                })
                .collect(),
        }
    }

    /// Epic created for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<EpicRef> {
        self.by_key.get(key.trim()).copied()
    }

    /// All epic ids
    #[must_use]
    pub fn ids(&self) -> Vec<EpicId> {
        self.by_key.values().map(|e| e.id).collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// A created story as the task phase sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoryRef {
    pub id: IssueId,
    pub epic_id: Option<EpicId>,
    pub sprint_id: Option<SprintId>,
}

/// Story key -> created story
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryIndex {
    by_key: BTreeMap<String, StoryRef>,
}

impl StoryIndex {
    /// Build from inserted story records; task rows are ignored
    #[must_use]
    pub fn from_records(records: &[IssueRecord]) -> Self {
        Self {
            by_key: records
                .iter()
                .filter(|r| r.is_story())
                .map(|r| {
                    (
                        r.issue.key.trim().to_string(),
                        StoryRef {
                            id: r.id,
                            epic_id: r.issue.epic_id,
                            sprint_id: r.issue.sprint_id,
                        },
                    )
                })
                .collect(),
        }
    }

    /// Story created for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<StoryRef> {
        self.by_key.get(key.trim()).copied()
    }

    /// All story ids
    #[must_use]
    pub fn ids(&self) -> Vec<IssueId> {
        self.by_key.values().map(|s| s.id).collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
