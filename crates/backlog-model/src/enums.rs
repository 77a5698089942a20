//! Closed value sets used by candidates and persisted records
//!
//! Candidates coming from the document analyzer carry these values as raw
//! strings; the `parse` constructors are what validators use to decide
//! whether a value belongs to its set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Epic priority as emitted by the document analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EpicPriority {
    /// Must ship first
    #[serde(rename = "CRÍTICA", alias = "CRITICA")]
    Critica,
    /// High
    #[serde(rename = "ALTA")]
    Alta,
    /// Medium
    #[serde(rename = "MEDIA")]
    Media,
    /// Low
    #[serde(rename = "BAJA")]
    Baja,
    /// Not yet prioritized
    #[serde(rename = "PENDIENTE")]
    Pendiente,
}

impl EpicPriority {
    /// All priorities in rank order
    pub const ALL: [EpicPriority; 5] = [
        EpicPriority::Critica,
        EpicPriority::Alta,
        EpicPriority::Media,
        EpicPriority::Baja,
        EpicPriority::Pendiente,
    ];

    /// Parse a raw priority string, tolerating case, padding and a missing accent
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "CRÍTICA" | "CRITICA" => Some(Self::Critica),
            "ALTA" => Some(Self::Alta),
            "MEDIA" => Some(Self::Media),
            "BAJA" => Some(Self::Baja),
            "PENDIENTE" => Some(Self::Pendiente),
            _ => None,
        }
    }

    /// Scheduling rank, lower goes first
    #[inline]
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Critica => 1,
            Self::Alta => 2,
            Self::Media => 3,
            Self::Baja => 4,
            Self::Pendiente => 5,
        }
    }

    /// Multiplier applied to the weekly point budget when sizing a sprint
    #[inline]
    #[must_use]
    pub const fn capacity_multiplier(self) -> f64 {
        match self {
            Self::Critica => 1.3,
            Self::Alta => 1.1,
            Self::Media => 1.0,
            Self::Baja => 0.9,
            Self::Pendiente => 0.8,
        }
    }

    /// Canonical label
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critica => "CRÍTICA",
            Self::Alta => "ALTA",
            Self::Media => "MEDIA",
            Self::Baja => "BAJA",
            Self::Pendiente => "PENDIENTE",
        }
    }
}

impl fmt::Display for EpicPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Technical area of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskKind {
    /// Frontend
    Fe,
    /// Backend
    Be,
    /// Operations / infrastructure
    Ops,
    /// Documentation
    Docs,
    /// Testing
    Test,
}

impl TaskKind {
    /// Parse a raw task type
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "FE" => Some(Self::Fe),
            "BE" => Some(Self::Be),
            "OPS" => Some(Self::Ops),
            "DOCS" => Some(Self::Docs),
            "TEST" => Some(Self::Test),
            _ => None,
        }
    }

    /// Priority every task of this kind is created with
    #[inline]
    #[must_use]
    pub const fn default_priority(self) -> IssuePriority {
        match self {
            Self::Ops | Self::Be => IssuePriority::High,
            Self::Fe | Self::Test => IssuePriority::Medium,
            Self::Docs => IssuePriority::Low,
        }
    }

    /// Canonical label
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fe => "FE",
            Self::Be => "BE",
            Self::Ops => "OPS",
            Self::Docs => "DOCS",
            Self::Test => "TEST",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of a persisted issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssuePriority {
    /// Low
    Low,
    /// Medium
    Medium,
    /// High
    High,
    /// Critical
    Critical,
}

impl IssuePriority {
    /// Priority derived from a story estimate
    #[inline]
    #[must_use]
    pub const fn from_story_points(points: u32) -> Self {
        match points {
            0..=2 => Self::Low,
            3..=5 => Self::Medium,
            6..=8 => Self::High,
            _ => Self::Critical,
        }
    }
}

/// Size bucket of a story, used as a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorySize {
    /// Under 5 points
    Small,
    /// 5 to 7 points
    Medium,
    /// 8 points and above
    Large,
}

impl StorySize {
    /// Bucket for a story estimate
    #[inline]
    #[must_use]
    pub const fn from_story_points(points: u32) -> Self {
        match points {
            0..=4 => Self::Small,
            5..=7 => Self::Medium,
            _ => Self::Large,
        }
    }

    /// Label form
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

/// Discriminator of the shared issue table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    /// User story
    Story,
    /// Technical task
    Task,
}

/// Health indicator of an epic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EpicHealth {
    /// No known risk
    #[default]
    OnTrack,
    /// Risk identified
    AtRisk,
    /// Slipping
    OffTrack,
}

/// Workflow status shared by epics and issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkStatus {
    /// Not started
    #[default]
    Todo,
    /// Being worked on
    InProgress,
    /// Finished
    Done,
}

/// Scheduling status of a generated sprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SprintStatus {
    /// Ready to be started
    Planned,
    /// Dates are an estimate and may move
    Provisional,
}
