//! Length and range bounds applied by the validators

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Bounds applied to candidate fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationLimits {
    /// Maximum length of a document-local key
    pub max_id_len: usize,
    /// Maximum length of a title
    pub max_title_len: usize,
    /// Maximum length of a story description
    pub max_description_len: usize,
    /// Smallest accepted epic estimate, in weeks
    pub min_epic_weeks: i64,
    /// Largest accepted epic estimate, in weeks
    pub max_epic_weeks: i64,
    /// Smallest accepted story estimate
    pub min_story_points: i64,
    /// Largest accepted story estimate
    pub max_story_points: i64,
}

impl ValidationLimits {
    /// Accepted epic estimate range
    #[inline]
    #[must_use]
    pub fn epic_weeks(&self) -> RangeInclusive<i64> {
        self.min_epic_weeks..=self.max_epic_weeks
    }

    /// Accepted story estimate range
    #[inline]
    #[must_use]
    pub fn story_points(&self) -> RangeInclusive<i64> {
        self.min_story_points..=self.max_story_points
    }
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_id_len: 50,
            max_title_len: 200,
            max_description_len: 5000,
            min_epic_weeks: 1,
            max_epic_weeks: 12,
            min_story_points: 1,
            max_story_points: 21,
        }
    }
}
