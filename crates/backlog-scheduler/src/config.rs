//! Scheduler configuration

use crate::error::ScheduleError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tunables of the sprint planner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Story points budgeted per sprint week before the priority multiplier
    pub points_per_week: u32,
    /// Shortest sprint, in weeks
    pub min_sprint_weeks: u32,
    /// Longest sprint, in weeks
    pub max_sprint_weeks: u32,
    /// Maximum characters of the epic title embedded in a sprint name
    pub max_name_title_len: usize,
    /// Maximum characters of a sprint goal
    pub max_goal_len: usize,
    /// Pin the schedule start; snapped forward to a Monday
    pub start_date: Option<NaiveDate>,
}

impl SchedulerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With pinned start date
    #[inline]
    #[must_use]
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// With weekly point budget
    #[inline]
    #[must_use]
    pub fn with_points_per_week(mut self, points: u32) -> Self {
        self.points_per_week = points;
        self
    }

    /// Reject configurations the planner cannot honour
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.min_sprint_weeks == 0 {
            return Err(ScheduleError::InvalidConfig(
                "min_sprint_weeks must be at least 1".to_string(),
            ));
        }
        if self.min_sprint_weeks > self.max_sprint_weeks {
            return Err(ScheduleError::InvalidConfig(format!(
                "min_sprint_weeks ({}) exceeds max_sprint_weeks ({})",
                self.min_sprint_weeks, self.max_sprint_weeks
            )));
        }
        if self.max_name_title_len < 4 || self.max_goal_len < 4 {
            return Err(ScheduleError::InvalidConfig(
                "name and goal lengths must allow at least 4 characters".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            points_per_week: 20,
            min_sprint_weeks: 2,
            max_sprint_weeks: 4,
            max_name_title_len: 30,
            max_goal_len: 200,
            start_date: None,
        }
    }
}
