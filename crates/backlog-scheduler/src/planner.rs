//! Sprint planner
//!
//! Turns a prioritized list of epics into one sprint per epic:
//! 1. Stable sort by priority rank (CRÍTICA first, PENDIENTE last)
//! 2. Sequential Monday-to-Friday windows, `clamp(weeks, min, max)` weeks each
//! 3. Name and goal derived from the epic
//! 4. Capacity `round(weeks * points_per_week * priority multiplier)`
//!
//! Planning is pure: persisting the plan is the caller's job, and the
//! returned order is the order ids must be matched back in.

use crate::calendar::{monday_on_or_after, next_monday, SprintWindow};
use crate::config::SchedulerConfig;
use crate::error::ScheduleError;
use crate::naming::{sprint_goal, sprint_name};
use backlog_model::{EpicBasicInfo, EpicPriority, NewSprint, ProjectId, SprintStatus};
use chrono::NaiveDate;

/// One planned sprint
#[derive(Debug, Clone, PartialEq)]
pub struct SprintPlan {
    /// Key of the epic the sprint is for
    pub epic_id: String,
    /// 1-based position in the schedule
    pub sequence: u32,
    pub name: String,
    pub goal: String,
    /// True when the goal was generated because the epic had no objective
    pub goal_generated: bool,
    pub window: SprintWindow,
    /// Weeks actually scheduled, after clamping
    pub weeks: u32,
    pub capacity: u32,
    pub priority: EpicPriority,
    pub status: SprintStatus,
}

impl SprintPlan {
    /// Persistence record for this plan
    #[must_use]
    pub fn to_new_sprint(&self, project_id: ProjectId) -> NewSprint {
        NewSprint {
            project_id,
            epic_key: self.epic_id.clone(),
            sequence: self.sequence,
            name: self.name.clone(),
            goal: self.goal.clone(),
            start_date: self.window.start,
            end_date: self.window.end,
            capacity: self.capacity,
            status: self.status,
        }
    }
}

/// Plans sprints from epics
#[derive(Debug, Clone, Default)]
pub struct SprintPlanner {
    config: SchedulerConfig,
}

impl SprintPlanner {
    /// Create planner with default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create planner with custom configuration
    #[inline]
    #[must_use]
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// First sprint start for a plan computed on `today`
    #[must_use]
    pub fn first_start(&self, today: NaiveDate) -> NaiveDate {
        match self.config.start_date {
            Some(pinned) => monday_on_or_after(pinned),
            None => next_monday(today),
        }
    }

    /// Plan one sprint per epic
    ///
    /// # Errors
    /// - `ScheduleError::NoEpics` if `epics` is empty
    /// - `ScheduleError::InvalidConfig` if the configuration is inconsistent
    pub fn plan(
        &self,
        epics: &[EpicBasicInfo],
        today: NaiveDate,
    ) -> Result<Vec<SprintPlan>, ScheduleError> {
        if epics.is_empty() {
            return Err(ScheduleError::NoEpics);
        }
        self.config.validate()?;

        let ordered = sort_by_priority(epics);
        let mut start = self.first_start(today);
        let mut plans = Vec::with_capacity(ordered.len());

        for (index, epic) in ordered.into_iter().enumerate() {
            let sequence = u32::try_from(index + 1).unwrap_or(u32::MAX);
            let priority = epic.priority_level().unwrap_or(EpicPriority::Pendiente);
            let weeks = self.sprint_weeks(epic.estimated_weeks);
            let window = SprintWindow::new(start, weeks)?;
            let (goal, goal_generated) = sprint_goal(
                epic.objective.as_deref(),
                &epic.title,
                self.config.max_goal_len,
            );

            plans.push(SprintPlan {
                epic_id: epic.id.trim().to_string(),
                sequence,
                name: sprint_name(sequence, &epic.title, self.config.max_name_title_len),
                goal,
                goal_generated,
                window,
                weeks,
                capacity: self.capacity(epic.estimated_weeks, priority),
                priority,
                status: if index == 0 {
                    SprintStatus::Planned
                } else {
                    SprintStatus::Provisional
                },
            });

            start = window.next_start()?;
        }

        tracing::debug!(
            sprints = plans.len(),
            first_start = %plans[0].window.start,
            "planned sprint schedule"
        );
        Ok(plans)
    }

    /// Scheduled length of a sprint for an epic estimate
    #[must_use]
    pub fn sprint_weeks(&self, estimated_weeks: i64) -> u32 {
        let min = i64::from(self.config.min_sprint_weeks);
        let max = i64::from(self.config.max_sprint_weeks);
        u32::try_from(estimated_weeks.max(min).min(max)).unwrap_or(self.config.min_sprint_weeks)
    }

    /// Heuristic capacity in story points, based on the raw estimate
    #[must_use]
    pub fn capacity(&self, estimated_weeks: i64, priority: EpicPriority) -> u32 {
        #[allow(clippy::cast_precision_loss)]
        let points = estimated_weeks.max(0) as f64
            * f64::from(self.config.points_per_week)
            * priority.capacity_multiplier();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let capacity = points.round() as u32;
        capacity
    }
}

/// Stable sort by priority rank; unknown priorities rank last
#[must_use]
pub fn sort_by_priority(epics: &[EpicBasicInfo]) -> Vec<&EpicBasicInfo> {
    let mut ordered: Vec<&EpicBasicInfo> = epics.iter().collect();
    ordered.sort_by_key(|epic| {
        epic.priority_level()
            .map_or(EpicPriority::Pendiente.rank(), EpicPriority::rank)
    });
    ordered
}
