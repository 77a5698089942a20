//! Pipeline configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file is a
//! valid configuration; unknown keys are rejected.
//!
//! ```toml
//! default_assignee = "00000000-0000-4000-8000-000000000001"
//! assignment = "requested_or_fallback"
//! analyzer_timeout_secs = 120
//! compensate_on_failure = true  # off by default
//!
//! [scheduler]
//! points_per_week = 18
//! start_date = "2027-01-04"
//!
//! [limits]
//! max_story_points = 13
//! ```

use crate::error::ConfigError;
use backlog_model::UserId;
use backlog_scheduler::SchedulerConfig;
use backlog_validation::ValidationLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

/// Identity tasks are assigned to when no other assignee applies
pub const FALLBACK_ASSIGNEE: UserId =
    UserId::from_uuid(Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001));

/// How generated tasks are assigned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMode {
    /// Every task goes to the configured default assignee
    #[default]
    Fixed,
    /// The requested assignee when present, the default otherwise
    RequestedOrFallback,
}

/// Import pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Fallback assignee identity
    pub default_assignee: UserId,
    /// Task assignment policy
    pub assignment: AssignmentMode,
    /// Time budget of each analyzer call; unbounded when absent
    pub analyzer_timeout_secs: Option<u64>,
    /// Time budget of each store call; unbounded when absent
    pub store_timeout_secs: Option<u64>,
    /// Delete already created records when a later phase fails; off by
    /// default, leaving the partial project for manual cleanup
    pub compensate_on_failure: bool,
    /// Maximum length of generated project codes
    pub project_code_max_len: usize,
    /// Sprint planner tunables
    pub scheduler: SchedulerConfig,
    /// Candidate validation bounds
    pub limits: ValidationLimits,
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded pipeline configuration");
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject inconsistent values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheduler
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.project_code_max_len < 2 {
            return Err(ConfigError::Invalid(
                "project_code_max_len must be at least 2".to_string(),
            ));
        }
        if self.limits.min_epic_weeks > self.limits.max_epic_weeks
            || self.limits.min_story_points > self.limits.max_story_points
        {
            return Err(ConfigError::Invalid(
                "validation limits have inverted ranges".to_string(),
            ));
        }
        if self.analyzer_timeout_secs == Some(0) || self.store_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid("timeouts must be positive".to_string()));
        }
        Ok(())
    }

    /// With fallback assignee
    #[inline]
    #[must_use]
    pub fn with_default_assignee(mut self, user: UserId) -> Self {
        self.default_assignee = user;
        self
    }

    /// With assignment mode
    #[inline]
    #[must_use]
    pub fn with_assignment(mut self, mode: AssignmentMode) -> Self {
        self.assignment = mode;
        self
    }

    /// With compensation on or off
    #[inline]
    #[must_use]
    pub fn with_compensation(mut self, enabled: bool) -> Self {
        self.compensate_on_failure = enabled;
        self
    }

    /// With analyzer time budget
    #[inline]
    #[must_use]
    pub fn with_analyzer_timeout(mut self, timeout: Duration) -> Self {
        self.analyzer_timeout_secs = Some(timeout.as_secs().max(1));
        self
    }

    /// With store time budget
    #[inline]
    #[must_use]
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout_secs = Some(timeout.as_secs().max(1));
        self
    }

    /// With scheduler configuration
    #[inline]
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// With validation limits
    #[inline]
    #[must_use]
    pub fn with_limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Analyzer time budget
    #[must_use]
    pub fn analyzer_timeout(&self) -> Option<Duration> {
        self.analyzer_timeout_secs.map(Duration::from_secs)
    }

    /// Store time budget
    #[must_use]
    pub fn store_timeout(&self) -> Option<Duration> {
        self.store_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_assignee: FALLBACK_ASSIGNEE,
            assignment: AssignmentMode::Fixed,
            analyzer_timeout_secs: None,
            store_timeout_secs: None,
            compensate_on_failure: false,
            project_code_max_len: 6,
            scheduler: SchedulerConfig::default(),
            limits: ValidationLimits::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_is_default() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert!(!config.compensate_on_failure);
        assert_eq!(config.default_assignee, FALLBACK_ASSIGNEE);
    }

    #[test]
    fn nested_sections_are_parsed() {
        let config = PipelineConfig::from_toml_str(
            r#"
            assignment = "requested_or_fallback"
            analyzer_timeout_secs = 45
            compensate_on_failure = true

            [scheduler]
            points_per_week = 18
            start_date = "2027-01-04"

            [limits]
            max_story_points = 13
            "#,
        )
        .unwrap();

        assert_eq!(config.assignment, AssignmentMode::RequestedOrFallback);
        assert_eq!(config.analyzer_timeout(), Some(Duration::from_secs(45)));
        assert!(config.compensate_on_failure);
        assert_eq!(config.scheduler.points_per_week, 18);
        assert_eq!(config.scheduler.max_sprint_weeks, 4);
        assert_eq!(config.limits.max_story_points, 13);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = PipelineConfig::from_toml_str("retries = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn inconsistent_values_are_rejected() {
        let err = PipelineConfig::from_toml_str("project_code_max_len = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = PipelineConfig::from_toml_str(
            "[scheduler]\nmin_sprint_weeks = 5\nmax_sprint_weeks = 2",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "project_code_max_len = 8").unwrap();

        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.project_code_max_len, 8);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = PipelineConfig::load("/nonexistent/backlog.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
