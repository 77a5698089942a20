//! Backlog Scheduler - sprint planning from prioritized epics
//!
//! One sprint per epic, ordered by priority and laid out as consecutive
//! Monday-to-Friday windows starting on the next upcoming Monday.
//!
//! # Example
//!
//! ```rust
//! use backlog_model::{EpicBasicInfo, EpicPriority};
//! use backlog_scheduler::SprintPlanner;
//! use chrono::NaiveDate;
//!
//! let epics = vec![EpicBasicInfo::new("EP-01", "Autenticación", 2, EpicPriority::Critica)];
//! let today = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
//! let plans = SprintPlanner::new().plan(&epics, today).unwrap();
//!
//! assert_eq!(plans[0].name, "Sprint 1: Autenticación");
//! assert_eq!(plans[0].capacity, 52);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod calendar;
pub mod config;
pub mod error;
pub mod naming;
pub mod planner;

pub use calendar::{monday_on_or_after, next_monday, SprintWindow};
pub use config::SchedulerConfig;
pub use error::ScheduleError;
pub use naming::{clean_title, sprint_goal, sprint_name, truncate_chars};
pub use planner::{sort_by_priority, SprintPlan, SprintPlanner};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
