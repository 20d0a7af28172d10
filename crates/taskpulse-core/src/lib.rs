//! # taskpulse-core
//!
//! Domain model, dependency validation, recurrence, and lifecycle
//! management for the taskpulse personal task-management engine.
//!
//! This crate provides:
//! - Domain types: `Task`, `RecurrencePattern`, `CurveConfig`, `TaskStatus`
//! - The `TaskStore` external-collaborator trait and its CRUD-adjacent
//!   input/filter types
//! - The dependency validator (existence + acyclicity)
//! - The recurrence engine (next-due computation)
//! - The lifecycle manager (`TaskManager`) that drives status transitions
//!
//! Priority curves, the curve factory, and the daily planner live in
//! `taskpulse-solver`, which depends on this crate.
//!
//! ## Example
//!
//! ```rust
//! use taskpulse_core::{CurveConfig, NewTaskInput};
//!
//! let input = NewTaskInput::new("Write quarterly report")
//!     .deadline(chrono::Utc::now() + chrono::Duration::days(5))
//!     .curve(CurveConfig::Linear { start_date: None, deadline: None });
//! assert_eq!(input.title, "Write quarterly report");
//! ```

pub mod dependency;
pub mod lifecycle;
pub mod recurrence;
pub mod store;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod time;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use dependency::all_complete;
pub use lifecycle::TaskManager;
pub use store::{CompletionRecord, Filter, NewTaskInput, TaskPatch, TaskStore};

/// Unique identifier for a task.
pub type TaskId = u64;

// ============================================================================
// Task status
// ============================================================================

/// Lifecycle state of a task (spec.md §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    InProgress,
    Completed,
    Blocked,
}

// ============================================================================
// Recurrence
// ============================================================================

/// Whether the next occurrence is driven by wall-clock schedule
/// (`Calendar`) or by an interval since the last completion (`Completion`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceMode {
    Calendar,
    Completion,
}

/// Interval unit for `RecurrenceType::Interval`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceUnit {
    Days,
    Weeks,
    Months,
}

impl RecurrenceUnit {
    /// Equivalent day count used by the expected-interval table (spec.md
    /// §4.2's `AccumulatorCurve`).
    pub fn days(self) -> i64 {
        match self {
            RecurrenceUnit::Days => 1,
            RecurrenceUnit::Weeks => 7,
            RecurrenceUnit::Months => 30,
        }
    }
}

/// The four recurrence families, with their type-dependent fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecurrenceType {
    Daily,
    Weekly {
        #[serde(skip_serializing_if = "Option::is_none")]
        day_of_week: Option<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        days_of_week: Option<Vec<u8>>,
    },
    Monthly,
    Interval {
        interval: u32,
        unit: RecurrenceUnit,
        #[serde(skip_serializing_if = "Option::is_none")]
        anchor: Option<DateTime<Utc>>,
    },
}

/// A recurrence rule attached to a task.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecurrencePattern {
    pub mode: RecurrenceMode,
    #[serde(flatten)]
    pub kind: RecurrenceType,
}

impl RecurrencePattern {
    /// The expected interval in days, per spec.md §4.2's lookup table.
    pub fn expected_interval_days(&self) -> i64 {
        match &self.kind {
            RecurrenceType::Daily => 1,
            RecurrenceType::Weekly { .. } => 7,
            RecurrenceType::Monthly => 30,
            RecurrenceType::Interval { interval, unit, .. } => i64::from(*interval) * unit.days(),
        }
    }
}

// ============================================================================
// Curve config
// ============================================================================

/// Priority-curve configuration, as persisted on a task (spec.md §4.3, §6).
///
/// Field names and the `type` tag match the wire format in spec.md §6
/// exactly: lowercase/snake_case variant identifiers, ISO-8601 dates.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CurveConfig {
    Linear {
        #[serde(skip_serializing_if = "Option::is_none")]
        start_date: Option<DateTime<Utc>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        deadline: Option<DateTime<Utc>>,
    },
    Exponential {
        #[serde(skip_serializing_if = "Option::is_none")]
        start_date: Option<DateTime<Utc>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        deadline: Option<DateTime<Utc>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        exponent: Option<f64>,
    },
    HardWindow {
        #[serde(skip_serializing_if = "Option::is_none")]
        window_start: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        window_end: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        priority: Option<f64>,
    },
    Blocked {
        #[serde(skip_serializing_if = "Option::is_none")]
        dependencies: Option<Vec<TaskId>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        then_curve: Option<Box<CurveConfig>>,
    },
    Accumulator {
        #[serde(skip_serializing_if = "Option::is_none")]
        recurrence: Option<RecurrencePattern>,
        #[serde(skip_serializing_if = "Option::is_none")]
        buildup_rate: Option<f64>,
    },
}

impl CurveConfig {
    /// The default curve for a freshly-created task (spec.md §4.3): if the
    /// task carries a recurrence pattern, default to `Accumulator` with the
    /// pattern injected; otherwise `Linear` with default bounds.
    pub fn default_for(recurrence: Option<&RecurrencePattern>) -> Self {
        match recurrence {
            Some(pattern) => CurveConfig::Accumulator {
                recurrence: Some(pattern.clone()),
                buildup_rate: None,
            },
            None => CurveConfig::Linear {
                start_date: None,
                deadline: None,
            },
        }
    }
}

// ============================================================================
// Task
// ============================================================================

/// A schedulable unit of work (spec.md §3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub project: Option<String>,
    pub bucket_id: Option<String>,
    /// Set-like in meaning; duplicates are tolerated but not meaningful
    /// (spec.md §8 requires `create`/`get` to preserve multiplicity).
    pub tags: Vec<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub estimate_minutes: Option<u32>,
    pub window_start: Option<String>,
    pub window_end: Option<String>,
    pub recurrence: Option<RecurrencePattern>,
    pub last_completed_at: Option<DateTime<Utc>>,
    pub next_due_at: Option<DateTime<Utc>>,
    /// Ordered list of dependency task ids; set-like, duplicates tolerated.
    pub dependencies: Vec<TaskId>,
    pub curve: CurveConfig,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// `true` if the task has no window, or its window (inclusive bounds,
    /// possibly crossing midnight) contains `now`'s minute-of-day.
    pub fn window_contains(&self, now_minutes: u32) -> bool {
        match (&self.window_start, &self.window_end) {
            (Some(start), Some(end)) => match (time::parse_hhmm(start), time::parse_hhmm(end)) {
                (Some(s), Some(e)) => time::in_window(now_minutes, s, e),
                _ => true,
            },
            _ => true,
        }
    }

    pub fn has_window(&self) -> bool {
        self.window_start.is_some() && self.window_end.is_some()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by the dependency validator and lifecycle manager
/// (spec.md §7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("task {0} not found")]
    NotFound(TaskId),

    #[error("dependency {missing} does not resolve")]
    DepMissing { missing: TaskId },

    #[error("circular dependency through task {0}")]
    Circular(TaskId),

    #[error("task {0} has dependents and cannot be deleted")]
    HasDependents(TaskId),
}
