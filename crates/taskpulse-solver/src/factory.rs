//! Curve construction (spec.md §4.3): turns a task's `CurveConfig` — whose
//! fields are mostly optional at the wire boundary (spec.md §6) — into a
//! fully-specified, ready-to-evaluate [`crate::curves::PriorityCurve`],
//! applying the per-variant defaults and required-field checks spec.md §4.3
//! and §7 describe.

use crate::curves::{CurveError, PriorityCurve};
use chrono::{DateTime, Duration, Utc};
use taskpulse_core::{CurveConfig, RecurrenceMode, RecurrencePattern, Task, TaskStore};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FactoryError {
    #[error("hard_window curve requires window_start and window_end")]
    MissingWindow,
    #[error("blocked curve requires a dependency checker")]
    MissingChecker,
    #[error("blocked curve requires a dependencies field")]
    MissingDependencies,
    #[error("accumulator curve requires a recurrence pattern")]
    MissingRecurrence,
    #[error(transparent)]
    Curve(#[from] CurveError),
}

const DEFAULT_EXPONENT: f64 = 2.0;
const DEFAULT_HARD_WINDOW_PRIORITY: f64 = 1.0;
const DEFAULT_BUILDUP_RATE: f64 = 0.1;
const DEFAULT_DEADLINE_HORIZON_DAYS: i64 = 7;

/// Build a [`PriorityCurve`] from a task's stored `CurveConfig`.
///
/// `checker` is required only for `Blocked` curves, to evaluate dependency
/// completion later; `task` supplies the `last_completed_at`/`next_due_at`
/// an `Accumulator` curve needs. `now` seeds the `Linear`/`Exponential`
/// default start and deadline.
///
/// There is deliberately no "unknown curve type" branch: `CurveConfig` is a
/// closed, tagged `enum`, so every value the type system accepts already
/// names one of these five variants. Malformed wire input (an unrecognized
/// `type` tag) is rejected by `serde` at deserialization time, before a
/// `CurveConfig` value can exist to reach this function.
pub fn build_curve(
    config: &CurveConfig,
    checker: Option<&dyn TaskStore>,
    task: Option<&Task>,
    now: DateTime<Utc>,
) -> Result<PriorityCurve, FactoryError> {
    match config {
        CurveConfig::Linear { start_date, deadline } => {
            let (start, deadline) = linear_bounds(*start_date, *deadline, now);
            Ok(PriorityCurve::linear(start, deadline)?)
        }
        CurveConfig::Exponential {
            start_date,
            deadline,
            exponent,
        } => {
            let (start, deadline) = linear_bounds(*start_date, *deadline, now);
            let exponent = exponent.unwrap_or(DEFAULT_EXPONENT);
            Ok(PriorityCurve::exponential(start, deadline, exponent)?)
        }
        CurveConfig::HardWindow {
            window_start,
            window_end,
            priority,
        } => {
            let (start, end) = match (window_start, window_end) {
                (Some(s), Some(e)) => (s, e),
                _ => return Err(FactoryError::MissingWindow),
            };
            let start_minutes =
                taskpulse_core::time::parse_hhmm(start).ok_or(FactoryError::MissingWindow)?;
            let end_minutes =
                taskpulse_core::time::parse_hhmm(end).ok_or(FactoryError::MissingWindow)?;
            let priority = priority.unwrap_or(DEFAULT_HARD_WINDOW_PRIORITY);
            Ok(PriorityCurve::hard_window(start_minutes, end_minutes, priority)?)
        }
        CurveConfig::Blocked {
            dependencies,
            then_curve,
        } => {
            let checker = checker.ok_or(FactoryError::MissingChecker)?;
            let dependencies = dependencies
                .clone()
                .ok_or(FactoryError::MissingDependencies)?;
            let inner_config = then_curve
                .as_deref()
                .cloned()
                .unwrap_or_else(|| CurveConfig::Linear {
                    start_date: None,
                    deadline: None,
                });
            let inner = build_curve(&inner_config, Some(checker), task, now)?;
            Ok(PriorityCurve::blocked(dependencies, inner)?)
        }
        CurveConfig::Accumulator {
            recurrence,
            buildup_rate,
        } => {
            let pattern = recurrence
                .clone()
                .or_else(|| task.and_then(|t| t.recurrence.clone()))
                .ok_or(FactoryError::MissingRecurrence)?;
            let buildup_rate = buildup_rate.unwrap_or(DEFAULT_BUILDUP_RATE);
            Ok(build_accumulator(&pattern, task, buildup_rate, now))
        }
    }
}

fn linear_bounds(
    start_date: Option<DateTime<Utc>>,
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_date.unwrap_or(now);
    let deadline = deadline.unwrap_or(now + Duration::days(DEFAULT_DEADLINE_HORIZON_DAYS));
    (start, deadline)
}

fn build_accumulator(
    pattern: &RecurrencePattern,
    task: Option<&Task>,
    buildup_rate: f64,
    now: DateTime<Utc>,
) -> PriorityCurve {
    let last_completed = task.and_then(|t| t.last_completed_at);
    // spec.md §4.3: "next_due := now if task has none" — the factory, not
    // the curve, owns this default so a task with no recurrence history yet
    // still gets a well-defined calendar-mode ramp.
    let next_due = Some(task.and_then(|t| t.next_due_at).unwrap_or(now));
    let is_calendar = matches!(pattern.mode, RecurrenceMode::Calendar);
    let expected_interval_days = pattern.expected_interval_days() as f64;
    PriorityCurve::accumulator(
        last_completed,
        next_due,
        expected_interval_days,
        is_calendar,
        buildup_rate,
    )
}
