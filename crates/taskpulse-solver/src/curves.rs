//! Priority curves (spec.md §4.2): the five shapes a task's urgency can
//! take over time, each evaluated at a given instant to a priority score.
//!
//! Every variant is a validated, already-fully-specified value — the
//! construction-time checks below are exactly spec.md §7's `InvalidCurveArgs`
//! cases. Defaulting unset fields and translating a task's `CurveConfig` into
//! one of these is [`crate::factory`]'s job, not this module's.

use chrono::{DateTime, Timelike, Utc};
use taskpulse_core::{TaskId, TaskStore};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CurveError {
    #[error("deadline must be strictly after start")]
    InvalidBounds,
    #[error("exponent {0} outside [1.0, 5.0]")]
    InvalidExponent(f64),
    #[error("priority {0} outside [0.0, 2.0]")]
    InvalidPriority(f64),
    #[error("blocked curve requires at least one dependency")]
    EmptyDependencies,
}

/// A fully-specified, ready-to-evaluate priority curve.
#[derive(Debug, Clone)]
pub enum PriorityCurve {
    Linear {
        start: DateTime<Utc>,
        deadline: DateTime<Utc>,
    },
    Exponential {
        start: DateTime<Utc>,
        deadline: DateTime<Utc>,
        exponent: f64,
    },
    HardWindow {
        window_start_minutes: u32,
        window_end_minutes: u32,
        priority: f64,
    },
    Accumulator {
        last_completed: Option<DateTime<Utc>>,
        next_due: Option<DateTime<Utc>>,
        expected_interval_days: f64,
        is_calendar: bool,
        buildup_rate: f64,
    },
    Blocked {
        dependencies: Vec<TaskId>,
        then_curve: Box<PriorityCurve>,
    },
}

/// Debug/introspection summary of a curve (spec.md §4.2's `metadata()`), not
/// used for dispatch — `PriorityCurve` is matched on directly for that.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveMetadata {
    pub kind: &'static str,
    pub start: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
}

impl PriorityCurve {
    pub fn linear(start: DateTime<Utc>, deadline: DateTime<Utc>) -> Result<Self, CurveError> {
        if deadline <= start {
            return Err(CurveError::InvalidBounds);
        }
        Ok(PriorityCurve::Linear { start, deadline })
    }

    pub fn exponential(
        start: DateTime<Utc>,
        deadline: DateTime<Utc>,
        exponent: f64,
    ) -> Result<Self, CurveError> {
        if deadline <= start {
            return Err(CurveError::InvalidBounds);
        }
        if !(1.0..=5.0).contains(&exponent) {
            return Err(CurveError::InvalidExponent(exponent));
        }
        Ok(PriorityCurve::Exponential {
            start,
            deadline,
            exponent,
        })
    }

    pub fn hard_window(
        window_start_minutes: u32,
        window_end_minutes: u32,
        priority: f64,
    ) -> Result<Self, CurveError> {
        if window_end_minutes <= window_start_minutes {
            return Err(CurveError::InvalidBounds);
        }
        if !(0.0..=2.0).contains(&priority) {
            return Err(CurveError::InvalidPriority(priority));
        }
        Ok(PriorityCurve::HardWindow {
            window_start_minutes,
            window_end_minutes,
            priority,
        })
    }

    pub fn accumulator(
        last_completed: Option<DateTime<Utc>>,
        next_due: Option<DateTime<Utc>>,
        expected_interval_days: f64,
        is_calendar: bool,
        buildup_rate: f64,
    ) -> Self {
        PriorityCurve::Accumulator {
            last_completed,
            next_due,
            expected_interval_days,
            is_calendar,
            buildup_rate,
        }
    }

    pub fn blocked(
        dependencies: Vec<TaskId>,
        then_curve: PriorityCurve,
    ) -> Result<Self, CurveError> {
        if dependencies.is_empty() {
            return Err(CurveError::EmptyDependencies);
        }
        Ok(PriorityCurve::Blocked {
            dependencies,
            then_curve: Box::new(then_curve),
        })
    }

    /// Evaluate this curve at `now`. `store` is only consulted by
    /// `Blocked`, to check whether its dependencies are all complete
    /// (spec.md §4.5); other variants ignore it.
    pub fn evaluate(&self, now: DateTime<Utc>, store: &dyn TaskStore) -> f64 {
        match self {
            PriorityCurve::Linear { start, deadline } => linear_fraction(now, *start, *deadline),
            PriorityCurve::Exponential {
                start,
                deadline,
                exponent,
            } => {
                let fraction = linear_fraction(now, *start, *deadline);
                if now > *deadline {
                    // Overdue: grows linearly past 1.0, not raised to the
                    // exponent (spec.md §4.2).
                    fraction
                } else {
                    fraction.powf(*exponent)
                }
            }
            PriorityCurve::HardWindow {
                window_start_minutes,
                window_end_minutes,
                priority,
            } => {
                let minute_of_day = now.hour() * 60 + now.minute();
                if minute_of_day >= *window_start_minutes && minute_of_day <= *window_end_minutes {
                    *priority
                } else {
                    0.0
                }
            }
            PriorityCurve::Accumulator {
                last_completed,
                next_due,
                expected_interval_days,
                is_calendar,
                buildup_rate,
            } => evaluate_accumulator(
                now,
                *last_completed,
                *next_due,
                *expected_interval_days,
                *is_calendar,
                *buildup_rate,
            ),
            PriorityCurve::Blocked {
                dependencies,
                then_curve,
            } => {
                if taskpulse_core::all_complete(store, dependencies) {
                    then_curve.evaluate(now, store)
                } else {
                    0.0
                }
            }
        }
    }

    pub fn metadata(&self) -> CurveMetadata {
        match self {
            PriorityCurve::Linear { start, deadline } => CurveMetadata {
                kind: "linear",
                start: Some(*start),
                deadline: Some(*deadline),
            },
            PriorityCurve::Exponential { start, deadline, .. } => CurveMetadata {
                kind: "exponential",
                start: Some(*start),
                deadline: Some(*deadline),
            },
            PriorityCurve::HardWindow { .. } => CurveMetadata {
                kind: "hard_window",
                start: None,
                deadline: None,
            },
            PriorityCurve::Accumulator {
                last_completed,
                next_due,
                ..
            } => CurveMetadata {
                kind: "accumulator",
                start: *last_completed,
                deadline: *next_due,
            },
            PriorityCurve::Blocked { .. } => CurveMetadata {
                kind: "blocked",
                start: None,
                deadline: None,
            },
        }
    }
}

/// `(now - start) / (deadline - start)`, clamped at 0 before `start` and
/// continuing linearly past 1.0 after `deadline` (spec.md §4.2's shared
/// overdue behavior for `Linear` and `Exponential`).
fn linear_fraction(now: DateTime<Utc>, start: DateTime<Utc>, deadline: DateTime<Utc>) -> f64 {
    if now <= start {
        return 0.0;
    }
    let span = (deadline - start).num_seconds() as f64;
    let elapsed = (now - start).num_seconds() as f64;
    elapsed / span
}

/// Accumulator evaluation (spec.md §4.2): Calendar mode ramps priority as
/// `next_due` approaches and decays past it; Completion mode buckets
/// elapsed-since-last-completion as a fraction of the expected interval.
fn evaluate_accumulator(
    now: DateTime<Utc>,
    last_completed: Option<DateTime<Utc>>,
    next_due: Option<DateTime<Utc>>,
    expected_interval_days: f64,
    is_calendar: bool,
    buildup_rate: f64,
) -> f64 {
    if is_calendar {
        let due = match next_due {
            Some(due) => due,
            None => return 0.2,
        };
        let delta_days = (due - now).num_seconds() as f64 / 86_400.0;
        let half_interval = expected_interval_days / 2.0;
        if delta_days > half_interval {
            0.2
        } else if delta_days < 0.0 {
            (1.0 + delta_days.abs() * buildup_rate).min(1.5)
        } else {
            0.2 + (1.0 - delta_days / half_interval) * 0.8
        }
    } else {
        let baseline = now - chrono::Duration::days(expected_interval_days.round() as i64);
        let since = last_completed.unwrap_or(baseline);
        let days_since = (now - since).num_seconds() as f64 / 86_400.0;
        let ratio = days_since / expected_interval_days;
        if ratio < 0.5 {
            0.1
        } else if ratio < 0.8 {
            0.3
        } else if ratio < 1.0 {
            0.6
        } else if ratio < 1.2 {
            0.9
        } else {
            1.0
        }
    }
}
