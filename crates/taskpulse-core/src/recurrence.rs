//! Recurrence engine (spec.md §4.4): computing the next due instant for a
//! task from its `RecurrencePattern` and the instant it was just completed.
//!
//! Day-of-week numbering follows the teacher's `Calendar::is_working_day`
//! convention (`weekday().num_days_from_sunday()`, Sunday = 0), which
//! happens to match spec.md §3's `day_of_week: 0..=6` (Sunday=0) exactly.

use crate::{RecurrencePattern, RecurrenceMode, RecurrenceType};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

/// Start-of-day (00:00:00 UTC) for the calendar date of `instant`.
fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| Utc.from_local_datetime(&naive).single())
        .unwrap_or(instant)
}

fn weekday_index(instant: DateTime<Utc>) -> u8 {
    instant.weekday().num_days_from_sunday() as u8
}

/// Same day-of-month as `from`, advanced to the next calendar month, at
/// start of day. Clamps to the target month's last day when `from`'s
/// day-of-month doesn't exist there (e.g. the 31st into a 30-day month) —
/// spec.md §9 leaves this to the host date library and asks only that the
/// policy be documented, not overridden.
fn next_month_same_day(from: DateTime<Utc>) -> DateTime<Utc> {
    let date = from.date_naive();
    let (mut year, mut month) = (date.year(), date.month());
    month += 1;
    if month > 12 {
        month = 1;
        year += 1;
    }
    let day = date.day();
    let next = (1..=day)
        .rev()
        .find_map(|d| chrono::NaiveDate::from_ymd_opt(year, month, d))
        .expect("every month has at least one day");
    next.and_hms_opt(0, 0, 0)
        .and_then(|naive| Utc.from_local_datetime(&naive).single())
        .unwrap_or(from)
}

/// Compute `next_due` from a recurrence pattern and the instant a task was
/// just completed (spec.md §4.4).
///
/// `anchor` is the `Interval` pattern's own anchor if set, else the task's
/// creation time, as spec.md §4.4 directs.
pub fn next_due(pattern: &RecurrencePattern, completed_at: DateTime<Utc>, task_created_at: DateTime<Utc>) -> DateTime<Utc> {
    match pattern.mode {
        RecurrenceMode::Completion => completed_at + Duration::days(pattern.expected_interval_days()),
        RecurrenceMode::Calendar => next_due_calendar(pattern, completed_at, task_created_at),
    }
}

fn next_due_calendar(pattern: &RecurrencePattern, completed_at: DateTime<Utc>, task_created_at: DateTime<Utc>) -> DateTime<Utc> {
    match &pattern.kind {
        RecurrenceType::Daily => start_of_day(completed_at) + Duration::days(1),

        RecurrenceType::Weekly {
            days_of_week: Some(set),
            ..
        } if !set.is_empty() => {
            // Earliest day strictly after completed_at whose weekday is in
            // the set; search capped at 7 iterations (spec.md §4.4).
            let mut candidate = start_of_day(completed_at) + Duration::days(1);
            for _ in 0..7 {
                if set.contains(&weekday_index(candidate)) {
                    return candidate;
                }
                candidate += Duration::days(1);
            }
            completed_at + Duration::days(7)
        }

        RecurrenceType::Weekly {
            day_of_week: Some(target),
            ..
        } => {
            let today = weekday_index(completed_at);
            let mut days_until = i64::from(*target) - i64::from(today);
            if days_until <= 0 {
                days_until += 7;
            }
            start_of_day(completed_at) + Duration::days(days_until)
        }

        RecurrenceType::Weekly { .. } => completed_at + Duration::days(7),

        RecurrenceType::Monthly => next_month_same_day(completed_at),

        RecurrenceType::Interval { interval, unit, anchor } => {
            let step = Duration::days(i64::from(*interval) * unit.days());
            let mut candidate = anchor.unwrap_or(task_created_at);
            if step.num_days() <= 0 {
                return completed_at + Duration::days(7);
            }
            while candidate <= completed_at {
                candidate += step;
            }
            candidate
        }
    }
}
