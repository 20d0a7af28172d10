//! The daily planner (spec.md §4.8): picks a bounded, time-blocked set of
//! actionable tasks for a given day out of the ranked candidate pool
//! [`crate::evaluator::get_by_priority`] would otherwise return unbounded.

use crate::evaluator::evaluate_priority;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use taskpulse_core::{time, Task, TaskStatus, TaskStore};

/// Work-day bounds and task-sizing defaults. Start/end are minutes-from-
/// midnight, matching spec.md §4.1's `HH:MM` window convention once parsed.
#[derive(Debug, Clone, Copy)]
pub struct PlannerConfig {
    pub work_hours_start: u32,
    pub work_hours_end: u32,
    pub default_estimate_minutes: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            work_hours_start: 8 * 60,
            work_hours_end: 17 * 60,
            default_estimate_minutes: 15,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlanOptions {
    pub limit: usize,
    pub include_time_blocks: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            limit: 8,
            include_time_blocks: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start_minutes: u32,
    pub end_minutes: u32,
}

#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub task: Task,
    pub priority: f64,
    pub slot: TimeSlot,
    pub estimate_minutes: u32,
    pub is_default_estimate: bool,
}

#[derive(Debug, Clone)]
pub struct UnscheduledTask {
    pub task: Task,
    pub priority: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct PlanResult {
    pub scheduled: Vec<ScheduledTask>,
    pub unscheduled: Vec<UnscheduledTask>,
    pub total_scheduled_minutes: u32,
    pub remaining_minutes: u32,
}

const REASON_WINDOW_OUTSIDE_WORK_HOURS: &str = "window outside work hours";
const REASON_DOES_NOT_FIT: &str = "does not fit";

/// Build `date`'s plan (spec.md §4.8, steps 1-5).
pub fn plan_day(
    store: &dyn TaskStore,
    date: NaiveDate,
    config: &PlannerConfig,
    opts: &PlanOptions,
) -> PlanResult {
    let priority_time_minutes = priority_time(config.work_hours_start);
    let now = minutes_to_datetime(date, priority_time_minutes);

    // Step 2: candidate pool, sized 2*limit, ranked like C6's get_by_priority.
    let mut candidates: Vec<(Task, f64)> = store
        .all()
        .into_iter()
        .filter(|t| matches!(t.status, TaskStatus::Open | TaskStatus::InProgress))
        .map(|t| {
            let priority = evaluate_priority(&t, now, store);
            (t, priority)
        })
        .collect();
    candidates.sort_by(|(a, pa), (b, pb)| {
        pb.partial_cmp(pa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    candidates.truncate(opts.limit.saturating_mul(2));

    // Step 3: actionability filter.
    let actionable: Vec<(Task, f64)> = candidates
        .into_iter()
        .filter(|(task, priority)| is_actionable(task, *priority, date))
        .collect();

    if !opts.include_time_blocks {
        let nominal = TimeSlot {
            start_minutes: config.work_hours_start,
            end_minutes: config.work_hours_end,
        };
        let scheduled = actionable
            .into_iter()
            .take(opts.limit)
            .map(|(task, priority)| {
                let is_default_estimate = task.estimate_minutes.is_none();
                let estimate_minutes = task
                    .estimate_minutes
                    .unwrap_or(config.default_estimate_minutes);
                ScheduledTask {
                    task,
                    priority,
                    slot: nominal,
                    estimate_minutes,
                    is_default_estimate,
                }
            })
            .collect();
        return PlanResult {
            scheduled,
            unscheduled: Vec::new(),
            total_scheduled_minutes: 0,
            remaining_minutes: config.work_hours_end.saturating_sub(config.work_hours_start),
        };
    }

    // Step 4: greedy first-fit packing.
    let work_range = (config.work_hours_start, config.work_hours_end);
    let mut used: Vec<(u32, u32)> = Vec::new();
    let mut scheduled = Vec::new();
    let mut unscheduled = Vec::new();

    for (task, priority) in actionable {
        if scheduled.len() >= opts.limit {
            break;
        }

        let is_default_estimate = task.estimate_minutes.is_none();
        let estimate_minutes = task
            .estimate_minutes
            .unwrap_or(config.default_estimate_minutes);

        let allowed_range = match task_window_minutes(&task) {
            Some(window) => match time::range_intersect(window, work_range) {
                Some(range) => range,
                None => {
                    unscheduled.push(UnscheduledTask {
                        task,
                        priority,
                        reason: REASON_WINDOW_OUTSIDE_WORK_HOURS.to_string(),
                    });
                    continue;
                }
            },
            None => work_range,
        };

        match find_gap(allowed_range, estimate_minutes, &used) {
            Some((start, end)) => {
                used.push((start, end));
                used.sort_unstable();
                scheduled.push(ScheduledTask {
                    task,
                    priority,
                    slot: TimeSlot {
                        start_minutes: start,
                        end_minutes: end,
                    },
                    estimate_minutes,
                    is_default_estimate,
                });
            }
            None => unscheduled.push(UnscheduledTask {
                task,
                priority,
                reason: REASON_DOES_NOT_FIT.to_string(),
            }),
        }
    }

    let total_scheduled_minutes: u32 = used.iter().map(|(s, e)| e - s).sum();
    let work_day_minutes = work_range.1.saturating_sub(work_range.0);
    let remaining_minutes = work_day_minutes.saturating_sub(total_scheduled_minutes);

    PlanResult {
        scheduled,
        unscheduled,
        total_scheduled_minutes,
        remaining_minutes,
    }
}

/// `hour = max(workStartHour, 9)`, `minute = workStartMinute` (spec.md §4.8
/// step 1) — hoists early-morning-only windows out of candidacy before the
/// evaluation instant even considers them.
fn priority_time(work_hours_start: u32) -> u32 {
    let hour = (work_hours_start / 60).max(9);
    let minute = work_hours_start % 60;
    hour * 60 + minute
}

/// Step 3: keep iff `priority > 0` and at least one of: deadline on or
/// before `date`, `next_due_at` on or before `date`, the task has a window,
/// or priority clears the 0.3 high-priority catch-all.
fn is_actionable(task: &Task, priority: f64, date: NaiveDate) -> bool {
    if priority <= 0.0 {
        return false;
    }
    let due_today_or_earlier = task
        .deadline
        .is_some_and(|d| d.date_naive() <= date);
    let recurrence_due_today_or_earlier = task
        .next_due_at
        .is_some_and(|d| d.date_naive() <= date);
    due_today_or_earlier
        || recurrence_due_today_or_earlier
        || task.has_window()
        || priority > 0.3
}

fn task_window_minutes(task: &Task) -> Option<(u32, u32)> {
    match (&task.window_start, &task.window_end) {
        (Some(start), Some(end)) => match (time::parse_hhmm(start), time::parse_hhmm(end)) {
            (Some(s), Some(e)) if e > s => Some((s, e)),
            _ => None,
        },
        _ => None,
    }
}

/// First gap of at least `duration` minutes within `range`, skipping past
/// already-`used` slots (assumed sorted, possibly outside `range`).
fn find_gap(range: (u32, u32), duration: u32, used: &[(u32, u32)]) -> Option<(u32, u32)> {
    let mut cursor = range.0;
    for &(start, end) in used {
        if end <= cursor || start >= range.1 {
            continue;
        }
        let gap_end = start.min(range.1);
        if gap_end > cursor && gap_end - cursor >= duration {
            return Some((cursor, cursor + duration));
        }
        cursor = cursor.max(end);
        if cursor >= range.1 {
            return None;
        }
    }
    if range.1 - cursor >= duration {
        Some((cursor, cursor + duration))
    } else {
        None
    }
}

fn minutes_to_datetime(date: NaiveDate, minutes: u32) -> DateTime<Utc> {
    let naive = date
        .and_hms_opt(minutes / 60, minutes % 60, 0)
        .unwrap_or_else(|| date.and_hms_opt(0, 0, 0).unwrap());
    Utc.from_local_datetime(&naive)
        .single()
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpulse_core::testing::{bare_task, MemStore};
    use taskpulse_core::CurveConfig;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    fn deadline_task(id: u64, estimate: u32, deadline_hours: i64, priority_time_minutes: u32) -> Task {
        let mut task = bare_task(id, vec![]);
        task.estimate_minutes = Some(estimate);
        let now = minutes_to_datetime(day(), priority_time_minutes);
        task.deadline = Some(now + chrono::Duration::hours(deadline_hours));
        task.curve = CurveConfig::Linear {
            start_date: Some(now - chrono::Duration::days(5)),
            deadline: Some(now + chrono::Duration::hours(deadline_hours)),
        };
        task
    }

    #[test]
    fn fills_gaps_back_to_back_from_work_start() {
        let mut store = MemStore::new();
        let config = PlannerConfig {
            work_hours_start: 9 * 60,
            work_hours_end: 17 * 60,
            ..PlannerConfig::default()
        };
        let priority_time_minutes = priority_time(config.work_hours_start);
        for id in 1..=3 {
            store.seed(deadline_task(id, 60, id as i64, priority_time_minutes));
        }
        let opts = PlanOptions::default();
        let plan = plan_day(&store, day(), &config, &opts);

        assert_eq!(plan.scheduled.len(), 3);
        assert_eq!(plan.total_scheduled_minutes, 180);
        assert_eq!(plan.remaining_minutes, 300);
        assert_eq!(plan.scheduled[0].slot.start_minutes, 9 * 60);
        assert_eq!(plan.scheduled[0].slot.end_minutes, 10 * 60);
        assert_eq!(plan.scheduled[1].slot.start_minutes, 10 * 60);
        assert_eq!(plan.scheduled[2].slot.start_minutes, 11 * 60);
    }

    #[test]
    fn window_outside_work_hours_is_dropped_entirely() {
        let mut store = MemStore::new();
        let mut task = bare_task(1, vec![]);
        task.window_start = Some("19:00".into());
        task.window_end = Some("21:00".into());
        store.seed(task);

        let config = PlannerConfig::default();
        let opts = PlanOptions::default();
        let plan = plan_day(&store, day(), &config, &opts);

        // priority-time 09:00 falls outside the 19:00-21:00 window, so the
        // evaluator scores it 0 and step 3 rejects it before step 4 ever
        // sees it — it belongs in neither list.
        assert!(plan.scheduled.is_empty());
        assert!(plan.unscheduled.is_empty());
    }

    #[test]
    fn narrow_window_containing_priority_time_still_gets_scheduled() {
        let mut store = MemStore::new();
        let config = PlannerConfig::default();
        let priority_time_minutes = priority_time(config.work_hours_start);
        let mut task = deadline_task(1, 30, 4, priority_time_minutes);
        task.window_start = Some("09:00".into());
        task.window_end = Some("09:30".into());
        store.seed(task);

        let opts = PlanOptions::default();
        let plan = plan_day(&store, day(), &config, &opts);

        assert_eq!(plan.scheduled.len(), 1);
        assert_eq!(plan.scheduled[0].slot.start_minutes, 9 * 60);
        assert_eq!(plan.scheduled[0].slot.end_minutes, 9 * 60 + 30);
    }

    #[test]
    fn oversized_task_does_not_fit_reports_reason() {
        let mut store = MemStore::new();
        let config = PlannerConfig::default();
        let priority_time_minutes = priority_time(config.work_hours_start);
        store.seed(deadline_task(1, 300, 2, priority_time_minutes));
        store.seed(deadline_task(2, 300, 1, priority_time_minutes));

        let opts = PlanOptions::default();
        let plan = plan_day(&store, day(), &config, &opts);

        assert_eq!(plan.scheduled.len(), 1);
        assert_eq!(plan.unscheduled.len(), 1);
        assert_eq!(plan.unscheduled[0].reason, REASON_DOES_NOT_FIT);
    }

    #[test]
    fn limit_caps_scheduled_count() {
        let mut store = MemStore::new();
        let config = PlannerConfig::default();
        let priority_time_minutes = priority_time(config.work_hours_start);
        for id in 1..=5 {
            store.seed(deadline_task(id, 15, id as i64, priority_time_minutes));
        }
        let opts = PlanOptions {
            limit: 2,
            include_time_blocks: true,
        };
        let plan = plan_day(&store, day(), &config, &opts);
        assert_eq!(plan.scheduled.len(), 2);
    }

    #[test]
    fn without_time_blocks_uses_nominal_whole_day_slot() {
        let mut store = MemStore::new();
        let config = PlannerConfig::default();
        let priority_time_minutes = priority_time(config.work_hours_start);
        store.seed(deadline_task(1, 600, 1, priority_time_minutes));
        let opts = PlanOptions {
            limit: 8,
            include_time_blocks: false,
        };
        let plan = plan_day(&store, day(), &config, &opts);
        assert_eq!(plan.scheduled.len(), 1);
        assert_eq!(plan.scheduled[0].slot.start_minutes, config.work_hours_start);
        assert_eq!(plan.scheduled[0].slot.end_minutes, config.work_hours_end);
        assert!(plan.unscheduled.is_empty());
    }

    #[test]
    fn recurring_task_due_today_is_planned() {
        let mut store = MemStore::new();
        let mut task = bare_task(1, vec![]);
        task.recurrence = Some(taskpulse_core::RecurrencePattern {
            mode: taskpulse_core::RecurrenceMode::Calendar,
            kind: taskpulse_core::RecurrenceType::Daily,
        });
        task.next_due_at = Some(minutes_to_datetime(day(), 0));
        task.curve = CurveConfig::Accumulator {
            recurrence: task.recurrence.clone(),
            buildup_rate: None,
        };
        store.seed(task);

        let config = PlannerConfig::default();
        let opts = PlanOptions::default();
        let plan = plan_day(&store, day(), &config, &opts);
        assert_eq!(plan.scheduled.len(), 1);
    }

    #[test]
    fn high_priority_catch_all_schedules_without_deadline_or_window() {
        let mut store = MemStore::new();
        let config = PlannerConfig::default();
        let priority_time_minutes = priority_time(config.work_hours_start);
        let now = minutes_to_datetime(day(), priority_time_minutes);
        let mut task = bare_task(1, vec![]);
        // task.deadline stays None so only the 0.3 catch-all can admit this
        // task; the curve's own deadline still drives its priority score.
        task.curve = CurveConfig::Linear {
            start_date: Some(now - chrono::Duration::days(10)),
            deadline: Some(now - chrono::Duration::days(5)),
        };
        store.seed(task);

        let opts = PlanOptions::default();
        let plan = plan_day(&store, day(), &config, &opts);
        assert_eq!(plan.scheduled.len(), 1);
    }
}
