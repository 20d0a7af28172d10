//! Priority evaluation (spec.md §4.6): the three-step decision that turns a
//! task plus the current instant into a single priority score, and the
//! ranked listing built on top of it.

use crate::curves::PriorityCurve;
use crate::factory;
use chrono::{DateTime, Timelike, Utc};
use taskpulse_core::{Task, TaskStatus, TaskStore};

/// Priority of `task` at `now`.
///
/// 1. If `task` has dependencies and any is incomplete, priority is `0.0`
///    regardless of curve — a blocked task is never worth surfacing.
/// 2. If `task` carries a window (`window_start`/`window_end`) and `now`
///    falls outside it, priority is `0.0`.
/// 3. Otherwise build the task's curve and evaluate it. If curve
///    construction fails (missing a required field the task never set),
///    fall back to a synthetic `Linear` curve from `created_at` to
///    `deadline.unwrap_or(now + 7 days)` rather than surface an error for
///    what is, from the caller's perspective, just "rank this task" —
///    matching spec.md §4.6 step 3's fallback.
pub fn evaluate_priority(task: &Task, now: DateTime<Utc>, store: &dyn TaskStore) -> f64 {
    if !taskpulse_core::all_complete(store, &task.dependencies) {
        return 0.0;
    }
    if task.has_window() && !task.window_contains(now.hour() * 60 + now.minute()) {
        return 0.0;
    }

    match factory::build_curve(&task.curve, Some(store), Some(task), now) {
        Ok(curve) => curve.evaluate(now, store),
        Err(_) => fallback_linear(task, now).evaluate(now, store),
    }
}

/// The fallback curve spec.md §4.6 step 3 specifies for a task whose curve
/// failed to build: `Linear` from `created_at` to `deadline` (or
/// `created_at + 7 days` if unset).
fn fallback_linear(task: &Task, _now: DateTime<Utc>) -> PriorityCurve {
    let start = task.created_at;
    let deadline = task
        .deadline
        .filter(|d| *d > start)
        .unwrap_or(start + chrono::Duration::days(7));
    PriorityCurve::linear(start, deadline).expect("start is strictly before deadline by construction")
}

/// Open and in-progress tasks, ranked by descending priority at `now`.
/// Ties break by descending creation order (spec.md §5) — more recently
/// created tasks sort first among equal priorities.
pub fn get_by_priority(
    store: &dyn TaskStore,
    limit: Option<usize>,
    now: DateTime<Utc>,
) -> Vec<(Task, f64)> {
    let mut scored: Vec<(Task, f64)> = store
        .all()
        .into_iter()
        .filter(|t| matches!(t.status, TaskStatus::Open | TaskStatus::InProgress))
        .map(|t| {
            let priority = evaluate_priority(&t, now, store);
            (t, priority)
        })
        .collect();

    scored.sort_by(|(a, pa), (b, pb)| {
        pb.partial_cmp(pa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    if let Some(limit) = limit {
        scored.truncate(limit);
    }
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use taskpulse_core::testing::{bare_task, MemStore};
    use taskpulse_core::CurveConfig;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, mi, 0).unwrap()
    }

    #[test]
    fn blocked_by_incomplete_dependency_is_zero() {
        let mut store = MemStore::new();
        store.seed(bare_task(1, vec![]));
        let blocked = bare_task(2, vec![1]);
        store.seed(blocked.clone());
        let now = dt(2026, 1, 1, 12, 0);
        assert_eq!(evaluate_priority(&blocked, now, &store), 0.0);
    }

    #[test]
    fn unblocked_once_dependency_completes() {
        let mut store = MemStore::new();
        let mut dep = bare_task(1, vec![]);
        dep.status = TaskStatus::Completed;
        store.seed(dep);
        let blocked = bare_task(2, vec![1]);
        store.seed(blocked.clone());
        let now = dt(2026, 1, 1, 12, 0);
        // Linear default curve (start=deadline=now-ish window) still
        // evaluates to *something* non-blocked; assert it isn't the
        // hard-coded blocked value of exactly 0 by construction.
        let mut task = blocked;
        task.curve = CurveConfig::Linear {
            start_date: Some(now - chrono::Duration::days(1)),
            deadline: Some(now + chrono::Duration::days(1)),
        };
        assert!(evaluate_priority(&task, now, &store) > 0.0);
    }

    #[test]
    fn outside_window_is_zero() {
        let mut store = MemStore::new();
        let mut task = bare_task(1, vec![]);
        task.window_start = Some("19:00".into());
        task.window_end = Some("21:00".into());
        store.seed(task.clone());
        let now = dt(2026, 1, 1, 9, 0);
        assert_eq!(evaluate_priority(&task, now, &store), 0.0);
    }

    #[test]
    fn get_by_priority_sorts_descending_and_respects_limit() {
        let mut store = MemStore::new();
        let now = dt(2026, 1, 15, 0, 0);
        for (id, deadline_offset) in [(1, 1), (2, 20), (3, 5)] {
            let mut task = bare_task(id, vec![]);
            task.curve = CurveConfig::Linear {
                start_date: Some(now - chrono::Duration::days(10)),
                deadline: Some(now + chrono::Duration::days(deadline_offset)),
            };
            store.seed(task);
        }
        let ranked = get_by_priority(&store, Some(2), now);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0.id, 1); // nearest deadline -> highest priority
        assert!(ranked[0].1 >= ranked[1].1);
    }

    #[test]
    fn completed_tasks_are_excluded() {
        let mut store = MemStore::new();
        let mut task = bare_task(1, vec![]);
        task.status = TaskStatus::Completed;
        store.seed(task);
        let ranked = get_by_priority(&store, None, dt(2026, 1, 1, 0, 0));
        assert!(ranked.is_empty());
    }
}
