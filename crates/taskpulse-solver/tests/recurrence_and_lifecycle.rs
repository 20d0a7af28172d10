//! End-to-end literal-value scenarios for recurrence and the task
//! lifecycle (spec.md §8 "End-to-end scenarios", items 6-8), driven
//! through `taskpulse_core::TaskManager` against the in-memory store.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use taskpulse_core::testing::MemStore;
use taskpulse_core::{
    CoreError, CurveConfig, NewTaskInput, RecurrenceMode, RecurrencePattern, RecurrenceType,
    TaskManager, TaskPatch, TaskStatus, TaskStore,
};

fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, mi, 0).unwrap()
}

#[test]
fn scenario_6_recurring_daily_completed_yesterday_is_due_today() {
    let mut store = MemStore::new();
    let pattern = RecurrencePattern {
        mode: RecurrenceMode::Calendar,
        kind: RecurrenceType::Daily,
    };
    let id = {
        let mut mgr = TaskManager::new(&mut store);
        mgr.create(
            NewTaskInput::new("water plants")
                .curve(CurveConfig::Accumulator {
                    recurrence: Some(pattern.clone()),
                    buildup_rate: None,
                }),
        )
        .unwrap()
    };
    let mut mgr = TaskManager::new(&mut store);
    mgr.update(
        id,
        TaskPatch {
            recurrence: Some(Some(pattern)),
            ..Default::default()
        },
    )
    .unwrap();

    let yesterday_evening = dt(2026, 3, 4, 22, 0);
    mgr.complete(id, Some(yesterday_evening)).unwrap();

    let task = store.get(id).unwrap();
    assert_eq!(task.status, TaskStatus::Open);
    assert_eq!(task.next_due_at, Some(dt(2026, 3, 5, 0, 0)));
}

#[test]
fn scenario_7_weekly_monday_recurrence_completed_friday() {
    let mut store = MemStore::new();
    let pattern = RecurrencePattern {
        mode: RecurrenceMode::Calendar,
        kind: RecurrenceType::Weekly {
            day_of_week: Some(1), // Monday
            days_of_week: None,
        },
    };
    let id = {
        let mut mgr = TaskManager::new(&mut store);
        mgr.create(NewTaskInput::new("weekly report")).unwrap()
    };
    store.update(
        id,
        TaskPatch {
            recurrence: Some(Some(pattern)),
            ..Default::default()
        },
    );

    // 2026-03-06 is a Friday.
    let friday = dt(2026, 3, 6, 17, 0);
    let mut mgr = TaskManager::new(&mut store);
    mgr.complete(id, Some(friday)).unwrap();

    let task = store.get(id).unwrap();
    assert_eq!(task.next_due_at.unwrap().weekday().num_days_from_sunday(), 1);
}

#[test]
fn scenario_8_circular_dependency_is_rejected() {
    let mut store = MemStore::new();
    let mut mgr = TaskManager::new(&mut store);
    let t1 = mgr.create(NewTaskInput::new("task1")).unwrap();
    let t2 = mgr
        .create(NewTaskInput::new("task2").depends_on(t1))
        .unwrap();

    // Proposing task1 -> task2 would close the loop (task1 -> task2 -> task1).
    let err = mgr
        .update(
            t1,
            TaskPatch {
                dependencies: Some(vec![t2]),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err, CoreError::Circular(t1));
}

#[test]
fn delete_refuses_while_dependents_exist_then_succeeds_after_removal() {
    let mut store = MemStore::new();
    let mut mgr = TaskManager::new(&mut store);
    let base = mgr.create(NewTaskInput::new("base")).unwrap();
    let dependent = mgr
        .create(NewTaskInput::new("dependent").depends_on(base))
        .unwrap();

    assert_eq!(mgr.delete(base).unwrap_err(), CoreError::HasDependents(base));

    mgr.update(
        dependent,
        TaskPatch {
            dependencies: Some(vec![]),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(mgr.delete(base).is_ok());
}
