//! An in-memory `TaskStore` used by this crate's own unit tests and by
//! `taskpulse-solver`'s integration tests (enabled there via the
//! `test-util` feature). Not part of the public API surface used by real
//! integrations — production implementations of `TaskStore` live outside
//! this workspace (spec.md §1).

use crate::{CompletionRecord, CurveConfig, Filter, NewTaskInput, Task, TaskId, TaskPatch, TaskStatus, TaskStore};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Default)]
pub struct MemStore {
    pub tasks: HashMap<TaskId, Task>,
    pub completions: Vec<CompletionRecord>,
    next_id: TaskId,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed `Task` (bypassing `insert`'s defaulting),
    /// bumping the id counter so later `insert` calls don't collide.
    pub fn seed(&mut self, task: Task) -> TaskId {
        let id = task.id;
        self.next_id = self.next_id.max(id + 1);
        self.tasks.insert(id, task);
        id
    }
}

impl TaskStore for MemStore {
    fn get(&self, id: TaskId) -> Option<Task> {
        self.tasks.get(&id).cloned()
    }

    fn list(&self, filter: &Filter) -> Vec<Task> {
        self.tasks
            .values()
            .filter(|t| {
                filter
                    .status
                    .as_ref()
                    .map(|s| s.contains(&t.status))
                    .unwrap_or(true)
            })
            .filter(|t| filter.project.as_ref().map(|p| t.project.as_ref() == Some(p)).unwrap_or(true))
            .filter(|t| filter.bucket_id.as_ref().map(|b| t.bucket_id.as_ref() == Some(b)).unwrap_or(true))
            .filter(|t| filter.tags.is_empty() || filter.tags.iter().all(|tag| t.tags.contains(tag)))
            .filter(|t| filter.has_deadline.map(|hd| t.deadline.is_some() == hd).unwrap_or(true))
            .filter(|t| filter.has_recurrence.map(|hr| t.recurrence.is_some() == hr).unwrap_or(true))
            .cloned()
            .collect()
    }

    fn insert(&mut self, input: NewTaskInput) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        let now = Utc::now();
        let curve = input
            .curve
            .unwrap_or_else(|| CurveConfig::default_for(input.recurrence.as_ref()));
        let task = Task {
            id,
            title: input.title,
            project: input.project,
            bucket_id: input.bucket_id,
            tags: input.tags,
            deadline: input.deadline,
            estimate_minutes: input.estimate_minutes,
            window_start: input.window_start,
            window_end: input.window_end,
            recurrence: input.recurrence,
            last_completed_at: None,
            next_due_at: None,
            dependencies: input.dependencies,
            curve,
            status: TaskStatus::Open,
            created_at: now,
            updated_at: now,
        };
        self.tasks.insert(id, task);
        id
    }

    fn update(&mut self, id: TaskId, patch: TaskPatch) -> Option<()> {
        let task = self.tasks.get_mut(&id)?;
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(project) = patch.project {
            task.project = project;
        }
        if let Some(bucket_id) = patch.bucket_id {
            task.bucket_id = bucket_id;
        }
        if let Some(tags) = patch.tags {
            task.tags = tags;
        }
        if let Some(deadline) = patch.deadline {
            task.deadline = deadline;
        }
        if let Some(estimate) = patch.estimate_minutes {
            task.estimate_minutes = estimate;
        }
        if let Some(window_start) = patch.window_start {
            task.window_start = window_start;
        }
        if let Some(window_end) = patch.window_end {
            task.window_end = window_end;
        }
        if let Some(recurrence) = patch.recurrence {
            task.recurrence = recurrence;
        }
        if let Some(deps) = patch.dependencies {
            task.dependencies = deps;
        }
        if let Some(curve) = patch.curve {
            task.curve = curve;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        task.updated_at = Utc::now();
        Some(())
    }

    fn delete(&mut self, id: TaskId) -> Option<()> {
        self.tasks.remove(&id).map(|_| ())
    }

    fn set_last_completed(&mut self, id: TaskId, ts: DateTime<Utc>) {
        if let Some(t) = self.tasks.get_mut(&id) {
            t.last_completed_at = Some(ts);
        }
    }

    fn set_next_due(&mut self, id: TaskId, ts: DateTime<Utc>) {
        if let Some(t) = self.tasks.get_mut(&id) {
            t.next_due_at = Some(ts);
        }
    }

    fn insert_completion(&mut self, record: CompletionRecord) {
        self.completions.push(record);
    }

    fn search(&self, query: &str) -> Vec<Task> {
        self.tasks
            .values()
            .filter(|t| t.title.contains(query))
            .cloned()
            .collect()
    }
}

/// Build a bare, dependency-free task for tests, with sensible defaults.
pub fn bare_task(id: TaskId, deps: Vec<TaskId>) -> Task {
    Task {
        id,
        title: format!("task {id}"),
        project: None,
        bucket_id: None,
        tags: vec![],
        deadline: None,
        estimate_minutes: None,
        window_start: None,
        window_end: None,
        recurrence: None,
        last_completed_at: None,
        next_due_at: None,
        dependencies: deps,
        curve: CurveConfig::Linear {
            start_date: None,
            deadline: None,
        },
        status: TaskStatus::Open,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
