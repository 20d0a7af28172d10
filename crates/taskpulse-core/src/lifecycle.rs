//! The task lifecycle manager (spec.md §4.7): `create`, `update`, `delete`,
//! `complete`, `reopen`. The exclusive writer of tasks (spec.md §3
//! Ownership) — every mutation flows through here so the dependency
//! invariants (spec.md §3, invariants 1-2, 8) are enforced uniformly.

use crate::dependency;
use crate::store::{CompletionRecord, NewTaskInput, TaskPatch, TaskStore};
use crate::{CoreError, RecurrencePattern, Task, TaskId, TaskStatus};
use chrono::{DateTime, Utc};

/// Drives task creation, mutation, and status transitions against a
/// `TaskStore`.
pub struct TaskManager<'a> {
    store: &'a mut dyn TaskStore,
}

impl<'a> TaskManager<'a> {
    pub fn new(store: &'a mut dyn TaskStore) -> Self {
        Self { store }
    }

    /// Create a task. Validates dependency existence (spec.md invariant 1);
    /// the curve, if unspecified, defaults per spec.md §4.3.
    pub fn create(&mut self, input: NewTaskInput) -> Result<TaskId, CoreError> {
        dependency::check_existence(self.store, &input.dependencies)?;
        Ok(self.store.insert(input))
    }

    /// Update a task. If `patch.dependencies` is set, re-validates
    /// existence and acyclicity (spec.md invariant 2) against this task's
    /// id.
    pub fn update(&mut self, id: TaskId, patch: TaskPatch) -> Result<(), CoreError> {
        if self.store.get(id).is_none() {
            return Err(CoreError::NotFound(id));
        }
        if let Some(deps) = &patch.dependencies {
            dependency::validate_write(self.store, Some(id), deps)?;
        }
        self.store
            .update(id, patch)
            .ok_or(CoreError::NotFound(id))
    }

    /// Delete a task, refusing if any other task still depends on it
    /// (spec.md invariant 8).
    pub fn delete(&mut self, id: TaskId) -> Result<(), CoreError> {
        if self.store.get(id).is_none() {
            return Err(CoreError::NotFound(id));
        }
        let dependents = dependency::dependents_of(self.store, id);
        if !dependents.is_empty() {
            return Err(CoreError::HasDependents(id));
        }
        self.store.delete(id).ok_or(CoreError::NotFound(id))
    }

    /// Complete a task at `completed_at` (defaults to now). For recurring
    /// tasks, computes the next due instant and reopens the task (spec.md
    /// invariant 3); otherwise marks it `Completed` (spec.md invariant 4).
    pub fn complete(
        &mut self,
        id: TaskId,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), CoreError> {
        let task = self.store.get(id).ok_or(CoreError::NotFound(id))?;
        let completed_at = completed_at.unwrap_or_else(Utc::now);

        self.store.insert_completion(CompletionRecord {
            task_id: id,
            completed_at,
        });
        self.store.set_last_completed(id, completed_at);

        if let Some(pattern) = task.recurrence.as_ref() {
            let next = self.next_due_for(pattern, completed_at, task.created_at);
            self.store.set_next_due(id, next);
            self.store
                .update(
                    id,
                    TaskPatch {
                        status: Some(TaskStatus::Open),
                        ..Default::default()
                    },
                )
                .ok_or(CoreError::NotFound(id))?;
        } else {
            self.store
                .update(
                    id,
                    TaskPatch {
                        status: Some(TaskStatus::Completed),
                        ..Default::default()
                    },
                )
                .ok_or(CoreError::NotFound(id))?;
        }
        Ok(())
    }

    /// Reopen a task: `status = Open`.
    pub fn reopen(&mut self, id: TaskId) -> Result<(), CoreError> {
        if self.store.get(id).is_none() {
            return Err(CoreError::NotFound(id));
        }
        self.store
            .update(
                id,
                TaskPatch {
                    status: Some(TaskStatus::Open),
                    ..Default::default()
                },
            )
            .ok_or(CoreError::NotFound(id))
    }

    fn next_due_for(
        &self,
        pattern: &RecurrencePattern,
        completed_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> DateTime<Utc> {
        crate::recurrence::next_due(pattern, completed_at, created_at)
    }
}
