//! The persistence collaborator surface (spec.md §6).
//!
//! `TaskStore` is the only interface the core consumes for reads and
//! writes; the concrete SQL/file-backed implementation lives outside this
//! workspace (spec.md §1, "deliberately out of scope"). It is a plain
//! synchronous trait — see DESIGN.md's "Open Question decisions" for why
//! this crate does not thread `async fn` through it.

use crate::{CurveConfig, RecurrencePattern, Task, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A query filter, as passed to `TaskStore::list` (spec.md §6).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<TaskStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_deadline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_recurrence: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overdue: Option<bool>,
}

impl Filter {
    pub fn with_status(status: TaskStatus) -> Self {
        Self {
            status: Some(vec![status]),
            ..Default::default()
        }
    }

    pub fn with_statuses(statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        Self {
            status: Some(statuses.into_iter().collect()),
            ..Default::default()
        }
    }
}

/// Input to `TaskManager::create` / `TaskStore::insert` (spec.md §4.7).
///
/// Shaped like the `rusk` example's `NewTaskData`: a dedicated input struct
/// rather than a bare `Task`, so optional fields default sensibly instead of
/// requiring the caller to fabricate a whole record.
#[derive(Clone, Debug, Default)]
pub struct NewTaskInput {
    pub title: String,
    pub project: Option<String>,
    pub bucket_id: Option<String>,
    pub tags: Vec<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub estimate_minutes: Option<u32>,
    pub window_start: Option<String>,
    pub window_end: Option<String>,
    pub recurrence: Option<RecurrencePattern>,
    pub dependencies: Vec<TaskId>,
    pub curve: Option<CurveConfig>,
}

impl NewTaskInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn curve(mut self, curve: CurveConfig) -> Self {
        self.curve = Some(curve);
        self
    }

    pub fn depends_on(mut self, id: TaskId) -> Self {
        self.dependencies.push(id);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// Partial update to an existing task; `None` fields (or, for the double
/// `Option` fields, the inner `None`) leave the current value untouched.
#[derive(Clone, Debug, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub project: Option<Option<String>>,
    pub bucket_id: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub deadline: Option<Option<DateTime<Utc>>>,
    pub estimate_minutes: Option<Option<u32>>,
    pub window_start: Option<Option<String>>,
    pub window_end: Option<Option<String>>,
    pub recurrence: Option<Option<RecurrencePattern>>,
    pub dependencies: Option<Vec<TaskId>>,
    pub curve: Option<CurveConfig>,
    pub status: Option<TaskStatus>,
}

/// A record of a single completion event, written by
/// `TaskManager::complete` via `TaskStore::insert_completion`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub task_id: TaskId,
    pub completed_at: DateTime<Utc>,
}

/// The persistence collaborator (spec.md §6). Implemented outside this
/// workspace; the core only ever holds `&dyn TaskStore` / `&mut dyn
/// TaskStore`.
pub trait TaskStore {
    fn get(&self, id: TaskId) -> Option<Task>;
    fn list(&self, filter: &Filter) -> Vec<Task>;
    fn insert(&mut self, input: NewTaskInput) -> TaskId;
    fn update(&mut self, id: TaskId, patch: TaskPatch) -> Option<()>;
    fn delete(&mut self, id: TaskId) -> Option<()>;
    fn set_last_completed(&mut self, id: TaskId, ts: DateTime<Utc>);
    fn set_next_due(&mut self, id: TaskId, ts: DateTime<Utc>);
    fn insert_completion(&mut self, record: CompletionRecord);
    fn search(&self, query: &str) -> Vec<Task>;

    /// All tasks currently persisted; used by the dependency validator to
    /// walk the full graph (spec.md §4.5).
    fn all(&self) -> Vec<Task> {
        self.list(&Filter::default())
    }
}
