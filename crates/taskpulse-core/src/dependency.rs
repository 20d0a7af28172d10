//! Dependency existence and acyclicity validation (spec.md §4.5).
//!
//! Grounded on the teacher's `utf8proj-solver/src/dag.rs` Kahn's-algorithm
//! cycle detector, adapted from "flatten a WBS and topo-sort the whole
//! graph" to the narrower, cheaper question asked on every write: "would
//! adding these dependency edges to task `X` create a cycle back to `X`?"
//! — answered with a bounded BFS over the live store, per spec.md §4.5.

use crate::{CoreError, Task, TaskId, TaskStore};
use std::collections::{HashSet, VecDeque};

/// Check that every id in `dependencies` resolves to a task in `store`.
pub fn check_existence(store: &dyn TaskStore, dependencies: &[TaskId]) -> Result<(), CoreError> {
    for &dep in dependencies {
        if store.get(dep).is_none() {
            return Err(CoreError::DepMissing { missing: dep });
        }
    }
    Ok(())
}

/// BFS the transitive closure of `dependencies`; if `exclude_task_id` (the
/// task being updated) appears in that closure, adding these edges would
/// create a cycle back to it.
///
/// The visited set prevents re-expansion, bounding the search to `O(V+E)`
/// over the graph reachable from `dependencies`.
pub fn check_acyclic(
    store: &dyn TaskStore,
    exclude_task_id: TaskId,
    dependencies: &[TaskId],
) -> Result<(), CoreError> {
    let mut visited: HashSet<TaskId> = HashSet::new();
    let mut queue: VecDeque<TaskId> = dependencies.iter().copied().collect();

    while let Some(id) = queue.pop_front() {
        if id == exclude_task_id {
            return Err(CoreError::Circular(exclude_task_id));
        }
        if !visited.insert(id) {
            continue;
        }
        if let Some(task) = store.get(id) {
            for &next in &task.dependencies {
                if !visited.contains(&next) {
                    queue.push_back(next);
                }
            }
        }
    }
    Ok(())
}

/// Run both checks for a task update: existence of the new dependency list,
/// then acyclicity with `exclude_task_id` excluded from expansion so the
/// task doesn't trivially "depend on itself" via its own current edges.
pub fn validate_write(
    store: &dyn TaskStore,
    exclude_task_id: Option<TaskId>,
    dependencies: &[TaskId],
) -> Result<(), CoreError> {
    check_existence(store, dependencies)?;
    if let Some(id) = exclude_task_id {
        check_acyclic(store, id, dependencies)?;
    }
    Ok(())
}

/// `true` iff every id in `dependencies` resolves to a task AND every
/// resolved task has `status = Completed` (spec.md §4.5).
pub fn all_complete(store: &dyn TaskStore, dependencies: &[TaskId]) -> bool {
    dependencies.iter().all(|&id| {
        store
            .get(id)
            .map(|task: Task| task.status == crate::TaskStatus::Completed)
            .unwrap_or(false)
    })
}

/// Every other task (besides `target`) that currently lists `target` in its
/// dependency list — used by `delete` to enforce spec.md invariant 8.
pub fn dependents_of(store: &dyn TaskStore, target: TaskId) -> Vec<TaskId> {
    store
        .all()
        .into_iter()
        .filter(|t| t.id != target && t.dependencies.contains(&target))
        .map(|t| t.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bare_task, MemStore};
    use crate::TaskStatus;

    #[test]
    fn existence_rejects_unknown_id() {
        let store = MemStore::new();
        let err = check_existence(&store, &[42]).unwrap_err();
        assert_eq!(err, CoreError::DepMissing { missing: 42 });
    }

    #[test]
    fn existence_accepts_known_id() {
        let mut store = MemStore::new();
        store.seed(bare_task(1, vec![]));
        assert!(check_existence(&store, &[1]).is_ok());
    }

    #[test]
    fn acyclic_detects_direct_cycle() {
        let mut store = MemStore::new();
        store.seed(bare_task(1, vec![2]));
        store.seed(bare_task(2, vec![]));
        // task1 -> task2 exists; update task1 with deps [2] again re-adding
        // no new edge, so it's fine. A real cycle: task2 now depends on 1.
        let err = check_acyclic(&store, 1, &[2]).unwrap_err();
        assert_eq!(err, CoreError::Circular(1));
    }

    #[test]
    fn acyclic_detects_transitive_cycle() {
        let mut store = MemStore::new();
        // 1 -> 2 -> 3; proposing 3 -> 1 would close the loop.
        store.seed(bare_task(1, vec![2]));
        store.seed(bare_task(2, vec![3]));
        store.seed(bare_task(3, vec![]));
        let err = check_acyclic(&store, 1, &[2]).unwrap_err();
        assert_eq!(err, CoreError::Circular(1));
    }

    #[test]
    fn acyclic_accepts_dag() {
        let mut store = MemStore::new();
        store.seed(bare_task(1, vec![]));
        store.seed(bare_task(2, vec![1]));
        store.seed(bare_task(3, vec![]));
        assert!(check_acyclic(&store, 3, &[1, 2]).is_ok());
    }

    #[test]
    fn all_complete_false_when_any_incomplete() {
        let mut store = MemStore::new();
        let mut done = bare_task(1, vec![]);
        done.status = TaskStatus::Completed;
        store.seed(done);
        store.seed(bare_task(2, vec![]));
        assert!(!all_complete(&store, &[1, 2]));
        assert!(all_complete(&store, &[1]));
    }

    #[test]
    fn all_complete_false_when_missing() {
        let store = MemStore::new();
        assert!(!all_complete(&store, &[99]));
    }

    #[test]
    fn all_complete_true_for_empty_deps() {
        let store = MemStore::new();
        assert!(all_complete(&store, &[]));
    }

    #[test]
    fn dependents_of_finds_reverse_edges() {
        let mut store = MemStore::new();
        store.seed(bare_task(1, vec![]));
        store.seed(bare_task(2, vec![1]));
        store.seed(bare_task(3, vec![1]));
        let mut deps = dependents_of(&store, 1);
        deps.sort_unstable();
        assert_eq!(deps, vec![2, 3]);
        assert!(dependents_of(&store, 2).is_empty());
    }
}
