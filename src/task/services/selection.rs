//! Candidate selection for unattended sessions.

use tracing::debug;

use crate::task::{
    domain::{TaskId, TaskStatus, is_suitable},
    ports::{TaskStore, TaskStoreResult},
};

/// Picks up to `max_count` suitable TODO tasks, in store order.
///
/// When `component_filter` is set, only tasks whose component or body
/// contains it (case-insensitively) are considered.
///
/// # Errors
///
/// Returns the store error when listing or reading a TODO record fails.
pub async fn select_candidates<S>(
    store: &S,
    component_filter: Option<&str>,
    max_count: usize,
) -> TaskStoreResult<Vec<TaskId>>
where
    S: TaskStore + ?Sized,
{
    let mut selected = Vec::new();
    if max_count == 0 {
        return Ok(selected);
    }
    for id in store.list(TaskStatus::Todo).await? {
        let record = store.read(&id).await?;
        if let Some(filter) = component_filter
            && !record.matches_filter(filter)
        {
            continue;
        }
        if !is_suitable(&record.suitability_text()) {
            debug!(task_id = %id, "skipping task unsuitable for unattended work");
            continue;
        }
        selected.push(id);
        if selected.len() == max_count {
            break;
        }
    }
    Ok(selected)
}
