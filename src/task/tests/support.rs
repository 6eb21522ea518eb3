//! Shared fixtures for task unit tests.

use crate::task::domain::{NewTaskRecord, TaskRecord};
use mockable::DefaultClock;

/// Builds a TODO record or panics; test input is always valid.
pub(super) fn todo_record(component: &str, title: &str, body: &str) -> TaskRecord {
    TaskRecord::new(
        NewTaskRecord::new(component, title).with_body(body),
        &DefaultClock,
    )
    .expect("test record should be valid")
}
